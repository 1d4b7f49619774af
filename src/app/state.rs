use crate::storage::Note;

/// Snapshot published by [`super::NotesStore`] after every transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotesState {
    /// Presentation order, most recently updated first.
    pub notes: Vec<Note>,
    pub loading: bool,
    pub error: Option<String>,
    pub search_query: String,
}

impl NotesState {
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn note(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.notes.iter().position(|note| note.id == id)
    }

    pub(crate) fn begin_operation(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub(crate) fn finish_operation(&mut self) {
        self.loading = false;
    }

    pub(crate) fn fail_operation(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
    }

    pub(crate) fn replace_notes(&mut self, notes: Vec<Note>) {
        self.notes = notes;
    }

    /// New notes go to the head without resorting the rest.
    pub(crate) fn prepend_note(&mut self, note: Note) {
        self.notes.insert(0, note);
    }

    /// Swaps the cached copy in place; the list is deliberately not resorted.
    pub(crate) fn replace_note(&mut self, note: Note) {
        if let Some(slot) = self.notes.iter_mut().find(|cached| cached.id == note.id) {
            *slot = note;
        }
    }

    pub(crate) fn remove_note(&mut self, id: &str) {
        self.notes.retain(|note| note.id != id);
    }
}
