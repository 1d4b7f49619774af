use crate::storage::Note;

/// Lowercased, trimmed form of a raw query. `None` when nothing is left to match.
pub fn normalize_query(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

pub fn matches_note(note: &Note, normalized: &str) -> bool {
    note.title.to_lowercase().contains(normalized)
        || note.content.to_lowercase().contains(normalized)
}

/// Visible subset of `notes` for `query`, preserving order.
///
/// An empty (or whitespace-only) query keeps every note. Otherwise a note is kept when its
/// title or content contains the query as a case-insensitive substring.
pub fn filter_notes(notes: &[Note], query: &str) -> Vec<Note> {
    let Some(normalized) = normalize_query(query) else {
        return notes.to_vec();
    };
    notes
        .iter()
        .filter(|note| matches_note(note, &normalized))
        .cloned()
        .collect()
}
