use std::future::Future;
use std::sync::Arc;

use strum::Display;

use crate::reactive::{Readable, Subscription, Writable};
use crate::search::filter_notes;
use crate::storage::{Note, NoteDraft, NoteRepository, RepoError, RepoResult};

pub mod state;

pub use state::NotesState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
enum Operation {
    Load,
    Create,
    Update,
    Delete,
}

impl Operation {
    fn fallback_message(self) -> &'static str {
        match self {
            Operation::Load => "Failed to load notes",
            Operation::Create => "Failed to create note",
            Operation::Update => "Failed to update note",
            Operation::Delete => "Failed to delete note",
        }
    }
}

/// UI-facing notes state container.
///
/// Every CRUD call publishes `loading = true` with the error cleared, awaits the repository,
/// then publishes either the merged notes or the failure message. Failures are also returned
/// to the caller so it can keep its edit context.
///
/// Calls are not serialized: two overlapping operations each apply their merge to whatever
/// state is current when they settle, and the last publish decides `loading`.
#[derive(Clone)]
pub struct NotesStore {
    repo: Arc<dyn NoteRepository>,
    state: Writable<NotesState>,
    filtered: Readable<Vec<Note>>,
}

impl NotesStore {
    pub fn new(repo: Arc<dyn NoteRepository>) -> Self {
        let state = Writable::new(NotesState::default());
        let filtered = state
            .readable()
            .derive(|state: &NotesState| filter_notes(&state.notes, &state.search_query));
        Self {
            repo,
            state,
            filtered,
        }
    }

    pub fn snapshot(&self) -> NotesState {
        self.state.get()
    }

    pub fn state(&self) -> Readable<NotesState> {
        self.state.readable()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&NotesState) + Send + Sync + 'static,
    {
        self.state.subscribe(listener)
    }

    /// Notes matching the current search query, recomputed on every publish.
    pub fn filtered_notes(&self) -> Readable<Vec<Note>> {
        self.filtered.clone()
    }

    pub async fn load_notes(&self) -> RepoResult<()> {
        let notes = self
            .run(Operation::Load, self.repo.list_notes(), |state, notes| {
                state.replace_notes(notes.clone())
            })
            .await?;
        tracing::debug!(count = notes.len(), "notes loaded");
        Ok(())
    }

    pub async fn create_note(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> RepoResult<Note> {
        let draft = NoteDraft::new(title, content);
        self.run(Operation::Create, self.repo.create_note(draft), |state, note| {
            state.prepend_note(note.clone())
        })
        .await
    }

    pub async fn update_note(
        &self,
        id: &str,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> RepoResult<Note> {
        let draft = NoteDraft::new(title, content);
        self.run(Operation::Update, self.repo.update_note(id, draft), |state, note| {
            state.replace_note(note.clone())
        })
        .await
    }

    pub async fn delete_note(&self, id: &str) -> RepoResult<()> {
        self.run(Operation::Delete, self.repo.delete_note(id), |state, _| {
            state.remove_note(id)
        })
        .await
    }

    pub fn set_search_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.state.update(move |state| state.search_query = query);
    }

    pub fn clear_error(&self) {
        self.state.update(|state| state.error = None);
    }

    async fn run<T, Fut, M>(&self, operation: Operation, call: Fut, merge: M) -> RepoResult<T>
    where
        Fut: Future<Output = RepoResult<T>>,
        M: FnOnce(&mut NotesState, &T),
    {
        self.state.update(NotesState::begin_operation);
        match call.await {
            Ok(value) => {
                self.state.update(|state| {
                    merge(state, &value);
                    state.finish_operation();
                });
                Ok(value)
            }
            Err(err) => {
                let message = failure_message(&err, operation);
                tracing::warn!(%operation, error = %message, "notes operation failed");
                self.state
                    .update(move |state| state.fail_operation(message));
                Err(err)
            }
        }
    }
}

fn failure_message(err: &RepoError, operation: Operation) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        operation.fallback_message().to_owned()
    } else {
        message
    }
}
