use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::LatencyConfig;

mod seed;

pub use seed::seed_notes;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Title and content submitted on create and update. No validation is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    #[error("Note not found: {id}")]
    NotFound { id: String },
    #[error("{0}")]
    Backend(String),
}

pub type RepoResult<T> = std::result::Result<T, RepoError>;

/// Backend contract consumed by the notes store.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Returns every note, most recently updated first.
    async fn list_notes(&self) -> RepoResult<Vec<Note>>;
    async fn create_note(&self, draft: NoteDraft) -> RepoResult<Note>;
    /// Replaces title and content; fails with [`RepoError::NotFound`] for unknown ids.
    async fn update_note(&self, id: &str, draft: NoteDraft) -> RepoResult<Note>;
    async fn delete_note(&self, id: &str) -> RepoResult<()>;
}

/// Simulated round-trip time per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyProfile {
    pub list: Duration,
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl LatencyProfile {
    pub fn instant() -> Self {
        Self {
            list: Duration::ZERO,
            create: Duration::ZERO,
            update: Duration::ZERO,
            delete: Duration::ZERO,
        }
    }
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self {
            list: Duration::from_millis(300),
            create: Duration::from_millis(400),
            update: Duration::from_millis(350),
            delete: Duration::from_millis(250),
        }
    }
}

impl From<&LatencyConfig> for LatencyProfile {
    fn from(config: &LatencyConfig) -> Self {
        Self {
            list: Duration::from_millis(config.list_ms),
            create: Duration::from_millis(config.create_ms),
            update: Duration::from_millis(config.update_ms),
            delete: Duration::from_millis(config.delete_ms),
        }
    }
}

/// In-memory stand-in for a remote notes backend. Clones share one collection.
#[derive(Debug, Clone)]
pub struct MockNoteRepository {
    notes: Arc<Mutex<Vec<Note>>>,
    latency: LatencyProfile,
}

impl MockNoteRepository {
    pub fn new(latency: LatencyProfile) -> Self {
        Self::with_notes(Vec::new(), latency)
    }

    pub fn with_seed_notes(latency: LatencyProfile) -> Self {
        Self::with_notes(seed_notes(OffsetDateTime::now_utc()), latency)
    }

    pub fn with_notes(notes: Vec<Note>, latency: LatencyProfile) -> Self {
        Self {
            notes: Arc::new(Mutex::new(notes)),
            latency,
        }
    }

    pub fn latency(&self) -> LatencyProfile {
        self.latency
    }

    pub fn len(&self) -> usize {
        self.notes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.lock().is_empty()
    }

    async fn simulate(&self, latency: Duration) {
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl NoteRepository for MockNoteRepository {
    async fn list_notes(&self) -> RepoResult<Vec<Note>> {
        self.simulate(self.latency.list).await;
        let mut notes = self.notes.lock().clone();
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        tracing::debug!(count = notes.len(), "listed notes");
        Ok(notes)
    }

    async fn create_note(&self, draft: NoteDraft) -> RepoResult<Note> {
        self.simulate(self.latency.create).await;
        let now = OffsetDateTime::now_utc();
        let note = Note {
            id: Uuid::now_v7().to_string(),
            title: draft.title,
            content: draft.content,
            created_at: now,
            updated_at: now,
        };
        self.notes.lock().push(note.clone());
        tracing::debug!(id = %note.id, "created note");
        Ok(note)
    }

    async fn update_note(&self, id: &str, draft: NoteDraft) -> RepoResult<Note> {
        self.simulate(self.latency.update).await;
        let mut notes = self.notes.lock();
        let Some(note) = notes.iter_mut().find(|note| note.id == id) else {
            tracing::debug!(id, "update of unknown note");
            return Err(RepoError::NotFound { id: id.to_owned() });
        };
        note.title = draft.title;
        note.content = draft.content;
        note.updated_at = OffsetDateTime::now_utc().max(note.updated_at);
        tracing::debug!(id, "updated note");
        Ok(note.clone())
    }

    async fn delete_note(&self, id: &str) -> RepoResult<()> {
        self.simulate(self.latency.delete).await;
        let mut notes = self.notes.lock();
        let Some(index) = notes.iter().position(|note| note.id == id) else {
            tracing::debug!(id, "delete of unknown note");
            return Err(RepoError::NotFound { id: id.to_owned() });
        };
        notes.remove(index);
        tracing::debug!(id, "deleted note");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashSet;

    fn repo() -> MockNoteRepository {
        MockNoteRepository::with_seed_notes(LatencyProfile::instant())
    }

    #[tokio::test]
    async fn list_sorts_by_updated_at_descending() {
        let repo = repo();
        let notes = repo.list_notes().await.unwrap();
        let titles: Vec<_> = notes.iter().map(|note| note.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Shopping List",
                "Meeting Notes - Q1 Planning",
                "Welcome to Notes App"
            ]
        );
        assert!(notes
            .windows(2)
            .all(|pair| pair[0].updated_at >= pair[1].updated_at));
    }

    #[tokio::test]
    async fn create_assigns_fresh_ids_and_equal_timestamps() {
        let repo = repo();
        let mut ids = HashSet::new();
        for n in 0..20 {
            let note = repo
                .create_note(NoteDraft::new(format!("n{n}"), ""))
                .await
                .unwrap();
            assert_eq!(note.created_at, note.updated_at);
            assert!(ids.insert(note.id));
        }
        assert_eq!(repo.len(), 23);
    }

    #[tokio::test]
    async fn create_accepts_empty_strings() {
        let repo = MockNoteRepository::new(LatencyProfile::instant());
        let note = repo.create_note(NoteDraft::default()).await.unwrap();
        assert_eq!(note.title, "");
        assert_eq!(note.content, "");
        assert_eq!(repo.list_notes().await.unwrap(), vec![note]);
    }

    #[tokio::test]
    async fn update_preserves_identity_and_refreshes_updated_at() {
        let repo = repo();
        let before = repo
            .list_notes()
            .await
            .unwrap()
            .into_iter()
            .find(|note| note.id == "1")
            .unwrap();

        let updated = repo
            .update_note("1", NoteDraft::new("Hello", "World"))
            .await
            .unwrap();

        assert_eq!(updated.id, "1");
        assert_eq!(updated.created_at, before.created_at);
        assert!(updated.updated_at >= before.updated_at);
        assert_eq!(updated.title, "Hello");
        assert_eq!(updated.content, "World");
        assert_eq!(repo.list_notes().await.unwrap()[0], updated);
    }

    #[tokio::test]
    async fn update_and_delete_unknown_id_fail_with_not_found() {
        let repo = repo();
        let err = repo
            .update_note("missing", NoteDraft::new("x", "y"))
            .await
            .unwrap_err();
        assert_matches!(&err, RepoError::NotFound { id } if id == "missing");
        assert_eq!(err.to_string(), "Note not found: missing");

        assert_matches!(
            repo.delete_note("missing").await,
            Err(RepoError::NotFound { .. })
        );
        assert_eq!(repo.len(), 3);
    }

    #[tokio::test]
    async fn delete_removes_note() {
        let repo = repo();
        repo.delete_note("2").await.unwrap();
        let notes = repo.list_notes().await.unwrap();
        assert_eq!(notes.len(), 2);
        assert!(notes.iter().all(|note| note.id != "2"));
        assert_matches!(repo.delete_note("2").await, Err(RepoError::NotFound { .. }));
    }

    #[tokio::test]
    async fn clones_share_the_same_collection() {
        let repo = repo();
        let other = repo.clone();
        other.delete_note("3").await.unwrap();
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn operations_wait_for_simulated_latency() {
        let repo = MockNoteRepository::with_seed_notes(LatencyProfile::default());
        let start = tokio::time::Instant::now();
        repo.list_notes().await.unwrap();
        assert_within(start.elapsed(), 300);

        let start = tokio::time::Instant::now();
        let note = repo.create_note(NoteDraft::new("a", "b")).await.unwrap();
        assert_within(start.elapsed(), 400);

        let start = tokio::time::Instant::now();
        repo.update_note(&note.id, NoteDraft::new("c", "d"))
            .await
            .unwrap();
        assert_within(start.elapsed(), 350);

        let start = tokio::time::Instant::now();
        repo.delete_note(&note.id).await.unwrap();
        assert_within(start.elapsed(), 250);
    }

    fn assert_within(elapsed: Duration, expected_ms: u64) {
        let expected = Duration::from_millis(expected_ms);
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(5),
            "expected ~{expected:?}, waited {elapsed:?}"
        );
    }

    #[test]
    fn note_serializes_with_camel_case_rfc3339_fields() {
        let note = seed_notes(time::macros::datetime!(2024-05-01 12:00 UTC))
            .into_iter()
            .next()
            .unwrap();
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["id"], "1");
        assert_eq!(json["createdAt"], "2024-04-30T12:00:00Z");
        assert_eq!(json["updatedAt"], "2024-04-30T12:00:00Z");
        let back: Note = serde_json::from_value(json).unwrap();
        assert_eq!(back, note);
    }
}
