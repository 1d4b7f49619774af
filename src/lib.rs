pub mod app;
pub mod cli;
pub mod config;
pub mod highlight;
pub mod preferences;
pub mod reactive;
pub mod search;
pub mod storage;
pub mod theme;

pub use app::{NotesState, NotesStore};
pub use config::{AppConfig, ConfigLoader, ConfigPaths};
pub use storage::{MockNoteRepository, Note, NoteDraft, NoteRepository, RepoError};
pub use theme::{Theme, ThemeStore};
