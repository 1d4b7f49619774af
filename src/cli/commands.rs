use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use regex::Regex;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::app::{NotesState, NotesStore};
use crate::config::{AppConfig, ConfigPaths};
use crate::highlight::{build_highlight_regex, mark_matches};
use crate::preferences::FileStorage;
use crate::storage::{LatencyProfile, MockNoteRepository, Note};
use crate::theme::{TerminalHost, Theme, ThemeStore};

const SNIPPET_LINES: usize = 2;
const SNIPPET_CHARS: usize = 160;

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Search text; words are joined and matched as one case-insensitive substring
    #[arg()]
    pub query: Vec<String>,
    /// Limit the number of results printed
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

#[derive(Args, Debug, Clone)]
pub struct ThemeArgs {
    #[command(subcommand)]
    pub action: Option<ThemeAction>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ThemeAction {
    /// Print the current preference (default)
    Show,
    /// Flip between light and dark
    Toggle,
    /// Set an explicit value
    Set {
        /// `light` or `dark`
        theme: Theme,
    },
}

pub fn build_store(config: &AppConfig) -> NotesStore {
    let latency = LatencyProfile::from(&config.latency);
    let repo = if config.seed_notes {
        MockNoteRepository::with_seed_notes(latency)
    } else {
        MockNoteRepository::new(latency)
    };
    NotesStore::new(Arc::new(repo))
}

pub async fn list_notes(config: &AppConfig) -> Result<()> {
    let store = build_store(config);
    store.load_notes().await.context("loading notes")?;
    print!("{}", format_notes(&store.snapshot().notes, None));
    Ok(())
}

pub async fn search_notes(config: &AppConfig, args: SearchArgs) -> Result<()> {
    let store = build_store(config);
    let output = run_search(&store, &args).await?;
    print!("{output}");
    Ok(())
}

async fn run_search(store: &NotesStore, args: &SearchArgs) -> Result<String> {
    let raw_query = args.query.join(" ");
    if raw_query.trim().is_empty() {
        bail!("search query cannot be empty");
    }

    store.load_notes().await.context("loading notes")?;
    store.set_search_query(raw_query.as_str());
    let mut results = store.filtered_notes().get();
    tracing::info!(query = %raw_query.trim(), matches = results.len(), "search finished");
    results.truncate(args.limit);

    let regex = build_highlight_regex(&raw_query);
    Ok(format_notes(&results, regex.as_ref()))
}

pub fn handle_theme_command(config: &AppConfig, paths: &ConfigPaths, args: ThemeArgs) -> Result<()> {
    let storage = Arc::new(FileStorage::new(&paths.preferences_file));
    let store = ThemeStore::with_key(
        &config.theme.storage_key,
        storage,
        Arc::new(TerminalHost::detect()),
    );
    let theme = apply_theme_action(&store, args.action.unwrap_or(ThemeAction::Show));
    println!(
        "Theme: {theme} (stored in {})",
        paths.preferences_file.display()
    );
    Ok(())
}

fn apply_theme_action(store: &ThemeStore, action: ThemeAction) -> Theme {
    match action {
        ThemeAction::Show => store.theme(),
        ThemeAction::Toggle => store.toggle_theme(),
        ThemeAction::Set { theme } => {
            store.set_theme(theme);
            theme
        }
    }
}

pub async fn demo(config: &AppConfig) -> Result<()> {
    let store = build_store(config);
    let output = run_demo(&store).await?;
    print!("{output}");
    Ok(())
}

async fn run_demo(store: &NotesStore) -> Result<String> {
    let mut out = String::new();

    store.load_notes().await.context("loading notes")?;
    describe_step(&mut out, "load", &store.snapshot());

    let created = store
        .create_note("Test", "Body")
        .await
        .context("creating demo note")?;
    describe_step(&mut out, "create", &store.snapshot());

    store
        .update_note(&created.id, "Test2", "Body2")
        .await
        .context("updating demo note")?;
    describe_step(&mut out, "update", &store.snapshot());

    store
        .delete_note(&created.id)
        .await
        .context("deleting demo note")?;
    describe_step(&mut out, "delete", &store.snapshot());

    if store.update_note(&created.id, "Gone", "").await.is_err() {
        describe_step(&mut out, "update deleted", &store.snapshot());
    }
    store.clear_error();
    Ok(out)
}

fn describe_step(out: &mut String, label: &str, state: &NotesState) {
    let head = state
        .notes
        .first()
        .map(|note| note.title.as_str())
        .unwrap_or("<none>");
    let _ = write!(
        out,
        "{label:<15} {} note{}, first: {head}",
        state.len(),
        if state.len() == 1 { "" } else { "s" }
    );
    if let Some(error) = &state.error {
        let _ = write!(out, ", error: {error}");
    }
    out.push('\n');
}

fn format_notes(notes: &[Note], highlight: Option<&Regex>) -> String {
    if notes.is_empty() {
        return "No matches found.\n".to_string();
    }
    let mut out = String::new();
    for note in notes {
        let title = match highlight {
            Some(regex) => mark_matches(&note.title, regex),
            None => note.title.clone(),
        };
        let _ = writeln!(&mut out, "{}  {}", note.id, title);
        let _ = writeln!(
            &mut out,
            "    updated {}",
            format_timestamp(note.updated_at)
        );
        if let Some(snippet) = build_snippet(&note.content, SNIPPET_LINES) {
            let snippet = match highlight {
                Some(regex) => mark_matches(&snippet, regex),
                None => snippet,
            };
            let _ = writeln!(&mut out, "    {snippet}");
        }
        out.push('\n');
    }
    out
}

fn build_snippet(content: &str, lines: usize) -> Option<String> {
    let segments: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(lines)
        .collect();
    if segments.is_empty() {
        None
    } else {
        Some(segments.join(" ").chars().take(SNIPPET_CHARS).collect())
    }
}

fn format_timestamp(stamp: OffsetDateTime) -> String {
    stamp
        .format(&Rfc3339)
        .unwrap_or_else(|_| stamp.unix_timestamp().to_string())
}
