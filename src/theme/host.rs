use std::env;
use std::sync::atomic::{AtomicBool, Ordering};

use super::Theme;

/// Presentation environment the theme is reflected onto.
pub trait ThemeHost: Send + Sync {
    /// The environment's own color-scheme preference, when it can report one.
    fn preferred_theme(&self) -> Option<Theme>;
    /// Sets or clears the "dark" marker consumers style against.
    fn apply(&self, theme: Theme);
}

/// Non-interactive contexts: no preference, nothing to mark.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessHost;

impl ThemeHost for HeadlessHost {
    fn preferred_theme(&self) -> Option<Theme> {
        None
    }

    fn apply(&self, _theme: Theme) {}
}

/// Terminal host. The preference comes from `COLORFGBG` (`fg;bg` as exported by many
/// terminal emulators); the dark marker is kept in memory for renderers to query.
#[derive(Debug, Default)]
pub struct TerminalHost {
    preferred: Option<Theme>,
    dark: AtomicBool,
}

impl TerminalHost {
    pub fn detect() -> Self {
        Self::from_colorfgbg(env::var("COLORFGBG").ok().as_deref())
    }

    pub fn from_colorfgbg(value: Option<&str>) -> Self {
        Self {
            preferred: value.and_then(parse_colorfgbg),
            dark: AtomicBool::new(false),
        }
    }

    pub fn has_dark_marker(&self) -> bool {
        self.dark.load(Ordering::SeqCst)
    }
}

impl ThemeHost for TerminalHost {
    fn preferred_theme(&self) -> Option<Theme> {
        self.preferred
    }

    fn apply(&self, theme: Theme) {
        self.dark.store(theme.is_dark(), Ordering::SeqCst);
    }
}

fn parse_colorfgbg(value: &str) -> Option<Theme> {
    let background: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    match background {
        0..=6 | 8 => Some(Theme::Dark),
        7 | 9..=15 => Some(Theme::Light),
        _ => None,
    }
}
