use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::preferences::PreferenceStorage;
use crate::reactive::{Readable, Subscription, Writable};

mod host;

pub use host::{HeadlessHost, TerminalHost, ThemeHost};

pub const THEME_STORAGE_KEY: &str = "theme";

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }
}

/// Light/dark preference cell.
///
/// The initial value comes from storage, then the host's preference, then [`Theme::Light`].
/// Every value it holds, the initial one included, is written back to storage and applied to
/// the host before subscribers added later observe it.
pub struct ThemeStore {
    cell: Writable<Theme>,
    _persist: Subscription,
}

impl ThemeStore {
    pub fn new(storage: Arc<dyn PreferenceStorage>, host: Arc<dyn ThemeHost>) -> Self {
        Self::with_key(THEME_STORAGE_KEY, storage, host)
    }

    pub fn with_key(
        key: &str,
        storage: Arc<dyn PreferenceStorage>,
        host: Arc<dyn ThemeHost>,
    ) -> Self {
        let cell = Writable::new(initial_theme(key, &*storage, &*host));
        let key = key.to_owned();
        let persist = cell.subscribe(move |theme: &Theme| {
            if let Err(err) = storage.set(&key, theme.as_ref()) {
                tracing::warn!(?err, %theme, "failed to persist theme preference");
            }
            host.apply(*theme);
        });
        Self {
            cell,
            _persist: persist,
        }
    }

    pub fn theme(&self) -> Theme {
        self.cell.get()
    }

    pub fn readable(&self) -> Readable<Theme> {
        self.cell.readable()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Theme) + Send + Sync + 'static,
    {
        self.cell.subscribe(listener)
    }

    pub fn set_theme(&self, theme: Theme) {
        self.cell.set(theme);
    }

    /// Flips light and dark, returning the new value.
    pub fn toggle_theme(&self) -> Theme {
        self.cell.update(|theme| *theme = theme.toggled());
        self.cell.get()
    }
}

fn initial_theme(key: &str, storage: &dyn PreferenceStorage, host: &dyn ThemeHost) -> Theme {
    match storage.get(key) {
        Ok(Some(stored)) => match Theme::from_str(&stored) {
            Ok(theme) => return theme,
            Err(_) => tracing::warn!(%stored, "ignoring invalid stored theme"),
        },
        Ok(None) => {}
        Err(err) => tracing::warn!(?err, "failed to read stored theme"),
    }
    host.preferred_theme().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::{MemoryStorage, NoopStorage};
    use parking_lot::Mutex;

    struct FixedHost {
        preferred: Option<Theme>,
        applied: Mutex<Vec<Theme>>,
    }

    impl FixedHost {
        fn new(preferred: Option<Theme>) -> Arc<Self> {
            Arc::new(Self {
                preferred,
                applied: Mutex::new(Vec::new()),
            })
        }
    }

    impl ThemeHost for FixedHost {
        fn preferred_theme(&self) -> Option<Theme> {
            self.preferred
        }

        fn apply(&self, theme: Theme) {
            self.applied.lock().push(theme);
        }
    }

    fn stored(storage: &MemoryStorage) -> Option<String> {
        storage.get(THEME_STORAGE_KEY).unwrap()
    }

    #[test]
    fn host_preference_used_when_nothing_stored_then_toggle_persists() {
        let storage = Arc::new(MemoryStorage::new());
        let host = FixedHost::new(Some(Theme::Dark));
        let store = ThemeStore::new(storage.clone(), host.clone());

        assert_eq!(store.theme(), Theme::Dark);
        assert_eq!(stored(&storage).as_deref(), Some("dark"));

        assert_eq!(store.toggle_theme(), Theme::Light);
        assert_eq!(store.theme(), Theme::Light);
        assert_eq!(stored(&storage).as_deref(), Some("light"));
        assert_eq!(*host.applied.lock(), vec![Theme::Dark, Theme::Light]);
    }

    #[test]
    fn stored_value_wins_over_host() {
        let storage = Arc::new(MemoryStorage::with_entry(THEME_STORAGE_KEY, "light"));
        let store = ThemeStore::new(storage, FixedHost::new(Some(Theme::Dark)));
        assert_eq!(store.theme(), Theme::Light);
    }

    #[test]
    fn invalid_stored_value_falls_back_to_host() {
        let storage = Arc::new(MemoryStorage::with_entry(THEME_STORAGE_KEY, "Dark"));
        let store = ThemeStore::new(storage.clone(), FixedHost::new(Some(Theme::Dark)));
        assert_eq!(store.theme(), Theme::Dark);
        assert_eq!(stored(&storage).as_deref(), Some("dark"));

        let storage = Arc::new(MemoryStorage::with_entry(THEME_STORAGE_KEY, "sepia"));
        let store = ThemeStore::new(storage, FixedHost::new(None));
        assert_eq!(store.theme(), Theme::Light);
    }

    #[test]
    fn headless_defaults_to_light() {
        let store = ThemeStore::new(Arc::new(NoopStorage), Arc::new(HeadlessHost));
        assert_eq!(store.theme(), Theme::Light);
        assert_eq!(store.toggle_theme(), Theme::Dark);
        assert_eq!(store.toggle_theme(), Theme::Light);
    }

    #[test]
    fn every_change_reaches_host_and_subscribers() {
        let storage = Arc::new(MemoryStorage::new());
        let host = FixedHost::new(None);
        let store = ThemeStore::new(storage.clone(), host.clone());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = store.subscribe(move |theme| sink.lock().push(*theme));

        store.set_theme(Theme::Dark);
        store.set_theme(Theme::Dark);
        store.toggle_theme();

        assert_eq!(
            *seen.lock(),
            vec![Theme::Light, Theme::Dark, Theme::Dark, Theme::Light]
        );
        assert_eq!(
            *host.applied.lock(),
            vec![Theme::Light, Theme::Dark, Theme::Dark, Theme::Light]
        );
        assert_eq!(stored(&storage).as_deref(), Some("light"));
    }

    #[test]
    fn custom_key_is_respected() {
        let storage = Arc::new(MemoryStorage::new());
        let store = ThemeStore::with_key("ui.theme", storage.clone(), Arc::new(HeadlessHost));
        store.set_theme(Theme::Dark);
        assert_eq!(storage.get("ui.theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(stored(&storage), None);
    }

    #[test]
    fn theme_string_forms() {
        assert_eq!(Theme::Dark.to_string(), "dark");
        assert_eq!(Theme::Light.as_ref(), "light");
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("DARK".parse::<Theme>().is_err());
    }
}
