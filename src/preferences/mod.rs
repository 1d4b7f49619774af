use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::Mutex;

const TMP_EXTENSION: &str = "json.tmp";

/// Small string key-value store for user preferences.
pub trait PreferenceStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Stand-in for contexts without any preference storage. Reads nothing, drops writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStorage;

impl PreferenceStorage for NoopStorage {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .entries
            .lock()
            .insert(key.to_owned(), value.to_owned());
        storage
    }
}

impl PreferenceStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Preferences kept in a JSON object on disk. Every write replaces the file atomically.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("reading preferences {}", self.path.display()))
            }
        };
        serde_json::from_slice(&raw)
            .with_context(|| format!("parsing preferences {}", self.path.display()))
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_vec_pretty(entries).context("serialising preferences")?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let tmp_path = self.path.with_extension(TMP_EXTENSION);
        fs::write(&tmp_path, &json)
            .with_context(|| format!("writing temporary preferences {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!("atomically persisting preferences {}", self.path.display())
        })?;
        Ok(())
    }
}

impl PreferenceStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let mut entries = match self.read_all() {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(?err, "discarding unreadable preferences file");
                BTreeMap::new()
            }
        };
        entries.insert(key.to_owned(), value.to_owned());
        self.write_all(&entries)
    }
}
