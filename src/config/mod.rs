use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::theme::THEME_STORAGE_KEY;

const APP_DOMAIN: &str = "io";
const APP_ORG: &str = "NotesStore";
const APP_NAME: &str = "notes-store";

pub const CONFIG_ENV: &str = "NOTES_STORE_CONFIG";
pub const DATA_ENV: &str = "NOTES_STORE_DATA";

pub struct ConfigLoader {
    paths: ConfigPaths,
}

impl ConfigLoader {
    pub fn discover() -> Result<Self> {
        let paths = ConfigPaths::discover()?;
        Ok(Self { paths })
    }

    pub fn from_paths(paths: ConfigPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn load_or_init(&self) -> Result<AppConfig> {
        self.paths.ensure_directories()?;
        if !self.paths.config_file.exists() {
            let mut default_cfg = AppConfig::default();
            default_cfg.post_load();
            self.write_default_config(&default_cfg)?;
            return Ok(default_cfg);
        }

        self.load()
    }

    pub fn load(&self) -> Result<AppConfig> {
        let raw = fs::read_to_string(&self.paths.config_file)
            .with_context(|| format!("reading config {}", self.paths.config_file.display()))?;
        let mut cfg: AppConfig = toml::from_str(&raw).context("parsing config toml")?;
        cfg.post_load();
        Ok(cfg)
    }

    fn write_default_config(&self, cfg: &AppConfig) -> Result<()> {
        let toml = toml::to_string_pretty(cfg).context("serializing default config")?;
        if let Some(parent) = self.paths.config_file.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut file = fs::File::create(&self.paths.config_file)
            .with_context(|| format!("creating config {}", self.paths.config_file.display()))?;
        file.write_all(toml.as_bytes())
            .context("writing default config")?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
    pub data_dir: PathBuf,
    pub preferences_file: PathBuf,
}

impl ConfigPaths {
    pub fn discover() -> Result<Self> {
        let override_config = env::var(CONFIG_ENV).ok().map(PathBuf::from);
        let override_data = env::var(DATA_ENV).ok().map(PathBuf::from);

        let project_dirs = ProjectDirs::from(APP_DOMAIN, APP_ORG, APP_NAME)
            .context("resolving XDG project directories")?;

        let config_dir = override_config
            .clone()
            .map(|p| {
                if p.is_dir() {
                    p
                } else {
                    p.parent().map(Path::to_path_buf).unwrap_or(p)
                }
            })
            .unwrap_or_else(|| project_dirs.config_dir().to_path_buf());

        let config_file = override_config
            .filter(|p| p.is_file() || p.extension().is_some())
            .unwrap_or_else(|| config_dir.join("config.toml"));

        let data_dir = override_data.unwrap_or_else(|| project_dirs.data_dir().to_path_buf());

        Ok(Self::rooted(config_dir, config_file, data_dir))
    }

    /// Paths for an explicit config file and data directory.
    pub fn rooted(config_dir: PathBuf, config_file: PathBuf, data_dir: PathBuf) -> Self {
        let preferences_file = data_dir.join("preferences.json");
        Self {
            config_dir,
            config_file,
            data_dir,
            preferences_file,
        }
    }

    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.config_dir, &self.data_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating application directory {}", dir.display()))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Start the mock backend with the starter notes.
    pub seed_notes: bool,
    pub latency: LatencyConfig,
    pub theme: ThemeOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            seed_notes: true,
            latency: LatencyConfig::default(),
            theme: ThemeOptions::default(),
        }
    }
}

impl AppConfig {
    fn post_load(&mut self) {
        if self.theme.storage_key.trim().is_empty() {
            tracing::warn!("empty theme storage key in config, falling back to default");
            self.theme.storage_key = THEME_STORAGE_KEY.to_owned();
        }
    }
}

/// Simulated backend round trips, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    pub list_ms: u64,
    pub create_ms: u64,
    pub update_ms: u64,
    pub delete_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            list_ms: 300,
            create_ms: 400,
            update_ms: 350,
            delete_ms: 250,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeOptions {
    pub storage_key: String,
}

impl Default for ThemeOptions {
    fn default() -> Self {
        Self {
            storage_key: THEME_STORAGE_KEY.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LatencyProfile;
    use tempfile::TempDir;

    fn temp_paths(root: &TempDir) -> ConfigPaths {
        let config_dir = root.path().join("config");
        ConfigPaths::rooted(
            config_dir.clone(),
            config_dir.join("config.toml"),
            root.path().join("data"),
        )
    }

    #[test]
    fn load_or_init_writes_default_config() -> Result<()> {
        let temp = TempDir::new()?;
        let loader = ConfigLoader::from_paths(temp_paths(&temp));

        let cfg = loader.load_or_init()?;
        assert_eq!(cfg, AppConfig::default());
        assert!(loader.paths().config_file.exists());
        assert!(loader.paths().data_dir.is_dir());

        assert_eq!(loader.load()?, cfg);
        Ok(())
    }

    #[test]
    fn partial_config_keeps_defaults() -> Result<()> {
        let temp = TempDir::new()?;
        let paths = temp_paths(&temp);
        paths.ensure_directories()?;
        fs::write(
            &paths.config_file,
            "seed_notes = false\n[latency]\nlist_ms = 0\n[theme]\nstorage_key = \"  \"\n",
        )?;

        let cfg = ConfigLoader::from_paths(paths).load()?;
        assert!(!cfg.seed_notes);
        assert_eq!(cfg.latency.list_ms, 0);
        assert_eq!(cfg.latency.create_ms, 400);
        assert_eq!(cfg.theme.storage_key, THEME_STORAGE_KEY);
        Ok(())
    }

    #[test]
    fn default_latency_matches_repository_profile() {
        let profile = LatencyProfile::from(&LatencyConfig::default());
        assert_eq!(profile, LatencyProfile::default());
    }

    #[test]
    fn preferences_live_in_data_dir() {
        let paths = ConfigPaths::rooted("c".into(), "c/config.toml".into(), "d".into());
        assert_eq!(paths.preferences_file, PathBuf::from("d/preferences.json"));
    }
}
