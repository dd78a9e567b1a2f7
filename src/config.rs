use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Key-value persistence surface the page reads preferences from.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UiConfig {
    pub toast_duration_ms: u64,
    pub clipboard_timeout_ms: u64,
    pub size_debounce_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            toast_duration_ms: 5000,
            clipboard_timeout_ms: 2000,
            size_debounce_ms: 300,
        }
    }
}

impl UiConfig {
    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    pub fn clipboard_timeout(&self) -> Duration {
        Duration::from_millis(self.clipboard_timeout_ms)
    }

    pub fn size_debounce(&self) -> Duration {
        Duration::from_millis(self.size_debounce_ms)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub preferences: BTreeMap<String, String>,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub path: PathBuf,
    pub preferences: BTreeMap<String, String>,
    pub ui: UiConfig,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(config_path()?)
    }

    /// Reads `path`, writing a default file there first if it is missing.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            let default = ConfigFile::default();
            let toml = toml::to_string_pretty(&default)?;
            if let Some(parent) = path.parent() { fs::create_dir_all(parent)?; }
            fs::write(&path, toml).with_context(|| format!("Writing {:?}", &path))?;
        }
        let content = fs::read_to_string(&path).with_context(|| format!("Reading {:?}", &path))?;
        let cfg: ConfigFile = toml::from_str(&content).with_context(|| "Parsing config TOML")?;
        Ok(Self { path, preferences: cfg.preferences, ui: cfg.ui })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        let cfg = ConfigFile { preferences: self.preferences.clone(), ui: self.ui.clone() };
        let toml = toml::to_string_pretty(&cfg)?;
        if let Some(parent) = self.path.parent() { fs::create_dir_all(parent)?; }
        fs::write(&self.path, toml).with_context(|| format!("Writing {:?}", &self.path))?;
        Ok(())
    }
}

impl KeyValueStore for Config {
    fn get(&self, key: &str) -> Option<String> {
        self.preferences.get(key).cloned()
    }

    /// Writes through to disk. On a failed save the previous value is put back.
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let previous = self.preferences.insert(key.to_string(), value.to_string());
        if let Err(e) = self.save() {
            match previous {
                Some(old) => self.preferences.insert(key.to_string(), old),
                None => self.preferences.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}

/// Non-persistent store, used when no config file is wanted.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn config_path() -> Result<PathBuf> {
    let base = config_dir().context("Could not determine config directory")?;
    Ok(base.join("pdfcrypto-ui").join("config.toml"))
}
