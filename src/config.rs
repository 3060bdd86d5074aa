use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "prefs.toml";

/// Stored preferences. The API key is the only persisted value.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct Config {
  pub api_key: Option<String>,
}

pub fn project_dirs() -> Option<ProjectDirs> {
  ProjectDirs::from("", "", "yt-scout")
}

/// `<config dir>/prefs.toml`, if the platform has a config directory.
pub fn config_path() -> Option<PathBuf> {
  project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

impl Config {
  /// Load the stored config. A missing or unreadable file is treated as empty.
  pub fn load() -> Self {
    config_path().map(|path| Self::load_from(&path)).unwrap_or_default()
  }

  pub fn load_from(path: &Path) -> Self {
    if let Ok(content) = std::fs::read_to_string(path)
      && let Ok(config) = toml::from_str(&content)
    {
      return config;
    }
    Self::default()
  }

  pub fn save(&self) -> Result<PathBuf> {
    let path = config_path().context("no config directory available on this platform")?;
    self.save_to(&path)?;
    Ok(path)
  }

  pub fn save_to(&self, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
      std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let content = toml::to_string(self).context("Failed to serialize config")?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
  }

  /// The stored key, trimmed; `None` when absent or blank.
  pub fn api_key(&self) -> Option<&str> {
    self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
  }

  /// Store `key` trimmed; a blank key clears the stored value.
  pub fn set_api_key(&mut self, key: &str) {
    let trimmed = key.trim();
    self.api_key = (!trimmed.is_empty()).then(|| trimmed.to_string());
  }

  pub fn clear_api_key(&mut self) {
    self.api_key = None;
  }
}
