use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::inspector::{InspectOptions, StalePolicy};

/// Application configuration loaded from ~/.config/fdpeek/config.toml.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// What to do with descriptors whose target can no longer be stat-ed.
    #[serde(default)]
    pub stale_targets: StalePolicy,
    /// Link targets longer than this many bytes classify as Unknown.
    #[serde(default = "default_max_target_len")]
    pub max_target_len: usize,
    /// Mount point of procfs.
    #[serde(default = "default_proc_root")]
    pub proc_root: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            stale_targets: StalePolicy::default(),
            max_target_len: default_max_target_len(),
            proc_root: default_proc_root(),
        }
    }
}

fn default_max_target_len() -> usize {
    libc::PATH_MAX as usize
}

fn default_proc_root() -> PathBuf {
    PathBuf::from("/proc")
}

impl Config {
    /// Load config from the default path, or return defaults if not found.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading config from {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("parsing config from {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn inspect_options(&self) -> InspectOptions {
        InspectOptions {
            stale_targets: self.general.stale_targets,
            max_target_len: self.general.max_target_len,
        }
    }
}

fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("fdpeek")
        .join("config.toml")
}
