use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "yacs";
const CONFIG_FILE: &str = "config.json";

/// User configuration stored in the app config directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Location of the search runner executable
    #[serde(default = "default_path_csearch")]
    pub path_csearch: PathBuf,

    /// Location of the index builder executable
    #[serde(default = "default_path_cindex")]
    pub path_cindex: PathBuf,
}

fn default_path_csearch() -> PathBuf {
    PathBuf::from("csearch")
}

fn default_path_cindex() -> PathBuf {
    PathBuf::from("cindex")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            path_csearch: default_path_csearch(),
            path_cindex: default_path_cindex(),
        }
    }
}

impl AppConfig {
    /// Load config from the app config directory, or return default if not found
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;
        Ok(config)
    }
}

/// Get the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    Ok(base.join(APP_NAME).join(CONFIG_FILE))
}

/// Expand a leading `~` to the user's home directory
pub fn expand_user(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') => rest,
        _ => return PathBuf::from(path),
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
        None => PathBuf::from(path),
    }
}

/// Expand `~` and anchor relative paths at `base`
pub fn resolve_path(path: &str, base: &Path) -> PathBuf {
    let expanded = expand_user(path);
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}
