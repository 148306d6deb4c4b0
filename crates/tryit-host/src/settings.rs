//! Host settings persistence.
//!
//! Settings are read from a JSON file, by default in the user's config
//! directory:
//! - Linux: ~/.config/tryit/settings.json
//! - macOS: ~/Library/Application Support/tryit/settings.json
//! - Windows: C:\Users\<User>\AppData\Roaming\tryit\settings.json

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

fn default_engine() -> Vec<String> {
    vec!["tryit-engine".to_string()]
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Settings for the terminal host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSettings {
    /// Engine program followed by its arguments
    #[serde(default = "default_engine")]
    pub engine: Vec<String>,

    /// Default log filter, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            log_level: default_log_level(),
        }
    }
}

/// Get the path to the default settings file
pub fn settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tryit")
        .join("settings.json")
}

impl HostSettings {
    /// Load settings from `path`, or from the default location.
    ///
    /// An explicit path must exist and parse. The default file is optional;
    /// when it is missing or invalid the defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::read(path),
            None => {
                let path = settings_path();
                if !path.exists() {
                    return Ok(Self::default());
                }
                Self::read(&path).or_else(|e| {
                    warn!("[host] Ignoring settings file: {:#}", e);
                    Ok(Self::default())
                })
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let settings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))?;
        info!("[host] Loaded settings from {}", path.display());
        Ok(settings)
    }
}
