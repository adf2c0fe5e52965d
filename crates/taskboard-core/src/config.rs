use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_ACTIVITY_RETENTION_DAYS: u32 = 90;
const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub default_file: Option<PathBuf>,
    #[serde(default)]
    pub activity_retention_days: Option<u32>,
    #[serde(default)]
    pub atomic_moves: Option<bool>,
    #[serde(default)]
    pub default_page_size: Option<u32>,
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/taskboard/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("taskboard/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("taskboard\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Reads a config file, falling back to defaults when it is missing or malformed.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Ignoring malformed config {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Could not read config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn effective_activity_retention_days(&self) -> u32 {
        self.activity_retention_days
            .unwrap_or(DEFAULT_ACTIVITY_RETENTION_DAYS)
    }

    pub fn effective_atomic_moves(&self) -> bool {
        self.atomic_moves.unwrap_or(true)
    }

    pub fn effective_page_size(&self) -> u32 {
        self.default_page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}
