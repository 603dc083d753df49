//! Small persistent key-value store for display-convenience values.
//!
//! Stands in for browser local storage: one JSON object in the user's data
//! directory. Nothing financial is kept here, and every read goes back to
//! disk so a value written by another process is picked up.

use common::Theme;
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace, warn};

pub const THEME_KEY: &str = "wealthwise_theme";
pub const USER_KEY: &str = "wealthwise_user";
pub const SESSION_KEY: &str = "wealthwise_session";

const APP: (&str, &str, &str) = ("com", "WealthWise", "wealthwise");
const FILE_NAME: &str = "storage.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Could not determine a data directory for this platform")]
    NoDataDir,

    #[error("Storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Storage file {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform data directory, e.g. `~/.local/share/wealthwise`.
    pub fn default_location() -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from(APP.0, APP.1, APP.2).ok_or(StorageError::NoDataDir)?;
        Ok(Self::open(dirs.data_dir().join(FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_error = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let raw = serde_json::to_string_pretty(values).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, raw).map_err(io_error)
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        trace!("Reading '{}' from {}", key, self.path.display());
        Ok(self.load()?.remove(key))
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)?;
        debug!("Stored '{}'", key);
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.load()?;
        if values.remove(key).is_some() {
            self.save(&values)?;
            debug!("Removed '{}'", key);
        }
        Ok(())
    }

    /// Saved theme, light when unset or unreadable.
    pub fn theme(&self) -> Theme {
        match self.get(THEME_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|e| {
                warn!("Ignoring stored theme: {}", e);
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!("Could not read theme preference: {}", e);
                Theme::default()
            }
        }
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), StorageError> {
        self.set(THEME_KEY, &theme.to_string())
    }

    /// Cached greeting name.
    pub fn display_name(&self) -> Result<Option<String>, StorageError> {
        self.get(USER_KEY)
    }

    pub fn set_display_name(&self, name: &str) -> Result<(), StorageError> {
        self.set(USER_KEY, name)
    }

    pub fn session_token(&self) -> Result<Option<String>, StorageError> {
        self.get(SESSION_KEY)
    }

    pub fn set_session_token(&self, token: &str) -> Result<(), StorageError> {
        self.set(SESSION_KEY, token)
    }

    /// Sign-out: forget the session and the cached name.
    pub fn clear_session(&self) -> Result<(), StorageError> {
        self.remove(SESSION_KEY)?;
        self.remove(USER_KEY)
    }
}
