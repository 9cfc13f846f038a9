//! Key-value settings remembered between runs.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use directories_next::ProjectDirs;
use serde_json::{Map, Value};

/// Key under which the Static Maps API key is remembered.
pub const API_KEY: &str = "apiKey";

/// Key under which the raw JSON style is remembered.
pub const STYLES: &str = "styles";

const STORAGE_FILE: &str = "storage.json";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("settings file {path} is corrupted: {source}")]
    Corrupted {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("could not determine where to keep the settings")]
    NoConfigDir,

    #[error("settings could not be saved")]
    Rejected,
}

/// Persistent settings. Values are plain strings.
pub trait SettingsStore {
    /// Get the value of `key`. If there is none, `default` gets stored and returned.
    ///
    /// # Errors
    ///
    /// When the store cannot be read, or the default cannot be stored.
    fn get(&mut self, key: &str, default: &str) -> Result<String, StorageError>;

    /// # Errors
    ///
    /// When the value could not be persisted.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// When the change could not be persisted.
    fn delete(&mut self, key: &str) -> Result<(), StorageError>;

    /// Forget all settings.
    ///
    /// # Errors
    ///
    /// When the change could not be persisted.
    fn reset(&mut self) -> Result<(), StorageError>;
}

/// Settings kept in a flat JSON object on disk, e.g. `{"apiKey": "...", "styles": "[...]"}`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,

    /// Contents of the file, loaded lazily.
    data: Option<Map<String, Value>>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            data: None,
        }
    }

    /// Store in the per-user configuration directory of the platform.
    ///
    /// # Errors
    ///
    /// When the directory cannot be determined or created.
    pub fn in_config_dir() -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("com", "Mapfill", "Mapfill").ok_or(StorageError::NoConfigDir)?;
        let dir = dirs.config_dir();
        fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            path: dir.to_owned(),
            source,
        })?;
        Ok(Self::new(dir.join(STORAGE_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Read the file, creating an empty one if it does not exist yet.
    fn data(&mut self) -> Result<&mut Map<String, Value>, StorageError> {
        if self.data.is_none() {
            let data = match fs::read_to_string(&self.path) {
                Ok(text) => {
                    serde_json::from_str(&text).map_err(|source| StorageError::Corrupted {
                        path: self.path.clone(),
                        source,
                    })?
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    log::info!("Creating settings file {}.", self.path.display());
                    fs::write(&self.path, "{}").map_err(|e| self.io_error(e))?;
                    Map::new()
                }
                Err(e) => return Err(self.io_error(e)),
            };
            self.data = Some(data);
        }

        Ok(self.data.get_or_insert_with(Map::new))
    }

    fn save(&mut self) -> Result<(), StorageError> {
        let text = serde_json::to_string(self.data()?).map_err(|source| StorageError::Corrupted {
            path: self.path.clone(),
            source,
        })?;
        log::debug!("Saving settings to {}.", self.path.display());
        fs::write(&self.path, text).map_err(|e| self.io_error(e))
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&mut self, key: &str, default: &str) -> Result<String, StorageError> {
        match self.data()?.get(key) {
            Some(Value::String(value)) => Ok(value.clone()),
            Some(other) => Ok(other.to_string()),
            None => {
                self.set(key, default)?;
                Ok(default.to_owned())
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.data()?
            .insert(key.to_owned(), Value::String(value.to_owned()));
        self.save()
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        self.data()?.remove(key);
        self.save()
    }

    fn reset(&mut self) -> Result<(), StorageError> {
        self.data()?.clear();
        self.save()
    }
}

/// Settings which live only as long as the process. Writes can be made to fail, which is
/// handy for testing.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store which refuses every write.
    pub fn read_only() -> Self {
        Self {
            values: HashMap::new(),
            read_only: true,
        }
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_owned(), value.to_owned());
        self
    }

    /// Peek at a value without storing defaults.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.read_only {
            Err(StorageError::Rejected)
        } else {
            Ok(())
        }
    }
}

impl SettingsStore for MemoryStore {
    fn get(&mut self, key: &str, default: &str) -> Result<String, StorageError> {
        if let Some(value) = self.values.get(key) {
            return Ok(value.clone());
        }
        // Reading must work even if defaults cannot be remembered.
        if !self.read_only {
            self.values.insert(key.to_owned(), default.to_owned());
        }
        Ok(default.to_owned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.values.remove(key);
        Ok(())
    }

    fn reset(&mut self) -> Result<(), StorageError> {
        self.check_writable()?;
        self.values.clear();
        Ok(())
    }
}
