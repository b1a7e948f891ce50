//! JSON key-value storage for persisting app state to disk.
//!
//! Each piece of state lives under its own key, one file per key in the
//! data directory. Writes triggered by store mutations run on a
//! background task and never block the caller.

mod state;

pub use state::AppState;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Storage keys, one per persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKey {
    Lists,
    ActiveList,
    BarcodeCache,
    Theme,
}

impl StoreKey {
    /// Returns the filename for this key.
    pub fn filename(&self) -> &'static str {
        match self {
            StoreKey::Lists => "lists.json",
            StoreKey::ActiveList => "active_list.json",
            StoreKey::BarcodeCache => "barcode_cache.json",
            StoreKey::Theme => "theme.json",
        }
    }
}

/// Key-value storage backed by JSON files.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    data_dir: PathBuf,
}

impl JsonStorage {
    /// Creates a new storage instance with a custom data directory.
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Returns the full path for a storage key.
    pub fn path(&self, key: StoreKey) -> PathBuf {
        self.data_dir.join(key.filename())
    }

    /// Checks if a record exists on disk.
    pub fn exists(&self, key: StoreKey) -> bool {
        self.path(key).exists()
    }

    /// Loads a record from disk.
    ///
    /// Returns `Ok(None)` if the file doesn't exist.
    /// Returns `Err` for other I/O or parsing errors.
    pub fn load<T: DeserializeOwned>(&self, key: StoreKey) -> Result<Option<T>, StorageError> {
        let path = self.path(key);

        match fs::read(&path) {
            Ok(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .map_err(|e| StorageError::Decode(path, e.to_string()))?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(path, e)),
        }
    }

    /// Saves a record to disk.
    ///
    /// Creates the data directory if it doesn't exist.
    pub fn save<T: Serialize>(&self, key: StoreKey, value: &T) -> Result<(), StorageError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| StorageError::Io(self.data_dir.clone(), e))?;

        let path = self.path(key);
        let bytes = serde_json::to_vec(value)
            .map_err(|e| StorageError::Decode(path.clone(), e.to_string()))?;

        fs::write(&path, bytes).map_err(|e| StorageError::Io(path, e))?;

        Ok(())
    }
}

/// Errors that can occur during storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error reading or writing a file.
    Io(PathBuf, io::Error),
    /// Error encoding or decoding a JSON record.
    Decode(PathBuf, String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(path, e) => {
                write!(f, "I/O error for {}: {}", path.display(), e)
            }
            StorageError::Decode(path, e) => {
                write!(f, "Failed to decode {}: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(_, e) => Some(e),
            StorageError::Decode(_, _) => None,
        }
    }
}

/// Runs a persistence task off the caller's thread when a Tokio runtime
/// is available, inline otherwise. Failures are the task's to log;
/// durability is best-effort.
pub(crate) fn persist_in_background(task: impl FnOnce() + Send + 'static) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn_blocking(task);
        }
        Err(_) => task(),
    }
}
