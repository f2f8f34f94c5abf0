use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not access {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("stored data under {key} is not valid JSON: {source}")]
    Parse {
        key: String,
        source: serde_json::Error,
    },
    #[error("could not encode data: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// Persists whole JSON documents under a name.
///
/// Each `save` replaces whatever was stored under the key; there is exactly
/// one writer, so the last write wins.
pub trait Storage {
    /// Read the document stored under `key`. `Ok(None)` means nothing stored yet.
    fn load(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Replace the document stored under `key`.
    fn save(&self, key: &str, value: &Value) -> Result<(), StorageError>;

    /// Copy the document under `key` somewhere a later `save` won't reach.
    /// Returns where it went, or None if this backend keeps no backups.
    fn back_up(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }
}

impl<S: Storage + ?Sized> Storage for &S {
    fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        (**self).save(key, value)
    }
    fn back_up(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).back_up(key)
    }
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        (**self).save(key, value)
    }
    fn back_up(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).back_up(key)
    }
}

/// Keys become file names, so keep them to a safe alphabet.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !key.starts_with('.');
    if ok {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Atomic file write
// ---------------------------------------------------------------------------

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// File-backed storage
// ---------------------------------------------------------------------------

/// One `<key>.json` file per key inside a data directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
        validate_key(key)?;
        let path = self.path_for(key);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Io { path, source: e }),
        };
        let value = serde_json::from_str(&text).map_err(|e| StorageError::Parse {
            key: key.to_string(),
            source: e,
        })?;
        Ok(Some(value))
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        validate_key(key)?;
        fs::create_dir_all(&self.dir).map_err(|e| StorageError::Io {
            path: self.dir.clone(),
            source: e,
        })?;
        let path = self.path_for(key);
        let mut content = serde_json::to_string_pretty(value)?;
        content.push('\n');
        atomic_write(&path, content.as_bytes()).map_err(|e| StorageError::Io { path, source: e })
    }

    /// Copies `<key>.json` to `<key>.json.bak`.
    fn back_up(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        let path = self.path_for(key);
        let bak = path.with_extension("json.bak");
        fs::copy(&path, &bak).map_err(|e| StorageError::Io {
            path: bak.clone(),
            source: e,
        })?;
        Ok(Some(bak.display().to_string()))
    }
}

// ---------------------------------------------------------------------------
// In-memory storage
// ---------------------------------------------------------------------------

/// String-valued key-value store, like a browser's local storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw text under a key, bypassing JSON encoding
    pub fn set_raw(&self, key: &str, raw: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), raw.to_string());
    }

    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let Some(raw) = self.get_raw(key) else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Parse {
                key: key.to_string(),
                source: e,
            })
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        let raw = serde_json::to_string(value)?;
        self.set_raw(key, &raw);
        Ok(())
    }

    fn back_up(&self, key: &str) -> Result<Option<String>, StorageError> {
        let Some(raw) = self.get_raw(key) else {
            return Ok(None);
        };
        let bak = format!("{}.bak", key);
        self.set_raw(&bak, &raw);
        Ok(Some(bak))
    }
}
