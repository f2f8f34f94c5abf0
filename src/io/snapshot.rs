use serde_json::Value;

use super::storage::{Storage, StorageError};
use crate::model::forest::Forest;
use crate::ops::check::check_forest;

/// Encode the whole forest as one JSON document.
pub fn encode(forest: &Forest) -> Result<Value, StorageError> {
    Ok(serde_json::to_value(forest)?)
}

/// Decode a stored document, filling defaults for fields older snapshots lack.
pub fn decode(value: Value) -> Result<Forest, serde_json::Error> {
    serde_json::from_value(value)
}

/// Why the stored snapshot couldn't be used
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("stored snapshot has an unexpected shape: {0}")]
    Shape(#[from] serde_json::Error),
}

impl LoadError {
    /// The stored bytes are there but unusable, as opposed to unreachable
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            LoadError::Shape(_) | LoadError::Storage(StorageError::Parse { .. })
        )
    }
}

/// Read the snapshot stored under `key`. `Ok(None)` means none stored.
pub fn try_load_forest(storage: &dyn Storage, key: &str) -> Result<Option<Forest>, LoadError> {
    match storage.load(key)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => Ok(Some(decode(value)?)),
    }
}

/// Load the forest, falling back to `fallback()` when nothing is stored or
/// what is stored can't be read. Never fails.
pub fn load_forest(storage: &dyn Storage, key: &str, fallback: impl FnOnce() -> Forest) -> Forest {
    match try_load_forest(storage, key) {
        Ok(Some(forest)) => {
            for issue in check_forest(&forest) {
                log::warn!("{}: {}", key, issue);
            }
            forest
        }
        Ok(None) => {
            log::info!("no stored data under {}, starting from defaults", key);
            fallback()
        }
        Err(e) => {
            log::warn!("could not load {}, starting from defaults: {}", key, e);
            if e.is_corrupt() {
                match storage.back_up(key) {
                    Ok(Some(bak)) => log::warn!("unreadable data under {} kept as {}", key, bak),
                    Ok(None) => {}
                    Err(e) => log::error!("could not back up {}: {}", key, e),
                }
            }
            fallback()
        }
    }
}

/// Persist the whole forest under `key`, replacing the previous snapshot.
pub fn save_forest(storage: &dyn Storage, key: &str, forest: &Forest) -> Result<(), StorageError> {
    let value = encode(forest)?;
    storage.save(key, &value)
}
