use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde_json::Value;

use super::storage::{StorageError, atomic_write};

/// File name used when exporting into a directory
pub fn default_export_name(date: NaiveDate) -> String {
    format!("kanban-export-{}.json", date.format("%Y-%m-%d"))
}

/// Write `value` as pretty JSON. If `dest` is an existing directory the file
/// is created inside it under the default export name. Returns the path written.
pub fn export_to_file(dest: &Path, value: &Value) -> Result<PathBuf, StorageError> {
    let path = if dest.is_dir() {
        dest.join(default_export_name(Local::now().date_naive()))
    } else {
        dest.to_path_buf()
    };
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');
    atomic_write(&path, content.as_bytes()).map_err(|e| StorageError::Io {
        path: path.clone(),
        source: e,
    })?;
    log::info!("exported to {}", path.display());
    Ok(path)
}

/// Read a JSON document from `path`. None if it can't be read or parsed.
pub fn import_from_file(path: &Path) -> Option<Value> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("could not read {}: {}", path.display(), e);
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("{} is not valid JSON: {}", path.display(), e);
            None
        }
    }
}
