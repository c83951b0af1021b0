//! File-based storage backend.
//!
//! Each entity is a JSON document; messages are grouped into one document per
//! conversation key. All writes use atomic operations (temp file + rename) to
//! prevent corruption. Documents are loaded into an in-memory index at open.

mod event;
mod message;
mod user;

pub use event::FileEventStore;
pub use message::FileMessageStore;
pub use user::FileUserStore;

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;

use super::error::{StorageError, StorageResult};

/// Write a JSON document atomically (temp file + rename), creating the
/// directory if needed.
pub(crate) async fn write_json_atomic<T: Serialize>(
    dir: &Path,
    file_name: &str,
    value: &T,
) -> StorageResult<()> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| StorageError::file_io(dir, e))?;

    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| StorageError::serialization(e.to_string()))?;

    let final_path = dir.join(file_name);
    let temp_path = dir.join(format!("{file_name}.tmp"));

    fs::write(&temp_path, &json)
        .await
        .map_err(|e| StorageError::file_io(&temp_path, e))?;
    fs::rename(&temp_path, &final_path)
        .await
        .map_err(|e| StorageError::file_io(&final_path, e))
}

/// Load every `*.json` document in a directory. A missing directory is an
/// empty store, not an error.
pub(crate) async fn load_json_dir<T: DeserializeOwned>(dir: &Path) -> StorageResult<Vec<T>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StorageError::file_io(dir, e)),
    };

    let mut documents = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| StorageError::file_io(dir, e))?
    {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        let contents = fs::read_to_string(&path)
            .await
            .map_err(|e| StorageError::file_io(&path, e))?;
        let value = serde_json::from_str(&contents)
            .map_err(|e| StorageError::file_deserialization(&path, e.to_string()))?;
        documents.push(value);
    }

    Ok(documents)
}
