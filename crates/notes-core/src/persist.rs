//! JSON file persistence shared by the stores.
//!
//! Each store keeps its whole table in memory and rewrites its file after
//! every mutation. A store opened without a path never touches the disk.

use std::fs;
use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};

use crate::error::StoreError;

/// Load a table from `path`, or the default table when the file doesn't exist.
pub(crate) fn load<T>(path: Option<&Path>) -> Result<T, StoreError>
where
    T: DeserializeOwned + Default,
{
    match path {
        Some(path) if path.exists() => {
            let content = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        }
        _ => Ok(T::default()),
    }
}

/// Write a table to `path`, replacing the previous file.
pub(crate) fn save<T: Serialize>(path: Option<&Path>, table: &T) -> Result<(), StoreError> {
    let Some(path) = path else {
        return Ok(());
    };

    let content = serde_json::to_string_pretty(table)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
