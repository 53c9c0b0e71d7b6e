//! Write stage: serialise rows to a JSON array on disk.
//!
//! The file is written to `<name>.tmp` next to the target and renamed over
//! it, so a failed run leaves the previous output untouched.

use crate::error::ExtractError;
use crate::output::Row;
use std::path::{Path, PathBuf};
use tracing::info;

/// Encode rows as a JSON array. Non-ASCII text is written as-is.
pub fn rows_to_json(rows: &[Row], pretty: bool, path: &Path) -> Result<String, ExtractError> {
    let encoded = if pretty {
        serde_json::to_string_pretty(rows)
    } else {
        serde_json::to_string(rows)
    };
    encoded.map_err(|e| ExtractError::Serialization {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write `rows` to `path` atomically.
pub async fn write_json(rows: &[Row], path: &Path, pretty: bool) -> Result<(), ExtractError> {
    let json = rows_to_json(rows, pretty, path)?;
    let write_err = |e: std::io::Error| ExtractError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    super::ensure_parent(path).await?;

    let tmp_path = tmp_path_for(path);
    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(write_err)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }

    info!("Saved {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Load rows from a JSON file previously written by [`write_json`].
pub async fn load_rows(path: &Path) -> Result<Vec<Row>, ExtractError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ExtractError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    serde_json::from_slice(&bytes).map_err(|e| ExtractError::Serialization {
        path: path.to_path_buf(),
        source: e,
    })
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
