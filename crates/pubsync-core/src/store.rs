use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SyncError};
use crate::models::Publication;

/// Load a dataset file: a JSON array of publication objects.
///
/// A missing file is an empty dataset. Anything that is not a JSON array is
/// rejected as malformed; non-object elements inside the array are skipped.
pub fn load_dataset(path: &Path) -> Result<Vec<Publication>> {
    if !path.exists() {
        debug!("dataset {} does not exist, treating as empty", path.display());
        return Ok(Vec::new());
    }

    let contents = fs::read_to_string(path)?;
    let raw: Value = serde_json::from_str(&contents).map_err(|e| SyncError::MalformedDataset {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let Value::Array(items) = raw else {
        return Err(SyncError::MalformedDataset {
            path: path.to_path_buf(),
            reason: "expected a JSON array".to_string(),
        });
    };

    Ok(items.iter().filter_map(Publication::from_json).collect())
}

/// Replace `path` with `items` as pretty JSON (2-space indent, trailing newline).
///
/// The content goes to a sibling temp file first and is renamed into place,
/// so readers see either the old file or the complete new one.
pub fn write_dataset(path: &Path, items: &[Publication]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut json = serde_json::to_string_pretty(items)?;
    json.push('\n');

    let tmp = temp_sibling(path);
    fs::write(&tmp, json)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    debug!("wrote {} records to {}", items.len(), path.display());
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "dataset.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
