//! Loading store snapshots from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::Snapshot;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read snapshot at {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse snapshot at {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read a JSON snapshot of the store. Absent collections deserialize as empty.
pub fn load_snapshot(path: &Path) -> Result<Snapshot, StoreError> {
    let raw = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot = parse_snapshot(&raw).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        path = %path.display(),
        reports = snapshot.reports.len(),
        personal_details = snapshot.personal_details.len(),
        categories = snapshot.categories.len(),
        tags = snapshot.tags.len(),
        "loaded snapshot"
    );
    Ok(snapshot)
}

pub fn parse_snapshot(raw: &str) -> Result<Snapshot, serde_json::Error> {
    serde_json::from_str(raw)
}
