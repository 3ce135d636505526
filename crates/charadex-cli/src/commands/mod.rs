pub mod config_ops;
pub mod query_ops;
pub mod store_ops;

use std::io;
use std::path::PathBuf;

use charadex_core::pipeline::IngestError;
use charadex_core::reference::ReferenceError;
use charadex_core::settings::{settings, SettingsError};
use charadex_core::snapshot::SnapshotError;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("reference vocabulary: {0}")]
    Reference(#[from] ReferenceError),
    #[error("snapshot: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("{}", describe_ingest(.0))]
    Ingest(#[from] IngestError),
    #[error("not found: {0}")]
    NotFound(String),
}

/// Rejections list every collected error, one per line.
fn describe_ingest(err: &IngestError) -> String {
    match err {
        IngestError::Rejected(report) => {
            let mut lines = vec![report.to_string()];
            lines.extend(report.errors.iter().map(|e| format!("  error: {e}")));
            lines.extend(report.warnings.iter().map(|w| format!("  warning: {w}")));
            lines.join("\n")
        }
        other => other.to_string(),
    }
}

/// Snapshot path from the global settings, relative to the working directory.
pub fn default_data_path() -> PathBuf {
    PathBuf::from(&settings().storage.data_file)
}
