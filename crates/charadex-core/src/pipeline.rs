//! Ingestion entry points: oracle → validate → merge → commit.
//!
//! Validation always happens before the store is touched. The `*_and_commit`
//! variants also validate before loading the snapshot, so a rejected batch
//! never rewrites the file.

use serde_json::Value;
use tracing::{debug_span, info};

use crate::merge::{merge_batch, IngestStats};
use crate::oracle::{ExtractionOracle, OracleError};
use crate::snapshot::{SnapshotError, SnapshotFile};
use crate::store::{LexicalStore, StoreStats};
use crate::validate::{validate, ValidationReport};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("input text is empty")]
    EmptyInput,
    #[error("source locator is empty")]
    MissingSource,
    #[error(transparent)]
    Rejected(#[from] ValidationReport),
    #[error(transparent)]
    Oracle(#[from] OracleError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

fn check_source(source: &str) -> Result<(), IngestError> {
    if source.trim().is_empty() {
        return Err(IngestError::MissingSource);
    }
    Ok(())
}

fn extract(oracle: &dyn ExtractionOracle, text: &str) -> Result<Value, IngestError> {
    if text.trim().is_empty() {
        return Err(IngestError::EmptyInput);
    }
    Ok(oracle.extract(text)?)
}

/// Validate `raw` and merge it into `store`.
pub fn ingest(store: &mut LexicalStore, raw: &Value, source: &str) -> Result<IngestStats, IngestError> {
    check_source(source)?;
    let batch = validate(raw)?;
    Ok(merge_batch(store, &batch, source))
}

/// Run `text` through `oracle`, then [`ingest`] the reply.
pub fn ingest_text(
    store: &mut LexicalStore,
    oracle: &dyn ExtractionOracle,
    text: &str,
    source: &str,
) -> Result<IngestStats, IngestError> {
    check_source(source)?;
    let raw = extract(oracle, text)?;
    ingest(store, &raw, source)
}

/// Validate `raw`, then load, merge and commit the snapshot in `file`.
pub fn ingest_and_commit(
    file: &SnapshotFile,
    raw: &Value,
    source: &str,
) -> Result<IngestStats, IngestError> {
    let _span = debug_span!("ingest", path = %file.path().display()).entered();
    check_source(source)?;
    let batch = validate(raw)?;

    let mut store = file.load()?;
    let stats = merge_batch(&mut store, &batch, source);
    let revision = file.commit(&mut store)?;
    info!(
        revision,
        sentences = stats.sentences,
        words = stats.words,
        characters = stats.characters,
        "batch ingested"
    );
    Ok(stats)
}

/// [`ingest_and_commit`] the oracle's extraction of `text`.
///
/// The oracle runs before the snapshot is loaded.
pub fn capture_and_commit(
    file: &SnapshotFile,
    oracle: &dyn ExtractionOracle,
    text: &str,
    source: &str,
) -> Result<IngestStats, IngestError> {
    check_source(source)?;
    let raw = extract(oracle, text)?;
    ingest_and_commit(file, &raw, source)
}

/// Clear the store in `file` and commit. Returns counts before and after.
pub fn clear_and_commit(file: &SnapshotFile) -> Result<(StoreStats, StoreStats), SnapshotError> {
    let mut store = file.load()?;
    let before = store.clear();
    file.commit(&mut store)?;
    info!(
        words = before.words,
        sentences = before.sentences,
        "store cleared"
    );
    Ok((before, store.stats()))
}
