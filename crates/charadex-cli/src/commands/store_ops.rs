use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use charadex_core::merge::IngestStats;
use charadex_core::oracle::{parse_oracle_response, CommandOracle};
use charadex_core::pipeline::{capture_and_commit, clear_and_commit, ingest_and_commit, IngestError};
use charadex_core::reference::ReferenceVocabulary;
use charadex_core::settings::settings;
use charadex_core::snapshot::SnapshotFile;
use charadex_core::store::StoreStats;

use super::CommandError;

/// Read `input`, or stdin when it is `-`.
fn read_input(input: &str) -> Result<String, CommandError> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn print_ingest_stats(out: &mut dyn Write, stats: &IngestStats) -> Result<(), CommandError> {
    for w in &stats.warnings {
        writeln!(out, "warning: {w}")?;
    }
    writeln!(
        out,
        "Ingested {} sentences, {} words, {} characters",
        stats.sentences, stats.words, stats.characters
    )?;
    Ok(())
}

fn print_stats(out: &mut dyn Write, stats: &StoreStats) -> Result<(), CommandError> {
    writeln!(
        out,
        "characters={} (seen {}) words={} occurrences={} sentences={}",
        stats.characters, stats.seen_characters, stats.words, stats.occurrences, stats.sentences
    )?;
    Ok(())
}

/// Install the reference vocabulary from a HanziDB NDJSON file.
pub fn seed(
    out: &mut dyn Write,
    data: &Path,
    hanzi: &Path,
    max: Option<usize>,
) -> Result<(), CommandError> {
    let max = max.unwrap_or(settings().reference.max_characters);
    let vocabulary = ReferenceVocabulary::load(hanzi, max)?;

    let file = SnapshotFile::new(data);
    let mut store = file.load()?;
    store.apply_reference(&vocabulary);
    let revision = file.commit(&mut store)?;
    writeln!(
        out,
        "Seeded {} characters into {} (revision {revision})",
        vocabulary.len(),
        data.display()
    )?;
    Ok(())
}

/// Ingest an extraction JSON document.
pub fn ingest(
    out: &mut dyn Write,
    data: &Path,
    input: &str,
    source: &str,
) -> Result<(), CommandError> {
    let content = read_input(input)?;
    let raw = parse_oracle_response(&content).map_err(IngestError::Oracle)?;
    let stats = ingest_and_commit(&SnapshotFile::new(data), &raw, source)?;
    print_ingest_stats(out, &stats)
}

/// Run raw text through an external extraction program and ingest the result.
pub fn capture(
    out: &mut dyn Write,
    data: &Path,
    program: &str,
    args: &[String],
    input: &str,
    source: &str,
) -> Result<(), CommandError> {
    let text = read_input(input)?;
    let oracle = CommandOracle::new(program, args.to_vec());
    let stats = capture_and_commit(&SnapshotFile::new(data), &oracle, &text, source)?;
    print_ingest_stats(out, &stats)
}

pub fn clear(out: &mut dyn Write, data: &Path) -> Result<(), CommandError> {
    let (before, after) = clear_and_commit(&SnapshotFile::new(data))?;
    write!(out, "Before: ")?;
    print_stats(out, &before)?;
    write!(out, "After:  ")?;
    print_stats(out, &after)
}

pub fn stats(out: &mut dyn Write, data: &Path, json: bool) -> Result<(), CommandError> {
    let store = SnapshotFile::new(data).load()?;
    let stats = store.stats();
    if json {
        serde_json::to_writer_pretty(&mut *out, &stats)?;
        writeln!(out)?;
        return Ok(());
    }
    writeln!(out, "revision={}", store.revision())?;
    print_stats(out, &stats)
}
