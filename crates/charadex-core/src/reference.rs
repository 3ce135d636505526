//! Reference character vocabulary loaded from a HanziDB NDJSON export.
//!
//! Each line is one JSON object. Field names follow the upstream data set,
//! misspellings included (`charcter`, `hsk_levl`).

use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::store::{Character, CharacterMeta};

#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },
    #[error("line {line}: expected a single character, got {value:?}")]
    InvalidCharacter { line: usize, value: String },
}

#[derive(Debug, Deserialize)]
struct HanziRecord {
    #[serde(default)]
    frequency_rank: Option<String>,
    charcter: String,
    #[serde(default)]
    pinyin: String,
    #[serde(default)]
    definition: Option<String>,
    #[serde(default)]
    radical: Option<String>,
    #[serde(default)]
    radical_code: Option<String>,
    #[serde(default)]
    stroke_count: Option<String>,
    #[serde(default)]
    hsk_levl: Option<String>,
}

impl HanziRecord {
    fn rank(&self) -> u32 {
        self.frequency_rank
            .as_deref()
            .and_then(|r| r.trim().parse().ok())
            .unwrap_or(u32::MAX)
    }
}

/// Reference characters in frequency order, most common first.
#[derive(Debug, Clone, Default)]
pub struct ReferenceVocabulary {
    characters: Vec<Character>,
}

impl ReferenceVocabulary {
    /// Parse NDJSON content and keep the `max` most frequent characters.
    ///
    /// Blank lines are skipped. Records with an unparsable rank sort last;
    /// equal ranks keep file order.
    pub fn parse(content: &str, max: usize) -> Result<Self, ReferenceError> {
        let mut records: Vec<(char, HanziRecord)> = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }
            let record: HanziRecord =
                serde_json::from_str(line).map_err(|source| ReferenceError::Parse {
                    line: line_no,
                    source,
                })?;
            let mut chars = record.charcter.chars();
            let c = match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => {
                    return Err(ReferenceError::InvalidCharacter {
                        line: line_no,
                        value: record.charcter,
                    })
                }
            };
            records.push((c, record));
        }

        records.sort_by_key(|(_, r)| r.rank());
        records.truncate(max);

        let characters = records
            .into_iter()
            .map(|(c, r)| {
                let meta = CharacterMeta {
                    frequency_rank: r.frequency_rank,
                    definition: r.definition,
                    radical: r.radical,
                    radical_code: r.radical_code,
                    stroke_count: r.stroke_count,
                    hsk_level: r.hsk_levl,
                };
                Character::with_reading(c, r.pinyin, meta)
            })
            .collect::<Vec<_>>();
        debug!(characters = characters.len(), "reference vocabulary parsed");
        Ok(Self { characters })
    }

    pub fn load(path: &Path, max: usize) -> Result<Self, ReferenceError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content, max)
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    /// Characters in frequency order.
    pub fn order(&self) -> Vec<char> {
        self.characters.iter().map(|c| c.character).collect()
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}
