use serde::{Deserialize, Serialize};

/// Static reference data attached to a character. Never touched by ingestion
/// or by [`LexicalStore::clear`](super::LexicalStore::clear).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_rank: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radical: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radical_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_count: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hsk_level: Option<String>,
}

impl CharacterMeta {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub character: char,
    #[serde(default)]
    pub seen_count: u32,
    #[serde(default)]
    pub pinyin: String,
    /// Ids of words whose text contains this character (set semantics).
    #[serde(default)]
    pub word_references: Vec<String>,
    #[serde(flatten)]
    pub meta: CharacterMeta,
}

impl Character {
    /// A character with no reading and no reference metadata.
    pub fn new(character: char) -> Self {
        Self {
            character,
            seen_count: 0,
            pinyin: String::new(),
            word_references: Vec::new(),
            meta: CharacterMeta::default(),
        }
    }

    pub fn with_reading(character: char, pinyin: impl Into<String>, meta: CharacterMeta) -> Self {
        Self {
            pinyin: pinyin.into(),
            meta,
            ..Self::new(character)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: String,
    pub word: String,
    /// Distinct meanings in first-seen order.
    #[serde(default)]
    pub meanings: Vec<String>,
    #[serde(default)]
    pub seen_count: u32,
    #[serde(default)]
    pub occurrence_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordOccurrence {
    pub id: String,
    pub word_id: String,
    pub word: String,
    pub meaning: String,
    #[serde(default)]
    pub pinyin: String,
    pub sentence_id: String,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentence {
    pub id: String,
    pub text: String,
    /// Occurrence ids in textual order; index equals the occurrence's position.
    #[serde(default)]
    pub occurrence_ids: Vec<String>,
    #[serde(default)]
    pub source: String,
}

/// Entity counts per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub characters: usize,
    pub seen_characters: usize,
    pub words: usize,
    pub occurrences: usize,
    pub sentences: usize,
}
