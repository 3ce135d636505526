//! In-memory lexical store: characters, words, word occurrences and sentences.
//!
//! The store owns all four collections; entities refer to each other by id
//! only. Word text is unique across the word collection and is indexed
//! (`word_index`) so deduplication during merge is a hash lookup. The index
//! is updated in the same call as every insert.
//!
//! No I/O happens here. Loading and saving go through
//! [`crate::snapshot`], mutation through [`crate::merge`] and [`LexicalStore::clear`].

mod entity;
mod query;

use std::collections::HashMap;

use tracing::debug;

use crate::reference::ReferenceVocabulary;

pub use entity::{Character, CharacterMeta, Sentence, StoreStats, Word, WordOccurrence};
pub use query::{
    CharacterDetails, RenderSegment, SentenceDetails, SentenceSummary, WordDetails, WordSummary,
};

/// Generate a globally unique opaque id.
pub(crate) fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Default)]
pub struct LexicalStore {
    characters: HashMap<char, Character>,
    words: HashMap<String, Word>,
    /// word text → word id
    word_index: HashMap<String, String>,
    occurrences: HashMap<String, WordOccurrence>,
    sentences: HashMap<String, Sentence>,
    /// Snapshot revision this store was loaded from.
    revision: u64,
}

impl LexicalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh store whose character collection is the reference vocabulary,
    /// every character at seen-count 0.
    pub fn with_reference(vocabulary: &ReferenceVocabulary) -> Self {
        let mut store = Self::new();
        store.apply_reference(vocabulary);
        store
    }

    /// Install reading and metadata for every reference character.
    ///
    /// Counts and word references of characters already in the store are kept.
    pub fn apply_reference(&mut self, vocabulary: &ReferenceVocabulary) {
        for reference in vocabulary.characters() {
            let entry = self
                .characters
                .entry(reference.character)
                .or_insert_with(|| Character::new(reference.character));
            entry.pinyin = reference.pinyin.clone();
            entry.meta = reference.meta.clone();
        }
        debug!(characters = self.characters.len(), "reference applied");
    }

    // --- lookups ---

    /// Find a word by its unique text.
    pub fn find_word_by_text(&self, text: &str) -> Option<&Word> {
        self.word_index.get(text).and_then(|id| self.words.get(id))
    }

    pub fn character(&self, c: char) -> Option<&Character> {
        self.characters.get(&c)
    }

    pub fn word(&self, id: &str) -> Option<&Word> {
        self.words.get(id)
    }

    pub fn occurrence(&self, id: &str) -> Option<&WordOccurrence> {
        self.occurrences.get(id)
    }

    pub fn sentence(&self, id: &str) -> Option<&Sentence> {
        self.sentences.get(id)
    }

    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.words.values()
    }

    pub fn occurrences(&self) -> impl Iterator<Item = &WordOccurrence> {
        self.occurrences.values()
    }

    pub fn sentences(&self) -> impl Iterator<Item = &Sentence> {
        self.sentences.values()
    }

    /// Occurrences of a sentence in position order. Dangling ids are skipped.
    pub fn sentence_occurrences(&self, sentence: &Sentence) -> Vec<&WordOccurrence> {
        let mut occurrences: Vec<&WordOccurrence> = sentence
            .occurrence_ids
            .iter()
            .filter_map(|id| self.occurrences.get(id))
            .collect();
        occurrences.sort_by_key(|occ| occ.position);
        occurrences
    }

    /// Space-joined readings of the characters of `text`.
    ///
    /// Characters with no stored reading contribute nothing.
    pub fn pinyin_of(&self, text: &str) -> String {
        let readings: Vec<&str> = text
            .chars()
            .filter_map(|c| self.characters.get(&c))
            .map(|ch| ch.pinyin.as_str())
            .filter(|p| !p.is_empty())
            .collect();
        readings.join(" ")
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            characters: self.characters.len(),
            seen_characters: self.characters.values().filter(|c| c.seen_count > 0).count(),
            words: self.words.len(),
            occurrences: self.occurrences.len(),
            sentences: self.sentences.len(),
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }

    // --- mutation ---

    /// Count one appearance of `c` inside the word `word_id`.
    ///
    /// Characters outside the reference vocabulary are created on the fly
    /// with no reading and no metadata.
    pub fn upsert_character_occurrence(&mut self, c: char, word_id: &str) {
        let entry = self
            .characters
            .entry(c)
            .or_insert_with(|| Character::new(c));
        entry.seen_count += 1;
        if !entry.word_references.iter().any(|id| id == word_id) {
            entry.word_references.push(word_id.to_string());
        }
    }

    /// Drop all words, occurrences and sentences and reset every character's
    /// count and references. Readings and reference metadata are kept.
    ///
    /// Returns the counts from before the clear.
    pub fn clear(&mut self) -> StoreStats {
        let before = self.stats();
        self.words.clear();
        self.word_index.clear();
        self.occurrences.clear();
        self.sentences.clear();
        for character in self.characters.values_mut() {
            character.seen_count = 0;
            character.word_references.clear();
        }
        debug!(
            words = before.words,
            occurrences = before.occurrences,
            sentences = before.sentences,
            "store cleared"
        );
        before
    }

    /// Insert a new word, keeping the text index in step.
    ///
    /// Callers must have checked [`find_word_by_text`](Self::find_word_by_text) first.
    pub(crate) fn insert_word(&mut self, word: Word) {
        debug_assert!(!self.word_index.contains_key(&word.word));
        self.word_index.insert(word.word.clone(), word.id.clone());
        self.words.insert(word.id.clone(), word);
    }

    pub(crate) fn word_mut(&mut self, id: &str) -> Option<&mut Word> {
        self.words.get_mut(id)
    }

    pub(crate) fn insert_occurrence(&mut self, occurrence: WordOccurrence) {
        self.occurrences.insert(occurrence.id.clone(), occurrence);
    }

    pub(crate) fn insert_sentence(&mut self, sentence: Sentence) {
        self.sentences.insert(sentence.id.clone(), sentence);
    }

    pub(crate) fn insert_character(&mut self, character: Character) {
        self.characters.insert(character.character, character);
    }
}
