//! Fold a validated extraction batch into the lexical store.
//!
//! Per sentence, left to right: resolve or create each word by text, record
//! one occurrence per (sentence, word position), count every Han character of
//! the word, then create the sentence with its occurrence ids in position
//! order. Nothing here can fail: the batch was checked by
//! [`crate::validate`] and no I/O happens during a merge.

#[cfg(test)]
mod tests;

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, debug_span};

use crate::store::{generate_id, LexicalStore, Sentence, Word, WordOccurrence};
use crate::unicode::is_han;
use crate::validate::{ExtractedSentence, ValidatedBatch, ValidationWarning};

/// Summary of one merged batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestStats {
    pub sentences: usize,
    /// Distinct word texts in the batch.
    pub words: usize,
    /// Distinct Han characters in the batch.
    pub characters: usize,
    /// Ids of the created sentences, in batch order.
    pub sentence_ids: Vec<String>,
    #[serde(skip)]
    pub warnings: Vec<ValidationWarning>,
}

/// Merge every sentence of `batch`, all attributed to `source`.
pub fn merge_batch(store: &mut LexicalStore, batch: &ValidatedBatch, source: &str) -> IngestStats {
    let _span = debug_span!("merge_batch", sentences = batch.sentences().len()).entered();

    let mut distinct_words: HashSet<&str> = HashSet::new();
    let mut distinct_chars: HashSet<char> = HashSet::new();
    let mut sentence_ids = Vec::with_capacity(batch.sentences().len());

    for sentence in batch.sentences() {
        for w in &sentence.words {
            distinct_words.insert(&w.word);
            distinct_chars.extend(w.word.chars().filter(|&c| is_han(c)));
        }
        sentence_ids.push(merge_sentence(store, sentence, source));
    }

    let stats = IngestStats {
        sentences: sentence_ids.len(),
        words: distinct_words.len(),
        characters: distinct_chars.len(),
        sentence_ids,
        warnings: batch.warnings().to_vec(),
    };
    debug!(
        words = stats.words,
        characters = stats.characters,
        "batch merged"
    );
    stats
}

fn merge_sentence(store: &mut LexicalStore, sentence: &ExtractedSentence, source: &str) -> String {
    let sentence_id = generate_id();
    let mut occurrence_ids = Vec::with_capacity(sentence.words.len());

    for (position, extracted) in sentence.words.iter().enumerate() {
        let word_id = resolve_word(store, &extracted.word, &extracted.meaning);
        let occurrence = WordOccurrence {
            id: generate_id(),
            word_id: word_id.clone(),
            word: extracted.word.clone(),
            meaning: extracted.meaning.clone(),
            pinyin: store.pinyin_of(&extracted.word),
            sentence_id: sentence_id.clone(),
            position,
        };

        if let Some(word) = store.word_mut(&word_id) {
            word.occurrence_ids.push(occurrence.id.clone());
        }
        occurrence_ids.push(occurrence.id.clone());
        store.insert_occurrence(occurrence);

        for c in extracted.word.chars().filter(|&c| is_han(c)) {
            store.upsert_character_occurrence(c, &word_id);
        }
    }

    store.insert_sentence(Sentence {
        id: sentence_id.clone(),
        text: sentence.text.clone(),
        occurrence_ids,
        source: source.to_string(),
    });
    sentence_id
}

/// Count one more sighting of `text`, creating the word if it is new.
/// Returns the word id.
fn resolve_word(store: &mut LexicalStore, text: &str, meaning: &str) -> String {
    if let Some(id) = store.find_word_by_text(text).map(|w| w.id.clone()) {
        if let Some(word) = store.word_mut(&id) {
            word.seen_count += 1;
            if !word.meanings.iter().any(|m| m == meaning) {
                word.meanings.push(meaning.to_string());
            }
        }
        return id;
    }

    let id = generate_id();
    store.insert_word(Word {
        id: id.clone(),
        word: text.to_string(),
        meanings: vec![meaning.to_string()],
        seen_count: 1,
        occurrence_ids: Vec::new(),
    });
    id
}
