//! Read-only views over the store for character, word and sentence pages.

use std::collections::HashSet;

use serde::Serialize;

use super::{Character, CharacterMeta, LexicalStore, Sentence, WordOccurrence};
use crate::segment::{Segment, Segmenter};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordSummary {
    pub id: String,
    pub word: String,
    pub meanings: Vec<String>,
    pub seen_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterDetails {
    pub character: char,
    pub seen_count: u32,
    pub pinyin: String,
    /// `None` when the character is not part of the reference vocabulary.
    pub meta: Option<CharacterMeta>,
    pub words: Vec<WordSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceSummary {
    pub id: String,
    pub text: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordDetails {
    pub id: String,
    pub word: String,
    pub meanings: Vec<String>,
    pub seen_count: u32,
    pub sentences: Vec<SentenceSummary>,
    pub occurrences: Vec<WordOccurrence>,
    /// (character, reading) for every character of the word text.
    pub characters: Vec<(char, String)>,
}

/// One rendered span of a sentence. `occurrence` is set for word spans.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSegment {
    pub text: String,
    pub occurrence: Option<WordOccurrence>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceDetails {
    pub sentence: Sentence,
    pub occurrences: Vec<WordOccurrence>,
    pub segments: Vec<RenderSegment>,
}

impl LexicalStore {
    pub fn character_details(&self, c: char) -> Option<CharacterDetails> {
        let character = self.character(c)?;
        let words = character
            .word_references
            .iter()
            .filter_map(|id| self.word(id))
            .map(|w| WordSummary {
                id: w.id.clone(),
                word: w.word.clone(),
                meanings: w.meanings.clone(),
                seen_count: w.seen_count,
            })
            .collect();
        Some(CharacterDetails {
            character: character.character,
            seen_count: character.seen_count,
            pinyin: character.pinyin.clone(),
            meta: (!character.meta.is_empty()).then(|| character.meta.clone()),
            words,
        })
    }

    pub fn word_details(&self, text: &str) -> Option<WordDetails> {
        let word = self.find_word_by_text(text)?;
        let occurrences: Vec<WordOccurrence> = word
            .occurrence_ids
            .iter()
            .filter_map(|id| self.occurrence(id))
            .cloned()
            .collect();

        let mut seen = HashSet::new();
        let sentences = occurrences
            .iter()
            .filter(|occ| seen.insert(occ.sentence_id.as_str()))
            .filter_map(|occ| self.sentence(&occ.sentence_id))
            .map(|s| SentenceSummary {
                id: s.id.clone(),
                text: s.text.clone(),
                source: s.source.clone(),
            })
            .collect();

        let characters = word
            .word
            .chars()
            .map(|c| {
                let pinyin = self.character(c).map(|ch| ch.pinyin.clone());
                (c, pinyin.unwrap_or_default())
            })
            .collect();

        Some(WordDetails {
            id: word.id.clone(),
            word: word.word.clone(),
            meanings: word.meanings.clone(),
            seen_count: word.seen_count,
            sentences,
            occurrences,
            characters,
        })
    }

    pub fn sentence_details(&self, id: &str) -> Option<SentenceDetails> {
        let sentence = self.sentence(id)?;
        let occurrences: Vec<WordOccurrence> = self
            .sentence_occurrences(sentence)
            .into_iter()
            .cloned()
            .collect();

        let segments = {
            let segmenter = Segmenter::new(occurrences.iter().map(|occ| (occ.word.clone(), occ)));
            segmenter
                .segments(&sentence.text)
                .map(|segment| match segment {
                    Segment::Word { text, meta } => RenderSegment {
                        text: text.to_string(),
                        occurrence: Some(WordOccurrence::clone(meta)),
                    },
                    Segment::Literal(text) => RenderSegment {
                        text: text.to_string(),
                        occurrence: None,
                    },
                })
                .collect()
        };

        Some(SentenceDetails {
            sentence: sentence.clone(),
            occurrences,
            segments,
        })
    }

    /// Stored characters most frequent first: by reference frequency rank,
    /// then unranked characters in code point order.
    pub fn frequency_order(&self) -> Vec<char> {
        let mut ranked: Vec<(u32, char)> = self
            .characters()
            .map(|c| {
                let rank = c
                    .meta
                    .frequency_rank
                    .as_deref()
                    .and_then(|r| r.trim().parse().ok())
                    .unwrap_or(u32::MAX);
                (rank, c.character)
            })
            .collect();
        ranked.sort_unstable();
        ranked.into_iter().map(|(_, c)| c).collect()
    }

    /// One character per entry of `order`, substituting an empty zero-count
    /// character for entries missing from the store.
    pub fn characters_in_order(&self, order: &[char]) -> Vec<Character> {
        order
            .iter()
            .map(|&c| {
                self.character(c)
                    .cloned()
                    .unwrap_or_else(|| Character::new(c))
            })
            .collect()
    }
}
