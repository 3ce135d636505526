//! Gatekeeper between the extraction oracle and the merge engine.
//!
//! Oracle output is untrusted JSON. [`validate`] turns it into a typed
//! [`ValidatedBatch`] or rejects it with every structural and coverage
//! problem collected in one [`ValidationReport`]. A `ValidatedBatch` can only
//! be built here, so merge never sees unchecked input.


use serde_json::{Map, Value};
use tracing::{debug, debug_span, warn};

use crate::settings::{settings, ValidationSettings};
use crate::unicode::strip_ignorable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedWord {
    pub word: String,
    pub meaning: String,
    /// Reading proposed by the oracle. Only its type is checked: merge
    /// derives occurrence readings from the character table instead.
    pub pinyin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSentence {
    pub text: String,
    pub words: Vec<ExtractedWord>,
}

/// Extraction that passed validation, with any soft warnings.
#[derive(Debug, Clone)]
pub struct ValidatedBatch {
    sentences: Vec<ExtractedSentence>,
    warnings: Vec<ValidationWarning>,
}

impl ValidatedBatch {
    pub fn sentences(&self) -> &[ExtractedSentence] {
        &self.sentences
    }

    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    pub fn word_count(&self) -> usize {
        self.sentences.iter().map(|s| s.words.len()).sum()
    }
}

/// Hard failure: the whole batch is rejected. Indices are 0-based.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("extraction must be an object with a `sentences` array")]
    MissingSentences,
    #[error("sentence {sentence}: not an object")]
    SentenceNotObject { sentence: usize },
    #[error("sentence {sentence}: `text` must be a non-empty string")]
    InvalidText { sentence: usize },
    #[error("sentence {sentence}: `words` must be an array")]
    InvalidWords { sentence: usize },
    #[error("sentence {sentence}, word {word}: not an object")]
    WordNotObject { sentence: usize, word: usize },
    #[error("sentence {sentence}, word {word}: `word` must be a non-empty string")]
    InvalidWord { sentence: usize, word: usize },
    #[error("sentence {sentence}, word {word}: `meaning` must be a non-empty string")]
    InvalidMeaning { sentence: usize, word: usize },
    #[error("sentence {sentence}, word {word}: `pinyin` must be a string")]
    InvalidPinyin { sentence: usize, word: usize },
    #[error("sentence {sentence}: incomplete extraction, missing words (coverage {coverage:.2})")]
    IncompleteExtraction { sentence: usize, coverage: f64 },
    #[error("extraction contains no words")]
    NoWords,
}

/// Soft finding: reported, never blocks ingestion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationWarning {
    #[error("sentence {sentence}: low coverage {coverage:.2}, some words may be missing")]
    LowCoverage { sentence: usize, coverage: f64 },
    #[error("sentence {sentence}: coverage {coverage:.2}, possible duplicate words")]
    PossibleDuplicates { sentence: usize, coverage: f64 },
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("extraction rejected with {} error(s)", .errors.len())]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// Fraction of the sentence's ignorable-stripped length covered by the
/// concatenated words, counted in chars.
///
/// `None` when the sentence is empty after stripping.
pub fn coverage<'w>(text: &str, words: impl IntoIterator<Item = &'w str>) -> Option<f64> {
    let original = strip_ignorable(text).chars().count();
    if original == 0 {
        return None;
    }
    let reconstruction: String = words.into_iter().collect();
    let covered = strip_ignorable(&reconstruction).chars().count();
    Some(covered as f64 / original as f64)
}

/// Validate against the global settings thresholds.
pub fn validate(raw: &Value) -> Result<ValidatedBatch, ValidationReport> {
    validate_with(raw, &settings().validation)
}

pub fn validate_with(
    raw: &Value,
    thresholds: &ValidationSettings,
) -> Result<ValidatedBatch, ValidationReport> {
    let _span = debug_span!("validate").entered();

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let Some(raw_sentences) = raw.get("sentences").and_then(Value::as_array) else {
        return Err(ValidationReport {
            errors: vec![ValidationError::MissingSentences],
            warnings,
        });
    };

    let mut sentences = Vec::with_capacity(raw_sentences.len());
    let mut total_words = 0;
    for (idx, value) in raw_sentences.iter().enumerate() {
        if let Some(words) = value.get("words").and_then(Value::as_array) {
            total_words += words.len();
        }
        let Some(sentence) = parse_sentence(idx, value, &mut errors) else {
            continue;
        };

        let cov = coverage(&sentence.text, sentence.words.iter().map(|w| w.word.as_str()));
        match cov {
            Some(c) if c < thresholds.min_coverage => {
                errors.push(ValidationError::IncompleteExtraction {
                    sentence: idx,
                    coverage: c,
                });
            }
            Some(c) if c < thresholds.warn_coverage => {
                warnings.push(ValidationWarning::LowCoverage {
                    sentence: idx,
                    coverage: c,
                });
            }
            Some(c) if c > thresholds.max_coverage => {
                warnings.push(ValidationWarning::PossibleDuplicates {
                    sentence: idx,
                    coverage: c,
                });
            }
            _ => {}
        }
        sentences.push(sentence);
    }

    if total_words == 0 {
        errors.push(ValidationError::NoWords);
    }

    for w in &warnings {
        warn!("{w}");
    }

    if !errors.is_empty() {
        debug!(errors = errors.len(), "extraction rejected");
        return Err(ValidationReport { errors, warnings });
    }

    debug!(
        sentences = sentences.len(),
        words = total_words,
        warnings = warnings.len(),
        "extraction accepted"
    );
    Ok(ValidatedBatch {
        sentences,
        warnings,
    })
}

fn non_empty_str<'v>(obj: &'v Map<String, Value>, key: &str) -> Option<&'v str> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn parse_sentence(
    idx: usize,
    value: &Value,
    errors: &mut Vec<ValidationError>,
) -> Option<ExtractedSentence> {
    let Some(obj) = value.as_object() else {
        errors.push(ValidationError::SentenceNotObject { sentence: idx });
        return None;
    };

    let text = non_empty_str(obj, "text");
    if text.is_none() {
        errors.push(ValidationError::InvalidText { sentence: idx });
    }

    let Some(raw_words) = obj.get("words").and_then(Value::as_array) else {
        errors.push(ValidationError::InvalidWords { sentence: idx });
        return None;
    };

    let mut words = Vec::with_capacity(raw_words.len());
    let mut words_ok = true;
    for (w_idx, raw_word) in raw_words.iter().enumerate() {
        match parse_word(idx, w_idx, raw_word, errors) {
            Some(word) => words.push(word),
            None => words_ok = false,
        }
    }

    let text = text?;
    words_ok.then(|| ExtractedSentence {
        text: text.to_string(),
        words,
    })
}

fn parse_word(
    sentence: usize,
    word: usize,
    value: &Value,
    errors: &mut Vec<ValidationError>,
) -> Option<ExtractedWord> {
    let Some(obj) = value.as_object() else {
        errors.push(ValidationError::WordNotObject { sentence, word });
        return None;
    };

    let text = non_empty_str(obj, "word");
    if text.is_none() {
        errors.push(ValidationError::InvalidWord { sentence, word });
    }
    let meaning = non_empty_str(obj, "meaning");
    if meaning.is_none() {
        errors.push(ValidationError::InvalidMeaning { sentence, word });
    }
    let pinyin = match obj.get("pinyin") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(p)) => Ok(Some(p.clone())),
        Some(_) => Err(()),
    };
    if pinyin.is_err() {
        errors.push(ValidationError::InvalidPinyin { sentence, word });
    }

    Some(ExtractedWord {
        word: text?.to_string(),
        meaning: meaning?.to_string(),
        pinyin: pinyin.ok()?,
    })
}
