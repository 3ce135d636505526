//! Greedy longest-match segmentation against a set of known words.
//!
//! At each cursor position the longest candidate whose text is a prefix of
//! the remaining input wins. Candidates of equal length keep their insertion
//! order, so the first-inserted one wins a tie. Characters that start no
//! candidate are gathered into maximal literal spans.
//!
//! This is a heuristic. A shorter word that should win semantically (e.g.
//! 研究 + 生命 vs. 研究生 + 命) is not recovered.

use std::cmp::Reverse;

use tracing::debug;

/// One span of the segmented text, borrowing from the input and the segmenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a, M> {
    /// Span matching a candidate word, with that candidate's metadata.
    Word { text: &'a str, meta: &'a M },
    /// Maximal run of characters that start no candidate.
    Literal(&'a str),
}

impl<'a, M> Segment<'a, M> {
    pub fn text(&self) -> &'a str {
        match self {
            Segment::Word { text, .. } | Segment::Literal(text) => text,
        }
    }

    pub fn is_word(&self) -> bool {
        matches!(self, Segment::Word { .. })
    }
}

/// Candidate words sorted for longest-match lookup.
#[derive(Debug, Clone)]
pub struct Segmenter<M> {
    candidates: Vec<(String, M)>,
}

impl<M> Segmenter<M> {
    /// Build from `(word text, metadata)` pairs. Empty texts are dropped.
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = (S, M)>,
        S: Into<String>,
    {
        let mut candidates: Vec<(String, M)> = candidates
            .into_iter()
            .map(|(text, meta)| (text.into(), meta))
            .filter(|(text, _)| !text.is_empty())
            .collect();
        // Stable: equal lengths keep insertion order.
        candidates.sort_by_key(|(text, _)| Reverse(text.chars().count()));
        debug!(candidates = candidates.len(), "segmenter built");
        Self { candidates }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Lazily segment `text`. Each call starts a fresh scan.
    pub fn segments<'a>(&'a self, text: &'a str) -> Segments<'a, M> {
        Segments {
            segmenter: self,
            text,
            cursor: 0,
        }
    }

    /// Longest candidate that is a prefix of `rest`.
    fn match_prefix(&self, rest: &str) -> Option<&(String, M)> {
        self.candidates
            .iter()
            .find(|(word, _)| rest.starts_with(word.as_str()))
    }
}

/// Iterator returned by [`Segmenter::segments`].
#[derive(Debug, Clone)]
pub struct Segments<'a, M> {
    segmenter: &'a Segmenter<M>,
    text: &'a str,
    /// Byte offset, always on a char boundary.
    cursor: usize,
}

impl<'a, M> Iterator for Segments<'a, M> {
    type Item = Segment<'a, M>;

    fn next(&mut self) -> Option<Self::Item> {
        let text = self.text;
        let start = self.cursor;
        let rest = text.get(start..).filter(|r| !r.is_empty())?;

        if let Some((word, meta)) = self.segmenter.match_prefix(rest) {
            self.cursor += word.len();
            return Some(Segment::Word {
                text: &text[start..self.cursor],
                meta,
            });
        }

        // Consume characters until one starts a candidate or the text ends.
        for (offset, c) in rest.char_indices() {
            if offset > 0 && self.segmenter.match_prefix(&rest[offset..]).is_some() {
                break;
            }
            self.cursor = start + offset + c.len_utf8();
        }
        Some(Segment::Literal(&text[start..self.cursor]))
    }
}
