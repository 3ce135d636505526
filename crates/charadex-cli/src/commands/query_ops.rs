use std::io::Write;
use std::path::Path;

use unicode_width::UnicodeWidthStr;

use charadex_core::reference::ReferenceVocabulary;
use charadex_core::segment::{Segment, Segmenter};
use charadex_core::settings::settings;
use charadex_core::snapshot::SnapshotFile;
use charadex_core::store::{LexicalStore, Word};

use super::CommandError;

/// Pad `s` with spaces to `width` display columns.
fn pad(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    if w < width {
        format!("{s}{}", " ".repeat(width - w))
    } else {
        s.to_string()
    }
}

fn load(data: &Path) -> Result<LexicalStore, CommandError> {
    Ok(SnapshotFile::new(data).load()?)
}

fn write_json<T: serde::Serialize>(out: &mut dyn Write, value: &T) -> Result<(), CommandError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn char_cmd(out: &mut dyn Write, data: &Path, c: char, json: bool) -> Result<(), CommandError> {
    let store = load(data)?;
    let details = store
        .character_details(c)
        .ok_or_else(|| CommandError::NotFound(format!("character {c}")))?;
    if json {
        return write_json(out, &details);
    }

    writeln!(out, "{}  {}  seen {}", details.character, details.pinyin, details.seen_count)?;
    if let Some(meta) = &details.meta {
        let fields = [
            ("definition", &meta.definition),
            ("radical", &meta.radical),
            ("radical code", &meta.radical_code),
            ("strokes", &meta.stroke_count),
            ("HSK", &meta.hsk_level),
            ("rank", &meta.frequency_rank),
        ];
        for (label, value) in fields {
            if let Some(v) = value {
                writeln!(out, "{}{v}", pad(&format!("{label}:"), 14))?;
            }
        }
    }
    if details.words.is_empty() {
        writeln!(out, "(no words)")?;
        return Ok(());
    }
    writeln!(out, "words:")?;
    for w in &details.words {
        writeln!(
            out,
            "  {}{}  (seen {})",
            pad(&w.word, 10),
            pad(&w.meanings.join("; "), 24),
            w.seen_count
        )?;
    }
    Ok(())
}

pub fn word_cmd(out: &mut dyn Write, data: &Path, text: &str, json: bool) -> Result<(), CommandError> {
    let store = load(data)?;
    let details = store
        .word_details(text)
        .ok_or_else(|| CommandError::NotFound(format!("word {text}")))?;
    if json {
        return write_json(out, &details);
    }

    writeln!(out, "{}  (seen {})", details.word, details.seen_count)?;
    writeln!(out, "meanings: {}", details.meanings.join("; "))?;
    let characters: Vec<String> = details
        .characters
        .iter()
        .map(|(c, pinyin)| {
            if pinyin.is_empty() {
                c.to_string()
            } else {
                format!("{c}({pinyin})")
            }
        })
        .collect();
    writeln!(out, "characters: {}", characters.join(" "))?;
    writeln!(out, "sentences:")?;
    for s in &details.sentences {
        writeln!(out, "  {}  {}  [{}]", s.id, s.text, s.source)?;
    }
    Ok(())
}

pub fn sentence_cmd(out: &mut dyn Write, data: &Path, id: &str, json: bool) -> Result<(), CommandError> {
    let store = load(data)?;
    let details = store
        .sentence_details(id)
        .ok_or_else(|| CommandError::NotFound(format!("sentence {id}")))?;
    if json {
        return write_json(out, &details);
    }

    writeln!(out, "{}", details.sentence.text)?;
    writeln!(out, "source: {}", details.sentence.source)?;
    let rendered: Vec<String> = details
        .segments
        .iter()
        .map(|seg| match seg.occurrence {
            Some(_) => format!("[{}]", seg.text),
            None => seg.text.clone(),
        })
        .collect();
    writeln!(out, "segments: {}", rendered.join(" "))?;
    for occ in &details.occurrences {
        writeln!(
            out,
            "  {:>2}  {}{}{}",
            occ.position,
            pad(&occ.word, 10),
            pad(&occ.pinyin, 16),
            occ.meaning
        )?;
    }
    Ok(())
}

/// Characters in frequency order with their seen counts.
///
/// The order comes from `hanzi` when given, otherwise from the reference
/// ranks stored with each character.
pub fn characters_cmd(
    out: &mut dyn Write,
    data: &Path,
    hanzi: Option<&Path>,
    limit: Option<usize>,
    seen_only: bool,
    json: bool,
) -> Result<(), CommandError> {
    let store = load(data)?;
    let order = match hanzi {
        Some(path) => ReferenceVocabulary::load(path, settings().reference.max_characters)?.order(),
        None => store.frequency_order(),
    };
    let listed: Vec<_> = store
        .characters_in_order(&order)
        .into_iter()
        .filter(|c| !seen_only || c.seen_count > 0)
        .take(limit.unwrap_or(usize::MAX))
        .collect();
    if json {
        return write_json(out, &listed);
    }

    for (i, c) in listed.iter().enumerate() {
        writeln!(
            out,
            "{:>5}  {}  {}{}",
            i + 1,
            c.character,
            pad(&c.pinyin, 8),
            c.seen_count
        )?;
    }
    let seen = listed.iter().filter(|c| c.seen_count > 0).count();
    writeln!(out, "---")?;
    writeln!(out, "{seen}/{} seen", listed.len())?;
    Ok(())
}

/// Segment ad-hoc text against every stored word.
pub fn segment_cmd(out: &mut dyn Write, data: &Path, text: &str) -> Result<(), CommandError> {
    let store = load(data)?;
    let segmenter: Segmenter<&Word> = Segmenter::new(store.words().map(|w| (w.word.as_str(), w)));
    let parts: Vec<String> = segmenter
        .segments(text)
        .map(|seg| match seg {
            Segment::Word { text, meta } => format!("{text}({})", meta.meanings.join("/")),
            Segment::Literal(text) => text.to_string(),
        })
        .collect();
    writeln!(out, "{}", parts.join(" | "))?;
    Ok(())
}
