//! Character-level Unicode classification for Chinese text.

/// CJK Unified Ideographs plus Extensions A and B.
pub fn is_han(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
        || ('\u{3400}'..='\u{4DBF}').contains(&c)
        || ('\u{20000}'..='\u{2A6DF}').contains(&c)
}

/// Characters ignored when comparing an extraction against its sentence.
///
/// Whitespace, ASCII punctuation, General Punctuation (U+2000..U+206F, covers
/// “ ” ‘ ’ … —), CJK Symbols and Punctuation (U+3000..U+303F, covers 。、「」《》)
/// and the punctuation parts of the Halfwidth and Fullwidth Forms block
/// (，！？：；（） and friends).
pub fn is_ignorable(c: char) -> bool {
    c.is_whitespace()
        || c.is_ascii_punctuation()
        || ('\u{2000}'..='\u{206F}').contains(&c)
        || ('\u{3000}'..='\u{303F}').contains(&c)
        || ('\u{FF01}'..='\u{FF0F}').contains(&c)
        || ('\u{FF1A}'..='\u{FF20}').contains(&c)
        || ('\u{FF3B}'..='\u{FF40}').contains(&c)
        || ('\u{FF5B}'..='\u{FF65}').contains(&c)
        || c == '\u{00B7}'
}

/// Remove every [`is_ignorable`] character.
pub fn strip_ignorable(s: &str) -> String {
    s.chars().filter(|&c| !is_ignorable(c)).collect()
}
