//! Delimiter splitting over one owned copy of the source text.

use core::ops::Range;

/// A blank is a space or any control byte.
#[inline(always)]
const fn is_blank(c: char) -> bool {
    (c as u32) <= (' ' as u32)
}

/// Strip leading and trailing blanks.
pub fn trim_blank(text: &str) -> &str {
    text.trim_matches(is_blank)
}

/// Trim `text` and collapse every interior blank run into a single space.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in trim_blank(text).split(is_blank).filter(|w| !w.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// One input string split on a delimiter.
///
/// Holds a single owned copy of the text; tokens are byte ranges into it, so
/// nothing is copied per token and nothing outlives the value.
#[derive(Debug, Clone)]
pub struct TokenizedInput {
    text: String,
    parts: Vec<Range<usize>>,
}

impl TokenizedInput {
    /// Split `text` on every occurrence of `delim`.
    ///
    /// The first token always starts at offset 0, so there is at least one
    /// token, possibly empty. Adjacent delimiters produce empty tokens.
    pub fn split(text: &str, delim: char) -> Self {
        let text = text.to_owned();
        let mut parts = Vec::new();
        let mut start = 0usize;
        for (i, c) in text.char_indices() {
            if c == delim {
                parts.push(start..i);
                start = i + c.len_utf8();
            }
        }
        parts.push(start..text.len());
        Self { text, parts }
    }

    /// Number of tokens, never zero.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Token at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.parts.get(index).map(|r| &self.text[r.clone()])
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.parts.iter().map(|r| &self.text[r.clone()])
    }
}

// ==================== TESTS =======================
