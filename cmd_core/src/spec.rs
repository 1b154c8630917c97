//! Registration spec parsing.
//!
//! Grammar, after blank normalization:
//!
//! ```text
//! spec    := segment (segment)*
//! segment := NAME (TAG)*
//! ```
//!
//! A bare word after a segment's tags opens the next nesting level; the
//! segment before it gets the `<SUBCMD>` marker as its last descriptor.

use core::fmt;

use crate::error::RegisterError;
use crate::tokenizer::{TokenizedInput, normalize};
use crate::types::{Descriptor, TAG_MARKER};

/// One nesting level of a spec: a command name and its positional grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    pub descriptors: Vec<&'static Descriptor>,
}

impl Segment {
    /// Positional grammar matches, marker included.
    pub fn same_grammar(&self, descriptors: &[&'static Descriptor]) -> bool {
        self.descriptors.len() == descriptors.len()
            && self
                .descriptors
                .iter()
                .zip(descriptors)
                .all(|(a, b)| a.kind == b.kind)
    }
}

/// A parsed registration spec, outermost segment first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    segments: Vec<Segment>,
}

impl CommandSpec {
    pub fn parse(text: &str) -> Result<Self, RegisterError> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return Err(RegisterError::EmptySpec);
        }
        let words = TokenizedInput::split(&normalized, ' ');
        let words: Vec<&str> = words.iter().collect();
        let segments = parse_segments(&words)?;
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Full command path, e.g. `"config set"`.
    pub fn path(&self) -> String {
        let names: Vec<&str> = self.segments.iter().map(|s| s.name.as_str()).collect();
        names.join(" ")
    }

    /// Number of value tokens a matching input line carries after the names.
    pub fn value_count(&self) -> usize {
        self.segments
            .iter()
            .flat_map(|s| s.descriptors.iter())
            .filter(|d| d.is_value())
            .count()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            f.write_str(&segment.name)?;
            for d in segment.descriptors.iter().filter(|d| d.is_value()) {
                write!(f, " {d}")?;
            }
        }
        Ok(())
    }
}

/// `words` is never empty here: the first call gets a non-empty spec and
/// recursion only happens on a bare word.
fn parse_segments(words: &[&str]) -> Result<Vec<Segment>, RegisterError> {
    let Some((name, rest)) = words.split_first() else {
        return Err(RegisterError::EmptySpec);
    };
    if name.starts_with(TAG_MARKER) {
        return Err(RegisterError::MissingName { tag: (*name).to_owned() });
    }

    let mut descriptors = Vec::with_capacity(rest.len());
    for (i, word) in rest.iter().enumerate() {
        let descriptor = Descriptor::resolve(word);
        if descriptor.is_unknown() {
            return Err(RegisterError::UnknownType { tag: (*word).to_owned() });
        }
        descriptors.push(descriptor);
        if descriptor.is_subcommand() {
            let head = Segment { name: (*name).to_owned(), descriptors };
            let tail = parse_segments(&rest[i..])?;
            return Ok(core::iter::once(head).chain(tail).collect());
        }
    }

    Ok(vec![Segment { name: (*name).to_owned(), descriptors }])
}

// ==================== TESTS =======================
