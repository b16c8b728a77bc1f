//! Grapheme-indexed text.
//!
//! Typing, deleting and splitting work in user-perceived characters so an
//! emoji or a combining sequence is revealed as one unit.

use unicode_segmentation::UnicodeSegmentation;

/// A string with precomputed grapheme boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GraphemeText {
    text: String,
    /// Byte offset just past each grapheme.
    ends: Vec<usize>,
}

impl GraphemeText {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let ends = text
            .grapheme_indices(true)
            .map(|(start, g)| start + g.len())
            .collect();
        Self { text, ends }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of graphemes.
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    /// The first `count` graphemes (clamped to the length).
    pub fn prefix(&self, count: usize) -> &str {
        match count.min(self.ends.len()) {
            0 => "",
            n => &self.text[..self.ends[n - 1]],
        }
    }

    /// Iterate graphemes in order.
    pub fn graphemes(&self) -> impl Iterator<Item = &str> {
        self.text.graphemes(true)
    }
}
