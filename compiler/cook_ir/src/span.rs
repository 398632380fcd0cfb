//! Source location spans.
//!
//! Offsets are UTF-16 code units, which is what ESTree parsers report for
//! `start`/`end`. [`Span::snippet`] maps them back onto a Rust `&str`.

use serde::Deserialize;
use std::fmt;

/// Source location span.
///
/// Layout: 8 bytes total
/// - start: u32 - UTF-16 offset from source start
/// - end: u32 - UTF-16 offset (exclusive)
///
/// Nodes without position information deserialize to the empty span.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Deserialize)]
pub struct Span {
    #[serde(default)]
    pub start: u32,
    #[serde(default)]
    pub end: u32,
}

impl Span {
    /// Span used by nodes that carry no position.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    /// Create a new span.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Length of the span in UTF-16 code units.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Merge two spans to create one covering both.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// The literal source text covered by this span.
    ///
    /// Returns `None` for empty spans and for spans that fall outside
    /// `source` or split a surrogate pair.
    pub fn snippet<'s>(&self, source: &'s str) -> Option<&'s str> {
        if self.is_empty() {
            return None;
        }
        if source.is_ascii() {
            return source.get(self.start as usize..self.end as usize);
        }
        let start = utf16_to_byte_offset(source, self.start)?;
        let end = utf16_to_byte_offset(source, self.end)?;
        source.get(start..end)
    }

    /// Convert to a range of `char` indices, as diagnostic renderers expect.
    pub fn char_range(&self, source: &str) -> std::ops::Range<usize> {
        let mut units = 0u32;
        let mut start = None;
        let mut end = None;
        for (index, ch) in source.chars().enumerate() {
            if start.is_none() && units >= self.start {
                start = Some(index);
            }
            if end.is_none() && units >= self.end {
                end = Some(index);
                break;
            }
            units += ch.len_utf16() as u32;
        }
        let total = source.chars().count();
        let start = start.unwrap_or(total);
        start..end.unwrap_or(total).max(start)
    }
}

fn utf16_to_byte_offset(source: &str, offset: u32) -> Option<usize> {
    let mut units = 0u32;
    for (byte, ch) in source.char_indices() {
        if units == offset {
            return Some(byte);
        }
        if units > offset {
            return None;
        }
        units += ch.len_utf16() as u32;
    }
    (units == offset).then_some(source.len())
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
