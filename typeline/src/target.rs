//! # Target Module - The Text Being Typed
//!
//! A [`Target`] is prepared once and never changes afterwards:
//!
//! ```text
//! raw text ─▶ \n line endings ─▶ NFD ─▶ wrap ─▶ trim lines ─▶ lines + offsets
//! ```
//!
//! Lines are ranges over the flattened text, so joining them with `\n`
//! reconstructs it exactly. The [`LineOffsetTable`] maps a flat byte offset
//! (like the length of the user input) back to a line.

use std::ops::Range;

use derive_more::Deref;

use crate::config::Configuration;
use crate::error::Error;
use crate::text::{indentation_len, is_whitespace_char, normalize};
use crate::wrap::wrap;

/// Byte offset of the first character of every line in the flattened target
#[derive(Debug, Clone, PartialEq, Eq, Deref)]
pub struct LineOffsetTable(Vec<usize>);

impl LineOffsetTable {
    fn new(lines: &[Range<usize>]) -> Self {
        Self(lines.iter().map(|line| line.start).collect())
    }

    /// Offset of the given line
    pub fn offset(&self, line: usize) -> usize {
        self.0.get(line).copied().unwrap_or_default()
    }

    /// Index of the line that contains the flat offset `pos`
    ///
    /// The newline closing a line belongs to that line, so the cursor sits at
    /// its end until the next line is reached.
    pub fn line_of(&self, pos: usize) -> usize {
        self.0
            .partition_point(|&offset| offset <= pos)
            .saturating_sub(1)
    }
}

/// Normalized, wrapped and trimmed text split into lines
#[derive(Debug, Clone)]
pub struct Target {
    text: String,
    lines: Vec<Range<usize>>,
    offsets: LineOffsetTable,
}

impl Target {
    /// Prepare raw text for typing
    ///
    /// `wrap_width` is the column count to wrap to, 0 disables wrapping.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyInput`] if nothing but whitespace is left.
    pub fn new(raw: &str, wrap_width: usize, config: &Configuration) -> Result<Self, Error> {
        let unified = unify_line_endings(raw);
        let normalized = normalize(&unified);
        let wrapped = wrap(&normalized, wrap_width, config.tab_width);
        let lines_trimmed = trim_line_ends(&wrapped);
        let trimmed = lines_trimmed.trim_matches(is_whitespace_char);

        if trimmed.is_empty() {
            return Err(Error::EmptyInput);
        }

        Ok(Self::from_prepared(trimmed.to_owned()))
    }

    fn from_prepared(text: String) -> Self {
        let mut lines = Vec::new();
        let mut start = 0;
        for (index, _) in text.match_indices('\n') {
            lines.push(start..index);
            start = index + 1;
        }
        lines.push(start..text.len());

        let offsets = LineOffsetTable::new(&lines);
        Self {
            text,
            lines,
            offsets,
        }
    }

    /// The flattened text, lines joined with `\n`
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Length of the flattened text in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Always false, a target holds at least one non-whitespace character
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Get a line by its index
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(|range| &self.text[range.clone()])
    }

    /// Iterate over all lines
    pub fn lines(&self) -> impl ExactSizeIterator<Item = &str> {
        self.lines.iter().map(|range| &self.text[range.clone()])
    }

    pub const fn offsets(&self) -> &LineOffsetTable {
        &self.offsets
    }

    /// Returns true if the character expected at `pos` is a line break
    pub fn expects_newline_at(&self, pos: usize) -> bool {
        self.text.as_bytes().get(pos) == Some(&b'\n')
    }

    /// The run of spaces and tabs a line starts with
    pub fn indentation(&self, line: usize) -> &str {
        self.line(line)
            .map(|text| &text[..indentation_len(text.as_bytes())])
            .unwrap_or_default()
    }

    /// Index of the line beginning exactly at `pos`, if any
    pub fn line_starting_at(&self, pos: usize) -> Option<usize> {
        self.offsets.binary_search(&pos).ok()
    }
}

/// Strip trailing whitespace from every line
fn trim_line_ends(text: &str) -> String {
    text.split('\n')
        .map(|line| line.trim_end_matches(is_whitespace_char))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Convert `\r\n` and lone `\r` to `\n`
fn unify_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
