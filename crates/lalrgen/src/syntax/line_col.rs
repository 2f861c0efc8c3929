//! Byte offset to line/column conversion for error reporting.

use crate::syntax::TextSize;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Zero-based line and column (column counted in characters)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

impl LineCol {
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Displays one-based, as editors show positions.
impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Line start table for repeated offset lookups
///
/// Built in one scan of the text; each lookup is a binary search over
/// line starts. `\n`, `\r\n` and lone `\r` all end a line.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
    text: Box<str>,
}

impl LineIndex {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::zero()];
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    line_starts.push(TextSize::of(i + 1));
                    i += 1;
                }
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    line_starts.push(TextSize::of(i + 2));
                    i += 2;
                }
                b'\r' => {
                    line_starts.push(TextSize::of(i + 1));
                    i += 1;
                }
                _ => i += 1,
            }
        }

        Self {
            line_starts,
            text: text.into(),
        }
    }

    /// Offsets past the end of the text clamp to the last position.
    #[must_use]
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(TextSize::of(self.text.len()));
        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };

        let line_start = self.line_starts[line].to_usize();
        let column = self
            .text
            .get(line_start..offset.to_usize())
            .map_or(offset.to_usize() - line_start, |s| s.chars().count());

        LineCol {
            line: u32::try_from(line).unwrap_or(u32::MAX),
            column: u32::try_from(column).unwrap_or(u32::MAX),
        }
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    #[must_use]
    pub fn line_start(&self, line: usize) -> Option<TextSize> {
        self.line_starts.get(line).copied()
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// One-off conversion without keeping an index around.
#[must_use]
pub fn line_col_from_offset(text: &str, offset: TextSize) -> LineCol {
    LineIndex::new(text).line_col(offset)
}
