//! Byte offset ⇄ line/column mapping for one template.
//!
//! The index owns the template text and a sorted table of line-start
//! offsets. Positions are computed on demand by binary search, so nodes
//! only ever store a [`Span`] and never cache their own line/column.
//!
//! Lines are 1-based, columns are 0-based and counted in characters.

use std::fmt;

use crate::Span;

/// A line/column position in a template.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct SourcePosition {
    /// 1-based line number.
    pub line: u32,
    /// 0-based column, in characters.
    pub column: u32,
}

impl SourcePosition {
    pub const fn new(line: u32, column: u32) -> Self {
        SourcePosition { line, column }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Immutable template text plus its line table.
#[derive(Clone, Debug)]
pub struct SourceIndex {
    source: String,
    module_name: String,
    /// Byte offset where each line begins. Always starts with `0`.
    line_starts: Vec<u32>,
}

impl SourceIndex {
    pub fn new(source: impl Into<String>, module_name: impl Into<String>) -> Self {
        let source = source.into();
        let mut line_starts = vec![0];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        SourceIndex {
            source,
            module_name: module_name.into(),
            line_starts,
        }
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Line/column of a byte offset. Offsets past the end clamp to the end.
    pub fn position(&self, offset: u32) -> SourcePosition {
        let offset = offset.min(self.len());
        // Number of line starts <= offset is the 1-based line.
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line.saturating_sub(1)];
        let column = match self.source.get(line_start as usize..offset as usize) {
            Some(text) => text.chars().count(),
            None => (offset - line_start) as usize,
        };
        SourcePosition {
            line: u32::try_from(line).unwrap_or(u32::MAX),
            column: u32::try_from(column).unwrap_or(u32::MAX),
        }
    }

    /// Byte offset of a line/column position, if it lies inside the text.
    pub fn offset(&self, position: SourcePosition) -> Option<u32> {
        let line_index = (position.line as usize).checked_sub(1)?;
        let line_start = *self.line_starts.get(line_index)?;
        let line_end = self.line_end(line_index);
        let line_text = self.source.get(line_start as usize..line_end)?;

        let mut chars = line_text.char_indices();
        let byte = match chars.nth(position.column as usize) {
            Some((byte, _)) => byte,
            // Column one past the last character addresses the line end.
            None if line_text.chars().count() == position.column as usize => line_text.len(),
            None => return None,
        };
        u32::try_from(line_start as usize + byte).ok()
    }

    /// Text of a 1-based line without its terminator.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        let line_index = (line as usize).checked_sub(1)?;
        let start = *self.line_starts.get(line_index)? as usize;
        let text = self.source.get(start..self.line_end(line_index))?;
        Some(text.strip_suffix('\r').unwrap_or(text))
    }

    /// Source text covered by `span`, or `""` for dummy/out-of-range spans.
    pub fn slice(&self, span: Span) -> &str {
        if span.is_dummy() {
            return "";
        }
        self.source.get(span.to_range()).unwrap_or("")
    }

    /// Text used in diagnostics: the covered source, or the starting line
    /// when the span is empty.
    pub fn snippet(&self, span: Span) -> &str {
        let text = self.slice(span);
        if text.is_empty() {
            let line = self.position(span.start).line;
            self.line_text(line).unwrap_or("")
        } else {
            text
        }
    }

    fn len(&self) -> u32 {
        u32::try_from(self.source.len()).unwrap_or(u32::MAX)
    }

    /// Exclusive byte end of a line, excluding the `\n`.
    fn line_end(&self, line_index: usize) -> usize {
        match self.line_starts.get(line_index + 1) {
            Some(&next) => next as usize - 1,
            None => self.source.len(),
        }
    }
}
