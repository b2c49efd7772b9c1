// wick -- a tree-walking interpreter for a small dynamically typed scripting language
// Copyright (c) 2024 The Wick Language Authors
//
// Licensed under the MIT license. See the LICENSE file in the repository
// root for details.

//! Bits and pieces for working with ranges of text.

/// A region within the source text.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct Span {
    /// The byte-offset of the first character of the span.
    pub begin: usize,
    /// The byte-offset of the first character *after* the span.
    pub end: usize,
}

impl Span {
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    /// A span covering both `self` and `other`, even if they are not adjacent.
    pub fn to(self, other: Span) -> Span {
        Span {
            begin: self.begin.min(other.begin),
            end: self.end.max(other.end),
        }
    }
}

/// Position inside a text in a form that's useful for human readers.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Pos {
    /// Line number, starting at 1
    pub line: usize,
    /// Position within the line, in characters, starting at 1
    pub column: usize,
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A data structure for mapping byte offsets to line/column based positions.
pub struct LineMap<'a> {
    /// Ordered vector of the position of line breaks (`\n`)
    line_offsets: Vec<usize>,
    /// The original string, needed for obtaining the column indices.
    source: &'a str,
}

impl<'a> LineMap<'a> {
    pub fn new(s: &'a str) -> Self {
        Self {
            line_offsets: s
                .char_indices()
                .filter_map(|(pos, ch)| if ch == '\n' { Some(pos) } else { None })
                .collect(),
            source: s,
        }
    }

    /// # Examples
    ///
    /// ```
    /// # use wick_lang::span::{LineMap, Pos};
    /// let s = "abc\ndefg\nab\n";
    /// let m = LineMap::new(s);
    /// assert_eq!(m.offset_to_pos(0), Pos { line: 1, column: 1 });
    /// assert_eq!(m.offset_to_pos(3), Pos { line: 1, column: 4 });
    /// assert_eq!(m.offset_to_pos(4), Pos { line: 2, column: 1 });
    /// ```
    pub fn offset_to_pos(&self, offset: usize) -> Pos {
        let line = match self.line_offsets.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line,
        };
        let previous_line_start = if line > 0 {
            self.line_offsets[line - 1] + 1
        } else {
            0
        };
        let column = self.source[previous_line_start..offset.min(self.source.len())]
            .chars()
            .count()
            + 1;
        Pos {
            line: line + 1,
            column,
        }
    }
}
