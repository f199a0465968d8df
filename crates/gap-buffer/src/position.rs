//! Line/column addressing.

use std::fmt;

/// A point in the buffer: zero-based line and code-point column.
///
/// Ordering is lexicographic by `(line, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    /// Buffer start.
    pub const fn origin() -> Self {
        Self { line: 0, col: 0 }
    }

    /// Build a position from signed coordinates.
    ///
    /// A negative line clamps to the buffer start; a negative column clamps
    /// to the start of its line.
    pub fn from_signed(line: isize, col: isize) -> Self {
        if line < 0 {
            return Self::origin();
        }
        Self {
            line: line as usize,
            col: col.max(0) as usize,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl From<(usize, usize)> for Position {
    fn from((line, col): (usize, usize)) -> Self {
        Self { line, col }
    }
}

/// A span between two positions. Valid when `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    /// Whether the cell at `(line, col)` falls inside the range.
    ///
    /// Both boundary columns are inclusive, which is what selection
    /// highlighting needs.
    pub fn contains_cell(&self, line: usize, col: usize) -> bool {
        if line < self.start.line || line > self.end.line {
            return false;
        }
        if line == self.start.line && col < self.start.col {
            return false;
        }
        if line == self.end.line && col > self.end.col {
            return false;
        }
        true
    }
}
