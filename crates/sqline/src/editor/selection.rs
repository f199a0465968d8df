//! Visual selections and their normalization into buffer ranges.

use gap_buffer::{GapBuffer, Position, Range};

/// How a selection covers text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    /// Character by character (`v`).
    Charwise,
    /// Whole lines (`V`).
    Linewise,
}

/// Anchor and moving end of a visual selection, in absolute buffer
/// coordinates. Either may come first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: Position,
    pub end: Position,
}

impl SelectionKind {
    /// Whether the cell at `(line, col)` of `range` is drawn as selected.
    ///
    /// Linewise ranges end on the last line's newline cell, which extraction
    /// leaves out, so it is not highlighted either.
    pub fn highlights(self, range: Range, line: usize, col: usize) -> bool {
        if self == SelectionKind::Linewise && line == range.end.line && col == range.end.col {
            return false;
        }
        range.contains_cell(line, col)
    }
}

impl Selection {
    /// A linewise selection of `line`, whose content is `len` characters.
    pub fn line(line: usize, len: usize) -> Self {
        Self {
            anchor: Position::new(line, 0),
            end: Position::new(line, len),
        }
    }

    /// Ordered range covered by the selection, end cell inclusive.
    pub fn range(&self, kind: SelectionKind, buffer: &GapBuffer) -> Range {
        match kind {
            SelectionKind::Charwise => self.charwise(buffer),
            SelectionKind::Linewise => self.linewise(buffer),
        }
    }

    /// Range to hand to [`GapBuffer::get_text_in_range`], end exclusive.
    pub fn extraction_range(&self, kind: SelectionKind, buffer: &GapBuffer) -> Range {
        let range = self.range(kind, buffer);
        match kind {
            SelectionKind::Charwise => Range::new(
                range.start,
                Position::new(range.end.line, range.end.col + 1),
            ),
            SelectionKind::Linewise => range,
        }
    }

    /// Range to remove when the selection is deleted.
    ///
    /// Linewise deletion also takes a line terminator so no empty line is
    /// left behind.
    pub fn deletion_range(&self, kind: SelectionKind, buffer: &GapBuffer) -> Range {
        let range = self.extraction_range(kind, buffer);
        if kind == SelectionKind::Charwise {
            return range;
        }

        if range.end.line + 1 < buffer.lines() {
            Range::new(range.start, Position::new(range.end.line + 1, 0))
        } else if range.start.line > 0 {
            let prev = range.start.line - 1;
            Range::new(Position::new(prev, buffer.line_length(prev)), range.end)
        } else {
            range
        }
    }

    fn charwise(&self, buffer: &GapBuffer) -> Range {
        if self.anchor <= self.end {
            return Range::new(self.anchor, self.end);
        }

        // Selecting backwards: the anchor cell steps back by one.
        let mut end = self.anchor;
        if end.col > 0 {
            end.col -= 1;
        } else if end.line > 0 {
            end.line -= 1;
            end.col = buffer.line_length(end.line);
        }
        Range::new(self.end, end)
    }

    fn linewise(&self, buffer: &GapBuffer) -> Range {
        let first = self.anchor.line.min(self.end.line);
        let last = self.anchor.line.max(self.end.line);
        Range::new(
            Position::new(first, 0),
            Position::new(last, buffer.line_length(last)),
        )
    }
}
