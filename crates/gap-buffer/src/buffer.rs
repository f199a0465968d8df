//! The gap buffer itself.
//!
//! Storage is `buf[..gap_start] ++ gap ++ buf[gap_start + gap_len..]`. All
//! public offsets are logical (they ignore the gap), so callers never see
//! where the gap currently sits. Reads walk the two segments as one chained
//! iterator, which is how a line that straddles the gap comes back whole.

use std::fmt;

use tracing::{debug, trace};

use crate::error::BufferError;
use crate::position::{Position, Range};

/// Sentinel stored in gap cells.
const GAP: char = '\0';

/// Smallest amount the gap grows by when it runs out.
const MIN_GROWTH: usize = 64;

/// Which side of the gap a deletion removes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteDirection {
    /// The character before the gap (backspace).
    Backward,
    /// The character after the gap (delete).
    Forward,
}

/// A character store with a movable gap at the edit point.
#[derive(Debug, Clone)]
pub struct GapBuffer {
    buf: Vec<char>,
    gap_start: usize,
    gap_len: usize,
    /// Newlines in the logical content, plus one.
    line_count: usize,
    growth: usize,
}

impl GapBuffer {
    /// Create an empty buffer whose gap can take `gap_capacity` characters
    /// before the first reallocation.
    pub fn new(gap_capacity: usize) -> Self {
        Self {
            buf: vec![GAP; gap_capacity],
            gap_start: 0,
            gap_len: gap_capacity,
            line_count: 1,
            growth: gap_capacity.max(MIN_GROWTH),
        }
    }

    /// Create a buffer holding `text`, with the gap in front of it.
    ///
    /// A single trailing newline is treated as the terminator of the last
    /// line and is not stored.
    pub fn from_bytes(text: &[u8], gap_capacity: usize) -> Result<Self, BufferError> {
        let text = std::str::from_utf8(text).map_err(|e| {
            debug!(valid_up_to = e.valid_up_to(), "rejecting non UTF-8 input");
            BufferError::NonUtf8
        })?;
        let text = text.strip_suffix('\n').unwrap_or(text);

        let mut buf = vec![GAP; gap_capacity];
        buf.extend(text.chars());
        let line_count = buf[gap_capacity..].iter().filter(|&&c| c == '\n').count() + 1;

        Ok(Self {
            buf,
            gap_start: 0,
            gap_len: gap_capacity,
            line_count,
            growth: gap_capacity.max(MIN_GROWTH),
        })
    }

    /// Like [`from_bytes`](Self::from_bytes), but always hands back a usable
    /// buffer: on invalid input the buffer is empty and the error is returned
    /// alongside it.
    pub fn create(text: &[u8], gap_capacity: usize) -> (Self, Result<(), BufferError>) {
        match Self::from_bytes(text, gap_capacity) {
            Ok(buf) => (buf, Ok(())),
            Err(e) => (Self::new(gap_capacity), Err(e)),
        }
    }

    /// Number of characters of logical content.
    pub fn len(&self) -> usize {
        self.buf.len() - self.gap_len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of lines (newlines + 1).
    pub fn lines(&self) -> usize {
        self.line_count
    }

    /// Logical offset the gap currently sits at.
    pub fn gap_position(&self) -> usize {
        self.gap_start
    }

    /// Total allocated cells, content and gap together.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Iterate the logical content.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.buf[..self.gap_start]
            .iter()
            .chain(self.buf[self.gap_end()..].iter())
            .copied()
    }

    /// Insert `ch` at `at`, moving the gap there first.
    ///
    /// `at` is clamped the same way as [`find_offset`](Self::find_offset).
    pub fn insert(&mut self, ch: char, at: Position) -> Result<(), BufferError> {
        let offset = self.find_offset(at)?;

        if self.gap_len == 0 {
            self.grow();
        }
        self.shift_gap(offset);

        self.buf[self.gap_start] = ch;
        self.gap_start += 1;
        self.gap_len -= 1;

        if ch == '\n' {
            self.line_count += 1;
        }
        Ok(())
    }

    /// Insert a raw code point, rejecting values that are not Unicode scalars.
    pub fn insert_code_point(&mut self, code_point: u32, at: Position) -> Result<(), BufferError> {
        let ch = char::from_u32(code_point).ok_or(BufferError::NonUtf8)?;
        self.insert(ch, at)
    }

    /// Remove the character next to the gap. Returns what was removed.
    pub fn delete(&mut self, direction: DeleteDirection) -> Option<char> {
        let removed = match direction {
            DeleteDirection::Backward => {
                if self.gap_start == 0 {
                    return None;
                }
                self.gap_start -= 1;
                std::mem::replace(&mut self.buf[self.gap_start], GAP)
            }
            DeleteDirection::Forward => {
                let gap_end = self.gap_end();
                if gap_end >= self.buf.len() {
                    return None;
                }
                std::mem::replace(&mut self.buf[gap_end], GAP)
            }
        };
        self.gap_len += 1;

        if removed == '\n' {
            self.line_count -= 1;
        }
        Some(removed)
    }

    /// Remove `[range.start, range.end)` and return the removed characters.
    ///
    /// Positions clamp like [`get_text_in_range`](Self::get_text_in_range),
    /// so an end column past the line's content swallows its newline. The gap
    /// is left at the start of the range.
    pub fn delete_range(&mut self, range: Range) -> Result<Vec<char>, BufferError> {
        if !range.is_valid() {
            return Err(BufferError::InvalidRange {
                start: range.start,
                end: range.end,
            });
        }

        let start = self.range_offset(range.start)?;
        let end = self.range_offset(range.end)?;
        self.shift_gap(start);

        let gap_end = self.gap_end();
        let removed = self.buf[gap_end..gap_end + (end - start)].to_vec();
        self.buf[gap_end..gap_end + removed.len()].fill(GAP);
        self.gap_len += removed.len();
        self.line_count -= removed.iter().filter(|&&c| c == '\n').count();

        Ok(removed)
    }

    /// Move the gap to the logical `offset` (clamped to the content length).
    ///
    /// Only the characters between the old and the new gap position are
    /// copied.
    pub fn shift_gap(&mut self, offset: usize) {
        let offset = offset.min(self.len());
        let gap_end = self.gap_end();

        if offset < self.gap_start {
            let shift = self.gap_start - offset;
            self.buf.copy_within(offset..self.gap_start, gap_end - shift);
            let stale = shift.min(self.gap_len);
            self.buf[offset..offset + stale].fill(GAP);
        } else if offset > self.gap_start {
            let shift = offset - self.gap_start;
            self.buf.copy_within(gap_end..gap_end + shift, self.gap_start);
            let stale_from = gap_end.max(self.gap_start + shift);
            self.buf[stale_from..gap_end + shift].fill(GAP);
        }

        self.gap_start = offset;
    }

    /// Resolve a position to a logical offset.
    ///
    /// A line past the last clamps to the end of the buffer; a column past
    /// the line's content clamps to the end of that line, before its newline.
    pub fn find_offset(&self, pos: Position) -> Result<usize, BufferError> {
        if pos.line >= self.line_count {
            return Ok(self.len());
        }

        let start = self
            .line_start(pos.line)
            .ok_or(BufferError::OutOfBounds(pos))?;
        Ok(start + pos.col.min(self.content_len_from(start)))
    }

    /// Lines `start_line..=end_line`, each with its trailing newline except
    /// the last line of the buffer.
    ///
    /// Both bounds clamp to the existing lines.
    pub fn get_lines(&self, start_line: usize, end_line: usize) -> Vec<Vec<char>> {
        if start_line > end_line {
            return Vec::new();
        }

        let last = self.line_count - 1;
        let (start, end) = (start_line.min(last), end_line.min(last));
        let Some(offset) = self.line_start(start) else {
            return Vec::new();
        };

        let mut lines = Vec::with_capacity(end - start + 1);
        let mut current = Vec::new();
        for ch in self.chars().skip(offset) {
            current.push(ch);
            if ch == '\n' {
                lines.push(std::mem::take(&mut current));
                if start + lines.len() > end {
                    return lines;
                }
            }
        }
        lines.push(current);
        lines
    }

    /// Text between `start` and `end`, the end column exclusive.
    ///
    /// Lines past the last clamp to the whole last line, and columns clamp to
    /// the line's full length including its newline.
    pub fn get_text_in_range(&self, start: Position, end: Position) -> Result<Vec<char>, BufferError> {
        if end < start {
            return Err(BufferError::InvalidRange { start, end });
        }

        let (start, end) = (self.clamp_line(start), self.clamp_line(end));
        let lines = self.get_lines(start.line, end.line);
        let (Some(first), Some(last)) = (lines.first(), lines.last()) else {
            return Ok(Vec::new());
        };

        if lines.len() == 1 {
            let from = start.col.min(first.len());
            let to = end.col.min(first.len()).max(from);
            return Ok(first[from..to].to_vec());
        }

        let mut text = Vec::new();
        text.extend_from_slice(&first[start.col.min(first.len())..]);
        for line in &lines[1..lines.len() - 1] {
            text.extend_from_slice(line);
        }
        text.extend_from_slice(&last[..end.col.min(last.len())]);
        Ok(text)
    }

    /// Character just before the gap.
    pub fn peek_behind(&self) -> Option<char> {
        self.gap_start.checked_sub(1).map(|i| self.buf[i])
    }

    /// Character just after the gap.
    pub fn peek_ahead(&self) -> Option<char> {
        self.buf.get(self.gap_end()).copied()
    }

    /// Tabs between the last newline before the gap and the gap.
    pub fn tabs_behind(&self) -> usize {
        self.buf[..self.gap_start]
            .iter()
            .rev()
            .take_while(|&&c| c != '\n')
            .filter(|&&c| c == '\t')
            .count()
    }

    /// Length of `line` without its newline; 0 for lines that do not exist.
    pub fn line_length(&self, line: usize) -> usize {
        self.line_start(line)
            .map(|start| self.content_len_from(start))
            .unwrap_or(0)
    }

    fn gap_end(&self) -> usize {
        self.gap_start + self.gap_len
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        if offset < self.gap_start {
            Some(self.buf[offset])
        } else {
            self.buf.get(offset + self.gap_len).copied()
        }
    }

    fn line_start(&self, line: usize) -> Option<usize> {
        if line == 0 {
            return Some(0);
        }

        let mut seen = 0;
        for (i, ch) in self.chars().enumerate() {
            if ch == '\n' {
                seen += 1;
                if seen == line {
                    return Some(i + 1);
                }
            }
        }
        None
    }

    fn content_len_from(&self, start: usize) -> usize {
        (start..self.len())
            .take_while(|&i| self.char_at(i) != Some('\n'))
            .count()
    }

    fn clamp_line(&self, pos: Position) -> Position {
        if pos.line >= self.line_count {
            Position::new(self.line_count - 1, usize::MAX)
        } else {
            pos
        }
    }

    /// Offset for range positions: the column may reach past the newline.
    fn range_offset(&self, pos: Position) -> Result<usize, BufferError> {
        if pos.line >= self.line_count {
            return Ok(self.len());
        }

        let start = self
            .line_start(pos.line)
            .ok_or(BufferError::OutOfBounds(pos))?;
        let mut raw_len = self.content_len_from(start);
        if pos.line + 1 < self.line_count {
            raw_len += 1;
        }
        Ok(start + pos.col.min(raw_len))
    }

    fn grow(&mut self) {
        let extra = self.growth.max(self.len());
        let gap_end = self.gap_end();

        let mut buf = Vec::with_capacity(self.buf.len() + extra);
        buf.extend_from_slice(&self.buf[..self.gap_start]);
        buf.resize(gap_end + extra, GAP);
        buf.extend_from_slice(&self.buf[gap_end..]);

        trace!(from = self.buf.len(), to = buf.len(), "growing gap buffer");
        self.buf = buf;
        self.gap_len += extra;
    }
}

impl Default for GapBuffer {
    fn default() -> Self {
        Self::new(MIN_GROWTH)
    }
}

impl fmt::Display for GapBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;
        for ch in self.chars() {
            f.write_char(ch)?;
        }
        Ok(())
    }
}
