//! Cursor and visible window over a [`GapBuffer`].
//!
//! The viewport owns the buffer and keeps a cache of the visible lines. The
//! cache is rebuilt after every edit and every scroll; moving the cursor
//! within the window leaves it alone. After each operation the buffer's gap
//! sits at the cursor, so the next edit does not have to move it.

use gap_buffer::{BufferError, DeleteDirection, GapBuffer, Position, Range};
use tracing::trace;

use super::render::char_cells;

/// Remembered column for vertical movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickyColumn {
    /// A concrete column, clamped to each destination line.
    Column(usize),
    /// Always the end of the destination line.
    LineEnd,
}

#[derive(Debug, Clone)]
pub struct Viewport {
    buffer: GapBuffer,
    /// `buffer.get_lines(line_offset, line_offset + height - 1)`.
    lines: Vec<Vec<char>>,
    cur_x: usize,
    cur_y: usize,
    line_offset: usize,
    sticky: Option<StickyColumn>,
    tabs_behind: usize,
    width: usize,
    height: usize,
    tab_width: usize,
}

impl Viewport {
    /// Wrap `buffer` with the cursor at the buffer start.
    pub fn new(buffer: GapBuffer, width: usize, height: usize, tab_width: usize) -> Self {
        let mut view = Self {
            buffer,
            lines: Vec::new(),
            cur_x: 0,
            cur_y: 0,
            line_offset: 0,
            sticky: None,
            tabs_behind: 0,
            width,
            height: height.max(1),
            tab_width: tab_width.max(1),
        };
        view.buffer.shift_gap(0);
        view.refresh();
        view
    }

    pub fn buffer(&self) -> &GapBuffer {
        &self.buffer
    }

    /// The cached visible lines, each with its newline except the buffer's
    /// last line.
    pub fn lines(&self) -> &[Vec<char>] {
        &self.lines
    }

    /// Cursor `(x, y)` within the window, in characters.
    pub fn cursor(&self) -> (usize, usize) {
        (self.cur_x, self.cur_y)
    }

    /// Cursor in absolute buffer coordinates.
    pub fn position(&self) -> Position {
        Position::new(self.abs_line(), self.cur_x)
    }

    /// Absolute index of the first visible line.
    pub fn line_offset(&self) -> usize {
        self.line_offset
    }

    pub fn sticky(&self) -> Option<StickyColumn> {
        self.sticky
    }

    pub fn tabs_behind(&self) -> usize {
        self.tabs_behind
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    /// Screen column of the cursor from the start of its line, with tabs
    /// expanded and wide characters counted by their display width.
    ///
    /// For single-width text this is `cur_x + tabs_behind * (tab_width - 1)`.
    pub fn cursor_column(&self) -> usize {
        let line = self.current_line();
        let before = &line[..self.cur_x.min(line.len())];
        let others: usize = before
            .iter()
            .filter(|&&c| c != '\t')
            .map(|&c| char_cells(c))
            .sum();
        others + self.tabs_behind * self.tab_width
    }

    /// Length of the cursor line without its newline.
    pub fn line_len(&self) -> usize {
        let line = self.current_line();
        match line.last() {
            Some('\n') => line.len() - 1,
            _ => line.len(),
        }
    }

    pub fn at_start_of_line(&self) -> bool {
        self.cur_x == 0
    }

    /// On interior lines the last column is the newline's; on the buffer's
    /// last line it is one past the final character.
    pub fn at_end_of_line(&self) -> bool {
        let raw_len = self.current_line().len();
        if self.is_last_line() {
            self.cur_x == raw_len
        } else {
            self.cur_x + 1 == raw_len
        }
    }

    pub fn at_start_of_file(&self) -> bool {
        self.cur_x == 0 && self.abs_line() == 0
    }

    pub fn at_end_of_file(&self) -> bool {
        self.is_last_line() && self.at_end_of_line()
    }

    /// Room to move down without scrolling.
    pub fn can_move_down(&self) -> bool {
        self.cur_y + 1 < self.height && self.cur_y + 1 < self.lines.len()
    }

    /// A buffer line exists below the cursor line.
    pub fn can_scroll_down(&self) -> bool {
        self.abs_line() + 1 < self.buffer.lines()
    }

    pub fn can_move_up(&self) -> bool {
        self.cur_y > 0
    }

    pub fn can_scroll_up(&self) -> bool {
        self.cur_y == 0 && self.line_offset > 0
    }

    pub fn move_down(&mut self) -> Result<(), BufferError> {
        if !self.can_move_down() && !self.can_scroll_down() {
            self.sticky = None;
            self.cur_x = self.line_len();
            self.tabs_behind = self.tabs_before_cursor();
            return self.sync_gap();
        }

        self.capture_sticky();
        if self.can_move_down() {
            self.cur_y += 1;
        } else {
            self.line_offset += 1;
            self.refresh();
        }
        self.apply_sticky();
        self.sync_gap()
    }

    pub fn move_up(&mut self) -> Result<(), BufferError> {
        if !self.can_move_up() && !self.can_scroll_up() {
            self.sticky = None;
            self.cur_x = 0;
            self.tabs_behind = 0;
            return self.sync_gap();
        }

        self.capture_sticky();
        if self.can_move_up() {
            self.cur_y -= 1;
        } else {
            self.line_offset -= 1;
            self.refresh();
        }
        self.apply_sticky();
        self.sync_gap()
    }

    pub fn move_left(&mut self) -> Result<(), BufferError> {
        self.sticky = None;
        if self.at_start_of_file() {
            return Ok(());
        }

        if self.at_start_of_line() {
            self.step_to_previous_line();
            self.cur_x = self.line_len();
            self.tabs_behind = self.tabs_before_cursor();
        } else {
            if self.buffer.peek_behind() == Some('\t') {
                self.tabs_behind = self.tabs_behind.saturating_sub(1);
            }
            self.cur_x -= 1;
        }
        self.sync_gap()
    }

    pub fn move_right(&mut self) -> Result<(), BufferError> {
        self.sticky = None;
        if self.at_end_of_file() {
            return Ok(());
        }

        if self.at_end_of_line() {
            if self.can_move_down() {
                self.cur_y += 1;
            } else {
                self.line_offset += 1;
                self.refresh();
            }
            self.cur_x = 0;
            self.tabs_behind = 0;
        } else {
            if self.buffer.peek_ahead() == Some('\t') {
                self.tabs_behind += 1;
            }
            self.cur_x += 1;
        }
        self.sync_gap()
    }

    pub fn move_to_line_start(&mut self) -> Result<(), BufferError> {
        self.sticky = None;
        self.cur_x = 0;
        self.tabs_behind = 0;
        self.sync_gap()
    }

    pub fn move_to_line_end(&mut self) -> Result<(), BufferError> {
        self.sticky = Some(StickyColumn::LineEnd);
        self.cur_x = self.line_len();
        self.tabs_behind = self.tabs_before_cursor();
        self.sync_gap()
    }

    /// Put the cursor at an absolute position, scrolling as little as
    /// possible to make its line visible.
    pub fn jump_to(&mut self, pos: Position) -> Result<(), BufferError> {
        let line = pos.line.min(self.buffer.lines() - 1);

        if line < self.line_offset {
            self.line_offset = line;
        } else if line >= self.line_offset + self.height {
            self.line_offset = line + 1 - self.height;
        }
        self.cur_y = line - self.line_offset;
        self.refresh();

        self.sticky = None;
        self.cur_x = pos.col.min(self.line_len());
        self.tabs_behind = self.tabs_before_cursor();
        self.sync_gap()
    }

    /// Change the window size, scrolling if the cursor would fall out of it.
    ///
    /// The line cache only depends on the height, so it is rebuilt only when
    /// the height changes.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        let height = height.max(1);
        if height == self.height {
            return;
        }

        self.height = height;
        if self.cur_y >= self.height {
            self.line_offset += self.cur_y + 1 - self.height;
            self.cur_y = self.height - 1;
        }
        self.refresh();
    }

    pub fn insert_char(&mut self, ch: char) -> Result<(), BufferError> {
        self.buffer.insert(ch, self.position())?;
        self.sticky = None;
        self.cur_x += 1;
        self.refresh();
        Ok(())
    }

    pub fn insert_tab(&mut self) -> Result<(), BufferError> {
        self.buffer.insert('\t', self.position())?;
        self.sticky = None;
        self.cur_x += 1;
        self.tabs_behind += 1;
        self.refresh();
        Ok(())
    }

    pub fn insert_newline(&mut self) -> Result<(), BufferError> {
        self.buffer.insert('\n', self.position())?;
        self.sticky = None;
        if self.cur_y + 1 < self.height {
            self.cur_y += 1;
        } else {
            self.line_offset += 1;
        }
        self.cur_x = 0;
        self.tabs_behind = 0;
        self.refresh();
        Ok(())
    }

    /// Backspace. Joining with the previous line leaves the cursor where the
    /// two lines meet.
    pub fn delete_backward(&mut self) -> Result<(), BufferError> {
        self.sticky = None;
        if self.at_start_of_file() {
            return Ok(());
        }

        match self.buffer.peek_behind() {
            Some('\n') => {
                let prev_len = self.buffer.line_length(self.abs_line() - 1);
                self.buffer.delete(DeleteDirection::Backward);
                self.step_to_previous_line();
                self.cur_x = prev_len;
                self.refresh();
                self.tabs_behind = self.tabs_before_cursor();
            }
            Some(ch) => {
                self.buffer.delete(DeleteDirection::Backward);
                if ch == '\t' {
                    self.tabs_behind = self.tabs_behind.saturating_sub(1);
                }
                self.cur_x -= 1;
                self.refresh();
            }
            None => {}
        }
        Ok(())
    }

    pub fn delete_forward(&mut self) -> Result<(), BufferError> {
        self.sticky = None;
        if self.at_end_of_file() {
            return Ok(());
        }

        self.buffer.delete(DeleteDirection::Forward);
        self.refresh();
        Ok(())
    }

    /// Remove `range` from the buffer and put the cursor at its start.
    pub fn delete_range(&mut self, range: Range) -> Result<Vec<char>, BufferError> {
        let removed = self.buffer.delete_range(range)?;
        self.jump_to(range.start)?;
        Ok(removed)
    }

    /// Re-query the visible lines from the buffer.
    pub fn refresh(&mut self) {
        let last = self.line_offset + self.height - 1;
        self.lines = self.buffer.get_lines(self.line_offset, last);
        trace!(
            first = self.line_offset,
            last,
            cached = self.lines.len(),
            "rebuilt visible lines"
        );
    }

    fn abs_line(&self) -> usize {
        self.cur_y + self.line_offset
    }

    fn is_last_line(&self) -> bool {
        self.abs_line() + 1 >= self.buffer.lines()
    }

    fn current_line(&self) -> &[char] {
        self.lines.get(self.cur_y).map(Vec::as_slice).unwrap_or(&[])
    }

    fn tabs_before_cursor(&self) -> usize {
        self.current_line()
            .iter()
            .take(self.cur_x)
            .filter(|&&c| c == '\t')
            .count()
    }

    /// Up one line, scrolling when the cursor is on the top row.
    fn step_to_previous_line(&mut self) {
        if self.can_move_up() {
            self.cur_y -= 1;
        } else {
            self.line_offset -= 1;
            self.refresh();
        }
    }

    fn capture_sticky(&mut self) {
        if self.sticky.is_none() {
            self.sticky = Some(if self.at_end_of_line() {
                StickyColumn::LineEnd
            } else {
                StickyColumn::Column(self.cur_x)
            });
        }
    }

    fn apply_sticky(&mut self) {
        let len = self.line_len();
        self.cur_x = match self.sticky {
            Some(StickyColumn::Column(col)) => col.min(len),
            Some(StickyColumn::LineEnd) | None => len,
        };
        self.tabs_behind = self.tabs_before_cursor();
    }

    fn sync_gap(&mut self) -> Result<(), BufferError> {
        let offset = self.buffer.find_offset(self.position())?;
        self.buffer.shift_gap(offset);
        Ok(())
    }
}
