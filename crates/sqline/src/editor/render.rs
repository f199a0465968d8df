//! Drawing surface for components.

use ratatui::buffer::Buffer;
use ratatui::style::Style;
use unicode_width::UnicodeWidthChar;

/// Where components put their cells.
///
/// Coordinates are absolute screen cells; writes outside the surface are
/// dropped.
pub trait RenderSink {
    fn set_cell(&mut self, x: u16, y: u16, ch: char, combining: &[char], style: Style);

    /// Request the terminal cursor at `(x, y)`.
    fn show_cursor_at(&mut self, x: u16, y: u16);
}

/// A [`RenderSink`] writing into a ratatui [`Buffer`].
///
/// The requested cursor position is only recorded; the host decides whether
/// to show it (typically with `Frame::set_cursor_position`).
pub struct BufferSink<'a> {
    buf: &'a mut Buffer,
    cursor: Option<(u16, u16)>,
}

impl<'a> BufferSink<'a> {
    pub fn new(buf: &'a mut Buffer) -> Self {
        Self { buf, cursor: None }
    }

    pub fn cursor(&self) -> Option<(u16, u16)> {
        self.cursor
    }
}

impl RenderSink for BufferSink<'_> {
    fn set_cell(&mut self, x: u16, y: u16, ch: char, combining: &[char], style: Style) {
        let Some(cell) = self.buf.cell_mut((x, y)) else {
            return;
        };

        if combining.is_empty() {
            cell.set_char(ch);
        } else {
            let mut symbol = String::with_capacity(4 * (combining.len() + 1));
            symbol.push(ch);
            symbol.extend(combining);
            cell.set_symbol(&symbol);
        }
        cell.set_style(style);
    }

    fn show_cursor_at(&mut self, x: u16, y: u16) {
        self.cursor = Some((x, y));
    }
}

/// Cells a buffer character other than a tab takes on screen.
///
/// Combining marks take none; control characters are drawn as one
/// replacement cell.
pub(crate) fn char_cells(ch: char) -> usize {
    ch.width().unwrap_or(1)
}

/// Draw `text` starting at `(x, y)`, using at most `max_width` cells.
///
/// Zero-width characters are attached to the preceding cell. Returns the
/// number of cells used.
pub fn draw_str(
    sink: &mut dyn RenderSink,
    x: u16,
    y: u16,
    text: &str,
    style: Style,
    max_width: u16,
) -> u16 {
    let mut used: u16 = 0;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        let width = ch.width().unwrap_or(0) as u16;
        if width == 0 {
            continue;
        }
        if used + width > max_width {
            break;
        }

        let mut combining = Vec::new();
        while let Some(&next) = chars.peek() {
            if next.width() != Some(0) {
                break;
            }
            combining.push(next);
            chars.next();
        }

        sink.set_cell(x + used, y, ch, &combining, style);
        // The trailing half of a wide character stays blank.
        for pad in 1..width {
            sink.set_cell(x + used + pad, y, ' ', &[], style);
        }
        used += width;
    }

    used
}
