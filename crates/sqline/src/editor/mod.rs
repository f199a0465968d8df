//! The query editor: a gap buffer behind a vim-style cursor.
//!
//! [`Editor`] ties together the [`Viewport`] (cursor, scrolling, visible
//! lines), the current [`VimMode`] and an optional [`SqlExecutor`] that
//! receives the text of a visual selection when the user runs it.

mod render;
mod selection;
mod viewport;

pub use render::{draw_str, BufferSink, RenderSink};
pub use selection::{Selection, SelectionKind};
pub use viewport::{StickyColumn, Viewport};

use render::char_cells;

use crossterm::event::KeyEvent;
use gap_buffer::{BufferError, GapBuffer, Position};
use ratatui::layout::{Margin, Rect};
use ratatui::style::{Color, Style};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::EditorConfig;
use crate::ui::Component;
use crate::vim::{Motion, VimCommand, VimHandler, VimMode};

const SELECTION_STYLE: Style = Style::new().bg(Color::Blue);

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Buffer(#[from] BufferError),
    /// The SQL executor rejected the selection.
    #[error(transparent)]
    Execute(#[from] anyhow::Error),
}

/// Receives selected SQL for execution.
///
/// Implemented for any `FnMut(&[char]) -> anyhow::Result<()>`.
pub trait SqlExecutor {
    fn execute(&mut self, sql: &[char]) -> anyhow::Result<()>;
}

impl<F> SqlExecutor for F
where
    F: FnMut(&[char]) -> anyhow::Result<()>,
{
    fn execute(&mut self, sql: &[char]) -> anyhow::Result<()> {
        self(sql)
    }
}

pub struct Editor {
    view: Viewport,
    mode: VimMode,
    handler: VimHandler,
    executor: Option<Box<dyn SqlExecutor>>,
    area: Rect,
    modified: bool,
}

impl Editor {
    /// An empty editor.
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_buffer(GapBuffer::new(config.gap_capacity), config)
    }

    /// An editor preloaded with `text`.
    ///
    /// Text that is not UTF-8 is reported, and the editor starts empty.
    pub fn open(text: &[u8], config: &EditorConfig) -> (Self, Result<(), BufferError>) {
        let (buffer, result) = GapBuffer::create(text, config.gap_capacity);
        if let Err(e) = &result {
            warn!(error = %e, bytes = text.len(), "initial text rejected");
        }
        (Self::with_buffer(buffer, config), result)
    }

    fn with_buffer(buffer: GapBuffer, config: &EditorConfig) -> Self {
        Self {
            view: Viewport::new(buffer, 0, 1, config.tab_width),
            mode: VimMode::Normal,
            handler: VimHandler::new(),
            executor: None,
            area: Rect::default(),
            modified: false,
        }
    }

    pub fn set_executor(&mut self, executor: impl SqlExecutor + 'static) {
        self.executor = Some(Box::new(executor));
    }

    pub fn clear_executor(&mut self) {
        self.executor = None;
    }

    pub fn has_executor(&self) -> bool {
        self.executor.is_some()
    }

    pub fn mode(&self) -> &VimMode {
        &self.mode
    }

    pub fn is_normal_mode(&self) -> bool {
        self.mode.is_normal()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.view
    }

    /// Cursor in absolute buffer coordinates.
    pub fn cursor_position(&self) -> Position {
        self.view.position()
    }

    /// Full buffer content.
    pub fn text(&self) -> String {
        self.view.buffer().to_string()
    }

    /// Whether the buffer changed since the editor was created.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Outer area including the border the host draws.
    pub fn bounds(&self) -> Rect {
        self.area
    }

    /// Area inside the border where text goes.
    pub fn content_area(&self) -> Rect {
        self.area.inner(Margin::new(1, 1))
    }

    /// Dispatch a key through the vim bindings for the current mode.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<(), EditorError> {
        let command = self.handler.handle_key(key, &self.mode);
        self.apply(command)
    }

    /// Carry out a command against the buffer, cursor and mode.
    pub fn apply(&mut self, command: VimCommand) -> Result<(), EditorError> {
        match command {
            VimCommand::None => return Ok(()),
            VimCommand::Move(motion) => {
                self.apply_motion(motion)?;
                self.track_selection();
            }
            VimCommand::EnterInsert => self.mode = VimMode::Insert,
            VimCommand::ExitInsert | VimCommand::CancelVisual => self.mode = VimMode::Normal,
            VimCommand::StartVisual => {
                let cursor = self.view.position();
                let anchor = self.anchor_or(cursor);
                self.mode = VimMode::Visual(Selection {
                    anchor,
                    end: cursor,
                });
            }
            VimCommand::StartVisualLine => {
                let cursor = self.view.position();
                let line = Selection::line(cursor.line, self.view.line_len());
                let anchor = self.anchor_or(line.anchor);
                self.mode = VimMode::VisualLine(Selection {
                    anchor,
                    end: line.end,
                });
            }
            VimCommand::ExecuteSelection => {
                let text = self.selected_text()?;
                self.mode = VimMode::Normal;
                if let Some(text) = text {
                    self.run_executor(&text)?;
                }
            }
            VimCommand::DeleteSelection => self.delete_selection()?,
            VimCommand::InsertChar(ch) => self.view.insert_char(ch)?,
            VimCommand::InsertTab => self.view.insert_tab()?,
            VimCommand::InsertNewline => self.view.insert_newline()?,
            VimCommand::DeleteBackward => self.view.delete_backward()?,
            VimCommand::DeleteForward => self.view.delete_forward()?,
        }

        if command.edits_buffer() {
            self.modified = true;
        }
        Ok(())
    }

    /// Text of the current visual selection, if there is one.
    pub fn selected_text(&self) -> Result<Option<Vec<char>>, EditorError> {
        let Some((selection, kind)) = self.mode.selection() else {
            return Ok(None);
        };

        let range = selection.extraction_range(kind, self.view.buffer());
        match self.view.buffer().get_text_in_range(range.start, range.end) {
            Ok(text) => Ok(Some(text)),
            Err(BufferError::InvalidRange { start, end }) => {
                debug!(%start, %end, "ignoring inverted selection");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn apply_motion(&mut self, motion: Motion) -> Result<(), BufferError> {
        match motion {
            Motion::Up => self.view.move_up(),
            Motion::Down => self.view.move_down(),
            Motion::Left => self.view.move_left(),
            Motion::Right => self.view.move_right(),
            Motion::LineStart => self.view.move_to_line_start(),
            Motion::LineEnd => self.view.move_to_line_end(),
        }
    }

    fn anchor_or(&self, fallback: Position) -> Position {
        self.mode
            .selection()
            .map(|(selection, _)| selection.anchor)
            .unwrap_or(fallback)
    }

    /// Visual modes follow the cursor with the selection end.
    fn track_selection(&mut self) {
        let cursor = self.view.position();
        match &mut self.mode {
            VimMode::Visual(selection) => selection.end = cursor,
            VimMode::VisualLine(selection) => {
                selection.end = Position::new(cursor.line, self.view.line_len());
            }
            VimMode::Normal | VimMode::Insert => {}
        }
    }

    fn delete_selection(&mut self) -> Result<(), EditorError> {
        let Some((selection, kind)) = self.mode.selection() else {
            return Ok(());
        };

        let range = selection.deletion_range(kind, self.view.buffer());
        self.mode = VimMode::Normal;
        let removed = self.view.delete_range(range)?;
        debug!(removed = removed.len(), start = %range.start, "deleted selection");
        Ok(())
    }

    fn run_executor(&mut self, sql: &[char]) -> Result<(), EditorError> {
        match self.executor.as_mut() {
            Some(executor) => executor.execute(sql).map_err(EditorError::Execute),
            None => {
                warn!(chars = sql.len(), "no SQL executor installed, selection dropped");
                Ok(())
            }
        }
    }
}

impl Component for Editor {
    fn layout(&mut self, area: Rect) {
        self.area = area;
        let inner = self.content_area();
        self.view
            .resize(inner.width as usize, inner.height as usize);
    }

    fn render(&self, sink: &mut dyn RenderSink) {
        let inner = self.content_area();
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let highlight = self
            .mode
            .selection()
            .map(|(selection, kind)| (selection.range(kind, self.view.buffer()), kind));
        let width = inner.width as usize;
        let tab_width = self.view.tab_width();

        // Lines are not wrapped: the window shifts right just far enough to
        // keep the cursor cell visible.
        let cursor_col = self.view.cursor_column();
        let left = cursor_col.saturating_sub(width - 1);

        let rows = self.view.lines().iter().take(inner.height as usize);
        for (row, line) in rows.enumerate() {
            let y = inner.y + row as u16;
            let abs_line = self.view.line_offset() + row;
            let mut start = 0;
            let mut i = 0;

            while i < line.len() && start < left + width {
                let ch = line[i];
                let selected =
                    highlight.is_some_and(|(range, kind)| kind.highlights(range, abs_line, i));
                let style = if selected {
                    SELECTION_STYLE
                } else {
                    Style::default()
                };

                let combining: Vec<char> = line[i + 1..]
                    .iter()
                    .take_while(|&&c| char_cells(c) == 0)
                    .copied()
                    .collect();
                let consumed = 1 + combining.len();

                // A selected newline shows as one highlighted blank.
                let (glyph, cells) = match ch {
                    '\t' => (' ', tab_width),
                    '\n' if selected => (' ', 1),
                    '\n' => break,
                    c if char_cells(c) == 0 => {
                        i += consumed;
                        continue;
                    }
                    c if c.is_control() => (char::REPLACEMENT_CHARACTER, 1),
                    c => (c, char_cells(c)),
                };

                // A glyph cut by either edge is drawn as blanks.
                let fits = start >= left && start + cells <= left + width;
                for cell in start..start + cells {
                    if cell < left || cell >= left + width {
                        continue;
                    }
                    let x = inner.x + (cell - left) as u16;
                    if cell == start && fits {
                        sink.set_cell(x, y, glyph, &combining, style);
                    } else {
                        sink.set_cell(x, y, ' ', &[], style);
                    }
                }

                start += cells;
                i += consumed;
            }
        }

        let (_, row) = self.view.cursor();
        sink.show_cursor_at(
            inner.x + (cursor_col - left) as u16,
            inner.y + row as u16,
        );
    }

    fn handle_input(&mut self, key: KeyEvent) -> anyhow::Result<()> {
        Ok(self.handle_key(key)?)
    }

    fn clean_up(&mut self) {
        self.clear_executor();
        self.mode = VimMode::Normal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::buffer::Buffer;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn editor(text: &str) -> Editor {
        let (mut editor, result) = Editor::open(text.as_bytes(), &EditorConfig::default());
        result.unwrap();
        editor.layout(Rect::new(0, 0, 22, 7));
        editor
    }

    fn press(editor: &mut Editor, codes: &[KeyCode]) {
        for &code in codes {
            editor.handle_key(key(code)).unwrap();
        }
    }

    fn capture(editor: &mut Editor) -> Rc<RefCell<Vec<String>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        editor.set_executor(move |sql: &[char]| -> anyhow::Result<()> {
            sink.borrow_mut().push(sql.iter().collect());
            Ok(())
        });
        seen
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_open_rejects_invalid_utf8() {
        let (editor, result) = Editor::open(&[b'a', 0xC3], &EditorConfig::default());
        assert_eq!(result, Err(BufferError::NonUtf8));
        assert_eq!(editor.text(), "");
    }

    #[test]
    fn test_layout_sizes_viewport_inside_border() {
        let editor = editor("select 1");
        assert_eq!(editor.content_area(), Rect::new(1, 1, 20, 5));
        assert_eq!(editor.viewport().height(), 5);
        assert_eq!(editor.viewport().width(), 20);
    }

    #[test]
    fn test_insert_and_exit() {
        let mut editor = editor("");
        press(&mut editor, &[KeyCode::Char('i')]);
        assert!(editor.mode().is_insert());

        press(
            &mut editor,
            &[
                KeyCode::Char('s'),
                KeyCode::Char('e'),
                KeyCode::Enter,
                KeyCode::Tab,
                KeyCode::Char('l'),
            ],
        );
        press(&mut editor, &[KeyCode::Esc]);

        assert!(editor.is_normal_mode());
        assert_eq!(editor.text(), "se\n\tl");
        assert_eq!(editor.cursor_position(), Position::new(1, 2));
        assert!(editor.is_modified());
    }

    #[test]
    fn test_letters_are_motions_in_normal_mode() {
        let mut editor = editor("ab\ncd");
        press(&mut editor, &[KeyCode::Char('l'), KeyCode::Char('j')]);
        assert_eq!(editor.cursor_position(), Position::new(1, 1));
        assert_eq!(editor.text(), "ab\ncd");
        assert!(!editor.is_modified());
    }

    #[test]
    fn test_visual_execute_sends_inclusive_selection() {
        let mut editor = editor("select 1;\nselect 2;");
        let seen = capture(&mut editor);

        press(&mut editor, &[KeyCode::Char('v'), KeyCode::Char('$')]);
        assert_eq!(
            editor.mode(),
            &VimMode::Visual(Selection {
                anchor: Position::new(0, 0),
                end: Position::new(0, 9),
            })
        );

        press(&mut editor, &[KeyCode::Left, KeyCode::Enter]);
        assert!(editor.is_normal_mode());
        assert_eq!(seen.borrow().as_slice(), ["select 1;"]);
    }

    #[test]
    fn test_visual_line_execute_sends_whole_lines() {
        let mut editor = editor("select *\nfrom t\nwhere x = 1");
        let seen = capture(&mut editor);

        press(
            &mut editor,
            &[KeyCode::Char('l'), KeyCode::Char('V'), KeyCode::Char('j')],
        );
        press(&mut editor, &[KeyCode::Enter]);

        assert_eq!(seen.borrow().as_slice(), ["select *\nfrom t"]);
    }

    #[test]
    fn test_backward_visual_selection() {
        let mut editor = editor("abcdef");
        let seen = capture(&mut editor);

        press(&mut editor, &[KeyCode::Char('$'), KeyCode::Left, KeyCode::Char('v')]);
        press(&mut editor, &[KeyCode::Left, KeyCode::Left, KeyCode::Enter]);

        // The anchor cell itself is not part of a backward selection.
        assert_eq!(seen.borrow().as_slice(), ["de"]);
    }

    #[test]
    fn test_executor_error_is_returned_and_mode_resets() {
        let mut editor = editor("select broken");
        editor.set_executor(|_: &[char]| -> anyhow::Result<()> {
            Err(anyhow::anyhow!("not connected"))
        });

        press(&mut editor, &[KeyCode::Char('v')]);
        let err = editor.handle_key(key(KeyCode::Enter)).unwrap_err();

        assert!(matches!(err, EditorError::Execute(_)));
        assert_eq!(err.to_string(), "not connected");
        assert!(editor.is_normal_mode());
    }

    #[test]
    fn test_execute_without_executor_is_ignored() {
        let mut editor = editor("select 1");
        press(&mut editor, &[KeyCode::Char('v'), KeyCode::Enter]);
        assert!(editor.is_normal_mode());
        assert!(!editor.has_executor());
    }

    #[test]
    fn test_escape_drops_selection() {
        let mut editor = editor("abc");
        press(&mut editor, &[KeyCode::Char('v'), KeyCode::Char('l')]);
        assert!(editor.mode().is_visual());

        press(&mut editor, &[KeyCode::Esc]);
        assert_eq!(editor.mode(), &VimMode::Normal);
        assert_eq!(editor.selected_text().unwrap(), None);
    }

    #[test]
    fn test_visual_delete() {
        let mut editor = editor("select id, name from t");
        press(&mut editor, &[KeyCode::Char('l')]);
        for _ in 0..8 {
            press(&mut editor, &[KeyCode::Char('l')]);
        }
        press(&mut editor, &[KeyCode::Char('v')]);
        for _ in 0..5 {
            press(&mut editor, &[KeyCode::Char('l')]);
        }
        press(&mut editor, &[KeyCode::Char('d')]);

        assert_eq!(editor.text(), "select id from t");
        assert_eq!(editor.cursor_position(), Position::new(0, 9));
        assert!(editor.is_normal_mode());
        assert!(editor.is_modified());
    }

    #[test]
    fn test_visual_line_delete() {
        let mut editor = editor("one\ntwo\nthree");
        press(&mut editor, &[KeyCode::Char('j'), KeyCode::Char('V'), KeyCode::Char('x')]);

        assert_eq!(editor.text(), "one\nthree");
        assert_eq!(editor.cursor_position(), Position::new(1, 0));
    }

    #[test]
    fn test_render_draws_text_selection_and_cursor() {
        let mut editor = editor("ab\tc\nxyz");
        press(&mut editor, &[KeyCode::Char('j'), KeyCode::Char('v'), KeyCode::Char('l')]);

        let mut buf = Buffer::empty(Rect::new(0, 0, 22, 7));
        let mut sink = BufferSink::new(&mut buf);
        editor.render(&mut sink);
        let cursor = sink.cursor();

        assert_eq!(&row(&buf, 1)[1..9], "ab    c ");
        assert_eq!(&row(&buf, 2)[1..5], "xyz ");
        assert_eq!(buf[(1, 2)].bg, Color::Blue);
        assert_eq!(buf[(2, 2)].bg, Color::Blue);
        assert_eq!(buf[(3, 2)].bg, Color::Reset);
        assert_eq!(cursor, Some((2, 2)));
    }

    #[test]
    fn test_render_cursor_accounts_for_tabs() {
        let mut editor = editor("\t\tx");
        press(&mut editor, &[KeyCode::Char('$')]);

        let mut buf = Buffer::empty(Rect::new(0, 0, 22, 7));
        let mut sink = BufferSink::new(&mut buf);
        editor.render(&mut sink);

        assert_eq!(sink.cursor(), Some((1 + 3 + 2 * 3, 1)));
    }

    #[test]
    fn test_render_wide_chars_take_two_cells() {
        let mut editor = editor("日本x");
        press(&mut editor, &[KeyCode::Char('l'), KeyCode::Char('l')]);

        let mut buf = Buffer::empty(Rect::new(0, 0, 22, 7));
        let mut sink = BufferSink::new(&mut buf);
        editor.render(&mut sink);

        assert_eq!(sink.cursor(), Some((1 + 4, 1)));
        assert_eq!(buf[(1, 1)].symbol(), "日");
        assert_eq!(buf[(3, 1)].symbol(), "本");
        assert_eq!(buf[(5, 1)].symbol(), "x");
    }

    #[test]
    fn test_render_scrolls_long_line_to_cursor() {
        // 20 columns inside the border.
        let mut editor = editor("");
        press(&mut editor, &[KeyCode::Char('i')]);
        for ch in "abcdefghijklmnopqrstuvwxy".chars() {
            press(&mut editor, &[KeyCode::Char(ch)]);
        }

        let mut buf = Buffer::empty(Rect::new(0, 0, 22, 7));
        let mut sink = BufferSink::new(&mut buf);
        editor.render(&mut sink);

        assert_eq!(sink.cursor(), Some((20, 1)));
        assert_eq!(&row(&buf, 1)[1..21], "ghijklmnopqrstuvwxy ");

        press(&mut editor, &[KeyCode::Home]);
        let mut buf = Buffer::empty(Rect::new(0, 0, 22, 7));
        let mut sink = BufferSink::new(&mut buf);
        editor.render(&mut sink);

        assert_eq!(sink.cursor(), Some((1, 1)));
        assert_eq!(&row(&buf, 1)[1..21], "abcdefghijklmnopqrst");
    }

    #[test]
    fn test_render_visual_line_leaves_final_newline_plain() {
        let mut editor = editor("ab\ncd");
        press(&mut editor, &[KeyCode::Char('V')]);

        let mut buf = Buffer::empty(Rect::new(0, 0, 22, 7));
        let mut sink = BufferSink::new(&mut buf);
        editor.render(&mut sink);

        assert_eq!(buf[(2, 1)].bg, Color::Blue);
        assert_eq!(buf[(3, 1)].bg, Color::Reset);
    }

    #[test]
    fn test_clean_up_removes_executor() {
        let mut editor = editor("x");
        let _seen = capture(&mut editor);
        assert!(editor.has_executor());

        editor.clean_up();
        assert!(!editor.has_executor());
    }
}
