//! Editing sessions driven through key events, the way the terminal host
//! drives the editor.

use std::cell::RefCell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use gap_buffer::Position;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use sqline::config::EditorConfig;
use sqline::editor::{BufferSink, Editor, EditorError};
use sqline::ui::Component;

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn type_text(editor: &mut Editor, text: &str) {
    for ch in text.chars() {
        let code = match ch {
            '\n' => KeyCode::Enter,
            '\t' => KeyCode::Tab,
            c => KeyCode::Char(c),
        };
        editor.handle_key(key(code)).unwrap();
    }
}

fn press(editor: &mut Editor, codes: &[KeyCode]) {
    for &code in codes {
        editor.handle_key(key(code)).unwrap();
    }
}

fn executed(editor: &mut Editor) -> Rc<RefCell<Vec<String>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    editor.set_executor(move |sql: &[char]| -> anyhow::Result<()> {
        sink.borrow_mut().push(sql.iter().collect());
        Ok(())
    });
    seen
}

fn render(editor: &Editor, area: Rect) -> (Buffer, Option<(u16, u16)>) {
    let mut buf = Buffer::empty(area);
    let cursor = {
        let mut sink = BufferSink::new(&mut buf);
        editor.render(&mut sink);
        sink.cursor()
    };
    (buf, cursor)
}

fn row(buf: &Buffer, y: u16) -> String {
    (0..buf.area.width)
        .map(|x| buf[(x, y)].symbol().to_string())
        .collect()
}

#[test]
fn test_type_then_run_second_statement() {
    let mut editor = Editor::new(&EditorConfig::default());
    editor.layout(Rect::new(0, 0, 40, 8));
    let seen = executed(&mut editor);

    press(&mut editor, &[KeyCode::Char('i')]);
    type_text(&mut editor, "SELECT 1;\nSELECT name\n  FROM users;");
    press(&mut editor, &[KeyCode::Esc]);

    // Select lines 2..3 linewise and run them.
    press(
        &mut editor,
        &[
            KeyCode::Char('k'),
            KeyCode::Char('V'),
            KeyCode::Char('j'),
            KeyCode::Enter,
        ],
    );

    assert!(editor.is_normal_mode());
    assert_eq!(*seen.borrow(), vec!["SELECT name\n  FROM users;".to_string()]);
}

#[test]
fn test_charwise_selection_runs_fragment() {
    let (mut editor, result) = Editor::open(b"SELECT now(); -- clock", &EditorConfig::default());
    result.unwrap();
    editor.layout(Rect::new(0, 0, 40, 5));
    let seen = executed(&mut editor);

    press(&mut editor, &[KeyCode::Char('v')]);
    for _ in 0..12 {
        press(&mut editor, &[KeyCode::Char('l')]);
    }
    press(&mut editor, &[KeyCode::Enter]);

    assert_eq!(*seen.borrow(), vec!["SELECT now();".to_string()]);
}

#[test]
fn test_delete_selected_lines() {
    let (mut editor, result) = Editor::open(b"one\ntwo\nthree", &EditorConfig::default());
    result.unwrap();
    editor.layout(Rect::new(0, 0, 20, 6));

    press(&mut editor, &[KeyCode::Char('j'), KeyCode::Char('V'), KeyCode::Char('d')]);
    assert_eq!(editor.text(), "one\nthree");
    assert!(editor.is_normal_mode());
    assert!(editor.is_modified());
}

#[test]
fn test_executor_error_is_returned_and_mode_resets() {
    let (mut editor, result) = Editor::open(b"SELECT 1", &EditorConfig::default());
    result.unwrap();
    editor.layout(Rect::new(0, 0, 20, 4));
    editor.set_executor(|_: &[char]| -> anyhow::Result<()> { anyhow::bail!("boom") });

    press(&mut editor, &[KeyCode::Char('V')]);
    let err = editor.handle_key(key(KeyCode::Enter)).unwrap_err();

    assert!(matches!(err, EditorError::Execute(_)));
    assert_eq!(err.to_string(), "boom");
    assert!(editor.is_normal_mode());
}

#[test]
fn test_scrolls_to_keep_cursor_visible() {
    let text: String = (1..=10).map(|i| format!("line {}\n", i)).collect();
    let (mut editor, result) = Editor::open(text.as_bytes(), &EditorConfig::default());
    result.unwrap();

    // Three visible lines inside the border.
    let area = Rect::new(0, 0, 12, 5);
    editor.layout(area);
    for _ in 0..5 {
        press(&mut editor, &[KeyCode::Char('j')]);
    }
    assert_eq!(editor.cursor_position(), Position::new(5, 0));

    let (buf, cursor) = render(&editor, area);
    assert_eq!(row(&buf, 1), " line 4     ");
    assert_eq!(row(&buf, 3), " line 6     ");
    assert_eq!(cursor, Some((1, 3)));
}

#[test]
fn test_render_expands_tabs() {
    let (mut editor, result) = Editor::open(b"\tx", &EditorConfig::default());
    result.unwrap();
    let area = Rect::new(0, 0, 10, 3);
    editor.layout(area);
    press(&mut editor, &[KeyCode::Char('l')]);

    let (buf, cursor) = render(&editor, area);
    assert_eq!(row(&buf, 1), "     x    ");
    assert_eq!(cursor, Some((5, 1)));
}
