//! Vim key event handler.
//!
//! Converts key events into [`VimCommand`]s for Normal, Insert, Visual and
//! VisualLine modes. Arrow keys, Home and End work in every mode; the letter
//! motions only outside Insert.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::command::{Motion, VimCommand};
use super::mode::VimMode;

/// Vim key event handler.
///
/// Stateless: every binding is a single key, so the result depends only on
/// the key and the mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct VimHandler;

impl VimHandler {
    pub fn new() -> Self {
        Self
    }

    /// Handle a key event in the given mode.
    pub fn handle_key(&self, key: KeyEvent, mode: &VimMode) -> VimCommand {
        match mode {
            VimMode::Normal => self.handle_normal_mode(key),
            VimMode::Insert => self.handle_insert_mode(key),
            VimMode::Visual(_) => self.handle_visual_mode(key, false),
            VimMode::VisualLine(_) => self.handle_visual_mode(key, true),
        }
    }

    fn handle_normal_mode(&self, key: KeyEvent) -> VimCommand {
        if let Some(motion) = navigation_key(key).or_else(|| letter_motion(key)) {
            return VimCommand::Move(motion);
        }

        match (key.code, key.modifiers) {
            (KeyCode::Char('i'), KeyModifiers::NONE) => VimCommand::EnterInsert,
            (KeyCode::Char('v'), KeyModifiers::NONE) => VimCommand::StartVisual,
            (KeyCode::Char('V'), KeyModifiers::SHIFT | KeyModifiers::NONE) => {
                VimCommand::StartVisualLine
            }
            _ => VimCommand::None,
        }
    }

    fn handle_insert_mode(&self, key: KeyEvent) -> VimCommand {
        if let Some(motion) = navigation_key(key) {
            return VimCommand::Move(motion);
        }

        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => VimCommand::ExitInsert,
            (KeyCode::Enter, KeyModifiers::NONE) => VimCommand::InsertNewline,
            (KeyCode::Tab, KeyModifiers::NONE) => VimCommand::InsertTab,
            (KeyCode::Backspace, _) => VimCommand::DeleteBackward,
            (KeyCode::Delete, _) => VimCommand::DeleteForward,
            (KeyCode::Char(c), modifiers)
                if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                VimCommand::InsertChar(c)
            }
            _ => VimCommand::None,
        }
    }

    fn handle_visual_mode(&self, key: KeyEvent, linewise: bool) -> VimCommand {
        if let Some(motion) = navigation_key(key).or_else(|| letter_motion(key)) {
            return VimCommand::Move(motion);
        }

        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => VimCommand::CancelVisual,

            // Pressing the key of the current visual kind toggles it off;
            // the other key switches kind.
            (KeyCode::Char('v'), KeyModifiers::NONE) if linewise => VimCommand::StartVisual,
            (KeyCode::Char('v'), KeyModifiers::NONE) => VimCommand::CancelVisual,
            (KeyCode::Char('V'), KeyModifiers::SHIFT | KeyModifiers::NONE) if linewise => {
                VimCommand::CancelVisual
            }
            (KeyCode::Char('V'), KeyModifiers::SHIFT | KeyModifiers::NONE) => {
                VimCommand::StartVisualLine
            }

            // Operations on the selection
            (KeyCode::Enter, _) => VimCommand::ExecuteSelection,
            (KeyCode::Char('d'), KeyModifiers::NONE) | (KeyCode::Char('x'), KeyModifiers::NONE) => {
                VimCommand::DeleteSelection
            }

            _ => VimCommand::None,
        }
    }
}

/// Arrow keys, Home and End.
fn navigation_key(key: KeyEvent) -> Option<Motion> {
    match key.code {
        KeyCode::Up => Some(Motion::Up),
        KeyCode::Down => Some(Motion::Down),
        KeyCode::Left => Some(Motion::Left),
        KeyCode::Right => Some(Motion::Right),
        KeyCode::Home => Some(Motion::LineStart),
        KeyCode::End => Some(Motion::LineEnd),
        _ => None,
    }
}

/// `h`/`j`/`k`/`l`, `0` and `$`.
fn letter_motion(key: KeyEvent) -> Option<Motion> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('h'), KeyModifiers::NONE) => Some(Motion::Left),
        (KeyCode::Char('j'), KeyModifiers::NONE) => Some(Motion::Down),
        (KeyCode::Char('k'), KeyModifiers::NONE) => Some(Motion::Up),
        (KeyCode::Char('l'), KeyModifiers::NONE) => Some(Motion::Right),
        (KeyCode::Char('0'), KeyModifiers::NONE) => Some(Motion::LineStart),
        // Terminals disagree on whether `$` carries SHIFT.
        (KeyCode::Char('$'), KeyModifiers::NONE | KeyModifiers::SHIFT) => Some(Motion::LineEnd),
        _ => None,
    }
}
