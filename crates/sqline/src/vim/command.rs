//! Vim commands and motions.
//!
//! These are the operations the handler produces; the editor decides how to
//! carry them out against its buffer and viewport.

/// A single-step cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Up,
    Down,
    Left,
    Right,
    /// Column 0 (`0`, Home).
    LineStart,
    /// End of the line's content (`$`, End).
    LineEnd,
}

/// A complete vim command to be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VimCommand {
    /// No operation.
    None,

    /// Move the cursor; in visual modes this also moves the selection end.
    Move(Motion),

    /// Normal -> Insert (`i`).
    EnterInsert,

    /// Insert -> Normal (Esc).
    ExitInsert,

    /// Start a charwise selection at the cursor (`v`).
    StartVisual,

    /// Start a linewise selection on the cursor line (`V`).
    StartVisualLine,

    /// Drop the selection and return to Normal.
    CancelVisual,

    /// Send the selected text to the SQL executor (Enter).
    ExecuteSelection,

    /// Remove the selected text (`d`, `x`).
    DeleteSelection,

    /// Insert a character at the cursor.
    InsertChar(char),

    /// Insert a tab character.
    InsertTab,

    /// Break the line at the cursor.
    InsertNewline,

    /// Backspace.
    DeleteBackward,

    /// Delete.
    DeleteForward,
}

impl VimCommand {
    /// Returns true if this command changes the buffer's content.
    pub fn edits_buffer(&self) -> bool {
        matches!(
            self,
            VimCommand::InsertChar(_)
                | VimCommand::InsertTab
                | VimCommand::InsertNewline
                | VimCommand::DeleteBackward
                | VimCommand::DeleteForward
                | VimCommand::DeleteSelection
        )
    }
}
