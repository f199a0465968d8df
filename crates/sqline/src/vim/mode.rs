//! Vim editing modes.

use crate::editor::{Selection, SelectionKind};

/// The current vim editing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VimMode {
    /// Normal mode - navigation and commands.
    #[default]
    Normal,
    /// Insert mode - text input.
    Insert,
    /// Charwise selection.
    Visual(Selection),
    /// Linewise selection.
    VisualLine(Selection),
}

impl VimMode {
    pub fn is_insert(&self) -> bool {
        matches!(self, VimMode::Insert)
    }

    pub fn is_normal(&self) -> bool {
        matches!(self, VimMode::Normal)
    }

    /// True for both visual variants.
    pub fn is_visual(&self) -> bool {
        matches!(self, VimMode::Visual(_) | VimMode::VisualLine(_))
    }

    /// The active selection and how it covers text, if any.
    pub fn selection(&self) -> Option<(Selection, SelectionKind)> {
        match *self {
            VimMode::Visual(sel) => Some((sel, SelectionKind::Charwise)),
            VimMode::VisualLine(sel) => Some((sel, SelectionKind::Linewise)),
            VimMode::Normal | VimMode::Insert => None,
        }
    }

    /// Returns the mode name for display.
    pub fn label(&self) -> &'static str {
        match self {
            VimMode::Normal => "NORMAL",
            VimMode::Insert => "INSERT",
            VimMode::Visual(_) => "VISUAL",
            VimMode::VisualLine(_) => "V-LINE",
        }
    }
}
