use crate::db::DbSession;

/// Who receives key events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Editor,
    /// The editor let go of the keyboard; the app handles `q`, `i` and Enter.
    Released,
}

#[derive(Default)]
pub struct AppState {
    pub focus: Focus,
    pub db: DbSession,
    pub should_quit: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn editor_focused(&self) -> bool {
        self.focus == Focus::Editor
    }
}
