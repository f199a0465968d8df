//! The contract shared by everything the host lays out and draws.

use crossterm::event::KeyEvent;
use ratatui::layout::Rect;

use crate::editor::RenderSink;

/// A rectangular piece of the screen.
///
/// The host calls `layout` before every `render`, so components may treat
/// the area from the latest `layout` as current.
pub trait Component {
    fn layout(&mut self, area: Rect);

    fn render(&self, sink: &mut dyn RenderSink);

    fn handle_input(&mut self, key: KeyEvent) -> anyhow::Result<()>;

    /// Release anything the component holds before the host shuts down.
    fn clean_up(&mut self) {}
}
