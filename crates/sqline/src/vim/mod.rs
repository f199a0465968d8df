//! Vim keybindings for the query editor.
//!
//! # Architecture
//!
//! - `VimMode`: the current editing mode; the visual variants carry their
//!   selection
//! - `VimCommand`: what a key asks the editor to do
//! - `VimHandler`: translates key events into commands for a given mode
//!
//! # Usage
//!
//! ```ignore
//! let handler = VimHandler::new();
//! match handler.handle_key(key_event, editor.mode()) {
//!     VimCommand::Move(motion) => viewport.apply(motion)?,
//!     VimCommand::EnterInsert => mode = VimMode::Insert,
//!     // ...
//! }
//! ```

mod command;
mod handler;
mod mode;

pub use command::{Motion, VimCommand};
pub use handler::VimHandler;
pub use mode::VimMode;
