//! # gap-buffer
//!
//! Character storage for the sqline query editor.
//!
//! The buffer keeps its text in a single `Vec<char>` with one contiguous
//! unused region (the gap) that is moved to wherever the next edit happens,
//! so typing and deleting near the cursor only touches the characters between
//! the old and new edit points.
//!
//! ## Features
//!
//! - Line/column addressing with total clamping (`find_offset` never fails on
//!   out-of-range input)
//! - Incremental line counting
//! - Inclusive line extraction that stitches lines split by the gap
//! - Range extraction and deletion
//!
//! ## Example
//!
//! ```rust
//! use gap_buffer::{GapBuffer, Position};
//!
//! let mut buf = GapBuffer::from_bytes(b"SELECT 1\nFROM t", 16).unwrap();
//! buf.insert(';', Position::new(1, 99)).unwrap();
//!
//! assert_eq!(buf.lines(), 2);
//! assert_eq!(buf.to_string(), "SELECT 1\nFROM t;");
//! ```

mod buffer;
mod error;
mod position;

pub use buffer::{DeleteDirection, GapBuffer};
pub use error::BufferError;
pub use position::{Position, Range};
