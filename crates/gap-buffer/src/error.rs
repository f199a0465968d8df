//! Buffer error types.

use thiserror::Error;

use crate::position::Position;

/// Errors reported by [`GapBuffer`](crate::GapBuffer) operations.
///
/// None of these leave the buffer in a modified state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferError {
    /// Input bytes or a code point were not valid Unicode.
    #[error("text contains non unicode characters")]
    NonUtf8,
    /// A position could not be resolved even after clamping.
    ///
    /// Only reachable if the buffer's internal bookkeeping is broken.
    #[error("offset out of bounds at {0}")]
    OutOfBounds(Position),
    /// The end of a range lies before its start.
    #[error("end position {end} is before start position {start}")]
    InvalidRange { start: Position, end: Position },
}
