//! Crate error kinds.
//!
//! Short reads are not errors: `Session::read` reports the byte count it got.
//! A degenerate (zero-width) edit window is not an error either; it simply
//! paints no text.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The bound byte transport is gone: the stream reported EOF while the
    /// session still needed bytes to make progress.
    #[error("terminal transport unavailable")]
    TransportUnavailable,

    /// The cursor-position query never produced a parseable report within
    /// the retry budget.
    #[error("cursor position query failed after {attempts} attempts")]
    CursorQueryFailed { attempts: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Prompt renderers speak `io::Write`; backend failures surfacing inside a
/// renderer cross back through this conversion.
impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(io) => io,
            other => std::io::Error::other(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
