//! Error types surfaced at the host boundary.
//!
//! Parsing itself never fails: a malformed construct degrades to literal
//! text or a plain paragraph rather than raising an error (CommonMark has no
//! syntax errors). The only failures a caller can observe come from the I/O
//! boundary around the parser, or from an internal invariant that should
//! never trip.

use std::fmt;

/// Errors surfaced by the reader-driven and writer-driven entry points.
///
/// `parse_document` itself is infallible; this type exists for
/// [`crate::parse_document_from_reader`] and
/// [`crate::render_document_to_writer`], which wrap I/O.
#[derive(Debug)]
pub enum Error {
    /// The underlying reader or writer failed.
    Io(std::io::Error),

    /// A defensive assertion in the block or inline builder tripped. This
    /// indicates a bug in the parser, not a malformed input: every
    /// Markdown input, however ill-formed, has a well-defined parse.
    InternalInvariantViolation(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "i/o error: {}", e),
            Error::InternalInvariantViolation(msg) => {
                write!(f, "internal invariant violation: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::InternalInvariantViolation(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
