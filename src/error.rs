//! Error taxonomy for the discovery core.
//!
//! Resource exhaustion is not represented here: allocation failure aborts
//! the process under Rust's global allocator, a fatal, non-recoverable
//! treatment of out-of-memory that needs no variant that could never
//! actually be constructed.

use thiserror::Error;

/// Errors surfaced while ingesting or validating external input.
///
/// Algorithmic signals (no patterns found, expansion budget reached, a
/// stopping condition reached) are never represented here; they surface as
/// empty result collections instead.
#[derive(Debug, Error)]
pub enum SubdueError {
    /// Malformed graph/pattern/substructure file: unknown token, missing
    /// field, or a non-numeric token where an integer was expected.
    #[error("{file}:{line}: {message} (at token {token:?})")]
    InputFormat {
        file: String,
        line: usize,
        token: String,
        message: String,
    },

    /// Out-of-range numeric flag, unknown flag, or missing file argument.
    #[error("parameter error: {message}")]
    Parameter { message: String },
}

pub type Result<T> = std::result::Result<T, SubdueError>;
