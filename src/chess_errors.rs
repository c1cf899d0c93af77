//! Errors used throughout the position-state core.
//!
//! `ChessErrors` is the single error type returned by FEN parsing, move-text
//! validation, history manipulation and the external engine channel, so
//! callers can branch on the failure kind instead of matching strings.
//!
//! Usage guidelines:
//! - Parsing variants (`MalformedFen`, `InvalidMoveFormat`) describe bad
//!   input and are suitable for presenting to end users.
//! - `InvalidOperation` marks a programmer error such as asking a quiet move
//!   for its en-passant square.
//! - `NoHistory` and `HistoryTruncated` are deliberately distinct: the first
//!   means nothing was played, the second means the last `play` was
//!   definitive and discarded its undo snapshot.
//! - Channel variants are fatal for the request that raised them; no retry
//!   is attempted.

use thiserror::Error;

/// Unified error type for the crate.
#[derive(Debug, Error)]
pub enum ChessErrors {
    /// Wrong rank/file count, bad separator, unknown piece letter, or an
    /// unparseable state field.
    #[error("malformed FEN: {0}")]
    MalformedFen(String),

    /// Wrong length, out-of-range file/rank character or bad promotion
    /// letter in a UCI move text.
    #[error("invalid move format: {0}")]
    InvalidMoveFormat(String),

    /// The call does not make sense for its argument.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// `unplay` was called with no move on the history stack.
    #[error("no move to undo")]
    NoHistory,

    /// `unplay` was called after a definitive `play` discarded the undo
    /// snapshot.
    #[error("undo history was truncated by a definitive play")]
    HistoryTruncated,

    /// EOF or I/O failure while talking to an external engine.
    #[error("engine channel failure: {0}")]
    ChannelFailure(String),

    /// No line carrying the expected token arrived before the deadline.
    #[error("timed out waiting for '{0}'")]
    ChannelTimeout(String),

    /// The wait for a token was cancelled by the caller.
    #[error("cancelled while waiting for '{0}'")]
    ChannelCancelled(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias used by every fallible operation in the crate.
pub type ChessResult<T> = Result<T, ChessErrors>;
