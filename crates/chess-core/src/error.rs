//! Errors raised by position oracles.

use thiserror::Error;

/// Failure reported by a [`Position`](crate::Position) implementation.
///
/// Search code never swallows these: an oracle failure during a search is
/// propagated to the caller unchanged, which keeps "no move available"
/// distinguishable from "the oracle broke".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// Legal move enumeration failed.
    #[error("move generation failed: {0}")]
    MoveGeneration(String),

    /// A move was rejected when applying it to the position.
    #[error("illegal move: {0}")]
    IllegalMove(String),

    /// The backing rules engine is not reachable.
    #[error("position oracle unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur when building a position from FEN.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: {0}")]
    Parse(String),

    #[error("illegal position: {0}")]
    Setup(String),
}
