use chess_core::OracleError;
use thiserror::Error;

/// Errors returned by search engines.
///
/// A search that finds no move is not an error: it returns a
/// [`SearchResult`](crate::SearchResult) with `best_move: None`.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The position oracle failed mid-search.
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// The engine was configured with values it cannot search with.
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}
