use thiserror::Error;

/// Errors from a rating update.
///
/// `BracketNotFound` and `NoConvergence` mean the volatility root-find hit
/// its iteration cap. They point at pathological inputs or a bad
/// configuration, never at a normal game result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RatingError {
    #[error("score must lie in [0, 1], got {0}")]
    InvalidScore(f64),

    #[error("rating inputs must be finite")]
    NonFinite,

    #[error("could not bracket the volatility root after {iterations} steps")]
    BracketNotFound { iterations: u32 },

    #[error("volatility did not converge after {iterations} iterations")]
    NoConvergence { iterations: u32 },
}
