//! Player strength estimates for engine-vs-engine play.
//!
//! - [`Glicko2`] updates a [`GlickoRating`] from a rating period's results
//! - [`elo`] holds the plain Elo formulas used for quick comparisons
//! - [`Leaderboard`] keeps one rating per player name and applies both
//!
//! Everything here is pure computation over plain values. Callers that
//! share a leaderboard between threads must serialize updates themselves.

pub mod elo;
mod error;
mod glicko2;
mod leaderboard;

pub use error::RatingError;
pub use glicko2::{GameResult, Glicko2, Glicko2Config, GlickoRating, GLICKO2_SCALE};
pub use leaderboard::{Leaderboard, Standing};
