//! Elo rating calculation.
//!
//! Kept alongside Glicko-2 as the simpler single-number comparison. Ratings
//! are plain `f64`s and are not rounded, so repeated updates do not drift.

/// K-factor used when none is configured.
pub const DEFAULT_K_FACTOR: f64 = 32.0;

/// Expected score for a player rated `rating` against `opponent_rating`.
pub fn expected_score(rating: f64, opponent_rating: f64) -> f64 {
    1.0 / (1.0 + 10_f64.powf((opponent_rating - rating) / 400.0))
}

/// Calculate new rating after a game.
///
/// # Arguments
/// * `rating` - Current rating
/// * `opponent_rating` - Opponent's rating
/// * `actual` - Actual score (1.0 = win, 0.5 = draw, 0.0 = loss)
/// * `k` - K-factor
pub fn new_rating(rating: f64, opponent_rating: f64, actual: f64, k: f64) -> f64 {
    rating + k * (actual - expected_score(rating, opponent_rating))
}

/// Updates both players of one game from their pre-game ratings.
///
/// `score_a` is player A's score; B scores `1 - score_a`.
pub fn update_pair(rating_a: f64, rating_b: f64, score_a: f64, k: f64) -> (f64, f64) {
    (
        new_rating(rating_a, rating_b, score_a, k),
        new_rating(rating_b, rating_a, 1.0 - score_a, k),
    )
}
