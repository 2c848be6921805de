//! Multi-game matches between two configured engines.
//!
//! Colours alternate every game and each opening is played once from each
//! side. Results are reported to a [`Leaderboard`] as one rating period per
//! match.

use crate::config::{ArenaConfig, ConfigError, PresetConfig};
use crate::game_runner::{GameRecord, GameRunner};
use chess_rating::{Leaderboard, RatingError};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to update ratings: {0}")]
    Rating(#[from] RatingError),
}

/// Totals of a finished match, from engine A's side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub engine_a: String,
    pub engine_b: String,
    pub wins_a: u32,
    pub wins_b: u32,
    pub draws: u32,
    #[serde(skip)]
    pub games: Vec<GameRecord>,
}

impl MatchSummary {
    /// Points scored by engine A.
    pub fn score_a(&self) -> f64 {
        f64::from(self.wins_a) + 0.5 * f64::from(self.draws)
    }
}

/// Plays `preset.games` games between engines `a` and `b`.
///
/// Engine A takes white in even-numbered games. `on_game` is called after
/// every game with its zero-based index. Each game result is queued on
/// `leaderboard` and the rating period is closed once the match is over.
///
/// # Errors
///
/// Fails before any game is played if the preset, either engine or an
/// opening is invalid, and after the match if the rating update fails.
pub fn run_match<F>(
    config: &ArenaConfig,
    a: &str,
    b: &str,
    preset: &PresetConfig,
    leaderboard: &mut Leaderboard,
    mut on_game: F,
) -> Result<MatchSummary, MatchError>
where
    F: FnMut(usize, &GameRecord),
{
    preset.validate()?;
    let mut engine_a = config.build_engine(a)?;
    let mut engine_b = config.build_engine(b)?;
    let openings = preset.opening_boards()?;
    let limits = preset.limits();

    info!(a, b, games = preset.games, "starting match");

    let mut summary = MatchSummary {
        engine_a: a.to_string(),
        engine_b: b.to_string(),
        wins_a: 0,
        wins_b: 0,
        draws: 0,
        games: Vec::with_capacity(preset.games as usize),
    };

    for index in 0..preset.games as usize {
        let opening = &openings[(index / 2) % openings.len()];
        let a_is_white = index % 2 == 0;

        let runner = if a_is_white {
            GameRunner::new(a, &mut engine_a, b, &mut engine_b)
        } else {
            GameRunner::new(b, &mut engine_b, a, &mut engine_a)
        };
        let record = runner
            .with_limits(limits)
            .with_max_plies(preset.max_plies)
            .play_game(opening);

        let white_score = record.result.white_score();
        let score_a = if a_is_white { white_score } else { 1.0 - white_score };
        if score_a > 0.5 {
            summary.wins_a += 1;
        } else if score_a < 0.5 {
            summary.wins_b += 1;
        } else {
            summary.draws += 1;
        }
        leaderboard.record_game(a, b, score_a)?;

        on_game(index, &record);
        summary.games.push(record);
    }

    leaderboard.close_period()?;
    info!(
        a,
        b,
        wins_a = summary.wins_a,
        wins_b = summary.wins_b,
        draws = summary.draws,
        "match finished"
    );
    Ok(summary)
}
