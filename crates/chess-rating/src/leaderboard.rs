//! Named player ratings.
//!
//! Two ways to feed results in:
//! - [`Leaderboard::record_match`] rates a single game immediately
//! - [`Leaderboard::record_game`] queues a game for the current rating
//!   period and [`Leaderboard::close_period`] rates the whole period at once
//!
//! Elo is always updated immediately; it has no notion of periods.

use crate::elo::{self, DEFAULT_K_FACTOR};
use crate::{GameResult, Glicko2, Glicko2Config, GlickoRating, RatingError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

const INITIAL_ELO: f64 = 1500.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PlayerEntry {
    glicko: GlickoRating,
    elo: f64,
    wins: u32,
    draws: u32,
    losses: u32,
}

impl Default for PlayerEntry {
    fn default() -> Self {
        PlayerEntry {
            glicko: GlickoRating::default(),
            elo: INITIAL_ELO,
            wins: 0,
            draws: 0,
            losses: 0,
        }
    }
}

impl PlayerEntry {
    fn tally(&mut self, score: f64) {
        if score > 0.5 {
            self.wins += 1;
        } else if score < 0.5 {
            self.losses += 1;
        } else {
            self.draws += 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PendingGame {
    a: String,
    b: String,
    score_a: f64,
}

/// One row of [`Leaderboard::standings`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub name: String,
    pub rating: GlickoRating,
    pub elo: f64,
    pub games: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

/// Ratings for every player seen so far. Players are never removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    config: Glicko2Config,
    elo_k: f64,
    players: BTreeMap<String, PlayerEntry>,
    pending: Vec<PendingGame>,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Leaderboard::new(Glicko2Config::default(), DEFAULT_K_FACTOR)
    }
}

impl Leaderboard {
    pub fn new(config: Glicko2Config, elo_k: f64) -> Self {
        Leaderboard {
            config,
            elo_k,
            players: BTreeMap::new(),
            pending: Vec::new(),
        }
    }

    /// Registers `name` with default ratings if it is new.
    pub fn get_or_create(&mut self, name: &str) -> GlickoRating {
        self.entry(name).glicko
    }

    pub fn rating(&self, name: &str) -> Option<GlickoRating> {
        self.players.get(name).map(|p| p.glicko)
    }

    pub fn elo(&self, name: &str) -> Option<f64> {
        self.players.get(name).map(|p| p.elo)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Games queued for the open rating period.
    pub fn pending_games(&self) -> usize {
        self.pending.len()
    }

    /// Rates one game between `a` and `b` right away. Each side is rated
    /// against the other's rating from before the game.
    ///
    /// # Errors
    ///
    /// Ratings are left untouched if either update fails.
    pub fn record_match(&mut self, a: &str, b: &str, score_a: f64) -> Result<(), RatingError> {
        check_score(score_a)?;
        let glicko = Glicko2::new(self.config);
        let before_a = self.get_or_create(a);
        let before_b = self.get_or_create(b);

        let after_a = glicko.update_rating(&before_a, &[GameResult::against(&before_b, score_a)])?;
        let after_b =
            glicko.update_rating(&before_b, &[GameResult::against(&before_a, 1.0 - score_a)])?;

        self.entry(a).glicko = after_a;
        self.entry(b).glicko = after_b;
        self.apply_elo(a, b, score_a);
        Ok(())
    }

    /// Queues a game for the current rating period. Elo and the win/loss
    /// tally update immediately.
    pub fn record_game(&mut self, a: &str, b: &str, score_a: f64) -> Result<(), RatingError> {
        check_score(score_a)?;
        self.get_or_create(a);
        self.get_or_create(b);
        self.pending.push(PendingGame {
            a: a.to_string(),
            b: b.to_string(),
            score_a,
        });
        self.apply_elo(a, b, score_a);
        Ok(())
    }

    /// Rates every queued game as one Glicko-2 period.
    ///
    /// All players are rated against their opponents' ratings from the
    /// start of the period. Registered players without games in the period
    /// have their RD widened.
    ///
    /// # Errors
    ///
    /// If any player's update fails nothing is applied and the queued games
    /// are kept.
    pub fn close_period(&mut self) -> Result<(), RatingError> {
        let glicko = Glicko2::new(self.config);

        let mut results: BTreeMap<&str, Vec<GameResult>> = BTreeMap::new();
        for game in &self.pending {
            let rating_a = self.rating(&game.a).unwrap_or_default();
            let rating_b = self.rating(&game.b).unwrap_or_default();
            results
                .entry(game.a.as_str())
                .or_default()
                .push(GameResult::against(&rating_b, game.score_a));
            results
                .entry(game.b.as_str())
                .or_default()
                .push(GameResult::against(&rating_a, 1.0 - game.score_a));
        }

        let mut updated = Vec::with_capacity(self.players.len());
        for (name, entry) in &self.players {
            let games = results.get(name.as_str()).map_or(&[][..], Vec::as_slice);
            updated.push((name.clone(), glicko.update_rating(&entry.glicko, games)?));
        }

        debug!(
            games = self.pending.len(),
            players = updated.len(),
            "closed rating period"
        );

        for (name, rating) in updated {
            self.entry(&name).glicko = rating;
        }
        self.pending.clear();
        Ok(())
    }

    /// All players, highest Glicko rating first.
    pub fn standings(&self) -> Vec<Standing> {
        let mut standings: Vec<Standing> = self
            .players
            .iter()
            .map(|(name, entry)| Standing {
                name: name.clone(),
                rating: entry.glicko,
                elo: entry.elo,
                games: entry.wins + entry.draws + entry.losses,
                wins: entry.wins,
                draws: entry.draws,
                losses: entry.losses,
            })
            .collect();
        standings.sort_by(|x, y| y.rating.rating.total_cmp(&x.rating.rating));
        standings
    }

    fn entry(&mut self, name: &str) -> &mut PlayerEntry {
        self.players.entry(name.to_string()).or_default()
    }

    fn apply_elo(&mut self, a: &str, b: &str, score_a: f64) {
        let before_a = self.entry(a).elo;
        let before_b = self.entry(b).elo;
        let (elo_a, elo_b) = elo::update_pair(before_a, before_b, score_a, self.elo_k);
        let player_a = self.entry(a);
        player_a.elo = elo_a;
        player_a.tally(score_a);
        let player_b = self.entry(b);
        player_b.elo = elo_b;
        player_b.tally(1.0 - score_a);
    }
}

fn check_score(score: f64) -> Result<(), RatingError> {
    if (0.0..=1.0).contains(&score) {
        Ok(())
    } else {
        Err(RatingError::InvalidScore(score))
    }
}
