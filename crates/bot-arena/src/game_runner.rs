//! Game execution logic for running games between two search engines.
//!
//! This module provides the [`GameRunner`] struct for playing a single game
//! in-process, from a starting position to a result. Engine failures do not
//! abort the run: the failing side forfeits and the game is recorded with
//! the reason.

use chess_core::{to_uci, Board, Color, GameOutcome, Position, Termination};
use chess_search::{EngineMetrics, SearchEngine, SearchLimits, SearchResult};
use serde::Serialize;
use tracing::{debug, warn};

/// Games still running after this many plies are drawn.
pub const DEFAULT_MAX_PLIES: u32 = 500;

/// A single move with the search information that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveRecord {
    /// The move in UCI notation (e.g., "e2e4", "g1f3").
    pub uci: String,
    /// Score reported by the engine, from the mover's point of view.
    pub score: f64,
    #[serde(flatten)]
    pub metrics: EngineMetrics,
}

/// The outcome of a chess game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// White won the game (by checkmate or opponent forfeit).
    WhiteWins,
    /// Black won the game (by checkmate or opponent forfeit).
    BlackWins,
    /// The game ended in a draw.
    Draw,
}

impl MatchResult {
    pub fn from_outcome(outcome: &GameOutcome) -> Self {
        match outcome.winner {
            Some(Color::White) => MatchResult::WhiteWins,
            Some(Color::Black) => MatchResult::BlackWins,
            None => MatchResult::Draw,
        }
    }

    /// "white", "black" or "draw".
    pub fn as_str(self) -> &'static str {
        match self {
            MatchResult::WhiteWins => "white",
            MatchResult::BlackWins => "black",
            MatchResult::Draw => "draw",
        }
    }

    /// Score of the game for the white player.
    pub fn white_score(self) -> f64 {
        match self {
            MatchResult::WhiteWins => 1.0,
            MatchResult::BlackWins => 0.0,
            MatchResult::Draw => 0.5,
        }
    }
}

/// A completed game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    /// The name of the engine playing white.
    pub white_name: String,
    /// The name of the engine playing black.
    pub black_name: String,
    pub start_fen: String,
    pub moves: Vec<MoveRecord>,
    pub result: MatchResult,
    pub termination: Termination,
    pub final_fen: String,
}

/// Plays games between two engines.
///
/// # Example
///
/// ```
/// use bot_arena::game_runner::{GameRunner, MatchResult};
/// use chess_core::{Board, Termination};
/// use chess_search::{Engine, EngineConfig, RandomConfig};
///
/// let config = EngineConfig::Random(RandomConfig { seed: Some(1) });
/// let mut white = Engine::from_config(&config).unwrap();
/// let mut black = Engine::from_config(&config).unwrap();
///
/// let mut runner = GameRunner::new("white", &mut white, "black", &mut black).with_max_plies(6);
/// let record = runner.play_game(&Board::new());
/// assert_eq!(record.result, MatchResult::Draw);
/// assert_eq!(record.termination, Termination::MoveLimit);
/// ```
pub struct GameRunner<'a, E: SearchEngine> {
    white_name: String,
    white: &'a mut E,
    black_name: String,
    black: &'a mut E,
    limits: SearchLimits,
    max_plies: u32,
}

impl<'a, E: SearchEngine> GameRunner<'a, E> {
    pub fn new(
        white_name: impl Into<String>,
        white: &'a mut E,
        black_name: impl Into<String>,
        black: &'a mut E,
    ) -> Self {
        GameRunner {
            white_name: white_name.into(),
            white,
            black_name: black_name.into(),
            black,
            limits: SearchLimits::default(),
            max_plies: DEFAULT_MAX_PLIES,
        }
    }

    /// Limits passed to every search call.
    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_max_plies(mut self, max_plies: u32) -> Self {
        self.max_plies = max_plies;
        self
    }

    /// Plays a complete game from `start`.
    ///
    /// The game ends when the position is decided, when the ply limit is
    /// reached (a draw), or when the side to move fails to produce a legal
    /// move (a loss for that side).
    pub fn play_game(&mut self, start: &Board) -> GameRecord {
        let mut board = start.clone();
        let mut moves: Vec<MoveRecord> = Vec::new();

        let outcome = loop {
            if let Some(outcome) = board.outcome() {
                break outcome;
            }
            if moves.len() >= self.max_plies as usize {
                break GameOutcome::draw(Termination::MoveLimit);
            }

            let side = board.turn();
            let (name, engine) = match side {
                Color::White => (self.white_name.as_str(), &mut *self.white),
                Color::Black => (self.black_name.as_str(), &mut *self.black),
            };

            match engine.search(&board, &self.limits) {
                Ok(SearchResult {
                    best_move: Some(mv),
                    score,
                    metrics,
                }) => {
                    let uci = to_uci(&mv);
                    if let Err(e) = board.push(&mv) {
                        warn!(engine = name, uci = %uci, error = %e, "engine played an illegal move");
                        break GameOutcome::win(!side, Termination::EngineFailure);
                    }
                    moves.push(MoveRecord {
                        uci,
                        score,
                        metrics,
                    });
                }
                Ok(SearchResult {
                    best_move: None, ..
                }) => {
                    warn!(engine = name, fen = %board.fen(), "engine returned no move in a live position");
                    break GameOutcome::win(!side, Termination::NoMove);
                }
                Err(e) => {
                    warn!(engine = name, error = %e, "engine failed");
                    break GameOutcome::win(!side, Termination::EngineFailure);
                }
            }
        };

        let result = MatchResult::from_outcome(&outcome);
        debug!(
            white = %self.white_name,
            black = %self.black_name,
            result = result.as_str(),
            termination = %outcome.termination,
            plies = moves.len(),
            "game finished"
        );

        GameRecord {
            white_name: self.white_name.clone(),
            black_name: self.black_name.clone(),
            start_fen: start.fen(),
            moves,
            result,
            termination: outcome.termination,
            final_fen: board.fen(),
        }
    }
}
