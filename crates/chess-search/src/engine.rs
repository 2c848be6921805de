//! The engine abstraction shared by every search strategy.

use crate::{
    EngineConfig, IterativeDeepeningEngine, MctsEngine, MinimaxEngine, NegamaxEngine,
    QuiescenceEngine, RandomEngine, SearchError,
};
use chess_core::{Move, Position};
use serde::{Serialize, Serializer};
use std::time::{Duration, Instant};

/// Per-call overrides of an engine's configured budget.
///
/// Fixed-depth engines ignore `movetime`; MCTS ignores `depth`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    pub depth: Option<u8>,
    pub movetime: Option<Duration>,
}

impl SearchLimits {
    pub fn depth(depth: u8) -> Self {
        SearchLimits {
            depth: Some(depth),
            movetime: None,
        }
    }

    pub fn movetime(movetime: Duration) -> Self {
        SearchLimits {
            depth: None,
            movetime: Some(movetime),
        }
    }
}

/// Counters reported by every search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineMetrics {
    pub nodes_searched: u64,
    /// Deepest completed nominal depth. For MCTS, the deepest tree node.
    pub depth_reached: u32,
    #[serde(rename = "time_ms", serialize_with = "serialize_millis")]
    pub time_taken: Duration,
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Outcome of one search.
///
/// `score` is always from the side to move's point of view: positive means
/// the player about to move stands better.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// `None` when the position has no legal moves, is already decided, or
    /// the budget ran out before any move was evaluated.
    pub best_move: Option<Move>,
    pub score: f64,
    pub metrics: EngineMetrics,
}

impl SearchResult {
    pub(crate) fn no_move(score: f64, start: Instant) -> Self {
        SearchResult {
            best_move: None,
            score,
            metrics: EngineMetrics {
                time_taken: start.elapsed(),
                ..EngineMetrics::default()
            },
        }
    }
}

/// A move-search strategy.
///
/// # Example
///
/// ```
/// use chess_core::Board;
/// use chess_search::{AlphaBetaConfig, NegamaxEngine, SearchEngine, SearchLimits};
///
/// let mut engine = NegamaxEngine::new(AlphaBetaConfig { depth: 2, ..Default::default() });
/// let result = engine.search(&Board::new(), &SearchLimits::default()).unwrap();
/// assert!(result.best_move.is_some());
/// ```
pub trait SearchEngine {
    /// Short name of the strategy.
    fn name(&self) -> &str;

    /// Searches `position` and returns the best move found.
    ///
    /// The caller's position is never modified; engines search on their
    /// own copy.
    ///
    /// # Errors
    ///
    /// Oracle failures are propagated as [`SearchError::Oracle`].
    fn search<P: Position>(
        &mut self,
        position: &P,
        limits: &SearchLimits,
    ) -> Result<SearchResult, SearchError>;
}

/// Wall-clock budget polled cooperatively by time-bounded searches.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    pub fn new(budget: Option<Duration>) -> Self {
        Deadline {
            start: Instant::now(),
            budget,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn expired(&self) -> bool {
        self.budget
            .is_some_and(|budget| self.start.elapsed() >= budget)
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Any of the in-process search strategies.
///
/// Adapters around external engines implement [`SearchEngine`] directly
/// and are not part of this enum.
#[derive(Debug)]
pub enum Engine {
    Random(RandomEngine),
    Minimax(MinimaxEngine),
    Negamax(NegamaxEngine),
    IterativeDeepening(IterativeDeepeningEngine),
    Quiescence(QuiescenceEngine),
    Mcts(MctsEngine),
}

impl Engine {
    /// Builds the engine described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidConfig`] if the configuration fails
    /// validation.
    pub fn from_config(config: &EngineConfig) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(match config {
            EngineConfig::Random(c) => Engine::Random(RandomEngine::new(c.clone())),
            EngineConfig::Minimax(c) => Engine::Minimax(MinimaxEngine::new(c.clone())),
            EngineConfig::Negamax(c) => Engine::Negamax(NegamaxEngine::new(c.clone())),
            EngineConfig::IterativeDeepening(c) => {
                Engine::IterativeDeepening(IterativeDeepeningEngine::new(c.clone()))
            }
            EngineConfig::Quiescence(c) => Engine::Quiescence(QuiescenceEngine::new(c.clone())),
            EngineConfig::Mcts(c) => Engine::Mcts(MctsEngine::new(c.clone())),
        })
    }
}

impl SearchEngine for Engine {
    fn name(&self) -> &str {
        match self {
            Engine::Random(e) => e.name(),
            Engine::Minimax(e) => e.name(),
            Engine::Negamax(e) => e.name(),
            Engine::IterativeDeepening(e) => e.name(),
            Engine::Quiescence(e) => e.name(),
            Engine::Mcts(e) => e.name(),
        }
    }

    fn search<P: Position>(
        &mut self,
        position: &P,
        limits: &SearchLimits,
    ) -> Result<SearchResult, SearchError> {
        match self {
            Engine::Random(e) => e.search(position, limits),
            Engine::Minimax(e) => e.search(position, limits),
            Engine::Negamax(e) => e.search(position, limits),
            Engine::IterativeDeepening(e) => e.search(position, limits),
            Engine::Quiescence(e) => e.search(position, limits),
            Engine::Mcts(e) => e.search(position, limits),
        }
    }
}
