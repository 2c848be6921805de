//! Game-tree search over a chess position oracle.
//!
//! Every strategy implements [`SearchEngine`] and searches any
//! [`chess_core::Position`]:
//! - [`MinimaxEngine`]: unpruned minimax, the correctness reference
//! - [`NegamaxEngine`]: fixed-depth negamax with alpha-beta pruning
//! - [`IterativeDeepeningEngine`]: alpha-beta at increasing depths under a
//!   time budget
//! - [`QuiescenceEngine`]: ordered alpha-beta extended through captures and
//!   checks past the horizon
//! - [`MctsEngine`]: Monte Carlo Tree Search with evaluator-scored rollouts
//! - [`RandomEngine`]: uniformly random legal moves
//!
//! [`Engine`] wraps them all behind one type, built from an
//! [`EngineConfig`].
//!
//! # Score convention
//!
//! [`SearchResult::score`] is always relative to the side to move.
//! [`eval::evaluate`] itself is white-positive.

mod alphabeta;
mod config;
mod engine;
mod error;
pub mod eval;
mod iterative;
mod mcts;
mod minimax;
pub mod ordering;
mod quiescence;
mod random;

pub use alphabeta::NegamaxEngine;
pub use config::{
    AlphaBetaConfig, EngineConfig, IterativeDeepeningConfig, MctsConfig, QuiescenceConfig,
    RandomConfig,
};
pub use engine::{Deadline, Engine, EngineMetrics, SearchEngine, SearchLimits, SearchResult};
pub use error::SearchError;
pub use eval::{Evaluator, MATE_SCORE};
pub use iterative::IterativeDeepeningEngine;
pub use mcts::MctsEngine;
pub use minimax::MinimaxEngine;
pub use quiescence::QuiescenceEngine;
pub use random::RandomEngine;
