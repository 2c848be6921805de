//! Uniformly random legal moves, as a baseline opponent.

use crate::{EngineMetrics, Evaluator, RandomConfig, SearchEngine, SearchError};
use crate::{SearchLimits, SearchResult};
use chess_core::Position;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct RandomEngine {
    rng: StdRng,
}

impl RandomEngine {
    pub fn new(config: RandomConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        RandomEngine { rng }
    }
}

impl SearchEngine for RandomEngine {
    fn name(&self) -> &str {
        "random"
    }

    /// Picks a legal move at random. The score is the static evaluation of
    /// the current position.
    fn search<P: Position>(
        &mut self,
        position: &P,
        _limits: &SearchLimits,
    ) -> Result<SearchResult, SearchError> {
        let start = Instant::now();
        let score = Evaluator::Heuristic.relative(position)?;
        if position.is_game_over() {
            return Ok(SearchResult::no_move(score, start));
        }
        let moves = position.legal_moves()?;

        Ok(SearchResult {
            best_move: moves.choose(&mut self.rng).cloned(),
            score,
            metrics: EngineMetrics {
                nodes_searched: 1,
                depth_reached: 0,
                time_taken: start.elapsed(),
            },
        })
    }
}
