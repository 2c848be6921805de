//! Plain minimax without pruning.
//!
//! Explores the full tree to a fixed depth with separate maximizing and
//! minimizing code paths over white-positive scores. It is slow and exists
//! as a reference the pruned searches are checked against.

use crate::{AlphaBetaConfig, EngineMetrics, Evaluator, SearchEngine, SearchError};
use crate::{SearchLimits, SearchResult};
use chess_core::{Color, Move, OracleError, Position};
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct MinimaxEngine {
    config: AlphaBetaConfig,
}

impl MinimaxEngine {
    pub fn new(config: AlphaBetaConfig) -> Self {
        MinimaxEngine { config }
    }
}

struct Minimax {
    nodes: u64,
    evaluator: Evaluator,
}

impl Minimax {
    fn minimax<P: Position>(&mut self, position: &mut P, depth: u8) -> Result<f64, OracleError> {
        self.nodes += 1;

        if depth == 0 || position.is_game_over() {
            return self.evaluator.evaluate_leaf(&*position);
        }

        let maximizing = position.turn() == Color::White;
        let mut best = if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };

        for mv in position.legal_moves()? {
            let value = {
                let mut child = position.push_scoped(&mv)?;
                self.minimax(&mut *child, depth - 1)?
            };
            best = if maximizing {
                best.max(value)
            } else {
                best.min(value)
            };
        }

        Ok(best)
    }
}

impl SearchEngine for MinimaxEngine {
    fn name(&self) -> &str {
        "minimax"
    }

    fn search<P: Position>(
        &mut self,
        position: &P,
        limits: &SearchLimits,
    ) -> Result<SearchResult, SearchError> {
        let start = Instant::now();
        let evaluator = self.config.evaluator;
        let depth = limits.depth.unwrap_or(self.config.depth).max(1);

        let mut board = position.snapshot();
        let moves = board.legal_moves()?;
        if moves.is_empty() || board.is_game_over() {
            return Ok(SearchResult::no_move(evaluator.relative(&board)?, start));
        }

        let maximizing = board.turn() == Color::White;
        let mut search = Minimax {
            nodes: 1,
            evaluator,
        };
        let mut best: Option<(Move, f64)> = None;

        for mv in &moves {
            let value = {
                let mut child = board.push_scoped(mv)?;
                search.minimax(&mut *child, depth - 1)?
            };
            let better = match &best {
                None => true,
                Some((_, best_value)) if maximizing => value > *best_value,
                Some((_, best_value)) => value < *best_value,
            };
            if better {
                best = Some((mv.clone(), value));
            }
        }

        let (best_move, value) = match best {
            Some((mv, value)) => (Some(mv), value),
            None => (None, evaluator.evaluate(&board)?),
        };
        // report from the side to move's point of view
        let score = if maximizing { value } else { -value };

        Ok(SearchResult {
            best_move,
            score,
            metrics: EngineMetrics {
                nodes_searched: search.nodes,
                depth_reached: u32::from(depth),
                time_taken: start.elapsed(),
            },
        })
    }
}
