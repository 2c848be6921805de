//! Iterative deepening over alpha-beta.

use crate::alphabeta::Searcher;
use crate::{Deadline, EngineMetrics, IterativeDeepeningConfig, SearchEngine, SearchError};
use crate::{SearchLimits, SearchResult};
use chess_core::{to_uci, Move, Position};
use tracing::debug;

/// Searches depth 1, 2, ... up to `max_depth` until the time budget runs
/// out.
///
/// Only fully completed depths count. When the deadline interrupts a depth
/// its partial result is thrown away and the previous depth's move stands.
/// If not even depth 1 completed, no move is returned.
#[derive(Debug, Clone)]
pub struct IterativeDeepeningEngine {
    config: IterativeDeepeningConfig,
}

impl IterativeDeepeningEngine {
    pub fn new(config: IterativeDeepeningConfig) -> Self {
        IterativeDeepeningEngine { config }
    }
}

impl SearchEngine for IterativeDeepeningEngine {
    fn name(&self) -> &str {
        "iterative_deepening"
    }

    fn search<P: Position>(
        &mut self,
        position: &P,
        limits: &SearchLimits,
    ) -> Result<SearchResult, SearchError> {
        let deadline = Deadline::new(Some(limits.movetime.unwrap_or(self.config.movetime())));
        let evaluator = self.config.evaluator;
        let max_depth = limits.depth.unwrap_or(self.config.max_depth).max(1);

        let mut board = position.snapshot();
        let mut moves = board.legal_moves()?;
        if moves.is_empty() || board.is_game_over() {
            return Ok(SearchResult::no_move(
                evaluator.relative(&board)?,
                deadline.start(),
            ));
        }

        let mut searcher = Searcher::new(evaluator, deadline);
        let mut best: Option<(Move, f64)> = None;
        let mut depth_reached = 0;

        for depth in 1..=max_depth {
            if deadline.expired() {
                break;
            }

            // None means the deadline hit mid-depth
            let Some((mv, score)) = searcher.search_root(&mut board, &moves, depth)? else {
                break;
            };

            debug!(
                depth,
                score,
                nodes = searcher.nodes,
                elapsed_ms = deadline.elapsed().as_millis() as u64,
                best = %to_uci(&mv),
                "completed depth"
            );

            // search the previous best move first at the next depth
            if let Some(index) = moves.iter().position(|m| *m == mv) {
                moves[..=index].rotate_right(1);
            }
            best = Some((mv, score));
            depth_reached = u32::from(depth);
        }

        let (best_move, score) = match best {
            Some((mv, score)) => (Some(mv), score),
            None => (None, evaluator.relative(&board)?),
        };

        Ok(SearchResult {
            best_move,
            score,
            metrics: EngineMetrics {
                nodes_searched: searcher.nodes,
                depth_reached,
                time_taken: deadline.elapsed(),
            },
        })
    }
}
