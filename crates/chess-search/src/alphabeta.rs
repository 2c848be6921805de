//! Negamax with alpha-beta pruning.
//!
//! [`Searcher`] is the shared recursive core: [`NegamaxEngine`] runs it once
//! at a fixed depth, the iterative deepening engine runs it at increasing
//! depths under a deadline.

use crate::{AlphaBetaConfig, Deadline, EngineMetrics, Evaluator, SearchEngine, SearchError};
use crate::{SearchLimits, SearchResult};
use chess_core::{Move, OracleError, Position};
use std::time::Instant;

/// How often (in nodes) the deadline is polled.
const CHECK_INTERVAL: u64 = 1024;

/// Search state for one alpha-beta run.
pub(crate) struct Searcher {
    pub(crate) nodes: u64,
    deadline: Deadline,
    stopped: bool,
    evaluator: Evaluator,
}

impl Searcher {
    pub(crate) fn new(evaluator: Evaluator, deadline: Deadline) -> Self {
        Searcher {
            nodes: 0,
            deadline,
            stopped: false,
            evaluator,
        }
    }

    fn check_time(&mut self) {
        if self.nodes % CHECK_INTERVAL == 0 && self.deadline.expired() {
            self.stopped = true;
        }
    }

    /// Searches every root move to `depth` and returns the best one with
    /// its score. The first move wins ties.
    ///
    /// The deadline is checked before every root move and every
    /// [`CHECK_INTERVAL`] nodes below. Returns `None` if `moves` is empty
    /// or the deadline cut the search short.
    pub(crate) fn search_root<P: Position>(
        &mut self,
        position: &mut P,
        moves: &[Move],
        depth: u8,
    ) -> Result<Option<(Move, f64)>, OracleError> {
        self.nodes += 1;
        let mut best: Option<(Move, f64)> = None;
        let mut alpha = f64::NEG_INFINITY;
        let beta = f64::INFINITY;

        for mv in moves {
            if self.deadline.expired() {
                self.stopped = true;
                return Ok(None);
            }
            let score = {
                let mut child = position.push_scoped(mv)?;
                -self.alpha_beta(&mut *child, depth - 1, -beta, -alpha)?
            };
            if self.stopped {
                return Ok(None);
            }
            if best.as_ref().map_or(true, |(_, best_score)| score > *best_score) {
                best = Some((mv.clone(), score));
            }
            if score > alpha {
                alpha = score;
            }
        }

        Ok(best)
    }

    /// Fail-hard negamax. Scores are relative to the side to move.
    pub(crate) fn alpha_beta<P: Position>(
        &mut self,
        position: &mut P,
        depth: u8,
        mut alpha: f64,
        beta: f64,
    ) -> Result<f64, OracleError> {
        self.nodes += 1;
        self.check_time();

        if self.stopped {
            return Ok(0.0);
        }

        if depth == 0 || position.is_game_over() {
            return self.evaluator.relative_leaf(&*position);
        }

        for mv in position.legal_moves()? {
            let score = {
                let mut child = position.push_scoped(&mv)?;
                -self.alpha_beta(&mut *child, depth - 1, -beta, -alpha)?
            };

            if self.stopped {
                return Ok(0.0);
            }

            if score >= beta {
                return Ok(beta);
            }
            if score > alpha {
                alpha = score;
            }
        }

        Ok(alpha)
    }
}

/// Fixed-depth negamax with alpha-beta pruning and no move ordering.
#[derive(Debug, Clone)]
pub struct NegamaxEngine {
    config: AlphaBetaConfig,
}

impl NegamaxEngine {
    pub fn new(config: AlphaBetaConfig) -> Self {
        NegamaxEngine { config }
    }
}

impl SearchEngine for NegamaxEngine {
    fn name(&self) -> &str {
        "negamax"
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

        let mut searcher = Searcher::new(evaluator, Deadline::unbounded());
        let best = searcher.search_root(&mut board, &moves, depth)?;
        let (best_move, score) = match best {
            Some((mv, score)) => (Some(mv), score),
            None => (None, evaluator.relative(&board)?),
        };

        Ok(SearchResult {
            best_move,
            score,
            metrics: EngineMetrics {
                nodes_searched: searcher.nodes,
                depth_reached: u32::from(depth),
                time_taken: start.elapsed(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{to_uci, Board};

    #[test]
    fn test_finds_mate_in_one() {
        let board = Board::from_fen("k7/8/1K6/8/8/8/8/6Q1 w - - 0 1").unwrap();
        let mut engine = NegamaxEngine::new(AlphaBetaConfig::default());
        let result = engine.search(&board, &SearchLimits::depth(2)).unwrap();

        let mv = result.best_move.unwrap();
        let mut after = board.clone();
        after.push(&mv).unwrap();
        assert!(after.is_checkmate(), "{} is not mate", to_uci(&mv));
        assert_eq!(result.score, crate::MATE_SCORE);
    }

    #[test]
    fn test_takes_hanging_queen() {
        let board = Board::from_fen("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1").unwrap();
        let mut engine = NegamaxEngine::new(AlphaBetaConfig::default());
        let result = engine.search(&board, &SearchLimits::depth(2)).unwrap();
        assert_eq!(to_uci(&result.best_move.unwrap()), "d1d5");
    }

    #[test]
    fn test_root_without_moves() {
        let stalemate = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let mut engine = NegamaxEngine::new(AlphaBetaConfig::default());
        let result = engine.search(&stalemate, &SearchLimits::default()).unwrap();
        assert_eq!(result.best_move, None);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.metrics.nodes_searched, 0);
    }

    #[test]
    fn test_caller_position_untouched() {
        let board = Board::new();
        let before = board.fen();
        let mut engine = NegamaxEngine::new(AlphaBetaConfig::default());
        engine.search(&board, &SearchLimits::depth(2)).unwrap();
        assert_eq!(board.fen(), before);
    }

    #[test]
    fn test_only_move() {
        // Black king boxed in with a single flight square
        let board = Board::from_fen("k7/8/1K6/8/8/8/8/7R b - - 0 1").unwrap();
        let moves = board.legal_moves().unwrap();
        assert_eq!(moves.len(), 1);

        let mut engine = NegamaxEngine::new(AlphaBetaConfig::default());
        let result = engine.search(&board, &SearchLimits::default()).unwrap();
        assert_eq!(result.best_move.as_ref(), Some(&moves[0]));
    }
}
