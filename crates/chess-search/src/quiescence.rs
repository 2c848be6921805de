//! Alpha-beta with move ordering and a quiescence extension.
//!
//! At the nominal horizon the search keeps going through captures,
//! promotions and checks for up to `q_depth` more plies, so a position in
//! the middle of an exchange is not scored as if the exchange were over.

use crate::eval::QUEEN_VALUE;
use crate::ordering::order_moves;
use crate::{Deadline, EngineMetrics, Evaluator, QuiescenceConfig, SearchEngine, SearchError};
use crate::{SearchLimits, SearchResult};
use chess_core::{to_uci, Move, OracleError, Position};
use tracing::debug;

/// Stand-pat scores this far below alpha are not worth extending.
const DELTA_MARGIN: f64 = QUEEN_VALUE as f64;

#[derive(Debug, Clone)]
pub struct QuiescenceEngine {
    config: QuiescenceConfig,
}

impl QuiescenceEngine {
    pub fn new(config: QuiescenceConfig) -> Self {
        QuiescenceEngine { config }
    }
}

struct QuiescenceSearch {
    nodes: u64,
    q_depth: u8,
    evaluator: Evaluator,
}

impl QuiescenceSearch {
    fn alpha_beta<P: Position>(
        &mut self,
        position: &mut P,
        depth: u8,
        mut alpha: f64,
        beta: f64,
    ) -> Result<f64, OracleError> {
        self.nodes += 1;

        if position.is_game_over() {
            return self.evaluator.relative_leaf(&*position);
        }
        if depth == 0 {
            return self.quiesce(position, alpha, beta, self.q_depth);
        }

        let mut value = f64::NEG_INFINITY;
        for mv in order_moves(&*position, position.legal_moves()?) {
            let score = {
                let mut child = position.push_scoped(&mv)?;
                -self.alpha_beta(&mut *child, depth - 1, -beta, -alpha)?
            };
            value = value.max(score);
            alpha = alpha.max(value);
            if alpha >= beta {
                break;
            }
        }

        Ok(value)
    }

    fn quiesce<P: Position>(
        &mut self,
        position: &mut P,
        mut alpha: f64,
        beta: f64,
        q_depth: u8,
    ) -> Result<f64, OracleError> {
        self.nodes += 1;

        if position.is_game_over() {
            return self.evaluator.relative_leaf(&*position);
        }
        let stand_pat = self.evaluator.relative(&*position)?;
        if q_depth == 0 {
            return Ok(stand_pat);
        }
        if stand_pat >= beta {
            return Ok(beta);
        }
        // delta pruning
        if stand_pat < alpha - DELTA_MARGIN {
            return Ok(alpha);
        }
        alpha = alpha.max(stand_pat);

        let tactical: Vec<Move> = position
            .legal_moves()?
            .into_iter()
            .filter(|m| position.is_capture(m) || m.is_promotion() || position.gives_check(m))
            .collect();

        for mv in order_moves(&*position, tactical) {
            let score = {
                let mut child = position.push_scoped(&mv)?;
                -self.quiesce(&mut *child, -beta, -alpha, q_depth - 1)?
            };
            if score >= beta {
                return Ok(beta);
            }
            alpha = alpha.max(score);
        }

        Ok(alpha)
    }
}

impl SearchEngine for QuiescenceEngine {
    fn name(&self) -> &str {
        "quiescence"
    }

    fn search<P: Position>(
        &mut self,
        position: &P,
        limits: &SearchLimits,
    ) -> Result<SearchResult, SearchError> {
        let deadline = Deadline::new(limits.movetime.or(self.config.movetime()));
        let evaluator = self.config.evaluator;
        let depth = limits.depth.unwrap_or(self.config.depth).max(1);

        let mut board = position.snapshot();
        let moves = board.legal_moves()?;
        if moves.is_empty() || board.is_game_over() {
            return Ok(SearchResult::no_move(
                evaluator.relative(&board)?,
                deadline.start(),
            ));
        }

        let mut search = QuiescenceSearch {
            nodes: 1,
            q_depth: self.config.q_depth,
            evaluator,
        };
        let mut best: Option<(Move, f64)> = None;
        let mut alpha = f64::NEG_INFINITY;
        let beta = f64::INFINITY;

        for mv in order_moves(&board, moves) {
            // keep at least one searched move
            if best.is_some() && deadline.expired() {
                break;
            }
            let score = {
                let mut child = board.push_scoped(&mv)?;
                -search.alpha_beta(&mut *child, depth - 1, -beta, -alpha)?
            };
            if best.as_ref().map_or(true, |(_, best_score)| score > *best_score) {
                best = Some((mv, score));
            }
            alpha = alpha.max(score);
        }

        let (best_move, score) = match best {
            Some((mv, score)) => (Some(mv), score),
            None => (None, evaluator.relative(&board)?),
        };

        if let Some(mv) = &best_move {
            debug!(
                depth,
                score,
                nodes = search.nodes,
                elapsed_ms = deadline.elapsed().as_millis() as u64,
                best = %to_uci(mv),
                "quiescence search finished"
            );
        }

        Ok(SearchResult {
            best_move,
            score,
            metrics: EngineMetrics {
                nodes_searched: search.nodes,
                depth_reached: u32::from(depth),
                time_taken: deadline.elapsed(),
            },
        })
    }
}
