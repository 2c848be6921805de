//! Monte Carlo Tree Search.
//!
//! The tree lives in a flat arena. Nodes refer to their parent and children
//! by index, the parent link is only followed during backpropagation, and
//! the whole arena is dropped when the search returns. Nothing is reused
//! between moves.
//!
//! Rollouts are random playouts scored by the static evaluator. The score
//! is squashed through `sigmoid(score / 100)` before it is accumulated, so a
//! node's win rate is a pseudo-probability in `[0, 1]`.

use crate::{Deadline, EngineMetrics, Evaluator, MctsConfig, SearchEngine, SearchError};
use crate::{SearchLimits, SearchResult};
use chess_core::{to_uci, Color, Move, OracleError, Position};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

type NodeId = usize;

const ROOT: NodeId = 0;

/// Scale of the evaluation-to-probability squash.
const SIGMOID_SCALE: f64 = 100.0;

/// One position in the search tree.
///
/// `wins` is accumulated from the point of view of the player who made
/// the move leading here, which is what the parent wants to maximize.
struct SearchNode<P> {
    position: P,
    parent: Option<NodeId>,
    mv: Option<Move>,
    children: Vec<NodeId>,
    untried: Vec<Move>,
    visits: u64,
    wins: f64,
    depth: u32,
}

impl<P: Position> SearchNode<P> {
    fn new(
        position: P,
        parent: Option<NodeId>,
        mv: Option<Move>,
        depth: u32,
        rng: &mut StdRng,
    ) -> Result<Self, OracleError> {
        let untried = if position.is_game_over() {
            Vec::new()
        } else {
            let mut moves = position.legal_moves()?;
            moves.shuffle(rng);
            moves
        };
        Ok(SearchNode {
            position,
            parent,
            mv,
            children: Vec::new(),
            untried,
            visits: 0,
            wins: 0.0,
            depth,
        })
    }

    fn ucb1(&self, ln_parent_visits: f64, exploration: f64) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        let visits = self.visits as f64;
        self.wins / visits + exploration * (ln_parent_visits / visits).sqrt()
    }
}

struct Tree<P> {
    nodes: Vec<SearchNode<P>>,
    max_depth: u32,
}

impl<P: Position> Tree<P> {
    fn new(root: P, rng: &mut StdRng) -> Result<Self, OracleError> {
        Ok(Tree {
            nodes: vec![SearchNode::new(root, None, None, 0, rng)?],
            max_depth: 0,
        })
    }

    /// Descends through fully expanded nodes by UCB1 until reaching a node
    /// with untried moves or no children.
    fn select(&self, exploration: f64) -> NodeId {
        let mut id = ROOT;
        loop {
            let node = &self.nodes[id];
            if !node.untried.is_empty() || node.children.is_empty() {
                return id;
            }
            let ln_visits = (node.visits as f64).ln();
            let mut best = node.children[0];
            let mut best_value = f64::NEG_INFINITY;
            for &child in &node.children {
                let value = self.nodes[child].ucb1(ln_visits, exploration);
                if value > best_value {
                    best = child;
                    best_value = value;
                }
            }
            id = best;
        }
    }

    /// Adds one child for an untried move of `id` and returns it. Returns
    /// `id` itself when it has nothing left to expand.
    fn expand(&mut self, id: NodeId, rng: &mut StdRng) -> Result<NodeId, OracleError> {
        let Some(mv) = self.nodes[id].untried.pop() else {
            return Ok(id);
        };
        let mut position = self.nodes[id].position.snapshot();
        position.push(&mv)?;

        let depth = self.nodes[id].depth + 1;
        let child = SearchNode::new(position, Some(id), Some(mv), depth, rng)?;
        let child_id = self.nodes.len();
        self.nodes.push(child);
        self.nodes[id].children.push(child_id);
        self.max_depth = self.max_depth.max(depth);
        Ok(child_id)
    }

    /// Credits `value` to `id` and its ancestors, flipping sign at every
    /// level.
    fn backpropagate(&mut self, id: NodeId, mut value: f64) {
        let mut current = Some(id);
        while let Some(id) = current {
            let node = &mut self.nodes[id];
            node.visits += 1;
            node.wins += sigmoid(value / SIGMOID_SCALE);
            value = -value;
            current = node.parent;
        }
    }

    /// Root child with the most visits. The earliest expanded wins ties.
    fn most_visited(&self) -> Option<&SearchNode<P>> {
        let mut best: Option<&SearchNode<P>> = None;
        for &child in &self.nodes[ROOT].children {
            let node = &self.nodes[child];
            if best.map_or(true, |b| node.visits > b.visits) {
                best = Some(node);
            }
        }
        best
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Inverse of the backpropagation squash, mapping a win rate back to a
/// centipawn-like score.
fn win_rate_to_score(win_rate: f64) -> f64 {
    let w = win_rate.clamp(1e-6, 1.0 - 1e-6);
    SIGMOID_SCALE * (w / (1.0 - w)).ln()
}

#[derive(Debug, Clone)]
pub struct MctsEngine {
    config: MctsConfig,
    rng: StdRng,
}

impl MctsEngine {
    pub fn new(config: MctsConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        MctsEngine { config, rng }
    }

    /// Plays random moves from `start` until the game ends or the ply cap
    /// is hit, then returns the white-positive evaluation.
    fn rollout<P: Position>(&mut self, start: &P) -> Result<f64, OracleError> {
        let mut position = start.snapshot();
        for _ in 0..self.config.rollout_plies {
            if position.is_game_over() {
                break;
            }
            let moves = position.legal_moves()?;
            let Some(mv) = moves.choose(&mut self.rng) else {
                break;
            };
            position.push(mv)?;
        }
        self.config.evaluator.evaluate_leaf(&position)
    }

    /// Runs simulations until the time or iteration budget is spent.
    fn grow<P: Position>(
        &mut self,
        position: &P,
        deadline: &Deadline,
    ) -> Result<(Tree<P>, u64), OracleError> {
        let mut tree = Tree::new(position.snapshot(), &mut self.rng)?;
        let mut iterations: u64 = 0;

        while !deadline.expired() && self.config.iterations.map_or(true, |n| iterations < n) {
            let selected = tree.select(self.config.exploration);
            let node = tree.expand(selected, &mut self.rng)?;
            let leaf = tree.nodes[node].position.snapshot();
            let white_score = self.rollout(&leaf)?;
            // the player who moved into the leaf is the one not to move
            let value = match leaf.turn() {
                Color::Black => white_score,
                Color::White => -white_score,
            };
            tree.backpropagate(node, value);
            iterations += 1;
        }

        Ok((tree, iterations))
    }

    /// Runs a search and returns every expanded root move with its visit
    /// count, in expansion order.
    ///
    /// # Errors
    ///
    /// Oracle failures are propagated as [`SearchError::Oracle`].
    pub fn root_visits<P: Position>(
        &mut self,
        position: &P,
        limits: &SearchLimits,
    ) -> Result<Vec<(Move, u64)>, SearchError> {
        if position.is_game_over() {
            return Ok(Vec::new());
        }
        let deadline = Deadline::new(Some(limits.movetime.unwrap_or(self.config.movetime())));
        let (tree, _) = self.grow(position, &deadline)?;
        Ok(tree.nodes[ROOT]
            .children
            .iter()
            .filter_map(|&child| {
                let node = &tree.nodes[child];
                node.mv.clone().map(|mv| (mv, node.visits))
            })
            .collect())
    }
}

impl SearchEngine for MctsEngine {
    fn name(&self) -> &str {
        "mcts"
    }

    fn search<P: Position>(
        &mut self,
        position: &P,
        limits: &SearchLimits,
    ) -> Result<SearchResult, SearchError> {
        let deadline = Deadline::new(Some(limits.movetime.unwrap_or(self.config.movetime())));
        let evaluator: Evaluator = self.config.evaluator;

        if position.is_game_over() {
            return Ok(SearchResult::no_move(
                evaluator.relative(position)?,
                deadline.start(),
            ));
        }

        let (tree, iterations) = self.grow(position, &deadline)?;

        let metrics = EngineMetrics {
            nodes_searched: iterations,
            depth_reached: tree.max_depth,
            time_taken: deadline.elapsed(),
        };

        let Some(best) = tree.most_visited() else {
            return Ok(SearchResult {
                best_move: None,
                score: evaluator.relative(position)?,
                metrics,
            });
        };
        let score = win_rate_to_score(best.wins / best.visits as f64);
        let best_move = best.mv.clone();

        debug!(
            iterations,
            tree_size = tree.nodes.len(),
            visits = best.visits,
            score,
            best = %best_move.as_ref().map(to_uci).unwrap_or_default(),
            "mcts search finished"
        );

        Ok(SearchResult {
            best_move,
            score,
            metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::Board;

    fn seeded(iterations: u64) -> MctsEngine {
        MctsEngine::new(MctsConfig {
            movetime_ms: 600_000,
            iterations: Some(iterations),
            rollout_plies: 8,
            seed: Some(1234),
            ..Default::default()
        })
    }

    #[test]
    fn test_sigmoid_round_trip() {
        for score in [-300.0, -50.0, 0.0, 75.0, 400.0] {
            let back = win_rate_to_score(sigmoid(score / SIGMOID_SCALE));
            assert!((back - score).abs() < 1e-6, "{} -> {}", score, back);
        }
    }

    #[test]
    fn test_terminal_root_runs_no_simulations() {
        let mated = Board::from_fen("3R2k1/5ppp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
        let result = seeded(100).search(&mated, &SearchLimits::default()).unwrap();
        assert_eq!(result.best_move, None);
        assert_eq!(result.metrics.nodes_searched, 0);
    }

    #[test]
    fn test_iteration_budget_is_respected() {
        let board = Board::new();
        let result = seeded(50).search(&board, &SearchLimits::default()).unwrap();
        assert_eq!(result.metrics.nodes_searched, 50);
        assert!(board
            .legal_moves()
            .unwrap()
            .contains(result.best_move.as_ref().unwrap()));
    }

    #[test]
    fn test_tree_visits_add_up() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut engine = seeded(1);
        let mut tree = Tree::new(Board::new(), &mut rng).unwrap();
        for _ in 0..60 {
            let selected = tree.select(std::f64::consts::SQRT_2);
            let node = tree.expand(selected, &mut rng).unwrap();
            let leaf = tree.nodes[node].position.snapshot();
            let value = engine.rollout(&leaf).unwrap();
            tree.backpropagate(node, value);
        }
        assert_eq!(tree.nodes[ROOT].visits, 60);
        let child_visits: u64 = tree.nodes[ROOT]
            .children
            .iter()
            .map(|&c| tree.nodes[c].visits)
            .sum();
        assert_eq!(child_visits, 60);
        // all twenty root moves get tried before any is revisited
        assert_eq!(tree.nodes[ROOT].children.len(), 20);
        for &child in &tree.nodes[ROOT].children {
            assert_eq!(tree.nodes[child].parent, Some(ROOT));
            assert!(tree.nodes[child].visits >= 1);
        }
    }
}
