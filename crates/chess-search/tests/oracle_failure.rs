//! Engines must surface oracle failures instead of treating them as "no move".

use chess_core::{Board, Color, Move, OracleError, Piece, Position, Square};
use chess_search::{
    AlphaBetaConfig, Engine, EngineConfig, IterativeDeepeningConfig, MctsConfig, QuiescenceConfig,
    RandomConfig, SearchEngine, SearchError, SearchLimits,
};
use std::cell::Cell;
use std::rc::Rc;

/// A board whose move generator breaks after a fixed number of calls.
/// Clones share the budget, so it runs out inside the search as well.
#[derive(Clone)]
struct FlakyBoard {
    inner: Board,
    remaining: Rc<Cell<u32>>,
}

impl FlakyBoard {
    fn new(fen: &str, budget: u32) -> Self {
        FlakyBoard {
            inner: Board::from_fen(fen).unwrap(),
            remaining: Rc::new(Cell::new(budget)),
        }
    }

    fn wrap(&self, inner: Board) -> Self {
        FlakyBoard {
            inner,
            remaining: Rc::clone(&self.remaining),
        }
    }
}

impl Position for FlakyBoard {
    fn legal_moves(&self) -> Result<Vec<Move>, OracleError> {
        match self.remaining.get() {
            0 => Err(OracleError::Unavailable("rules engine went away".to_string())),
            n => {
                self.remaining.set(n - 1);
                self.inner.legal_moves()
            }
        }
    }

    fn push(&mut self, m: &Move) -> Result<(), OracleError> {
        self.inner.push(m)
    }

    fn pop(&mut self) -> Option<Move> {
        self.inner.pop()
    }

    fn is_game_over(&self) -> bool {
        self.inner.is_game_over()
    }

    fn is_checkmate(&self) -> bool {
        self.inner.is_checkmate()
    }

    fn is_stalemate(&self) -> bool {
        self.inner.is_stalemate()
    }

    fn is_insufficient_material(&self) -> bool {
        self.inner.is_insufficient_material()
    }

    fn is_check(&self) -> bool {
        self.inner.is_check()
    }

    fn turn(&self) -> Color {
        self.inner.turn()
    }

    fn piece_at(&self, square: Square) -> Option<Piece> {
        self.inner.piece_at(square)
    }

    fn king(&self, color: Color) -> Option<Square> {
        self.inner.king(color)
    }

    fn is_capture(&self, m: &Move) -> bool {
        self.inner.is_capture(m)
    }

    fn gives_check(&self, m: &Move) -> bool {
        self.inner.gives_check(m)
    }

    fn null_move(&self) -> Option<Self> {
        self.inner.null_move().map(|inner| self.wrap(inner))
    }

    fn fen(&self) -> String {
        self.inner.fen()
    }

    fn snapshot(&self) -> Self {
        self.wrap(self.inner.snapshot())
    }
}

const FEN: &str = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";

fn configs() -> Vec<EngineConfig> {
    vec![
        EngineConfig::Random(RandomConfig { seed: Some(1) }),
        EngineConfig::Minimax(AlphaBetaConfig { depth: 2, ..Default::default() }),
        EngineConfig::Negamax(AlphaBetaConfig { depth: 3, ..Default::default() }),
        EngineConfig::IterativeDeepening(IterativeDeepeningConfig {
            max_depth: 3,
            movetime_ms: 60_000,
            ..Default::default()
        }),
        EngineConfig::Quiescence(QuiescenceConfig { depth: 2, ..Default::default() }),
        EngineConfig::Mcts(MctsConfig {
            iterations: Some(50),
            movetime_ms: 60_000,
            seed: Some(3),
            ..Default::default()
        }),
    ]
}

#[test]
fn failure_at_the_root_is_an_error() {
    for config in configs() {
        let board = FlakyBoard::new(FEN, 0);
        let mut engine = Engine::from_config(&config).unwrap();
        let result = engine.search(&board, &SearchLimits::default());
        assert!(
            matches!(result, Err(SearchError::Oracle(OracleError::Unavailable(_)))),
            "{} swallowed the failure",
            config.kind()
        );
        assert_eq!(board.fen(), FEN);
    }
}

#[test]
fn failure_inside_the_tree_is_an_error() {
    // Random only asks for the root moves once, so it cannot fail this late.
    for config in configs().into_iter().skip(1) {
        let board = FlakyBoard::new(FEN, 3);
        let mut engine = Engine::from_config(&config).unwrap();
        let result = engine.search(&board, &SearchLimits::default());
        assert!(
            matches!(result, Err(SearchError::Oracle(_))),
            "{} swallowed the failure",
            config.kind()
        );
        assert_eq!(board.fen(), FEN);
        assert!(board.inner.ply() == 0);
    }
}

#[test]
fn healthy_oracle_searches_normally() {
    for config in configs() {
        let board = FlakyBoard::new(FEN, u32::MAX);
        let mut engine = Engine::from_config(&config).unwrap();
        let result = engine.search(&board, &SearchLimits::default()).unwrap();
        assert!(result.best_move.is_some(), "{}", config.kind());
    }
}
