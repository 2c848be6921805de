//! Game termination types.

use shakmaty::Color;
use std::fmt;

/// Why a game ended.
///
/// The first five variants are detected by the position itself. The rest
/// are decided by whoever drives the game loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// Side to move is in check with no legal moves.
    Checkmate,
    /// Side to move has no legal moves but is not in check.
    Stalemate,
    /// Neither side can possibly deliver mate.
    InsufficientMaterial,
    /// 100 half-moves without a capture or pawn move.
    FiftyMoves,
    /// The same position occurred three times.
    Repetition,
    /// An engine returned no move although legal moves existed.
    NoMove,
    /// An engine failed while searching.
    EngineFailure,
    /// The game loop hit its ply limit.
    MoveLimit,
}

impl Termination {
    /// Stable snake_case name used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Termination::Checkmate => "checkmate",
            Termination::Stalemate => "stalemate",
            Termination::InsufficientMaterial => "insufficient_material",
            Termination::FiftyMoves => "fifty_moves",
            Termination::Repetition => "repetition",
            Termination::NoMove => "no_move",
            Termination::EngineFailure => "engine_failure",
            Termination::MoveLimit => "move_limit",
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOutcome {
    /// `None` for a draw.
    pub winner: Option<Color>,
    pub termination: Termination,
}

impl GameOutcome {
    pub fn draw(termination: Termination) -> Self {
        GameOutcome {
            winner: None,
            termination,
        }
    }

    pub fn win(winner: Color, termination: Termination) -> Self {
        GameOutcome {
            winner: Some(winner),
            termination,
        }
    }

    /// Score of the game for `color`: 1.0 win, 0.5 draw, 0.0 loss.
    pub fn score_for(&self, color: Color) -> f64 {
        match self.winner {
            None => 0.5,
            Some(winner) if winner == color => 1.0,
            Some(_) => 0.0,
        }
    }
}
