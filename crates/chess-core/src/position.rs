//! The position oracle abstraction.
//!
//! Search code is written against [`Position`] rather than a concrete board.
//! An implementation only has to answer rules questions: which moves are
//! legal, what happens when one is played, and whether the game is over.
//!
//! # Push/pop discipline
//!
//! Searches mutate one position in place and backtrack with [`Position::pop`].
//! Every push must be matched by exactly one pop on every exit path, errors
//! included. [`Position::push_scoped`] returns a [`Pushed`] guard that pops
//! when dropped, so a `?` in the middle of a recursive search cannot leave
//! the board one ply ahead.
//!
//! # Example
//!
//! ```
//! use chess_core::{Board, Position};
//!
//! let mut board = Board::new();
//! let before = board.fen();
//! let mv = board.legal_moves().unwrap()[0].clone();
//! {
//!     let child = board.push_scoped(&mv).unwrap();
//!     assert_ne!(child.fen(), before);
//! }
//! assert_eq!(board.fen(), before);
//! ```

use crate::OracleError;
use shakmaty::{Color, Move, Piece, Square};
use std::ops::{Deref, DerefMut};

/// A mutable chess position that can enumerate, apply and undo moves.
///
/// Only move generation and move application are fallible. Those are the
/// calls that may reach an external rules engine in adapter
/// implementations; everything else is a cheap query on the current state.
pub trait Position: Clone {
    /// Returns all legal moves in enumeration order.
    fn legal_moves(&self) -> Result<Vec<Move>, OracleError>;

    /// Applies a legal move.
    fn push(&mut self, m: &Move) -> Result<(), OracleError>;

    /// Undoes the last pushed move, returning it. `None` when nothing
    /// was pushed.
    fn pop(&mut self) -> Option<Move>;

    /// True when the game has ended by any rule the oracle tracks.
    fn is_game_over(&self) -> bool;

    fn is_checkmate(&self) -> bool;

    fn is_stalemate(&self) -> bool;

    fn is_insufficient_material(&self) -> bool;

    /// True when the side to move is in check.
    fn is_check(&self) -> bool;

    /// Side to move.
    fn turn(&self) -> Color;

    fn piece_at(&self, square: Square) -> Option<Piece>;

    /// Square of the king of `color`, if there is one.
    fn king(&self, color: Color) -> Option<Square>;

    fn is_capture(&self, m: &Move) -> bool;

    /// True when playing `m` puts the opponent in check.
    fn gives_check(&self, m: &Move) -> bool;

    /// The same placement with the other side to move.
    ///
    /// Returns `None` when passing is not a legal position, for example
    /// when the side to move is in check. The result carries no undo
    /// history.
    fn null_move(&self) -> Option<Self>;

    /// Canonical string form of the position (FEN).
    fn fen(&self) -> String;

    /// A copy that only needs to support moving forward from here.
    ///
    /// Implementations with an undo stack may drop it. Defaults to `clone`.
    fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Pushes `m` and returns a guard that pops it again when dropped.
    fn push_scoped(&mut self, m: &Move) -> Result<Pushed<'_, Self>, OracleError> {
        self.push(m)?;
        Ok(Pushed { position: self })
    }
}

/// A position with one extra move pushed. Dropping the guard pops it.
#[must_use = "dropping the guard immediately undoes the move"]
pub struct Pushed<'a, P: Position> {
    position: &'a mut P,
}

impl<P: Position> Deref for Pushed<'_, P> {
    type Target = P;

    fn deref(&self) -> &P {
        self.position
    }
}

impl<P: Position> DerefMut for Pushed<'_, P> {
    fn deref_mut(&mut self) -> &mut P {
        self.position
    }
}

impl<P: Position> Drop for Pushed<'_, P> {
    fn drop(&mut self) {
        self.position.pop();
    }
}
