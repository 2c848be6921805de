//! Position oracle for chess search.
//!
//! This crate defines what search algorithms need from a chess position and
//! provides one implementation of it:
//! - [`Position`], the oracle trait, and [`Pushed`], its scoped-undo guard
//! - [`Board`], a [`Position`] backed by the `shakmaty` rules engine
//! - [`GameOutcome`] and [`Termination`] for finished games
//!
//! Vocabulary types ([`Move`], [`Color`], [`Square`], ...) are re-exported from
//! `shakmaty` so downstream crates need not depend on it directly.

mod board;
mod error;
mod outcome;
mod position;

pub use board::{to_uci, Board};
pub use error::{FenError, OracleError};
pub use outcome::{GameOutcome, Termination};
pub use position::{Position, Pushed};
pub use shakmaty::{Color, File, Move, Piece, Rank, Role, Square};
