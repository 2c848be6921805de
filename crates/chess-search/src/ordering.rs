//! Static move ordering for alpha-beta search.

use crate::eval::{piece_value, PAWN_VALUE};
use chess_core::{Move, Position};
use std::cmp::Reverse;

const PROMOTION_SCORE: i32 = 10_000;
const CAPTURE_BONUS: i32 = 1_000;
const CHECK_SCORE: i32 = 500;

/// Ordering key for `m`: promotions, then captures by victim minus
/// attacker, then checks, then quiet moves.
pub fn move_order_score<P: Position>(position: &P, m: &Move) -> i32 {
    if m.is_promotion() {
        return PROMOTION_SCORE;
    }
    if position.is_capture(m) {
        // en passant reports a pawn victim
        let victim = m.capture().map_or(PAWN_VALUE, piece_value);
        return victim - piece_value(m.role()) + CAPTURE_BONUS;
    }
    if position.gives_check(m) {
        return CHECK_SCORE;
    }
    0
}

/// Sorts moves by descending [`move_order_score`], keeping enumeration
/// order among equal keys.
pub fn order_moves<P: Position>(position: &P, mut moves: Vec<Move>) -> Vec<Move> {
    moves.sort_by_cached_key(|m| Reverse(move_order_score(position, m)));
    moves
}
