//! Static position evaluation.
//!
//! Scores are in centipawns and white-positive. Negamax-style callers use
//! [`Evaluator::relative`] to get the side-to-move view.
//!
//! Piece-square tables are laid out from White's point of view with rank 8
//! first, the way they are usually printed. A white piece on `sq` reads
//! index `sq.flip_vertical()`, a black piece reads `sq` directly.

use chess_core::{Color, OracleError, Piece, Position, Rank, Role, Square};
use serde::{Deserialize, Serialize};

pub const PAWN_VALUE: i32 = 100;
pub const KNIGHT_VALUE: i32 = 320;
pub const BISHOP_VALUE: i32 = 330;
pub const ROOK_VALUE: i32 = 500;
pub const QUEEN_VALUE: i32 = 900;
pub const KING_VALUE: i32 = 20_000;

/// Score of a position where the side to move is checkmated, from the
/// winner's point of view.
pub const MATE_SCORE: f64 = 10_000.0;

/// Mate score used by the material-only evaluator.
pub const MATERIAL_MATE_SCORE: f64 = 20_000.0;

pub const MOBILITY_WEIGHT: f64 = 10.0;
pub const DOUBLED_PAWN_PENALTY: f64 = 50.0;
pub const ISOLATED_PAWN_PENALTY: f64 = 30.0;
pub const CENTRAL_KING_PENALTY: f64 = 60.0;
pub const BACK_RANK_KING_BONUS: f64 = 40.0;
pub const ADVANCED_KING_PENALTY: f64 = 20.0;

#[rustfmt::skip]
pub const PAWN_TABLE: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
    50, 50, 50, 50, 50, 50, 50, 50,
    10, 10, 20, 30, 30, 20, 10, 10,
     5,  5, 10, 25, 25, 10,  5,  5,
     0,  0,  0, 20, 20,  0,  0,  0,
     5, -5,-10,  0,  0,-10, -5,  5,
     5, 10, 10,-20,-20, 10, 10,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
pub const KNIGHT_TABLE: [i32; 64] = [
    -50,-40,-30,-30,-30,-30,-40,-50,
    -40,-20,  0,  0,  0,  0,-20,-40,
    -30,  0, 10, 15, 15, 10,  0,-30,
    -30,  5, 15, 20, 20, 15,  5,-30,
    -30,  0, 15, 20, 20, 15,  0,-30,
    -30,  5, 10, 15, 15, 10,  5,-30,
    -40,-20,  0,  5,  5,  0,-20,-40,
    -50,-40,-30,-30,-30,-30,-40,-50,
];

#[rustfmt::skip]
pub const BISHOP_TABLE: [i32; 64] = [
    -20,-10,-10,-10,-10,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5, 10, 10,  5,  0,-10,
    -10,  5,  5, 10, 10,  5,  5,-10,
    -10,  0, 10, 10, 10, 10,  0,-10,
    -10, 10, 10, 10, 10, 10, 10,-10,
    -10,  5,  0,  0,  0,  0,  5,-10,
    -20,-10,-10,-10,-10,-10,-10,-20,
];

#[rustfmt::skip]
pub const ROOK_TABLE: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10, 10, 10, 10, 10,  5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     0,  0,  0,  5,  5,  0,  0,  0,
];

#[rustfmt::skip]
pub const QUEEN_TABLE: [i32; 64] = [
    -20,-10,-10, -5, -5,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5,  5,  5,  5,  0,-10,
     -5,  0,  5,  5,  5,  5,  0, -5,
      0,  0,  5,  5,  5,  5,  0, -5,
    -10,  5,  5,  5,  5,  5,  0,-10,
    -10,  0,  5,  0,  0,  0,  0,-10,
    -20,-10,-10, -5, -5,-10,-10,-20,
];

#[rustfmt::skip]
pub const KING_MIDDLEGAME_TABLE: [i32; 64] = [
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -20,-30,-30,-40,-40,-30,-30,-20,
    -10,-20,-20,-20,-20,-20,-20,-10,
     20, 20,  0,  0,  0,  0, 20, 20,
     20, 30, 10,  0,  0, 10, 30, 20,
];

#[rustfmt::skip]
pub const KING_ENDGAME_TABLE: [i32; 64] = [
    -50,-40,-30,-20,-20,-30,-40,-50,
    -30,-20,-10,  0,  0,-10,-20,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-30,  0,  0,  0,  0,-30,-30,
    -50,-30,-30,-30,-30,-30,-30,-50,
];

/// Static evaluation function used by an engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evaluator {
    /// Material, piece-square tables, mobility, pawn structure and king
    /// safety.
    #[default]
    Heuristic,
    /// Piece values only.
    Material,
}

impl Evaluator {
    /// White-positive score of `position`.
    pub fn evaluate<P: Position>(self, position: &P) -> Result<f64, OracleError> {
        match self {
            Evaluator::Heuristic => evaluate(position),
            Evaluator::Material => Ok(material(position)),
        }
    }

    /// Score of `position` from the side to move's point of view.
    pub fn relative<P: Position>(self, position: &P) -> Result<f64, OracleError> {
        let score = self.evaluate(position)?;
        Ok(sign(position.turn()) * score)
    }

    /// White-positive score of a search leaf.
    ///
    /// Every drawn finished game scores zero, including draws by
    /// repetition or the fifty-move rule that [`evaluate`](Self::evaluate)
    /// scores on material.
    pub fn evaluate_leaf<P: Position>(self, position: &P) -> Result<f64, OracleError> {
        if is_drawn(position) {
            return Ok(0.0);
        }
        self.evaluate(position)
    }

    /// [`evaluate_leaf`](Self::evaluate_leaf) from the side to move's point
    /// of view.
    pub fn relative_leaf<P: Position>(self, position: &P) -> Result<f64, OracleError> {
        let score = self.evaluate_leaf(position)?;
        Ok(sign(position.turn()) * score)
    }
}

/// True when the game is over without a winner.
pub fn is_drawn<P: Position>(position: &P) -> bool {
    position.is_game_over() && !position.is_checkmate()
}

/// Base value of a piece in centipawns.
pub fn piece_value(role: Role) -> i32 {
    match role {
        Role::Pawn => PAWN_VALUE,
        Role::Knight => KNIGHT_VALUE,
        Role::Bishop => BISHOP_VALUE,
        Role::Rook => ROOK_VALUE,
        Role::Queen => QUEEN_VALUE,
        Role::King => KING_VALUE,
    }
}

/// Piece value plus its piece-square table bonus on `square`.
pub fn piece_square_value(piece: Piece, square: Square, endgame: bool) -> i32 {
    let index = match piece.color {
        Color::White => square.flip_vertical() as usize,
        Color::Black => square as usize,
    };
    let table = match piece.role {
        Role::Pawn => &PAWN_TABLE,
        Role::Knight => &KNIGHT_TABLE,
        Role::Bishop => &BISHOP_TABLE,
        Role::Rook => &ROOK_TABLE,
        Role::Queen => &QUEEN_TABLE,
        Role::King if endgame => &KING_ENDGAME_TABLE,
        Role::King => &KING_MIDDLEGAME_TABLE,
    };
    piece_value(piece.role) + table[index]
}

/// Endgame once the queens are gone, or when both queens remain but at
/// most two minor pieces are left on the board.
pub fn is_endgame<P: Position>(position: &P) -> bool {
    let mut queens = 0;
    let mut minors = 0;
    for square in Square::ALL {
        match position.piece_at(square).map(|p| p.role) {
            Some(Role::Queen) => queens += 1,
            Some(Role::Knight | Role::Bishop) => minors += 1,
            _ => {}
        }
    }
    queens == 0 || (queens == 2 && minors <= 2)
}

/// Full heuristic evaluation, white-positive.
///
/// Checkmate scores [`MATE_SCORE`] against the side to move; stalemate and
/// insufficient material score exactly zero. Repetition and fifty-move
/// positions are scored normally; searches score them through
/// [`Evaluator::evaluate_leaf`].
///
/// # Errors
///
/// Only the mobility term queries the oracle for moves, and its failure is
/// returned unchanged.
pub fn evaluate<P: Position>(position: &P) -> Result<f64, OracleError> {
    if position.is_checkmate() {
        return Ok(-sign(position.turn()) * MATE_SCORE);
    }
    if position.is_stalemate() || position.is_insufficient_material() {
        return Ok(0.0);
    }

    let endgame = is_endgame(position);
    let mut score = 0.0;
    // pawns per file, white then black
    let mut pawns = [[0u32; 8]; 2];

    for square in Square::ALL {
        let Some(piece) = position.piece_at(square) else {
            continue;
        };
        score += sign(piece.color) * f64::from(piece_square_value(piece, square, endgame));
        if piece.role == Role::Pawn {
            pawns[color_index(piece.color)][square.file() as usize] += 1;
        }
    }

    if !endgame {
        score += mobility(position)?;
    }
    score += pawn_structure(&pawns);
    if !endgame {
        score += king_safety(position);
    }
    score += tie_break(&position.fen());

    Ok(score)
}

/// Material-only evaluation, white-positive.
pub fn material<P: Position>(position: &P) -> f64 {
    if position.is_checkmate() {
        return -sign(position.turn()) * MATERIAL_MATE_SCORE;
    }
    if position.is_stalemate() || position.is_insufficient_material() {
        return 0.0;
    }
    Square::ALL
        .into_iter()
        .filter_map(|square| position.piece_at(square))
        .map(|piece| sign(piece.color) * f64::from(piece_value(piece.role)))
        .sum()
}

/// Legal-move count difference between White and Black.
///
/// The opponent's moves are counted after a null move. When the side to
/// move is in check the null move is illegal and the term is zero.
fn mobility<P: Position>(position: &P) -> Result<f64, OracleError> {
    let Some(passed) = position.null_move() else {
        return Ok(0.0);
    };
    let ours = position.legal_moves()?.len() as f64;
    let theirs = passed.legal_moves()?.len() as f64;
    Ok(sign(position.turn()) * (ours - theirs) * MOBILITY_WEIGHT)
}

fn pawn_structure(pawns: &[[u32; 8]; 2]) -> f64 {
    let mut score = 0.0;
    for (files, color) in pawns.iter().zip([Color::White, Color::Black]) {
        let s = sign(color);
        for file in 0..8 {
            let count = files[file];
            if count == 0 {
                continue;
            }
            if count > 1 {
                score -= s * DOUBLED_PAWN_PENALTY * f64::from(count - 1);
            }
            let left = file > 0 && files[file - 1] > 0;
            let right = file < 7 && files[file + 1] > 0;
            if !left && !right {
                score -= s * ISOLATED_PAWN_PENALTY * f64::from(count);
            }
        }
    }
    score
}

/// Central-file penalty and back-rank bonus for both kings. Skipped when
/// either king is missing.
fn king_safety<P: Position>(position: &P) -> f64 {
    let (Some(white), Some(black)) = (position.king(Color::White), position.king(Color::Black))
    else {
        return 0.0;
    };
    let mut score = 0.0;
    for (square, color, home) in [
        (white, Color::White, Rank::First),
        (black, Color::Black, Rank::Eighth),
    ] {
        let s = sign(color);
        // files c through f
        if (2..=5).contains(&(square.file() as usize)) {
            score -= s * CENTRAL_KING_PENALTY;
        }
        if square.rank() == home {
            score += s * BACK_RANK_KING_BONUS;
        } else {
            score -= s * ADVANCED_KING_PENALTY;
        }
    }
    score
}

/// Deterministic jitter in `[0, 0.09]` from an FNV-1a hash of the FEN.
pub fn tie_break(fen: &str) -> f64 {
    (fnv1a(fen.as_bytes()) % 10) as f64 * 0.01
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes.iter().fold(OFFSET_BASIS, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(PRIME)
    })
}

fn sign(color: Color) -> f64 {
    match color {
        Color::White => 1.0,
        Color::Black => -1.0,
    }
}

fn color_index(color: Color) -> usize {
    match color {
        Color::White => 0,
        Color::Black => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{Board, Move};

    fn board(fen: &str) -> Board {
        Board::from_fen(fen).unwrap()
    }

    #[test]
    fn test_startpos_is_balanced() {
        let score = evaluate(&Board::new()).unwrap();
        assert!((0.0..0.1).contains(&score), "got {}", score);
    }

    #[test]
    fn test_checkmate_disadvantages_mated_side() {
        // Fool's mate, white to move and mated
        let mated = board("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert_eq!(evaluate(&mated).unwrap(), -MATE_SCORE);
        assert_eq!(material(&mated), -MATERIAL_MATE_SCORE);

        // Back-rank mate, black to move and mated
        let mated = board("3R2k1/5ppp/8/8/8/8/8/6K1 b - - 0 1");
        assert_eq!(evaluate(&mated).unwrap(), MATE_SCORE);
        assert_eq!(Evaluator::Heuristic.relative(&mated).unwrap(), -MATE_SCORE);
    }

    #[test]
    fn test_draws_score_exactly_zero() {
        let stalemate = board("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert_eq!(evaluate(&stalemate).unwrap(), 0.0);

        let bare_kings = board("8/8/4k3/8/8/3K4/8/8 w - - 0 1");
        assert_eq!(evaluate(&bare_kings).unwrap(), 0.0);

        let knight_only = board("8/8/4k3/8/8/3KN3/8/8 w - - 0 1");
        assert_eq!(evaluate(&knight_only).unwrap(), 0.0);
        assert_eq!(material(&knight_only), 0.0);
    }

    #[test]
    fn test_extra_queen_is_decisive() {
        let score = evaluate(&board("k7/8/8/8/8/8/8/K5Q1 w - - 0 1")).unwrap();
        assert!(score > 900.0, "got {}", score);
    }

    #[test]
    fn test_relative_flips_for_black() {
        let position = board("k7/8/8/8/8/8/8/K5Q1 b - - 0 1");
        let absolute = evaluate(&position).unwrap();
        assert_eq!(Evaluator::Heuristic.relative(&position).unwrap(), -absolute);
    }

    #[test]
    fn test_is_endgame() {
        assert!(!is_endgame(&Board::new()));
        // no queens
        assert!(is_endgame(&board("4k3/pppppppp/8/8/8/8/PPPPPPPP/RNB1KBNR w KQ - 0 1")));
        // both queens, two minors
        assert!(is_endgame(&board("3qk3/8/8/2n5/8/5B2/8/3QK3 w - - 0 1")));
        // both queens, three minors
        assert!(!is_endgame(&board("3qk3/8/8/2n5/8/5B2/8/2BQK3 w - - 0 1")));
        // single queen
        assert!(!is_endgame(&board("4k3/8/8/8/8/8/8/3QK3 w - - 0 1")));
    }

    #[test]
    fn test_piece_square_value_is_mirrored() {
        let white_pawn = Piece { color: Color::White, role: Role::Pawn };
        let black_pawn = Piece { color: Color::Black, role: Role::Pawn };
        assert_eq!(
            piece_square_value(white_pawn, Square::E4, false),
            piece_square_value(black_pawn, Square::E5, false)
        );
        assert_eq!(piece_square_value(white_pawn, Square::E2, false), 80);
        assert_eq!(piece_square_value(white_pawn, Square::E7, false), 150);

        let white_king = Piece { color: Color::White, role: Role::King };
        assert_eq!(piece_square_value(white_king, Square::G1, false), KING_VALUE + 30);
        assert_eq!(piece_square_value(white_king, Square::E4, true), KING_VALUE + 40);
    }

    #[test]
    fn test_pawn_structure_penalties() {
        let mut pawns = [[0u32; 8]; 2];
        // white: doubled and isolated on the a-file
        pawns[0][0] = 2;
        assert_eq!(
            pawn_structure(&pawns),
            -DOUBLED_PAWN_PENALTY - 2.0 * ISOLATED_PAWN_PENALTY
        );

        // black mirror cancels it
        pawns[1][0] = 2;
        assert_eq!(pawn_structure(&pawns), 0.0);

        // connected pawns are not isolated
        let mut pawns = [[0u32; 8]; 2];
        pawns[0][3] = 1;
        pawns[0][4] = 1;
        assert_eq!(pawn_structure(&pawns), 0.0);
    }

    #[test]
    fn test_king_safety() {
        // Both kings central and at home: everything cancels
        assert_eq!(king_safety(&board("4k3/8/8/8/8/8/8/4K3 w - - 0 1")), 0.0);

        // Castled white king against a black king still in the center
        let score = king_safety(&board("4k3/8/8/8/8/8/8/6K1 w - - 0 1"));
        assert_eq!(score, BACK_RANK_KING_BONUS + CENTRAL_KING_PENALTY - BACK_RANK_KING_BONUS);

        // Wandering black king
        let score = king_safety(&board("8/8/8/8/8/k7/8/6K1 w - - 0 1"));
        assert_eq!(score, BACK_RANK_KING_BONUS + ADVANCED_KING_PENALTY);
    }

    #[test]
    fn test_tie_break_is_deterministic_and_small() {
        let fen = Board::new().fen();
        assert_eq!(tie_break(&fen), tie_break(&fen));
        for fen in ["a", "b", "rnbqkbnr", "8/8/8/8/8/8/8/8 w - - 0 1"] {
            let jitter = tie_break(fen);
            assert!((0.0..0.1).contains(&jitter));
        }
        // reference FNV-1a vector
        assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
    }

    /// A board that reports no kings.
    #[derive(Clone)]
    struct Kingless(Board);

    impl Position for Kingless {
        fn legal_moves(&self) -> Result<Vec<Move>, OracleError> {
            self.0.legal_moves()
        }

        fn push(&mut self, m: &Move) -> Result<(), OracleError> {
            self.0.push(m)
        }

        fn pop(&mut self) -> Option<Move> {
            self.0.pop()
        }

        fn is_game_over(&self) -> bool {
            self.0.is_game_over()
        }

        fn is_checkmate(&self) -> bool {
            self.0.is_checkmate()
        }

        fn is_stalemate(&self) -> bool {
            self.0.is_stalemate()
        }

        fn is_insufficient_material(&self) -> bool {
            self.0.is_insufficient_material()
        }

        fn is_check(&self) -> bool {
            self.0.is_check()
        }

        fn turn(&self) -> Color {
            self.0.turn()
        }

        fn piece_at(&self, square: Square) -> Option<Piece> {
            self.0.piece_at(square)
        }

        fn king(&self, _color: Color) -> Option<Square> {
            None
        }

        fn is_capture(&self, m: &Move) -> bool {
            self.0.is_capture(m)
        }

        fn gives_check(&self, m: &Move) -> bool {
            self.0.gives_check(m)
        }

        fn null_move(&self) -> Option<Self> {
            self.0.null_move().map(Kingless)
        }

        fn fen(&self) -> String {
            self.0.fen()
        }
    }

    #[test]
    fn test_missing_king_skips_king_safety() {
        // White king in the center, black castled
        let fen = "rnbq1rk1/pppp1ppp/5n2/2b1p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQ - 6 5";
        let full = board(fen);
        assert_ne!(king_safety(&full), 0.0);

        let kingless = Kingless(board(fen));
        assert_eq!(king_safety(&kingless), 0.0);

        let score = evaluate(&kingless).unwrap();
        assert!(score.is_finite());
        let expected = evaluate(&full).unwrap() - king_safety(&full);
        assert!((score - expected).abs() < 1e-9, "{} vs {}", score, expected);
    }

    #[test]
    fn test_repetition_leaf_scores_zero() {
        let mut repeated = board("k7/8/8/8/7Q/8/8/6NK w - - 0 1");
        for uci in ["g1f3", "a8b8", "f3g1", "b8a8", "g1f3", "a8b8", "f3g1", "b8a8"] {
            repeated.play_uci(uci).unwrap();
        }
        assert!(repeated.is_game_over());
        assert!(is_drawn(&repeated));

        // the static score still sees White's extra material
        assert!(evaluate(&repeated).unwrap() > 1000.0);
        assert_eq!(Evaluator::Heuristic.evaluate_leaf(&repeated).unwrap(), 0.0);
        assert_eq!(Evaluator::Material.relative_leaf(&repeated).unwrap(), 0.0);

        let mate = board("3R2k1/5ppp/8/8/8/8/8/6K1 b - - 0 1");
        assert!(!is_drawn(&mate));
        assert_eq!(Evaluator::Heuristic.relative_leaf(&mate).unwrap(), -MATE_SCORE);
    }
}
