//! [`Position`] implementation backed by the `shakmaty` rules engine.

use crate::{FenError, GameOutcome, OracleError, Position, Termination};
use shakmaty::fen::Fen;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Piece, Position as _, Square};
use std::fmt;

/// Half-moves without progress after which the game is drawn.
const FIFTY_MOVE_PLIES: u32 = 100;

/// A chess position with undo history and repetition tracking.
///
/// `shakmaty` positions are immutable values that know nothing about how
/// they were reached. `Board` keeps the previous positions for
/// [`Position::pop`] and the Zobrist key of every position reached so
/// threefold repetition can be detected.
#[derive(Debug, Clone)]
pub struct Board {
    chess: Chess,
    undo: Vec<(Chess, Move)>,
    keys: Vec<u64>,
}

impl Board {
    /// The standard starting position.
    pub fn new() -> Self {
        Self::from_chess(Chess::default())
    }

    /// Parses a FEN string.
    ///
    /// # Errors
    ///
    /// Returns [`FenError::Parse`] for malformed input and
    /// [`FenError::Setup`] for a well-formed but illegal position.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fen: Fen = fen
            .trim()
            .parse()
            .map_err(|e: shakmaty::fen::ParseFenError| FenError::Parse(e.to_string()))?;
        let chess: Chess = fen
            .into_position(CastlingMode::Standard)
            .map_err(|e| FenError::Setup(e.to_string()))?;
        Ok(Self::from_chess(chess))
    }

    pub fn from_chess(chess: Chess) -> Self {
        let key = zobrist_key(&chess);
        Board {
            chess,
            undo: Vec::new(),
            keys: vec![key],
        }
    }

    /// The underlying `shakmaty` position.
    pub fn chess(&self) -> &Chess {
        &self.chess
    }

    /// Half-moves since the last capture or pawn move.
    pub fn halfmove_clock(&self) -> u32 {
        self.chess.halfmoves()
    }

    /// Number of moves played since this board (or its snapshot source)
    /// was created.
    pub fn ply(&self) -> usize {
        self.keys.len() - 1
    }

    /// Finds the legal move with the given UCI notation.
    pub fn find_uci(&self, uci: &str) -> Option<Move> {
        self.chess
            .legal_moves()
            .into_iter()
            .find(|m| to_uci(m) == uci)
    }

    /// Plays a move given in UCI notation.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::IllegalMove`] if the string does not name a
    /// legal move in this position.
    pub fn play_uci(&mut self, uci: &str) -> Result<Move, OracleError> {
        let mv = self
            .find_uci(uci)
            .ok_or_else(|| OracleError::IllegalMove(uci.to_string()))?;
        self.push(&mv)?;
        Ok(mv)
    }

    /// How the game ended, or `None` if it is still in progress.
    pub fn outcome(&self) -> Option<GameOutcome> {
        if self.chess.is_checkmate() {
            return Some(GameOutcome::win(
                self.chess.turn().other(),
                Termination::Checkmate,
            ));
        }
        if self.chess.is_stalemate() {
            return Some(GameOutcome::draw(Termination::Stalemate));
        }
        if self.chess.is_insufficient_material() {
            return Some(GameOutcome::draw(Termination::InsufficientMaterial));
        }
        if self.chess.halfmoves() >= FIFTY_MOVE_PLIES {
            return Some(GameOutcome::draw(Termination::FiftyMoves));
        }
        if self.is_repetition() {
            return Some(GameOutcome::draw(Termination::Repetition));
        }
        None
    }

    /// True when the current position has occurred at least three times.
    ///
    /// Only positions since the last irreversible move can repeat, so the
    /// scan stops at the halfmove clock.
    pub fn is_repetition(&self) -> bool {
        let Some(&current) = self.keys.last() else {
            return false;
        };
        let window = self.chess.halfmoves() as usize + 1;
        self.keys
            .iter()
            .rev()
            .take(window)
            .filter(|&&key| key == current)
            .count()
            >= 3
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fen())
    }
}

impl Position for Board {
    fn legal_moves(&self) -> Result<Vec<Move>, OracleError> {
        Ok(self.chess.legal_moves().into_iter().collect())
    }

    fn push(&mut self, m: &Move) -> Result<(), OracleError> {
        if !self.chess.is_legal(m) {
            return Err(OracleError::IllegalMove(to_uci(m)));
        }
        let previous = self.chess.clone();
        self.chess.play_unchecked(m);
        self.keys.push(zobrist_key(&self.chess));
        self.undo.push((previous, m.clone()));
        Ok(())
    }

    fn pop(&mut self) -> Option<Move> {
        let (previous, mv) = self.undo.pop()?;
        self.chess = previous;
        self.keys.pop();
        Some(mv)
    }

    fn is_game_over(&self) -> bool {
        self.outcome().is_some()
    }

    fn is_checkmate(&self) -> bool {
        self.chess.is_checkmate()
    }

    fn is_stalemate(&self) -> bool {
        self.chess.is_stalemate()
    }

    fn is_insufficient_material(&self) -> bool {
        self.chess.is_insufficient_material()
    }

    fn is_check(&self) -> bool {
        self.chess.is_check()
    }

    fn turn(&self) -> Color {
        self.chess.turn()
    }

    fn piece_at(&self, square: Square) -> Option<Piece> {
        self.chess.board().piece_at(square)
    }

    fn king(&self, color: Color) -> Option<Square> {
        self.chess.board().king_of(color)
    }

    fn is_capture(&self, m: &Move) -> bool {
        m.is_capture()
    }

    fn gives_check(&self, m: &Move) -> bool {
        let mut next = self.chess.clone();
        next.play_unchecked(m);
        next.is_check()
    }

    fn null_move(&self) -> Option<Self> {
        self.chess.clone().swap_turn().ok().map(Board::from_chess)
    }

    fn fen(&self) -> String {
        Fen::from_position(self.chess.clone(), EnPassantMode::Legal).to_string()
    }

    fn snapshot(&self) -> Self {
        Board {
            chess: self.chess.clone(),
            undo: Vec::new(),
            keys: self.keys.clone(),
        }
    }
}

/// UCI notation of a move (`e2e4`, `e7e8q`, `e1g1`).
pub fn to_uci(m: &Move) -> String {
    m.to_uci(CastlingMode::Standard).to_string()
}

fn zobrist_key(chess: &Chess) -> u64 {
    chess.zobrist_hash::<Zobrist64>(EnPassantMode::Legal).0
}
