//! Authoritative position of a time-travel chess game.
//!
//! `Board` owns placement, blink pools, side to move, and the ancillary state
//! standard chess needs (castling rights, en-passant target, clocks, and the
//! repetition history). Rules live in `move_generation`; this file exposes
//! them as methods so callers have a single entry point.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::game_state::blink_pool::BlinkPool;
use crate::game_state::chess_rules::{FIFTY_MOVE_HALFMOVES, REPETITION_CLAIM_COUNT};
use crate::game_state::chess_types::*;
use crate::game_state::errors::{MoveResult, SnapshotError};
use crate::game_state::piece::Piece;
use crate::game_state::zobrist::position_key;
use crate::move_generation::legal_move_apply::apply_move;
use crate::move_generation::legal_move_checks::is_square_attacked;
use crate::move_generation::legal_move_generator::generate_legal_moves;
use crate::move_generation::legal_move_queries;
use crate::move_generation::legal_move_validate::validate_move;
use crate::moves::move_model::Move;
use crate::utils::notation::move_to_notation;
use crate::utils::render_board::render_board;
use crate::utils::snapshot_generator::{generate_snapshot, Snapshot};
use crate::utils::snapshot_parser::parse_snapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub(crate) squares: [Option<Piece>; 64],
    pub(crate) pools: BTreeMap<Square, BlinkPool>,
    pub(crate) turn: Color,
    pub(crate) castling_rights: CastlingRights,
    pub(crate) en_passant: Option<Square>,
    pub(crate) halfmove_clock: u16,
    pub(crate) fullmove_number: u16,
    pub(crate) repetition_history: Vec<u64>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new_game()
    }
}

const BACK_RANK: [Role; 8] = [
    Role::Rook,
    Role::Knight,
    Role::Bishop,
    Role::Queen,
    Role::King,
    Role::Bishop,
    Role::Knight,
    Role::Rook,
];

impl Board {
    /// Board with no pieces, white to move. Not playable until kings are placed.
    pub(crate) fn new_empty() -> Self {
        Self {
            squares: [None; 64],
            pools: BTreeMap::new(),
            turn: Color::White,
            castling_rights: 0,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            repetition_history: Vec::new(),
        }
    }

    /// Standard chess starting position with empty blink pools.
    pub fn new_game() -> Self {
        let mut board = Self::new_empty();
        for (file, role) in BACK_RANK.iter().enumerate() {
            let file = file as u8;
            for (color, back, pawns) in [(Color::White, 0u8, 1u8), (Color::Black, 7, 6)] {
                if let Some(sq) = Square::from_coords(file, back) {
                    board.squares[sq.index()] = Some(Piece::settled(color, *role));
                }
                if let Some(sq) = Square::from_coords(file, pawns) {
                    board.squares[sq.index()] = Some(Piece::settled(color, Role::Pawn));
                }
            }
        }
        board.castling_rights = CASTLE_WHITE_KINGSIDE
            | CASTLE_WHITE_QUEENSIDE
            | CASTLE_BLACK_KINGSIDE
            | CASTLE_BLACK_QUEENSIDE;
        board
    }

    pub fn from_snapshot(snapshot: &str) -> Result<Self, SnapshotError> {
        parse_snapshot(snapshot)
    }

    pub fn to_snapshot(&self) -> Snapshot {
        generate_snapshot(self)
    }

    // --- Placement ---

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.index()]
    }

    #[inline]
    pub fn is_empty(&self, square: Square) -> bool {
        self.squares[square.index()].is_none()
    }

    /// Occupied squares in ascending order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|sq| self.squares[sq.index()].map(|piece| (sq, piece)))
    }

    pub fn occupancy(&self) -> u64 {
        self.pieces().fold(0u64, |acc, (sq, _)| acc | sq.bit())
    }

    pub fn occupancy_of(&self, color: Color) -> u64 {
        self.pieces()
            .filter(|(_, piece)| piece.color == color)
            .fold(0u64, |acc, (sq, _)| acc | sq.bit())
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, piece)| piece.is(color, Role::King))
            .map(|(sq, _)| sq)
    }

    // --- Blink pools ---

    #[inline]
    pub fn pool_at(&self, square: Square) -> Option<&BlinkPool> {
        self.pools.get(&square)
    }

    #[inline]
    pub fn pool_count(&self, square: Square, code: PieceCode) -> u32 {
        self.pools.get(&square).map_or(0, |pool| pool.count(code))
    }

    /// Non-empty pools in square order.
    pub fn pools(&self) -> impl Iterator<Item = (Square, &BlinkPool)> + '_ {
        self.pools.iter().map(|(sq, pool)| (*sq, pool))
    }

    /// Squares holding traces of `code` with their counts.
    pub fn blink_squares(&self, code: PieceCode) -> Vec<(Square, u32)> {
        self.pools()
            .filter_map(|(sq, pool)| {
                let count = pool.count(code);
                (count > 0).then_some((sq, count))
            })
            .collect()
    }

    /// Total traces of `code` on the board.
    pub fn blink_total(&self, code: PieceCode) -> u32 {
        self.blink_squares(code).iter().map(|(_, count)| count).sum()
    }

    /// Add one trace; `false` when the entry is already full.
    pub(crate) fn add_trace(&mut self, square: Square, code: PieceCode) -> bool {
        self.pools.entry(square).or_default().add(code)
    }

    /// Remove one trace; `false` when there was none.
    pub(crate) fn consume_trace(&mut self, square: Square, code: PieceCode) -> bool {
        let Some(pool) = self.pools.get_mut(&square) else {
            return false;
        };
        let consumed = pool.consume(code);
        if pool.is_empty() {
            self.pools.remove(&square);
        }
        consumed
    }

    // --- Side / counters ---

    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    #[inline]
    pub fn repetition_history(&self) -> &[u64] {
        &self.repetition_history
    }

    pub fn position_key(&self) -> u64 {
        position_key(self)
    }

    /// Fifty-move rule or threefold repetition. Claiming is left to the player.
    pub fn can_claim_draw(&self) -> bool {
        if self.halfmove_clock >= FIFTY_MOVE_HALFMOVES {
            return true;
        }
        let key = self.position_key();
        let earlier = self
            .repetition_history
            .iter()
            .filter(|k| **k == key)
            .count();
        earlier + 1 >= REPETITION_CLAIM_COUNT
    }

    pub fn in_check(&self, color: Color) -> bool {
        self.king_square(color)
            .is_some_and(|king| is_square_attacked(self, king, color.opposite()))
    }

    // --- Rules ---

    /// Pure legality predicate shared by highlighting and move submission.
    pub fn is_legal(&self, mv: &Move) -> bool {
        validate_move(self, mv).is_ok()
    }

    /// Same predicate as `is_legal`, with the reason for a rejection.
    pub fn validate(&self, mv: &Move) -> MoveResult<()> {
        validate_move(self, mv).map(|_| ())
    }

    /// Execute a move. The board is replaced only when the move is legal.
    pub fn make_move(&mut self, mv: &Move) -> MoveResult<()> {
        let next = apply_move(self, mv)?;
        *self = next;
        Ok(())
    }

    pub fn legal_dests(&self, square: Square, blinks: &BTreeSet<Square>) -> BTreeSet<Square> {
        legal_move_queries::legal_dests(self, square, blinks)
    }

    pub fn legal_taps(&self, square: Square, blinks: &BTreeSet<Square>) -> BTreeSet<Square> {
        legal_move_queries::legal_taps(self, square, blinks)
    }

    pub fn can_blink(&self, square: Square, blinks: &BTreeSet<Square>) -> bool {
        legal_move_queries::can_blink(self, square, blinks)
    }

    /// Every legal move consuming at most one blink.
    pub fn legal_moves(&self) -> Vec<Move> {
        generate_legal_moves(self)
    }

    /// Notation for a move played from this position.
    pub fn move_to_string(&self, mv: &Move) -> MoveResult<String> {
        move_to_notation(self, mv)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_board(self))
    }
}

#[cfg(test)]
mod tests {
    use super::Board;
    use crate::game_state::chess_types::{Color, PieceCode, Role, Square};
    use crate::moves::move_model::Move;

    fn sq(name: &str) -> Square {
        name.parse().expect("test square should parse")
    }

    #[test]
    fn new_game_matches_standard_setup() {
        let board = Board::new_game();
        assert_eq!(board.pieces().count(), 32);
        assert_eq!(board.king_square(Color::White), Some(sq("e1")));
        assert_eq!(board.king_square(Color::Black), Some(sq("e8")));
        assert_eq!(board.turn(), Color::White);
        assert_eq!(board.occupancy_of(Color::White), 0xFFFF);
        assert!(board.pools().next().is_none());
    }

    #[test]
    fn traces_are_added_and_consumed() {
        let mut board = Board::new_game();
        let knight = PieceCode::new(Color::White, Role::Knight);
        board.add_trace(sq("g1"), knight);
        assert_eq!(board.pool_count(sq("g1"), knight), 1);
        assert_eq!(board.blink_total(knight), 1);

        assert!(board.consume_trace(sq("g1"), knight));
        assert!(!board.consume_trace(sq("g1"), knight));
        assert!(board.pool_at(sq("g1")).is_none());
    }

    #[test]
    fn fifty_move_counter_enables_draw_claim() {
        let mut board = Board::new_game();
        assert!(!board.can_claim_draw());
        board.halfmove_clock = 100;
        assert!(board.can_claim_draw());
    }

    #[test]
    fn repeated_position_enables_draw_claim() {
        let mut board = Board::new_game();
        let key = board.position_key();
        board.repetition_history = vec![key, 7, key];
        assert!(board.can_claim_draw());
        board.repetition_history = vec![key];
        assert!(!board.can_claim_draw());
    }

    #[test]
    fn repetition_ignores_pool_contents() {
        let start = Board::new_game();
        let mut board = start.clone();
        for _ in 0..2 {
            for (orig, dest) in [("g1", "f3"), ("g8", "f6"), ("f3", "g1"), ("f6", "g8")] {
                board
                    .make_move(&Move::standard(sq(orig), sq(dest)))
                    .expect("knight shuffle is legal");
            }
        }

        let knight = PieceCode::new(Color::White, Role::Knight);
        assert_eq!(board.pool_count(sq("g1"), knight), 2);
        assert_eq!(board.pool_count(sq("f3"), knight), 2);
        assert_ne!(board.pools, start.pools);
        assert_eq!(board.position_key(), start.position_key());
        assert!(board.can_claim_draw());
    }
}
