//! Attack and check detection.
//!
//! A pending piece threatens every square any of its candidate roles would
//! attack, so a king must stay clear of all of them.

use crate::game_state::board::Board;
use crate::game_state::chess_types::{Color, Square};
use crate::game_state::piece::Piece;
use crate::moves::attacks::role_attacks;

/// Attack set of a live piece, the union over candidates for pending pieces.
pub fn piece_attacks(piece: &Piece, square: Square, occupancy: u64) -> u64 {
    piece
        .possible_roles()
        .iter()
        .fold(0u64, |acc, role| acc | role_attacks(piece.color, role, square, occupancy))
}

pub fn is_square_attacked(board: &Board, square: Square, attacker_color: Color) -> bool {
    let occupancy = board.occupancy();
    board
        .pieces()
        .filter(|(_, piece)| piece.color == attacker_color)
        .any(|(from, piece)| piece_attacks(&piece, from, occupancy) & square.bit() != 0)
}
