//! Zobrist keys for repetition tracking.
//!
//! The key covers placement (pending pieces keyed by their candidate set),
//! side to move, castling rights, and the en-passant file. Blink pools are
//! left out: nearly every move adds a trace, so including them would make
//! repetitions impossible. Keys are generated from a fixed seed so snapshots
//! stay stable across runs.

use std::sync::OnceLock;

use crate::game_state::board::Board;
use crate::game_state::chess_types::{CastlingRights, Color, Role, RoleSet, Square};
use crate::game_state::piece::PieceState;

#[derive(Debug)]
struct ZobristTables {
    piece_square: [[[u64; 64]; 6]; 2],
    pending_square: [[u64; 64]; 2],
    candidate_bits: [u64; 64],
    side_to_move: u64,
    castling: [u64; 16],
    en_passant_file: [u64; 8],
}

static TABLES: OnceLock<ZobristTables> = OnceLock::new();

#[inline]
fn tables() -> &'static ZobristTables {
    TABLES.get_or_init(build_tables)
}

fn build_tables() -> ZobristTables {
    let mut seed: u64 = 0x7C15_9E37_79B9_7F4A;

    let mut piece_square = [[[0u64; 64]; 6]; 2];
    for color in &mut piece_square {
        for role in color {
            for sq in role {
                *sq = next_random_u64(&mut seed);
            }
        }
    }

    let mut pending_square = [[0u64; 64]; 2];
    for color in &mut pending_square {
        for sq in color {
            *sq = next_random_u64(&mut seed);
        }
    }

    let mut candidate_bits = [0u64; 64];
    for key in &mut candidate_bits {
        *key = next_random_u64(&mut seed);
    }

    let side_to_move = next_random_u64(&mut seed);

    let mut castling = [0u64; 16];
    for key in &mut castling {
        *key = next_random_u64(&mut seed);
    }

    let mut en_passant_file = [0u64; 8];
    for key in &mut en_passant_file {
        *key = next_random_u64(&mut seed);
    }

    ZobristTables {
        piece_square,
        pending_square,
        candidate_bits,
        side_to_move,
        castling,
        en_passant_file,
    }
}

#[inline]
fn next_random_u64(state: &mut u64) -> u64 {
    // splitmix64
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[inline]
pub fn piece_square_key(color: Color, role: Role, square: Square) -> u64 {
    tables().piece_square[color.index()][role.index()][square.index()]
}

/// Pending pieces hash by square and candidate set, rotated so equal sets on
/// different squares do not cancel out.
#[inline]
pub fn pending_square_key(color: Color, candidates: RoleSet, square: Square) -> u64 {
    let t = tables();
    t.pending_square[color.index()][square.index()]
        ^ t.candidate_bits[(candidates.bits() & 0x3F) as usize].rotate_left(square.index() as u32)
}

#[inline]
pub fn castling_key(castling_rights: CastlingRights) -> u64 {
    tables().castling[(castling_rights & 0x0F) as usize]
}

#[inline]
pub fn en_passant_file_key(file: u8) -> u64 {
    tables().en_passant_file[(file & 7) as usize]
}

#[inline]
pub fn side_to_move_key() -> u64 {
    tables().side_to_move
}

/// Full position key of a board, computed from scratch.
pub fn position_key(board: &Board) -> u64 {
    let mut key = 0u64;

    for (square, piece) in board.pieces() {
        key ^= match piece.state {
            PieceState::Settled(role) | PieceState::Revealed { role, .. } => {
                piece_square_key(piece.color, role, square)
            }
            PieceState::Pending { candidates, .. } => {
                pending_square_key(piece.color, candidates, square)
            }
        };
    }

    if board.turn() == Color::Black {
        key ^= side_to_move_key();
    }
    key ^= castling_key(board.castling_rights());
    if let Some(ep) = board.en_passant() {
        key ^= en_passant_file_key(ep.file());
    }

    key
}
