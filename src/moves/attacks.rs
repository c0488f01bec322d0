//! Attack bitboards for every role.
//!
//! Leaper tables are computed at compile time; sliding attacks trace rays
//! against an occupancy mask and include the first blocker.

use crate::game_state::chess_types::{Color, Role, Square};

pub const KNIGHT_ATTACKS: [u64; 64] = generate_leaper_table(&[
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
]);

pub const KING_ATTACKS: [u64; 64] = generate_leaper_table(&[
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
]);

pub const WHITE_PAWN_ATTACKS: [u64; 64] = generate_leaper_table(&[(-1, 1), (1, 1)]);
pub const BLACK_PAWN_ATTACKS: [u64; 64] = generate_leaper_table(&[(-1, -1), (1, -1)]);

const ROOK_DIRECTIONS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const BISHOP_DIRECTIONS: [(i32, i32); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];

const fn generate_leaper_table(steps: &[(i32, i32)]) -> [u64; 64] {
    let mut table = [0u64; 64];
    let mut sq = 0usize;

    while sq < 64 {
        let file = (sq % 8) as i32;
        let rank = (sq / 8) as i32;
        let mut attacks = 0u64;
        let mut i = 0usize;
        while i < steps.len() {
            attacks |= set_if_valid(file + steps[i].0, rank + steps[i].1);
            i += 1;
        }
        table[sq] = attacks;
        sq += 1;
    }

    table
}

const fn set_if_valid(file: i32, rank: i32) -> u64 {
    if file < 0 || file > 7 || rank < 0 || rank > 7 {
        return 0;
    }
    1u64 << ((rank as usize) * 8 + (file as usize))
}

fn trace_ray(square: Square, file_step: i32, rank_step: i32, occupancy: u64) -> u64 {
    let mut file = square.file() as i32 + file_step;
    let mut rank = square.rank() as i32 + rank_step;
    let mut attacks = 0u64;

    while (0..8).contains(&file) && (0..8).contains(&rank) {
        let bit = 1u64 << (rank * 8 + file);
        attacks |= bit;

        if (occupancy & bit) != 0 {
            break;
        }

        file += file_step;
        rank += rank_step;
    }

    attacks
}

#[inline]
pub fn knight_attacks(square: Square) -> u64 {
    KNIGHT_ATTACKS[square.index()]
}

#[inline]
pub fn king_attacks(square: Square) -> u64 {
    KING_ATTACKS[square.index()]
}

#[inline]
pub fn pawn_attacks(color: Color, square: Square) -> u64 {
    match color {
        Color::White => WHITE_PAWN_ATTACKS[square.index()],
        Color::Black => BLACK_PAWN_ATTACKS[square.index()],
    }
}

pub fn rook_attacks(square: Square, occupancy: u64) -> u64 {
    ROOK_DIRECTIONS
        .iter()
        .fold(0u64, |acc, (df, dr)| acc | trace_ray(square, *df, *dr, occupancy))
}

pub fn bishop_attacks(square: Square, occupancy: u64) -> u64 {
    BISHOP_DIRECTIONS
        .iter()
        .fold(0u64, |acc, (df, dr)| acc | trace_ray(square, *df, *dr, occupancy))
}

#[inline]
pub fn queen_attacks(square: Square, occupancy: u64) -> u64 {
    rook_attacks(square, occupancy) | bishop_attacks(square, occupancy)
}

/// Squares a piece of `role` attacks from `square`. Pawns attack diagonally
/// only; their pushes are not attacks.
pub fn role_attacks(color: Color, role: Role, square: Square, occupancy: u64) -> u64 {
    match role {
        Role::Pawn => pawn_attacks(color, square),
        Role::Knight => knight_attacks(square),
        Role::Bishop => bishop_attacks(square, occupancy),
        Role::Rook => rook_attacks(square, occupancy),
        Role::Queen => queen_attacks(square, occupancy),
        Role::King => king_attacks(square),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().expect("test square should parse")
    }

    #[test]
    fn knight_attacks_from_d4_has_eight_targets() {
        assert_eq!(knight_attacks(sq("d4")).count_ones(), 8);
        assert_eq!(knight_attacks(sq("a1")).count_ones(), 2);
    }

    #[test]
    fn king_attacks_from_a1_has_three_targets() {
        assert_eq!(king_attacks(sq("a1")).count_ones(), 3);
    }

    #[test]
    fn pawn_attacks_point_forward() {
        assert_eq!(
            pawn_attacks(Color::White, sq("e2")),
            sq("d3").bit() | sq("f3").bit()
        );
        assert_eq!(
            pawn_attacks(Color::Black, sq("e7")),
            sq("d6").bit() | sq("f6").bit()
        );
        assert_eq!(pawn_attacks(Color::White, sq("a8")), 0);
    }

    #[test]
    fn bishop_blocker_stops_ray() {
        let attacks = bishop_attacks(sq("c1"), sq("e3").bit());
        assert_ne!(attacks & sq("e3").bit(), 0);
        assert_eq!(attacks & sq("f4").bit(), 0);
    }

    #[test]
    fn queen_attacks_on_empty_board_from_d4() {
        assert_eq!(queen_attacks(sq("d4"), 0).count_ones(), 27);
        assert_eq!(rook_attacks(sq("a1"), 0).count_ones(), 14);
    }
}
