//! Geometric destination sets before king-safety filtering.
//!
//! `vacated` is the origin of the moving piece: rays traced from a launch
//! point pass through it because the piece is leaving that square.

use std::collections::BTreeSet;

use crate::game_state::board::Board;
use crate::game_state::chess_types::{Color, Role, RoleSet, Square};
use crate::moves::attacks::{pawn_attacks, role_attacks};

/// Pawn destinations split by how they are reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PawnReach {
    pub pushes: u64,
    pub double_pushes: u64,
    pub captures: u64,
}

impl PawnReach {
    #[inline]
    pub fn all(&self) -> u64 {
        self.pushes | self.double_pushes | self.captures
    }

    fn union(self, other: PawnReach) -> PawnReach {
        PawnReach {
            pushes: self.pushes | other.pushes,
            double_pushes: self.double_pushes | other.double_pushes,
            captures: self.captures | other.captures,
        }
    }
}

fn masks(board: &Board, color: Color, vacated: Option<Square>) -> (u64, u64) {
    let keep = !vacated.map_or(0, |sq| sq.bit());
    (board.occupancy() & keep, board.occupancy_of(color) & keep)
}

/// Pawn pushes (to empty squares) and captures from `from`. The en-passant
/// target is a capture square when `with_en_passant` is set.
pub fn pawn_reach(
    board: &Board,
    color: Color,
    from: Square,
    vacated: Option<Square>,
    with_en_passant: bool,
) -> PawnReach {
    let (occupancy, own) = masks(board, color, vacated);
    let enemy = occupancy & !own;
    let forward = color.forward();
    let mut reach = PawnReach::default();

    if let Some(one) = from.offset(0, forward) {
        if occupancy & one.bit() == 0 {
            reach.pushes |= one.bit();
            if from.rank() == color.pawn_rank() {
                if let Some(two) = one.offset(0, forward) {
                    if occupancy & two.bit() == 0 {
                        reach.double_pushes |= two.bit();
                    }
                }
            }
        }
    }

    let attacks = pawn_attacks(color, from);
    reach.captures = attacks & enemy;
    if with_en_passant {
        if let Some(ep) = board.en_passant() {
            if attacks & ep.bit() != 0 && occupancy & ep.bit() == 0 {
                reach.captures |= ep.bit();
            }
        }
    }

    reach
}

/// Destinations of a piece of `role` standing on `from`.
pub fn role_reach(
    board: &Board,
    color: Color,
    role: Role,
    from: Square,
    vacated: Option<Square>,
    with_en_passant: bool,
) -> u64 {
    if role == Role::Pawn {
        return pawn_reach(board, color, from, vacated, with_en_passant).all();
    }
    let (occupancy, own) = masks(board, color, vacated);
    role_attacks(color, role, from, occupancy) & !own
}

/// Union of pawn reaches from the origin and every launch point.
pub fn launch_pawn_reach(
    board: &Board,
    color: Color,
    orig: Square,
    blinks: &BTreeSet<Square>,
    vacated: Option<Square>,
    with_en_passant: bool,
) -> PawnReach {
    std::iter::once(orig)
        .chain(blinks.iter().copied())
        .map(|from| pawn_reach(board, color, from, vacated, with_en_passant))
        .fold(PawnReach::default(), PawnReach::union)
}

/// Union of `role` destinations from the origin and every launch point,
/// never including the origin itself.
pub fn launch_reach(
    board: &Board,
    color: Color,
    role: Role,
    orig: Square,
    blinks: &BTreeSet<Square>,
    vacated: Option<Square>,
    with_en_passant: bool,
) -> u64 {
    let reach = std::iter::once(orig)
        .chain(blinks.iter().copied())
        .fold(0u64, |acc, from| {
            acc | role_reach(board, color, role, from, vacated, with_en_passant)
        });
    reach & !orig.bit()
}

/// Squares every candidate of a pending piece can reach. A piece that may be
/// a pawn never enters the last rank.
pub fn pending_reach(board: &Board, color: Color, candidates: RoleSet, orig: Square) -> u64 {
    if candidates.is_empty() {
        return 0;
    }
    let mut reach = candidates.iter().fold(u64::MAX, |acc, role| {
        acc & role_reach(board, color, role, orig, Some(orig), false)
    });
    if candidates.contains(Role::Pawn) {
        reach &= !last_rank_mask(color);
    }
    reach
}

#[inline]
pub fn last_rank_mask(color: Color) -> u64 {
    0xFFu64 << (8 * color.last_rank() as u64)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{launch_reach, pawn_reach, pending_reach, role_reach};
    use crate::game_state::board::Board;
    use crate::game_state::chess_types::{squares_of, Color, Role, RoleSet, Square};

    fn sq(name: &str) -> Square {
        name.parse().expect("test square should parse")
    }

    fn names(mask: u64) -> Vec<String> {
        squares_of(mask).map(|s| s.to_string()).collect()
    }

    #[test]
    fn start_pawn_has_single_and_double_push() {
        let board = Board::new_game();
        let reach = pawn_reach(&board, Color::White, sq("e2"), Some(sq("e2")), true);
        assert_eq!(names(reach.pushes), vec!["e3"]);
        assert_eq!(names(reach.double_pushes), vec!["e4"]);
        assert_eq!(reach.captures, 0);
    }

    #[test]
    fn knight_reach_excludes_own_pieces() {
        let board = Board::new_game();
        let reach = role_reach(&board, Color::White, Role::Knight, sq("g1"), Some(sq("g1")), false);
        assert_eq!(names(reach), vec!["f3", "h3"]);
    }

    #[test]
    fn launch_point_extends_reach() {
        let board = Board::new_game();
        let blinks: BTreeSet<Square> = [sq("d4")].into_iter().collect();
        let reach = launch_reach(&board, Color::White, Role::Knight, sq("g1"), &blinks, Some(sq("g1")), false);
        assert_ne!(reach & sq("c6").bit(), 0);
        assert_ne!(reach & sq("f3").bit(), 0);
        assert_eq!(reach & sq("g1").bit(), 0);
    }

    #[test]
    fn pending_reach_is_intersection() {
        let board = Board::new_game();
        let candidates = RoleSet::EMPTY.with(Role::Bishop).with(Role::Queen);
        // From d4 the intersection of bishop and queen moves is the bishop's set.
        let bishop = role_reach(&board, Color::White, Role::Bishop, sq("d4"), Some(sq("d4")), false);
        assert_eq!(pending_reach(&board, Color::White, candidates, sq("d4")), bishop);

        let knight_or_rook = RoleSet::EMPTY.with(Role::Knight).with(Role::Rook);
        assert_eq!(pending_reach(&board, Color::White, knight_or_rook, sq("d4")), 0);
    }
}
