//! Highlighting queries built on the legality predicate.
//!
//! Each query only proposes shapes; the verdict always comes from
//! `validate_move`, so highlighted squares and accepted moves cannot drift.

use std::collections::BTreeSet;

use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_validate::validate_move;
use crate::moves::move_model::Move;

pub(crate) const PROMOTION_CHOICES: [Role; 4] = [Role::Queen, Role::Knight, Role::Rook, Role::Bishop];
pub(crate) const COMMIT_CHOICES: [Role; 5] = [
    Role::Queen,
    Role::Knight,
    Role::Rook,
    Role::Bishop,
    Role::Pawn,
];

fn is_legal(board: &Board, mv: &Move) -> bool {
    validate_move(board, mv).is_ok()
}

/// Destinations of the piece on `square` for standard and promotion moves.
pub fn legal_dests(board: &Board, square: Square, blinks: &BTreeSet<Square>) -> BTreeSet<Square> {
    let Some(piece) = board.piece_at(square) else {
        return BTreeSet::new();
    };
    if piece.color != board.turn() {
        return BTreeSet::new();
    }

    Square::all()
        .filter(|dest| *dest != square)
        .filter(|dest| {
            let standard = Move::standard(square, *dest).with_blinks(blinks.iter().copied());
            if is_legal(board, &standard) {
                return true;
            }
            dest.rank() == piece.color.last_rank()
                && PROMOTION_CHOICES.iter().any(|role| {
                    let promotion =
                        Move::promotion(square, *dest, *role).with_blinks(blinks.iter().copied());
                    is_legal(board, &promotion)
                })
        })
        .collect()
}

/// Legal taps of any pool entry on `square` with every tappable role and
/// commitment, as `(dest, role, promotion)` moves.
pub fn tap_moves(board: &Board, square: Square, blinks: &BTreeSet<Square>) -> Vec<Move> {
    if board.piece_at(square).is_some() {
        return Vec::new();
    }
    let Some(pool) = board.pool_at(square) else {
        return Vec::new();
    };
    let roles: Vec<Role> = pool
        .roles_for(board.turn())
        .filter(|role| *role != Role::King)
        .collect();

    let mut moves = Vec::new();
    for dest in Square::all().filter(|dest| *dest != square) {
        for role in &roles {
            let commitments = std::iter::once(None).chain(COMMIT_CHOICES.iter().copied().map(Some));
            for promotion in commitments {
                let tap = Move::tap(square, dest, *role, promotion).with_blinks(blinks.iter().copied());
                if is_legal(board, &tap) {
                    moves.push(tap);
                }
            }
        }
    }
    moves
}

/// Destinations reachable by some tap from the pool on `square`.
pub fn legal_taps(board: &Board, square: Square, blinks: &BTreeSet<Square>) -> BTreeSet<Square> {
    tap_moves(board, square, blinks)
        .iter()
        .filter_map(Move::dest)
        .collect()
}

/// Unblinks of the pending piece on `square`.
pub fn unblink_moves(board: &Board, square: Square, blinks: &BTreeSet<Square>) -> Vec<Move> {
    let Some(piece) = board.piece_at(square) else {
        return Vec::new();
    };
    if !piece.is_pending() || piece.color != board.turn() {
        return Vec::new();
    }
    piece
        .possible_roles()
        .iter()
        .map(|role| Move::unblink(square, role).with_blinks(blinks.iter().copied()))
        .filter(|mv| is_legal(board, mv))
        .collect()
}

/// Whether `square` offers a tap or an unblink to the side to move.
pub fn can_blink(board: &Board, square: Square, blinks: &BTreeSet<Square>) -> bool {
    match board.piece_at(square) {
        Some(_) => !unblink_moves(board, square, blinks).is_empty(),
        None => !legal_taps(board, square, blinks).is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{can_blink, legal_dests, legal_taps};
    use crate::game_state::board::Board;
    use crate::game_state::chess_types::Square;

    fn sq(name: &str) -> Square {
        name.parse().expect("test square should parse")
    }

    fn set(names: &[&str]) -> BTreeSet<Square> {
        names.iter().map(|name| sq(name)).collect()
    }

    #[test]
    fn start_position_destinations() {
        let board = Board::new_game();
        assert_eq!(legal_dests(&board, sq("g1"), &BTreeSet::new()), set(&["f3", "h3"]));
        assert_eq!(legal_dests(&board, sq("e2"), &BTreeSet::new()), set(&["e3", "e4"]));
        assert!(legal_dests(&board, sq("e7"), &BTreeSet::new()).is_empty());
        assert!(legal_dests(&board, sq("e4"), &BTreeSet::new()).is_empty());
    }

    #[test]
    fn promotion_square_is_highlighted() {
        let board = Board::from_snapshot("4k3/P7/8/8/8/8/8/4K3 w - - 0 1 - - -")
            .expect("snapshot should parse");
        assert_eq!(legal_dests(&board, sq("a7"), &BTreeSet::new()), set(&["a8"]));
    }

    #[test]
    fn blink_context_widens_destinations() {
        let board = Board::from_snapshot("4k3/8/8/8/8/8/8/4K1N1 w - - 0 1 b1:N1 - -")
            .expect("snapshot should parse");
        let plain = legal_dests(&board, sq("g1"), &BTreeSet::new());
        let launched = legal_dests(&board, sq("g1"), &set(&["b1"]));
        assert!(!plain.contains(&sq("c3")));
        assert!(launched.contains(&sq("c3")));
        assert!(launched.is_superset(&plain));
    }

    #[test]
    fn taps_and_blinks_after_a_knight_move() {
        let mut board = Board::new_game();
        board
            .make_move(&crate::moves::move_model::Move::standard(sq("g1"), sq("f3")))
            .expect("Nf3 is legal");
        board
            .make_move(&crate::moves::move_model::Move::standard(sq("g8"), sq("f6")))
            .expect("Nf6 is legal");

        assert_eq!(legal_taps(&board, sq("g1"), &BTreeSet::new()), set(&["h3"]));
        assert!(can_blink(&board, sq("g1"), &BTreeSet::new()));
        assert!(!can_blink(&board, sq("g8"), &BTreeSet::new()));
        assert!(!can_blink(&board, sq("f3"), &BTreeSet::new()));
    }
}
