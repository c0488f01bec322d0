//! Full legal move enumeration.
//!
//! Candidate destinations come from the reach sets; each candidate is then
//! confirmed by `validate_move`. Blink contexts are limited to at most one
//! consumed trace per move, which keeps the list finite and small.

use std::collections::BTreeSet;

use tracing::trace;

use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_queries::{COMMIT_CHOICES, PROMOTION_CHOICES};
use crate::move_generation::legal_move_reach::{
    launch_pawn_reach, launch_reach, pending_reach,
};
use crate::move_generation::legal_move_validate::validate_move;
use crate::moves::move_model::Move;

pub fn generate_legal_moves(board: &Board) -> Vec<Move> {
    let color = board.turn();
    let mut legal = Vec::with_capacity(64);

    for (orig, piece) in board.pieces().filter(|(_, piece)| piece.color == color) {
        match piece.role() {
            Some(role) => {
                let code = PieceCode::new(color, role);
                for blinks in blink_contexts(board, code, orig) {
                    let mut targets = if role == Role::Pawn {
                        launch_pawn_reach(board, color, orig, &blinks, Some(orig), true).all()
                    } else {
                        launch_reach(board, color, role, orig, &blinks, Some(orig), false)
                    };
                    if role == Role::King && blinks.is_empty() {
                        targets |= castling_targets(orig);
                    }
                    push_piece_moves(board, orig, targets, &blinks, &mut legal);
                }
            }
            None => {
                let targets = pending_reach(board, color, piece.possible_roles(), orig);
                push_piece_moves(board, orig, targets, &BTreeSet::new(), &mut legal);
                for role in piece.possible_roles().iter() {
                    for blinks in blink_contexts(board, PieceCode::new(color, role), orig) {
                        push_if_legal(board, Move::unblink(orig, role).with_blinks(blinks), &mut legal);
                    }
                }
            }
        }
    }

    for (orig, pool) in board.pools() {
        if !board.is_empty(orig) {
            continue;
        }
        for role in pool.roles_for(color).filter(|role| *role != Role::King) {
            for blinks in blink_contexts(board, PieceCode::new(color, role), orig) {
                let targets = if role == Role::Pawn {
                    launch_pawn_reach(board, color, orig, &blinks, None, false).all()
                } else {
                    launch_reach(board, color, role, orig, &blinks, None, false)
                };
                for dest in squares_of(targets) {
                    for promotion in std::iter::once(None).chain(COMMIT_CHOICES.map(Some)) {
                        let tap = Move::tap(orig, dest, role, promotion).with_blinks(blinks.iter().copied());
                        push_if_legal(board, tap, &mut legal);
                    }
                }
            }
        }
    }

    legal
}

/// The empty context plus one single-square context per other pool holding `code`.
fn blink_contexts(board: &Board, code: PieceCode, orig: Square) -> Vec<BTreeSet<Square>> {
    std::iter::once(BTreeSet::new())
        .chain(
            board
                .blink_squares(code)
                .into_iter()
                .filter(|(square, _)| *square != orig)
                .map(|(square, _)| BTreeSet::from([square])),
        )
        .collect()
}

fn castling_targets(orig: Square) -> u64 {
    [orig.offset(2, 0), orig.offset(-2, 0)]
        .into_iter()
        .flatten()
        .fold(0u64, |acc, sq| acc | sq.bit())
}

fn push_piece_moves(
    board: &Board,
    orig: Square,
    targets: u64,
    blinks: &BTreeSet<Square>,
    legal: &mut Vec<Move>,
) {
    let last_rank = board.turn().last_rank();
    for dest in squares_of(targets) {
        let standard = Move::standard(orig, dest).with_blinks(blinks.iter().copied());
        if validate_move(board, &standard).is_ok() {
            legal.push(standard);
        } else if dest.rank() == last_rank {
            for role in PROMOTION_CHOICES {
                let promotion = Move::promotion(orig, dest, role).with_blinks(blinks.iter().copied());
                push_if_legal(board, promotion, legal);
            }
        }
    }
}

fn push_if_legal(board: &Board, mv: Move, legal: &mut Vec<Move>) {
    match validate_move(board, &mv) {
        Ok(_) => legal.push(mv),
        Err(reason) => trace!(?mv, %reason, "candidate rejected"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::generate_legal_moves;
    use crate::game_state::board::Board;
    use crate::game_state::chess_types::{Role, Square};
    use crate::moves::move_model::Move;

    fn sq(name: &str) -> Square {
        name.parse().expect("test square should parse")
    }

    #[test]
    fn start_position_has_twenty_moves() {
        let moves = generate_legal_moves(&Board::new_game());
        assert_eq!(moves.len(), 20);
        assert!(moves.iter().all(|mv| mv.blinks().is_empty()));
    }

    #[test]
    fn traces_add_taps_and_launch_moves() {
        let mut board = Board::new_game();
        board
            .make_move(&Move::standard(sq("g1"), sq("f3")))
            .expect("Nf3 is legal");
        board
            .make_move(&Move::standard(sq("g8"), sq("f6")))
            .expect("Nf6 is legal");

        let moves = generate_legal_moves(&board);
        let taps: Vec<&Move> = moves
            .iter()
            .filter(|mv| matches!(mv, Move::Tap { .. }))
            .collect();
        assert_eq!(taps, vec![&Move::tap(sq("g1"), sq("h3"), Role::Knight, None)]);
        assert!(moves.contains(&Move::standard(sq("f3"), sq("h3")).with_blinks([sq("g1")])));
        assert!(moves.iter().all(|mv| board.is_legal(mv)));
    }

    #[test]
    fn promotions_are_listed_per_role() {
        let board = Board::from_snapshot("4k3/P7/8/8/8/8/8/4K3 w - - 0 1 - - -")
            .expect("snapshot should parse");
        let promotions: BTreeSet<Role> = generate_legal_moves(&board)
            .into_iter()
            .filter_map(|mv| match mv {
                Move::Promotion { role, .. } => Some(role),
                _ => None,
            })
            .collect();
        // a7 and a8 differ in color, so no bishop.
        assert_eq!(
            promotions,
            BTreeSet::from([Role::Knight, Role::Rook, Role::Queen])
        );
    }
}
