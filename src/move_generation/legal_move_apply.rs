//! Move execution.
//!
//! A `MovePlan` is executed on a clone of the board; the caller only sees the
//! new position when every step, including the final king-safety check,
//! succeeded.

use tracing::{debug, warn};

use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::errors::{IllegalMove, MoveResult};
use crate::move_generation::legal_move_validate::{validate_move, MovePlan};
use crate::moves::move_model::Move;

/// Validate and execute `mv`, returning the resulting position.
pub fn apply_move(board: &Board, mv: &Move) -> MoveResult<Board> {
    match validate_move(board, mv) {
        Ok(next) => {
            debug!(
                mover = %board.turn(),
                orig = %mv.orig(),
                dest = ?mv.dest(),
                blinks = mv.blinks().len(),
                "applied move"
            );
            Ok(next)
        }
        Err(err) => {
            warn!(mover = %board.turn(), orig = %mv.orig(), %err, "rejected move");
            Err(err)
        }
    }
}

pub fn execute_plan(board: &Board, plan: &MovePlan) -> MoveResult<Board> {
    let mover = board.turn();
    let mut next = board.clone();

    for (square, code) in &plan.traces_consumed {
        if !next.consume_trace(*square, *code) {
            return Err(IllegalMove::MissingBlink {
                square: *square,
                role: code.role,
            });
        }
    }
    for square in &plan.removals {
        next.squares[square.index()] = None;
    }
    for (square, piece) in &plan.placements {
        next.squares[square.index()] = Some(*piece);
    }
    for (square, code) in &plan.traces_added {
        if !next.add_trace(*square, *code) {
            return Err(IllegalMove::PoolFull(*square));
        }
    }

    for square in &plan.touched {
        next.castling_rights &= !castling_rights_lost(*square);
    }
    next.en_passant = plan.en_passant;

    if plan.irreversible {
        next.halfmove_clock = 0;
        next.repetition_history.clear();
    } else {
        next.halfmove_clock = next.halfmove_clock.saturating_add(1);
        next.repetition_history.push(board.position_key());
    }
    if mover == Color::Black {
        next.fullmove_number = next.fullmove_number.saturating_add(1);
    }
    next.turn = mover.opposite();

    if next.in_check(mover) {
        return Err(IllegalMove::LeavesKingInCheck);
    }
    Ok(next)
}

/// Rights that disappear once anything moves from or to `square`.
fn castling_rights_lost(square: Square) -> CastlingRights {
    match square.index() {
        0 => CASTLE_WHITE_QUEENSIDE,
        4 => CASTLE_WHITE_KINGSIDE | CASTLE_WHITE_QUEENSIDE,
        7 => CASTLE_WHITE_KINGSIDE,
        56 => CASTLE_BLACK_QUEENSIDE,
        60 => CASTLE_BLACK_KINGSIDE | CASTLE_BLACK_QUEENSIDE,
        63 => CASTLE_BLACK_KINGSIDE,
        _ => 0,
    }
}
