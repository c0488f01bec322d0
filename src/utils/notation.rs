//! Human-readable move notation.
//!
//! Settled pieces use SAN-like text (`Nf3`, `exd5`, `Rad1`, `e8=Q`). The
//! variant adds `?d4xe5` for pending pieces, `N*g1f3` for taps, `f3!B` for
//! unblinks, and a `(b1,d2)` suffix listing consumed blinks.

use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::errors::MoveResult;
use crate::move_generation::legal_move_validate::validate_move;
use crate::moves::move_model::Move;
use crate::utils::algebraic::{file_char, rank_char};

/// Notation for `mv` played on `board`; fails if the move is illegal there.
pub fn move_to_notation(board: &Board, mv: &Move) -> MoveResult<String> {
    let next = validate_move(board, mv)?;
    let mover = board.turn();

    let mut out = match mv {
        Move::Standard { orig, dest, .. } => standard_text(board, *orig, *dest, mv.blinks().is_empty()),
        Move::Promotion { orig, dest, role, .. } => {
            format!("{}={}", pawn_text(board, *orig, *dest), role.upper_char())
        }
        Move::Tap {
            orig,
            dest,
            role,
            promotion,
            ..
        } => {
            let mut text = format!(
                "{}*{orig}{}{dest}",
                role.upper_char(),
                capture_mark(board, *dest)
            );
            if let Some(commit) = promotion {
                text.push('/');
                text.push(commit.upper_char());
            }
            text
        }
        Move::Unblink { orig, role, .. } => format!("{orig}!{}", role.upper_char()),
    };

    if !mv.blinks().is_empty() {
        let squares: Vec<String> = mv.blinks().iter().map(Square::to_string).collect();
        out.push_str(&format!("({})", squares.join(",")));
    }
    if next.in_check(mover.opposite()) {
        out.push('+');
    }
    Ok(out)
}

fn capture_mark(board: &Board, dest: Square) -> &'static str {
    if board.piece_at(dest).is_some() {
        "x"
    } else {
        ""
    }
}

fn pawn_text(board: &Board, orig: Square, dest: Square) -> String {
    let en_passant = board.en_passant() == Some(dest) && orig.file() != dest.file();
    if board.piece_at(dest).is_some() || en_passant {
        format!("{}x{dest}", file_char(orig))
    } else {
        dest.to_string()
    }
}

fn standard_text(board: &Board, orig: Square, dest: Square, no_blinks: bool) -> String {
    let Some(piece) = board.piece_at(orig) else {
        return format!("{orig}{dest}");
    };
    let Some(role) = piece.role() else {
        return format!("?{orig}{}{dest}", capture_mark(board, dest));
    };

    match role {
        Role::Pawn => pawn_text(board, orig, dest),
        Role::King if no_blinks && orig.file() == 4 && dest.rank() == orig.rank() => {
            match dest.file() {
                6 => "O-O".to_owned(),
                2 => "O-O-O".to_owned(),
                _ => format!("K{}{dest}", capture_mark(board, dest)),
            }
        }
        _ => format!(
            "{}{}{}{dest}",
            role.upper_char(),
            disambiguation(board, role, orig, dest),
            capture_mark(board, dest)
        ),
    }
}

/// File, rank, or both when another piece of the same role could also
/// move to `dest`.
fn disambiguation(board: &Board, role: Role, orig: Square, dest: Square) -> String {
    let rivals: Vec<Square> = board
        .pieces()
        .filter(|(square, piece)| {
            *square != orig
                && piece.color == board.turn()
                && piece.role() == Some(role)
                && validate_move(board, &Move::standard(*square, dest)).is_ok()
        })
        .map(|(square, _)| square)
        .collect();

    if rivals.is_empty() {
        String::new()
    } else if rivals.iter().all(|sq| sq.file() != orig.file()) {
        file_char(orig).to_string()
    } else if rivals.iter().all(|sq| sq.rank() != orig.rank()) {
        rank_char(orig).to_string()
    } else {
        orig.to_string()
    }
}
