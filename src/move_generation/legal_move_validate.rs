//! Legality of a single `Move`.
//!
//! Validation builds a `MovePlan` describing every change the move makes and
//! then executes it on a scratch copy, so the king-safety test and the blink
//! accounting run through exactly the code `make_move` uses.

use std::collections::BTreeSet;

use crate::game_state::board::Board;
use crate::game_state::chess_rules::{promotion_roles, tap_commit_roles};
use crate::game_state::chess_types::*;
use crate::game_state::errors::{IllegalMove, MoveResult};
use crate::game_state::piece::{Piece, PieceState};
use crate::move_generation::legal_move_apply::execute_plan;
use crate::move_generation::legal_move_checks::is_square_attacked;
use crate::move_generation::legal_move_reach::{
    last_rank_mask, launch_pawn_reach, launch_reach, pending_reach, role_reach,
};
use crate::moves::move_model::Move;

/// Every change a legal move makes, applied in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovePlan {
    pub traces_consumed: Vec<(Square, PieceCode)>,
    pub removals: Vec<Square>,
    pub placements: Vec<(Square, Piece)>,
    pub traces_added: Vec<(Square, PieceCode)>,
    /// Squares whose contents changed, for castling-rights bookkeeping.
    pub touched: Vec<Square>,
    pub en_passant: Option<Square>,
    /// Pawn moves, captures, promotions, taps and unblinks reset the
    /// half-move clock and the repetition history.
    pub irreversible: bool,
}

/// Validate `mv` and return the position after it.
pub fn validate_move(board: &Board, mv: &Move) -> MoveResult<Board> {
    let plan = plan_move(board, mv)?;
    execute_plan(board, &plan)
}

pub fn plan_move(board: &Board, mv: &Move) -> MoveResult<MovePlan> {
    let orig = mv.orig();
    if mv.blinks().contains(&orig) {
        return Err(IllegalMove::BlinkOnOrigin(orig));
    }
    match mv {
        Move::Standard { orig, dest, blinks } => plan_standard(board, *orig, *dest, blinks),
        Move::Promotion {
            orig,
            dest,
            role,
            blinks,
        } => plan_promotion(board, *orig, *dest, *role, blinks),
        Move::Tap {
            orig,
            dest,
            role,
            promotion,
            blinks,
        } => plan_tap(board, *orig, *dest, *role, *promotion, blinks),
        Move::Unblink { orig, role, blinks } => plan_unblink(board, *orig, *role, blinks),
    }
}

fn own_piece(board: &Board, orig: Square) -> MoveResult<Piece> {
    let piece = board
        .piece_at(orig)
        .ok_or(IllegalMove::NoPieceOnOrigin(orig))?;
    if piece.color != board.turn() {
        return Err(IllegalMove::NotYourPiece(orig));
    }
    Ok(piece)
}

/// Destination must differ from the origin and hold no friendly piece or king.
/// Returns whether the move captures.
fn check_destination(board: &Board, orig: Square, dest: Square) -> MoveResult<bool> {
    if orig == dest {
        return Err(IllegalMove::NullMove);
    }
    match board.piece_at(dest) {
        None => Ok(false),
        Some(target) if target.color == board.turn() => {
            Err(IllegalMove::OwnPieceOnDestination(dest))
        }
        Some(target) if target.role() == Some(Role::King) => Err(IllegalMove::KingCapture(dest)),
        Some(_) => Ok(true),
    }
}

fn consume_blinks(plan: &mut MovePlan, blinks: &BTreeSet<Square>, code: PieceCode) {
    plan.traces_consumed
        .extend(blinks.iter().map(|square| (*square, code)));
}

fn plan_standard(
    board: &Board,
    orig: Square,
    dest: Square,
    blinks: &BTreeSet<Square>,
) -> MoveResult<MovePlan> {
    let piece = own_piece(board, orig)?;
    let color = piece.color;

    let Some(role) = piece.role() else {
        return plan_pending_move(board, piece, orig, dest, blinks);
    };

    if role == Role::King && blinks.is_empty() {
        if let Some(rook_from) = castling_rook(color, orig, dest) {
            return plan_castling(board, piece, orig, dest, rook_from);
        }
    }

    let capture = check_destination(board, orig, dest)?;
    let mut plan = MovePlan::default();
    let code = PieceCode::new(color, role);

    if role == Role::Pawn {
        let reach = launch_pawn_reach(board, color, orig, blinks, Some(orig), true);
        if reach.all() & dest.bit() == 0 {
            return Err(IllegalMove::Unreachable { orig, dest });
        }
        if dest.rank() == color.last_rank() {
            return Err(IllegalMove::PromotionRequired);
        }
        if !capture && reach.captures & dest.bit() != 0 && board.en_passant() == Some(dest) {
            let victim = dest
                .offset(0, -color.forward())
                .filter(|sq| board.piece_at(*sq).is_some_and(|p| p.color != color));
            if let Some(victim) = victim {
                plan.removals.push(victim);
                plan.touched.push(victim);
            }
        }
        if reach.double_pushes & dest.bit() != 0 {
            plan.en_passant = dest.offset(0, -color.forward());
        }
        plan.irreversible = true;
    } else {
        let reach = launch_reach(board, color, role, orig, blinks, Some(orig), false);
        if reach & dest.bit() == 0 {
            return Err(IllegalMove::Unreachable { orig, dest });
        }
        plan.irreversible = capture;
    }

    consume_blinks(&mut plan, blinks, code);
    plan.removals.push(orig);
    plan.placements.push((dest, piece));
    plan.traces_added.push((orig, code));
    plan.touched.extend([orig, dest]);
    Ok(plan)
}

fn plan_pending_move(
    board: &Board,
    piece: Piece,
    orig: Square,
    dest: Square,
    blinks: &BTreeSet<Square>,
) -> MoveResult<MovePlan> {
    if !blinks.is_empty() {
        return Err(IllegalMove::BlinksWithoutRole);
    }
    let capture = check_destination(board, orig, dest)?;
    let candidates = piece.possible_roles();
    if pending_reach(board, piece.color, candidates, orig) & dest.bit() == 0 {
        return Err(IllegalMove::Unreachable { orig, dest });
    }
    Ok(MovePlan {
        removals: vec![orig],
        placements: vec![(dest, piece)],
        touched: vec![orig, dest],
        irreversible: capture || candidates.contains(Role::Pawn),
        ..MovePlan::default()
    })
}

/// Corner rook square when `orig -> dest` has the shape of a castling move.
fn castling_rook(color: Color, orig: Square, dest: Square) -> Option<Square> {
    let home_rank = color.last_rank() ^ 7;
    if orig.rank() != home_rank || dest.rank() != home_rank || orig.file() != 4 {
        return None;
    }
    match dest.file() {
        6 => Square::from_coords(7, home_rank),
        2 => Square::from_coords(0, home_rank),
        _ => None,
    }
}

fn castling_right(color: Color, kingside: bool) -> CastlingRights {
    match (color, kingside) {
        (Color::White, true) => CASTLE_WHITE_KINGSIDE,
        (Color::White, false) => CASTLE_WHITE_QUEENSIDE,
        (Color::Black, true) => CASTLE_BLACK_KINGSIDE,
        (Color::Black, false) => CASTLE_BLACK_QUEENSIDE,
    }
}

fn plan_castling(
    board: &Board,
    king: Piece,
    orig: Square,
    dest: Square,
    rook_from: Square,
) -> MoveResult<MovePlan> {
    let color = king.color;
    let kingside = rook_from.file() > orig.file();
    if board.castling_rights() & castling_right(color, kingside) == 0 {
        return Err(IllegalMove::CastlingUnavailable);
    }
    let rook = board
        .piece_at(rook_from)
        .filter(|rook| rook.is(color, Role::Rook))
        .ok_or(IllegalMove::CastlingUnavailable)?;

    let (low, high) = if kingside {
        (orig.file() + 1, rook_from.file())
    } else {
        (rook_from.file() + 1, orig.file())
    };
    let path_clear = (low..high)
        .filter_map(|file| Square::from_coords(file, orig.rank()))
        .all(|sq| board.is_empty(sq));
    if !path_clear {
        return Err(IllegalMove::CastlingUnavailable);
    }

    let step: i8 = if kingside { 1 } else { -1 };
    let transit = orig
        .offset(step, 0)
        .ok_or(IllegalMove::CastlingUnavailable)?;
    let enemy = color.opposite();
    if is_square_attacked(board, orig, enemy) || is_square_attacked(board, transit, enemy) {
        return Err(IllegalMove::CastlingUnavailable);
    }

    Ok(MovePlan {
        removals: vec![orig, rook_from],
        placements: vec![(dest, king), (transit, rook)],
        traces_added: vec![(orig, PieceCode::new(color, Role::King))],
        touched: vec![orig, rook_from],
        ..MovePlan::default()
    })
}

fn plan_promotion(
    board: &Board,
    orig: Square,
    dest: Square,
    role: Role,
    blinks: &BTreeSet<Square>,
) -> MoveResult<MovePlan> {
    let piece = own_piece(board, orig)?;
    let color = piece.color;
    if piece.role() != Some(Role::Pawn) || dest.rank() != color.last_rank() {
        return Err(IllegalMove::PromotionNotApplicable);
    }
    check_destination(board, orig, dest)?;

    let reach = launch_pawn_reach(board, color, orig, blinks, Some(orig), false);
    if reach.all() & dest.bit() == 0 {
        return Err(IllegalMove::Unreachable { orig, dest });
    }

    let allowed = match piece.committed_promotion() {
        Some(Role::Pawn) => RoleSet::EMPTY,
        Some(committed) => RoleSet::EMPTY.with(committed),
        None => promotion_roles(color, orig, dest),
    };
    if !allowed.contains(role) {
        return Err(IllegalMove::BadPromotionRole(role));
    }

    let code = PieceCode::new(color, Role::Pawn);
    let mut plan = MovePlan {
        removals: vec![orig],
        placements: vec![(dest, piece.promoted(role))],
        traces_added: vec![(orig, code)],
        touched: vec![orig, dest],
        irreversible: true,
        ..MovePlan::default()
    };
    consume_blinks(&mut plan, blinks, code);
    Ok(plan)
}

/// Roles a tap of `role` from `orig` to `dest` leaves undecided.
pub fn tap_candidates(board: &Board, color: Color, role: Role, orig: Square, dest: Square) -> RoleSet {
    let last_rank = last_rank_mask(color);
    let mut candidates = RoleSet::EMPTY.with(role);
    for other in TAPPABLE_ROLES {
        if other == role || board.pool_count(orig, PieceCode::new(color, other)) == 0 {
            continue;
        }
        let mut reach = role_reach(board, color, other, orig, None, false);
        if other == Role::Pawn {
            reach &= !last_rank;
        }
        if reach & dest.bit() != 0 {
            candidates.insert(other);
        }
    }
    candidates
}

fn plan_tap(
    board: &Board,
    orig: Square,
    dest: Square,
    role: Role,
    promotion: Option<Role>,
    blinks: &BTreeSet<Square>,
) -> MoveResult<MovePlan> {
    if board.piece_at(orig).is_some() {
        return Err(IllegalMove::OriginOccupied(orig));
    }
    if role == Role::King {
        return Err(IllegalMove::UntappableRole(role));
    }
    let color = board.turn();
    let code = PieceCode::new(color, role);
    if board.pool_count(orig, code) == 0 {
        return Err(IllegalMove::MissingBlink { square: orig, role });
    }
    check_destination(board, orig, dest)?;

    let mut reach = if role == Role::Pawn {
        launch_pawn_reach(board, color, orig, blinks, None, false).all() & !last_rank_mask(color)
    } else {
        launch_reach(board, color, role, orig, blinks, None, false)
    };
    reach &= !orig.bit();
    if reach & dest.bit() == 0 {
        return Err(IllegalMove::Unreachable { orig, dest });
    }

    let candidates = tap_candidates(board, color, role, orig, dest);
    let committed = if candidates.contains(Role::Pawn) {
        let commit = promotion.ok_or(IllegalMove::CommitmentRequired)?;
        if !tap_commit_roles(color, orig, dest).contains(commit) {
            return Err(IllegalMove::BadCommitment(commit));
        }
        Some(commit)
    } else {
        if promotion.is_some() {
            return Err(IllegalMove::PromotionNotApplicable);
        }
        None
    };

    let mut plan = MovePlan {
        traces_consumed: vec![(orig, code)],
        placements: vec![(dest, Piece::pending(color, candidates, orig, committed))],
        touched: vec![dest],
        irreversible: true,
        ..MovePlan::default()
    };
    consume_blinks(&mut plan, blinks, code);
    Ok(plan)
}

fn plan_unblink(
    board: &Board,
    orig: Square,
    role: Role,
    blinks: &BTreeSet<Square>,
) -> MoveResult<MovePlan> {
    let piece = board
        .piece_at(orig)
        .ok_or(IllegalMove::NothingToUnblink(orig))?;
    if piece.color != board.turn() {
        return Err(IllegalMove::NotYourPiece(orig));
    }
    let PieceState::Pending {
        candidates,
        origin,
        promotion,
    } = piece.state
    else {
        return Err(IllegalMove::NothingToUnblink(orig));
    };
    if !candidates.contains(role) {
        return Err(IllegalMove::NotACandidate(role));
    }

    let code = PieceCode::new(piece.color, role);
    let revealed = Piece {
        color: piece.color,
        state: PieceState::Revealed {
            role,
            origin,
            promotion: promotion.filter(|_| role == Role::Pawn),
        },
    };
    let mut plan = MovePlan {
        traces_consumed: vec![(origin, code)],
        placements: vec![(orig, revealed)],
        irreversible: true,
        ..MovePlan::default()
    };
    consume_blinks(&mut plan, blinks, code);
    Ok(plan)
}
