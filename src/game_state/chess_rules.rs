//! Rule constants and the promotion-role tables of the variant.

use crate::game_state::chess_types::{Color, Role, RoleSet, Square};

/// Standard starting position as a snapshot (FEN fields plus empty pools,
/// markers, and repetition history).
pub const STARTING_POSITION_SNAPSHOT: &str =
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 - - -";

/// Half-moves without pawn move, capture, tap, or unblink before a draw can be claimed.
pub const FIFTY_MOVE_HALFMOVES: u16 = 100;

/// Occurrences of one position (including the current one) needed to claim a draw.
pub const REPETITION_CLAIM_COUNT: usize = 3;

/// Largest trace count one pool entry may hold. Decoding rejects larger
/// counts and a move that would exceed it is refused.
pub const MAX_TRACE_COUNT: u32 = 1 << 20;

/// Roles always available to a promoting or committing pawn.
pub const NON_BISHOP_ROLES: [Role; 3] = [Role::Queen, Role::Knight, Role::Rook];

/// Reference promotion square: the destination file on the mover's last rank.
#[inline]
pub fn promotion_square(color: Color, dest: Square) -> Square {
    Square::from_coords(dest.file(), color.last_rank()).unwrap_or(dest)
}

/// Bishop is only offered when `orig` shares a square color with the
/// reference promotion square.
#[inline]
pub fn bishop_allowed(color: Color, orig: Square, dest: Square) -> bool {
    orig.same_color(promotion_square(color, dest))
}

/// Roles a pawn may promote to when moving `orig -> dest`.
pub fn promotion_roles(color: Color, orig: Square, dest: Square) -> RoleSet {
    let mut roles: RoleSet = NON_BISHOP_ROLES.into_iter().collect();
    if bishop_allowed(color, orig, dest) {
        roles.insert(Role::Bishop);
    }
    roles
}

/// Roles a tapped piece that may be a pawn can commit to when tapped from
/// `orig` to `dest`. Staying a pawn is only possible for a straight push,
/// which keeps the piece behind the promotion rank.
pub fn tap_commit_roles(color: Color, orig: Square, dest: Square) -> RoleSet {
    let mut roles = promotion_roles(color, orig, dest);
    if orig.file() == dest.file() && dest.rank() != color.last_rank() {
        roles.insert(Role::Pawn);
    }
    roles
}
