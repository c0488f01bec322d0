//! Live pieces and their identity state.
//!
//! A piece created by a tap does not have a single role until its owner
//! unblinks it. That window is modelled as `PieceState::Pending` so every
//! consumer has to decide how to treat a set of candidate roles.

use crate::game_state::chess_types::{Color, PieceCode, Role, RoleSet, Square};

/// Identity of a live piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceState {
    /// Ordinary piece with a known role.
    Settled(Role),
    /// Tapped piece whose role is one of `candidates` until resolved.
    Pending {
        candidates: RoleSet,
        origin: Square,
        promotion: Option<Role>,
    },
    /// Tapped piece resolved by an unblink. The marker is kept for history only.
    Revealed {
        role: Role,
        origin: Square,
        promotion: Option<Role>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub state: PieceState,
}

impl Piece {
    #[inline]
    pub const fn settled(color: Color, role: Role) -> Self {
        Self {
            color,
            state: PieceState::Settled(role),
        }
    }

    #[inline]
    pub const fn pending(
        color: Color,
        candidates: RoleSet,
        origin: Square,
        promotion: Option<Role>,
    ) -> Self {
        Self {
            color,
            state: PieceState::Pending {
                candidates,
                origin,
                promotion,
            },
        }
    }

    /// The concrete role, `None` while the piece is pending.
    #[inline]
    pub const fn role(&self) -> Option<Role> {
        match self.state {
            PieceState::Settled(role) | PieceState::Revealed { role, .. } => Some(role),
            PieceState::Pending { .. } => None,
        }
    }

    /// Every role the piece may currently be.
    #[inline]
    pub const fn possible_roles(&self) -> RoleSet {
        match self.state {
            PieceState::Settled(role) | PieceState::Revealed { role, .. } => RoleSet::EMPTY.with(role),
            PieceState::Pending { candidates, .. } => candidates,
        }
    }

    #[inline]
    pub const fn code(&self) -> Option<PieceCode> {
        match self.role() {
            Some(role) => Some(PieceCode::new(self.color, role)),
            None => None,
        }
    }

    #[inline]
    pub const fn is_pending(&self) -> bool {
        matches!(self.state, PieceState::Pending { .. })
    }

    #[inline]
    pub fn is(&self, color: Color, role: Role) -> bool {
        self.color == color && self.role() == Some(role)
    }

    /// Square the piece was tapped from, if it came out of a blink pool.
    #[inline]
    pub const fn tap_origin(&self) -> Option<Square> {
        match self.state {
            PieceState::Settled(_) => None,
            PieceState::Pending { origin, .. } | PieceState::Revealed { origin, .. } => Some(origin),
        }
    }

    /// Promotion role a tapped pawn committed to when it was tapped.
    #[inline]
    pub const fn committed_promotion(&self) -> Option<Role> {
        match self.state {
            PieceState::Settled(_) => None,
            PieceState::Pending { promotion, .. } | PieceState::Revealed { promotion, .. } => {
                promotion
            }
        }
    }

    /// Same piece after changing role, keeping any tap marker.
    pub fn promoted(&self, role: Role) -> Piece {
        let state = match self.state {
            PieceState::Settled(_) => PieceState::Settled(role),
            PieceState::Pending { origin, .. } | PieceState::Revealed { origin, .. } => {
                PieceState::Revealed {
                    role,
                    origin,
                    promotion: None,
                }
            }
        };
        Piece {
            color: self.color,
            state,
        }
    }
}
