//! The four move shapes the engine accepts.
//!
//! Moves arrive fully formed from the view or network layer and serialize as
//! tagged JSON objects, e.g. `{"kind":"tap","orig":"g1","dest":"f3","role":"knight"}`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::game_state::chess_types::{Role, Square};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Move {
    /// Ordinary move of a live piece, castling included (`e1g1`).
    Standard {
        orig: Square,
        dest: Square,
        #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
        blinks: BTreeSet<Square>,
    },
    /// Pawn move onto the last rank with the chosen role.
    Promotion {
        orig: Square,
        dest: Square,
        role: Role,
        #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
        blinks: BTreeSet<Square>,
    },
    /// Spend a `role` trace on the empty `orig` to create a pending piece on `dest`.
    Tap {
        orig: Square,
        dest: Square,
        role: Role,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        promotion: Option<Role>,
        #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
        blinks: BTreeSet<Square>,
    },
    /// Resolve the pending piece on `orig` as `role`.
    Unblink {
        orig: Square,
        role: Role,
        #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
        blinks: BTreeSet<Square>,
    },
}

impl Move {
    pub fn standard(orig: Square, dest: Square) -> Self {
        Move::Standard {
            orig,
            dest,
            blinks: BTreeSet::new(),
        }
    }

    pub fn promotion(orig: Square, dest: Square, role: Role) -> Self {
        Move::Promotion {
            orig,
            dest,
            role,
            blinks: BTreeSet::new(),
        }
    }

    pub fn tap(orig: Square, dest: Square, role: Role, promotion: Option<Role>) -> Self {
        Move::Tap {
            orig,
            dest,
            role,
            promotion,
            blinks: BTreeSet::new(),
        }
    }

    pub fn unblink(orig: Square, role: Role) -> Self {
        Move::Unblink {
            orig,
            role,
            blinks: BTreeSet::new(),
        }
    }

    /// Same move consuming the given blink squares.
    pub fn with_blinks(mut self, squares: impl IntoIterator<Item = Square>) -> Self {
        match &mut self {
            Move::Standard { blinks, .. }
            | Move::Promotion { blinks, .. }
            | Move::Tap { blinks, .. }
            | Move::Unblink { blinks, .. } => blinks.extend(squares),
        }
        self
    }

    #[inline]
    pub fn orig(&self) -> Square {
        match self {
            Move::Standard { orig, .. }
            | Move::Promotion { orig, .. }
            | Move::Tap { orig, .. }
            | Move::Unblink { orig, .. } => *orig,
        }
    }

    /// Destination square; unblinks have none.
    #[inline]
    pub fn dest(&self) -> Option<Square> {
        match self {
            Move::Standard { dest, .. } | Move::Promotion { dest, .. } | Move::Tap { dest, .. } => {
                Some(*dest)
            }
            Move::Unblink { .. } => None,
        }
    }

    #[inline]
    pub fn blinks(&self) -> &BTreeSet<Square> {
        match self {
            Move::Standard { blinks, .. }
            | Move::Promotion { blinks, .. }
            | Move::Tap { blinks, .. }
            | Move::Unblink { blinks, .. } => blinks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Move;
    use crate::game_state::chess_types::{Role, Square};

    fn sq(name: &str) -> Square {
        name.parse().expect("test square should parse")
    }

    #[test]
    fn tap_serializes_with_kind_tag() {
        let mv = Move::tap(sq("g1"), sq("f3"), Role::Knight, None);
        let json = serde_json::to_string(&mv).expect("move should serialize");
        assert_eq!(
            json,
            r#"{"kind":"tap","orig":"g1","dest":"f3","role":"knight"}"#
        );
    }

    #[test]
    fn blinks_default_to_empty_when_absent() {
        let mv: Move = serde_json::from_str(r#"{"kind":"standard","orig":"e2","dest":"e4"}"#)
            .expect("standard move should parse");
        assert_eq!(mv, Move::standard(sq("e2"), sq("e4")));

        let with: Move = serde_json::from_str(
            r#"{"kind":"unblink","orig":"f3","role":"bishop","blinks":["c1"]}"#,
        )
        .expect("unblink should parse");
        assert_eq!(with.dest(), None);
        assert!(with.blinks().contains(&sq("c1")));
    }
}
