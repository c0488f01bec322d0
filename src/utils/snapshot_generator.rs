//! Board-to-snapshot encoder.
//!
//! The first six fields are plain FEN; pools, tap markers and the repetition
//! history follow so that a decoded board resumes play exactly.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::piece::{Piece, PieceState};

/// Encoded board state, one per ply of a game.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(String);

impl Snapshot {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unchecked wrap; the text is validated when decoded.
impl From<String> for Snapshot {
    fn from(value: String) -> Self {
        Snapshot(value)
    }
}

pub fn generate_snapshot(board: &Board) -> Snapshot {
    let side_to_move = match board.turn() {
        Color::White => "w",
        Color::Black => "b",
    };
    let en_passant = board
        .en_passant()
        .map_or_else(|| "-".to_owned(), |sq| sq.to_string());

    Snapshot(format!(
        "{} {} {} {} {} {} {} {} {}",
        generate_placement_field(board),
        side_to_move,
        generate_castling_field(board.castling_rights()),
        en_passant,
        board.halfmove_clock(),
        board.fullmove_number(),
        generate_pools_field(board),
        generate_markers_field(board),
        generate_history_field(board.repetition_history()),
    ))
}

fn generate_placement_field(board: &Board) -> String {
    let mut out = String::new();

    for rank in (0..8u8).rev() {
        let mut empty_count = 0u8;

        for file in 0..8u8 {
            let piece = Square::from_coords(file, rank).and_then(|sq| board.piece_at(sq));
            if let Some(piece) = piece {
                if empty_count > 0 {
                    out.push(char::from(b'0' + empty_count));
                    empty_count = 0;
                }
                out.push(placement_char(&piece));
            } else {
                empty_count += 1;
            }
        }

        if empty_count > 0 {
            out.push(char::from(b'0' + empty_count));
        }

        if rank > 0 {
            out.push('/');
        }
    }

    out
}

/// Role letter, or `X`/`x` for a pending piece.
pub fn placement_char(piece: &Piece) -> char {
    match (piece.code(), piece.color) {
        (Some(code), _) => code.char(),
        (None, Color::White) => 'X',
        (None, Color::Black) => 'x',
    }
}

fn generate_castling_field(castling_rights: CastlingRights) -> String {
    let mut out = String::new();
    if castling_rights & CASTLE_WHITE_KINGSIDE != 0 {
        out.push('K');
    }
    if castling_rights & CASTLE_WHITE_QUEENSIDE != 0 {
        out.push('Q');
    }
    if castling_rights & CASTLE_BLACK_KINGSIDE != 0 {
        out.push('k');
    }
    if castling_rights & CASTLE_BLACK_QUEENSIDE != 0 {
        out.push('q');
    }
    if out.is_empty() {
        out.push('-');
    }
    out
}

fn generate_pools_field(board: &Board) -> String {
    let entries: Vec<String> = board
        .pools()
        .map(|(square, pool)| {
            let counts: String = pool
                .iter()
                .map(|(code, count)| format!("{}{count}", code.char()))
                .collect();
            format!("{square}:{counts}")
        })
        .collect();
    join_or_dash(entries)
}

fn generate_markers_field(board: &Board) -> String {
    let entries: Vec<String> = board
        .pieces()
        .filter_map(|(square, piece)| {
            let mut marker = match piece.state {
                PieceState::Settled(_) => return None,
                PieceState::Pending {
                    candidates, origin, ..
                } => {
                    let roles: String = candidates.iter().map(Role::char).collect();
                    format!("{square}<{origin}?{roles}")
                }
                PieceState::Revealed { origin, .. } => format!("{square}<{origin}"),
            };
            if let Some(commit) = piece.committed_promotion() {
                marker.push('/');
                marker.push(commit.char());
            }
            Some(marker)
        })
        .collect();
    join_or_dash(entries)
}

fn generate_history_field(history: &[u64]) -> String {
    join_or_dash(history.iter().map(|key| format!("{key:016x}")).collect())
}

fn join_or_dash(entries: Vec<String>) -> String {
    if entries.is_empty() {
        "-".to_owned()
    } else {
        entries.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::generate_snapshot;
    use crate::game_state::board::Board;
    use crate::game_state::chess_rules::STARTING_POSITION_SNAPSHOT;
    use crate::game_state::chess_types::{Color, PieceCode, Role, RoleSet, Square};
    use crate::game_state::piece::Piece;

    fn sq(name: &str) -> Square {
        name.parse().expect("test square should parse")
    }

    #[test]
    fn start_position_snapshot() {
        assert_eq!(
            generate_snapshot(&Board::new_game()).as_str(),
            STARTING_POSITION_SNAPSHOT
        );
    }

    #[test]
    fn pools_and_markers_are_encoded() {
        let mut board = Board::new_empty();
        board.squares[sq("e1").index()] = Some(Piece::settled(Color::White, Role::King));
        board.squares[sq("e8").index()] = Some(Piece::settled(Color::Black, Role::King));
        let candidates = RoleSet::EMPTY.with(Role::Knight).with(Role::Bishop);
        board.squares[sq("f3").index()] = Some(Piece::pending(Color::White, candidates, sq("g1"), None));
        board.add_trace(sq("g1"), PieceCode::new(Color::White, Role::Knight));
        board.add_trace(sq("g1"), PieceCode::new(Color::White, Role::Knight));
        board.add_trace(sq("g1"), PieceCode::new(Color::Black, Role::Knight));
        board.add_trace(sq("e2"), PieceCode::new(Color::White, Role::Pawn));
        board.repetition_history.push(0xAB);

        assert_eq!(
            generate_snapshot(&board).as_str(),
            "4k3/8/8/8/8/5X2/8/4K3 w - - 0 1 g1:N2n1,e2:P1 f3<g1?nb 00000000000000ab"
        );
    }
}
