//! Terminal-oriented Unicode board renderer.
//!
//! Pending pieces are drawn as `?` (white) or `¿` (black); a listing of the
//! non-empty blink pools follows the diagram.

use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::piece::Piece;

/// Render the board and its pools to a Unicode string for terminal output.
pub fn render_board(board: &Board) -> String {
    let mut out = String::new();

    out.push_str("  a b c d e f g h\n");

    for rank in (0..8u8).rev() {
        out.push(char::from(b'1' + rank));
        out.push(' ');

        for file in 0..8u8 {
            let piece = Square::from_coords(file, rank).and_then(|sq| board.piece_at(sq));
            match piece {
                Some(piece) => out.push(piece_to_unicode(&piece)),
                None => out.push('·'),
            }

            if file < 7 {
                out.push(' ');
            }
        }

        out.push(' ');
        out.push(char::from(b'1' + rank));
        out.push('\n');
    }

    out.push_str("  a b c d e f g h\n");
    out.push_str(&format!("{} to move", board.turn()));

    for (square, pool) in board.pools() {
        let counts: Vec<String> = pool
            .iter()
            .map(|(code, count)| format!("{code}x{count}"))
            .collect();
        out.push_str(&format!("\n{square} ({}): {}", pool.total(), counts.join(" ")));
    }

    out
}

fn piece_to_unicode(piece: &Piece) -> char {
    let Some(role) = piece.role() else {
        return match piece.color {
            Color::White => '?',
            Color::Black => '¿',
        };
    };
    match (piece.color, role) {
        (Color::White, Role::Pawn) => '♙',
        (Color::White, Role::Knight) => '♘',
        (Color::White, Role::Bishop) => '♗',
        (Color::White, Role::Rook) => '♖',
        (Color::White, Role::Queen) => '♕',
        (Color::White, Role::King) => '♔',
        (Color::Black, Role::Pawn) => '♟',
        (Color::Black, Role::Knight) => '♞',
        (Color::Black, Role::Bishop) => '♝',
        (Color::Black, Role::Rook) => '♜',
        (Color::Black, Role::Queen) => '♛',
        (Color::Black, Role::King) => '♚',
    }
}
