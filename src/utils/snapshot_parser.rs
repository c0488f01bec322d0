//! Snapshot-to-Board decoder.
//!
//! Accepts exactly the nine fields written by `generate_snapshot` and checks
//! that the result is a playable position before handing it out.

use crate::game_state::blink_pool::BlinkPool;
use crate::game_state::board::Board;
use crate::game_state::chess_rules::MAX_TRACE_COUNT;
use crate::game_state::chess_types::*;
use crate::game_state::errors::SnapshotError;
use crate::game_state::piece::{Piece, PieceState};
use crate::utils::algebraic::algebraic_to_square;

pub fn parse_snapshot(snapshot: &str) -> Result<Board, SnapshotError> {
    let mut parts = snapshot.split_whitespace();
    let mut field = |name: &'static str| parts.next().ok_or(SnapshotError::MissingField(name));

    let placement_part = field("placement")?;
    let side_part = field("side to move")?;
    let castling_part = field("castling rights")?;
    let en_passant_part = field("en-passant square")?;
    let halfmove_part = field("halfmove clock")?;
    let fullmove_part = field("fullmove number")?;
    let pools_part = field("blink pools")?;
    let markers_part = field("tap markers")?;
    let history_part = field("repetition history")?;

    if parts.next().is_some() {
        return Err(SnapshotError::ExtraFields);
    }

    let mut board = Board::new_empty();

    let placeholders = parse_placement(placement_part, &mut board)?;
    board.turn = parse_side_to_move(side_part)?;
    board.castling_rights = parse_castling_rights(castling_part)?;
    board.en_passant = parse_en_passant_square(en_passant_part, board.turn)?;
    board.halfmove_clock = halfmove_part
        .parse::<u16>()
        .map_err(|_| SnapshotError::Counter(format!("halfmove clock {halfmove_part}")))?;
    board.fullmove_number = fullmove_part
        .parse::<u16>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| SnapshotError::Counter(format!("fullmove number {fullmove_part}")))?;
    parse_pools(pools_part, &mut board)?;
    let resolved = parse_markers(markers_part, &mut board, placeholders)?;
    if resolved != placeholders {
        let square = squares_of(placeholders & !resolved)
            .next()
            .map_or_else(String::new, |sq| sq.to_string());
        return Err(SnapshotError::Marker(format!(
            "pending piece on {square} has no marker"
        )));
    }
    board.repetition_history = parse_history(history_part)?;

    validate_position(&board)?;
    Ok(board)
}

fn sq_of(text: &str, error: fn(String) -> SnapshotError) -> Result<Square, SnapshotError> {
    algebraic_to_square(text).map_err(error)
}

/// Fills the placement and returns the mask of `X`/`x` squares still
/// waiting for their marker.
fn parse_placement(placement_part: &str, board: &mut Board) -> Result<u64, SnapshotError> {
    let ranks: Vec<&str> = placement_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(SnapshotError::Placement(
            "board layout must contain 8 ranks".to_owned(),
        ));
    }

    let mut placeholders = 0u64;
    for (rank_idx, rank_str) in ranks.iter().enumerate() {
        let rank = 7u8.saturating_sub(rank_idx as u8);
        let mut file = 0u8;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                if !(1..=8).contains(&empty_count) {
                    return Err(SnapshotError::Placement(format!(
                        "invalid empty-square count '{ch}'"
                    )));
                }
                file = file
                    .checked_add(empty_count as u8)
                    .filter(|total| *total <= 8)
                    .ok_or_else(|| {
                        SnapshotError::Placement(format!("rank {} has too many files", rank + 1))
                    })?;
                continue;
            }

            let square = Square::from_coords(file, rank).ok_or_else(|| {
                SnapshotError::Placement(format!("rank {} has too many files", rank + 1))
            })?;
            let piece = match ch {
                'X' | 'x' => {
                    placeholders |= square.bit();
                    let color = if ch == 'X' { Color::White } else { Color::Black };
                    Piece::pending(color, RoleSet::EMPTY, square, None)
                }
                _ => {
                    let code = PieceCode::from_char(ch).ok_or_else(|| {
                        SnapshotError::Placement(format!("invalid piece character '{ch}'"))
                    })?;
                    Piece::settled(code.color, code.role)
                }
            };
            board.squares[square.index()] = Some(piece);
            file += 1;
        }

        if file != 8 {
            return Err(SnapshotError::Placement(format!(
                "rank {} does not sum to 8 files",
                rank + 1
            )));
        }
    }

    Ok(placeholders)
}

fn parse_side_to_move(side_part: &str) -> Result<Color, SnapshotError> {
    match side_part {
        "w" => Ok(Color::White),
        "b" => Ok(Color::Black),
        _ => Err(SnapshotError::Turn(side_part.to_owned())),
    }
}

fn parse_castling_rights(castling_part: &str) -> Result<CastlingRights, SnapshotError> {
    if castling_part == "-" {
        return Ok(0);
    }

    let mut rights: CastlingRights = 0;
    for ch in castling_part.chars() {
        match ch {
            'K' => rights |= CASTLE_WHITE_KINGSIDE,
            'Q' => rights |= CASTLE_WHITE_QUEENSIDE,
            'k' => rights |= CASTLE_BLACK_KINGSIDE,
            'q' => rights |= CASTLE_BLACK_QUEENSIDE,
            _ => return Err(SnapshotError::Castling(castling_part.to_owned())),
        }
    }
    Ok(rights)
}

fn parse_en_passant_square(
    en_passant_part: &str,
    turn: Color,
) -> Result<Option<Square>, SnapshotError> {
    if en_passant_part == "-" {
        return Ok(None);
    }
    let square = sq_of(en_passant_part, SnapshotError::EnPassant)?;
    // The target lies behind a pawn of the side that just moved.
    let expected_rank = match turn {
        Color::White => 5,
        Color::Black => 2,
    };
    if square.rank() != expected_rank {
        return Err(SnapshotError::EnPassant(format!(
            "{square} is not on the en-passant rank"
        )));
    }
    Ok(Some(square))
}

fn parse_pools(pools_part: &str, board: &mut Board) -> Result<(), SnapshotError> {
    if pools_part == "-" {
        return Ok(());
    }

    for entry in pools_part.split(',') {
        let (square_text, counts) = entry
            .split_once(':')
            .ok_or_else(|| SnapshotError::Pool(entry.to_owned()))?;
        let square = sq_of(square_text, SnapshotError::Pool)?;
        if board.pools.contains_key(&square) {
            return Err(SnapshotError::Pool(format!("duplicate pool for {square}")));
        }

        let mut pool = BlinkPool::default();
        let mut chars = counts.chars().peekable();
        while let Some(ch) = chars.next() {
            let code = PieceCode::from_char(ch)
                .ok_or_else(|| SnapshotError::Pool(format!("invalid piece character '{ch}'")))?;
            let mut digits = String::new();
            while let Some(digit) = chars.next_if(char::is_ascii_digit) {
                digits.push(digit);
            }
            let count = digits
                .parse::<u32>()
                .ok()
                .filter(|count| (1..=MAX_TRACE_COUNT).contains(count))
                .ok_or_else(|| SnapshotError::Pool(format!("invalid count in {entry}")))?;
            if pool.contains(code) {
                return Err(SnapshotError::Pool(format!("duplicate {code} in {entry}")));
            }
            pool.add_many(code, count);
        }
        if pool.is_empty() {
            return Err(SnapshotError::Pool(format!("empty pool in {entry}")));
        }
        board.pools.insert(square, pool);
    }
    Ok(())
}

/// Applies the tap markers; returns the mask of resolved placeholders.
fn parse_markers(
    markers_part: &str,
    board: &mut Board,
    placeholders: u64,
) -> Result<u64, SnapshotError> {
    if markers_part == "-" {
        return Ok(0);
    }

    let mut seen = 0u64;
    let mut resolved = 0u64;
    for entry in markers_part.split(',') {
        let bad = || SnapshotError::Marker(entry.to_owned());

        let (square_text, rest) = entry.split_once('<').ok_or_else(bad)?;
        let square = sq_of(square_text, SnapshotError::Marker)?;
        if seen & square.bit() != 0 {
            return Err(SnapshotError::Marker(format!("duplicate marker for {square}")));
        }
        seen |= square.bit();

        let (rest, promotion) = match rest.split_once('/') {
            Some((rest, commit)) => {
                let mut chars = commit.chars();
                let role = chars.next().and_then(Role::from_char).ok_or_else(bad)?;
                if chars.next().is_some() {
                    return Err(bad());
                }
                (rest, Some(role))
            }
            None => (rest, None),
        };
        let (origin_text, candidates_text) = match rest.split_once('?') {
            Some((origin, candidates)) => (origin, Some(candidates)),
            None => (rest, None),
        };
        let origin = sq_of(origin_text, SnapshotError::Marker)?;

        let piece = board
            .piece_at(square)
            .ok_or_else(|| SnapshotError::Marker(format!("no piece on {square}")))?;
        let is_placeholder = placeholders & square.bit() != 0;

        let state = match candidates_text {
            Some(text) => {
                if !is_placeholder {
                    return Err(SnapshotError::Marker(format!(
                        "pending marker on {square} needs an X piece"
                    )));
                }
                let mut candidates = RoleSet::EMPTY;
                for ch in text.chars() {
                    match Role::from_char(ch) {
                        Some(role) if role != Role::King => candidates.insert(role),
                        _ => return Err(bad()),
                    }
                }
                if candidates.is_empty() || (promotion.is_some() != candidates.contains(Role::Pawn)) {
                    return Err(bad());
                }
                resolved |= square.bit();
                PieceState::Pending {
                    candidates,
                    origin,
                    promotion,
                }
            }
            None => {
                let role = piece.role().filter(|_| !is_placeholder).ok_or_else(bad)?;
                if role == Role::King || (promotion.is_some() && role != Role::Pawn) {
                    return Err(bad());
                }
                PieceState::Revealed {
                    role,
                    origin,
                    promotion,
                }
            }
        };
        board.squares[square.index()] = Some(Piece {
            color: piece.color,
            state,
        });
    }
    Ok(resolved)
}

fn parse_history(history_part: &str) -> Result<Vec<u64>, SnapshotError> {
    if history_part == "-" {
        return Ok(Vec::new());
    }
    history_part
        .split(',')
        .map(|key| {
            u64::from_str_radix(key, 16).map_err(|_| SnapshotError::History(key.to_owned()))
        })
        .collect()
}

fn validate_position(board: &Board) -> Result<(), SnapshotError> {
    for color in [Color::White, Color::Black] {
        let kings = board
            .pieces()
            .filter(|(_, piece)| piece.is(color, Role::King))
            .count();
        if kings != 1 {
            return Err(SnapshotError::Position(format!(
                "{color} has {kings} kings"
            )));
        }
    }
    let stray_pawn = board.pieces().find(|(square, piece)| {
        piece.role() == Some(Role::Pawn) && (square.rank() == 0 || square.rank() == 7)
    });
    if let Some((square, _)) = stray_pawn {
        return Err(SnapshotError::Position(format!(
            "pawn on back rank square {square}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_snapshot;
    use crate::game_state::board::Board;
    use crate::game_state::chess_rules::{MAX_TRACE_COUNT, STARTING_POSITION_SNAPSHOT};
    use crate::game_state::chess_types::{Color, PieceCode, Role, Square};
    use crate::game_state::errors::SnapshotError;

    fn sq(name: &str) -> Square {
        name.parse().expect("test square should parse")
    }

    #[test]
    fn starting_snapshot_matches_new_game() {
        let board = parse_snapshot(STARTING_POSITION_SNAPSHOT).expect("start should parse");
        assert_eq!(board, Board::new_game());
    }

    #[test]
    fn pools_markers_and_history_round_trip() {
        let text = "4k3/8/8/8/4P3/5X2/8/4K3 b - e3 0 3 g1:N2n1,e2:P1 f3<g1?nb,e4<e3/q 00000000000000ab";
        let board = parse_snapshot(text).expect("snapshot should parse");
        assert_eq!(board.pool_count(sq("g1"), PieceCode::new(Color::White, Role::Knight)), 2);
        assert_eq!(board.pool_count(sq("g1"), PieceCode::new(Color::Black, Role::Knight)), 1);
        let revealed = board.piece_at(sq("e4")).expect("e4 should hold a pawn");
        assert_eq!(revealed.role(), Some(Role::Pawn));
        assert_eq!(revealed.committed_promotion(), Some(Role::Queen));
        assert!(board.piece_at(sq("f3")).is_some_and(|p| p.is_pending()));
        assert_eq!(board.repetition_history(), &[0xAB]);
        assert_eq!(board.to_snapshot().as_str(), text);
    }

    #[test]
    fn malformed_snapshots_fail_closed() {
        let cases = [
            ("", SnapshotError::MissingField("placement")),
            (
                "4k3/8/8/8/8/8/8/4K3 w - - 0 1 - -",
                SnapshotError::MissingField("repetition history"),
            ),
            (
                "4k3/8/8/8/8/8/8/4K3 w - - 0 1 - - - extra",
                SnapshotError::ExtraFields,
            ),
        ];
        for (text, expected) in cases {
            assert_eq!(parse_snapshot(text), Err(expected));
        }

        let rejected = [
            "4k3/8/8/8/8/8/8/4K3 w - - 0 1 - - -x",
            "4k3/8/8/8/8/8/8/8 w - - 0 1 - - -",
            "4k3/8/8/8/8/8/8/4K2P w - - 0 1 - - -",
            "4k3/8/8/8/8/8/8/4K3 w - e3 0 1 - - -",
            "4k3/8/8/8/8/8/8/4K3 w - - 0 1 e2:P0 - -",
            "4k3/8/8/8/8/5X2/8/4K3 w - - 0 1 - - -",
            "4k3/8/8/8/8/5N2/8/4K3 w - - 0 1 - f3<g1?nb -",
            "4k3/8/8/8/8/5X2/8/4K3 w - - 0 1 - f3<e2?pn -",
            "4k3/8/8/8/8/8/8/4K3 w - - 0 0 - - -",
            "4k3/8/8/8/8/8/8/4K3 w Kx - 0 1 - - -",
            "4k3/45/8/8/8/8/8/4K3 w - - 0 1 - - -",
        ];
        for text in rejected {
            assert!(parse_snapshot(text).is_err(), "{text} should be rejected");
        }
    }

    #[test]
    fn oversized_rank_is_a_placement_error() {
        let text = format!("{}/8/8/8/8/8/8/4K2k w - - 0 1 - - -", "8".repeat(33));
        assert!(matches!(parse_snapshot(&text), Err(SnapshotError::Placement(_))));
        assert!(matches!(
            parse_snapshot("8/8/8/8/8/8/8/4K2k1 w - - 0 1 - - -"),
            Err(SnapshotError::Placement(_))
        ));
    }

    #[test]
    fn pool_counts_are_bounded() {
        let at_cap = format!("4k3/8/8/8/8/8/8/4K1N1 w - - 0 1 g1:N{MAX_TRACE_COUNT} - -");
        let board = parse_snapshot(&at_cap).expect("count at the cap should parse");
        assert_eq!(
            board.pool_count(sq("g1"), PieceCode::new(Color::White, Role::Knight)),
            MAX_TRACE_COUNT
        );

        for count in [u64::from(MAX_TRACE_COUNT) + 1, u64::from(u32::MAX)] {
            let text = format!("4k3/8/8/8/8/8/8/4K1N1 w - - 0 1 g1:N{count} - -");
            assert!(matches!(parse_snapshot(&text), Err(SnapshotError::Pool(_))));
        }
    }
}
