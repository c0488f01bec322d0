//! Move-list interchange: JSON records and a PGN-like text export.
//!
//! JSON input is either a bare array of moves or a `GameRecord` object with
//! an optional start snapshot. The text export mirrors PGN headers and
//! numbering but carries the variant notation, so it is not meant for
//! standard PGN readers.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use serde::Deserialize;

use crate::game::ply_history::{Game, GameRecord};
use crate::game_state::board::Board;
use crate::game_state::chess_rules::STARTING_POSITION_SNAPSHOT;
use crate::game_state::chess_types::Color;
use crate::game_state::errors::{GameResult, RecordResult};
use crate::moves::move_model::Move;

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordInput {
    Moves(Vec<Move>),
    Record(GameRecord),
}

pub fn read_record_json(json: &str) -> RecordResult<GameRecord> {
    let record = match serde_json::from_str::<RecordInput>(json)? {
        RecordInput::Moves(moves) => GameRecord { start: None, moves },
        RecordInput::Record(record) => record,
    };
    Ok(record)
}

/// Parse a JSON move list and replay it into a game.
pub fn read_game_json(json: &str) -> RecordResult<Game> {
    let record = read_record_json(json)?;
    Ok(Game::from_record(&record)?)
}

pub fn write_game_json(game: &Game) -> RecordResult<String> {
    Ok(serde_json::to_string_pretty(&game.to_record())?)
}

/// PGN-like export dated today.
pub fn write_pgn(game: &Game) -> GameResult<String> {
    write_pgn_dated(game, Local::now().date_naive())
}

pub fn write_pgn_dated(game: &Game, date: NaiveDate) -> GameResult<String> {
    let mut headers = BTreeMap::<String, String>::new();
    headers.insert("Event".to_owned(), "Time-Travel Chess Game".to_owned());
    headers.insert("Site".to_owned(), "Local".to_owned());
    headers.insert("Date".to_owned(), date.format("%Y.%m.%d").to_string());
    headers.insert("Round".to_owned(), "-".to_owned());
    headers.insert("White".to_owned(), "White".to_owned());
    headers.insert("Black".to_owned(), "Black".to_owned());
    headers.insert("Result".to_owned(), "*".to_owned());

    let start = game
        .snapshots()
        .first()
        .map_or(STARTING_POSITION_SNAPSHOT, |snapshot| snapshot.as_str());
    if start != STARTING_POSITION_SNAPSHOT {
        headers.insert("SetUp".to_owned(), "1".to_owned());
        headers.insert("Snapshot".to_owned(), start.to_owned());
    }
    let start_board = Board::from_snapshot(start)?;

    let mut out = String::new();
    for (key, value) in &headers {
        out.push_str(&format!("[{} \"{}\"]\n", key, escape_pgn_value(value)));
    }
    out.push('\n');

    let mut turn = start_board.turn();
    let mut number = start_board.fullmove_number();
    let mut movetext_parts = Vec::<String>::with_capacity(game.notation().len() + 1);
    for (index, text) in game.notation().iter().enumerate() {
        match turn {
            Color::White => movetext_parts.push(format!("{number}. {text}")),
            Color::Black if index == 0 => movetext_parts.push(format!("{number}... {text}")),
            Color::Black => movetext_parts.push(text.clone()),
        }
        if turn == Color::Black {
            number = number.saturating_add(1);
        }
        turn = turn.opposite();
    }
    movetext_parts.push("*".to_owned());
    out.push_str(&movetext_parts.join(" "));
    out.push('\n');

    Ok(out)
}

fn escape_pgn_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
