//! Crate root module declarations for the time-travel chess rules engine.
//!
//! Exposes the board model (placement, blink pools, tap markers), the
//! legality pipeline, the ply-indexed game history, and the text utilities
//! (snapshots, notation, move lists) so binaries, benches, and embedding
//! clients can import stable module paths.

pub mod game_state {
    pub mod blink_pool;
    pub mod board;
    pub mod chess_rules;
    pub mod chess_types;
    pub mod errors;
    pub mod piece;
    pub mod zobrist;
}

pub mod moves {
    pub mod attacks;
    pub mod move_model;
}

pub mod move_generation {
    pub mod legal_move_apply;
    pub mod legal_move_checks;
    pub mod legal_move_generator;
    pub mod legal_move_queries;
    pub mod legal_move_reach;
    pub mod legal_move_validate;
}

pub mod game {
    pub mod ply_history;
}

pub mod utils {
    pub mod algebraic;
    pub mod move_list;
    pub mod notation;
    pub mod random_playout;
    pub mod render_board;
    pub mod snapshot_generator;
    pub mod snapshot_parser;
}

pub use game::ply_history::{Game, GameRecord};
pub use game_state::board::Board;
pub use game_state::chess_types::{Color, PieceCode, Role, Square};
pub use game_state::errors::{GameError, IllegalMove, SnapshotError};
pub use moves::move_model::Move;
pub use utils::snapshot_generator::Snapshot;
