//! Error types for move validation, snapshot decoding, and game history.
//!
//! Every variant is a recoverable condition reported to the caller; none of
//! them leaves a board or game partially modified.

use crate::game_state::chess_types::{Role, Square};

/// Reason a move was rejected by the legality predicate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IllegalMove {
    #[error("no piece on {0}")]
    NoPieceOnOrigin(Square),
    #[error("piece on {0} does not belong to the side to move")]
    NotYourPiece(Square),
    #[error("tap origin {0} is occupied by a live piece")]
    OriginOccupied(Square),
    #[error("destination equals origin")]
    NullMove,
    #[error("{orig} cannot reach {dest}")]
    Unreachable { orig: Square, dest: Square },
    #[error("destination {0} holds a friendly piece")]
    OwnPieceOnDestination(Square),
    #[error("the king on {0} cannot be captured")]
    KingCapture(Square),
    #[error("move would leave the king in check")]
    LeavesKingInCheck,
    #[error("no {role:?} trace available on {square}")]
    MissingBlink { square: Square, role: Role },
    #[error("blink pool on {0} cannot hold another trace")]
    PoolFull(Square),
    #[error("blink square {0} duplicates the origin")]
    BlinkOnOrigin(Square),
    #[error("a pending piece cannot consume blinks")]
    BlinksWithoutRole,
    #[error("pawn reaching the last rank must promote")]
    PromotionRequired,
    #[error("promotion is not possible for this move")]
    PromotionNotApplicable,
    #[error("{0:?} is not an allowed promotion role here")]
    BadPromotionRole(Role),
    #[error("a tapped piece that may be a pawn needs a promotion commitment")]
    CommitmentRequired,
    #[error("{0:?} is not an allowed commitment for this tap")]
    BadCommitment(Role),
    #[error("{0:?} cannot be tapped")]
    UntappableRole(Role),
    #[error("no pending piece on {0} to unblink")]
    NothingToUnblink(Square),
    #[error("{0:?} is not a candidate identity of the pending piece")]
    NotACandidate(Role),
    #[error("castling is not available")]
    CastlingUnavailable,
}

/// Malformed snapshot text. Decoding never yields a partial board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("missing snapshot field: {0}")]
    MissingField(&'static str),
    #[error("snapshot has extra trailing fields")]
    ExtraFields,
    #[error("invalid placement: {0}")]
    Placement(String),
    #[error("invalid side to move: {0}")]
    Turn(String),
    #[error("invalid castling rights: {0}")]
    Castling(String),
    #[error("invalid en-passant square: {0}")]
    EnPassant(String),
    #[error("invalid counter: {0}")]
    Counter(String),
    #[error("invalid blink pool entry: {0}")]
    Pool(String),
    #[error("invalid tap marker: {0}")]
    Marker(String),
    #[error("invalid repetition history: {0}")]
    History(String),
    #[error("position is not playable: {0}")]
    Position(String),
}

/// Failures surfaced by `Game`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("illegal move: {0}")]
    IllegalMove(#[from] IllegalMove),
    #[error("illegal move at index {index}: {source}")]
    IllegalReplay { index: usize, source: IllegalMove },
    #[error("ply {ply} is outside the recorded history 0..={len}")]
    OutOfRangePly { ply: usize, len: usize },
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(#[from] SnapshotError),
}

/// Failures reading or writing move-list interchange files.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("malformed move list: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Game(#[from] GameError),
}

pub type MoveResult<T> = Result<T, IllegalMove>;
pub type GameResult<T> = Result<T, GameError>;
pub type RecordResult<T> = Result<T, RecordError>;
