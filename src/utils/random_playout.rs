//! Uniform random move selection for playouts, fuzzing and benchmarks.

use rand::prelude::IndexedRandom;
use rand::Rng;
use tracing::debug;

use crate::game_state::board::Board;
use crate::moves::move_model::Move;

/// A uniformly chosen legal move, `None` when the side to move has none.
pub fn random_legal_move<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<Move> {
    board.legal_moves().choose(rng).cloned()
}

/// Up to `plies` random legal moves played from `start`. Stops early when a
/// position has no legal move.
pub fn random_playout<R: Rng + ?Sized>(start: &Board, plies: usize, rng: &mut R) -> Vec<Move> {
    let mut board = start.clone();
    let mut moves = Vec::with_capacity(plies);

    for _ in 0..plies {
        let Some(mv) = random_legal_move(&board, rng) else {
            debug!(ply = moves.len(), "playout reached a position without moves");
            break;
        };
        if board.make_move(&mv).is_err() {
            break;
        }
        moves.push(mv);
    }

    moves
}
