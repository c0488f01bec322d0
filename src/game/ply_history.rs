//! Ply-indexed game history with rewind and truncate-on-branch.
//!
//! `snapshots[i]` is the position before `moves[i]`; the live board always
//! equals `snapshots[ply]` decoded. Moving from an earlier ply discards the
//! recorded future, there is no variation tree.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::game_state::board::Board;
use crate::game_state::errors::{GameError, GameResult};
use crate::moves::move_model::Move;
use crate::utils::snapshot_generator::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    ply: usize,
    moves: Vec<Move>,
    snapshots: Vec<Snapshot>,
    notation: Vec<String>,
}

/// Serializable form of a game: the move list plus a start position when
/// it differs from the standard one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Snapshot>,
    pub moves: Vec<Move>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// New game at the standard starting position.
    pub fn new() -> Self {
        Self::from_board(Board::new_game())
    }

    fn from_board(board: Board) -> Self {
        let snapshot = board.to_snapshot();
        Self {
            board,
            ply: 0,
            moves: Vec::new(),
            snapshots: vec![snapshot],
            notation: Vec::new(),
        }
    }

    /// Replay `moves` from the starting position.
    pub fn from_moves<'a>(moves: impl IntoIterator<Item = &'a Move>) -> GameResult<Self> {
        Self::new().replay(moves)
    }

    /// Replay `moves` from a decoded start snapshot.
    pub fn from_snapshot<'a>(
        start: &str,
        moves: impl IntoIterator<Item = &'a Move>,
    ) -> GameResult<Self> {
        let board = Board::from_snapshot(start)?;
        Self::from_board(board).replay(moves)
    }

    pub fn from_record(record: &GameRecord) -> GameResult<Self> {
        match &record.start {
            Some(start) => Self::from_snapshot(start.as_str(), &record.moves),
            None => Self::from_moves(&record.moves),
        }
    }

    pub fn to_record(&self) -> GameRecord {
        let start = Some(self.snapshots[0].clone())
            .filter(|snapshot| *snapshot != Board::new_game().to_snapshot());
        GameRecord {
            start,
            moves: self.moves.clone(),
        }
    }

    fn replay<'a>(mut self, moves: impl IntoIterator<Item = &'a Move>) -> GameResult<Self> {
        for (index, mv) in moves.into_iter().enumerate() {
            self.make_move(mv).map_err(|err| match err {
                GameError::IllegalMove(source) => {
                    warn!(index, %source, "replay stopped at illegal move");
                    GameError::IllegalReplay { index, source }
                }
                other => other,
            })?;
        }
        Ok(self)
    }

    /// Play `mv` at the current ply. Any recorded moves after the current ply
    /// are discarded; an illegal move changes nothing.
    pub fn make_move(&mut self, mv: &Move) -> GameResult<()> {
        let notation = self.board.move_to_string(mv)?;
        let mut next = self.board.clone();
        next.make_move(mv)?;

        self.moves.truncate(self.ply);
        self.notation.truncate(self.ply);
        self.snapshots.truncate(self.ply + 1);

        self.moves.push(mv.clone());
        self.notation.push(notation);
        self.snapshots.push(next.to_snapshot());
        self.board = next;
        self.ply = self.moves.len();

        debug!(ply = self.ply, notation = %self.notation[self.ply - 1], "move recorded");
        Ok(())
    }

    /// Jump to `ply` by decoding its snapshot.
    pub fn goto_ply(&mut self, ply: usize) -> GameResult<()> {
        let snapshot = self.snapshots.get(ply).ok_or(GameError::OutOfRangePly {
            ply,
            len: self.moves.len(),
        })?;
        self.board = Board::from_snapshot(snapshot.as_str())?;
        self.ply = ply;
        debug!(ply, "navigated");
        Ok(())
    }

    /// Draw claim at the tip of the recorded history.
    pub fn can_claim_draw(&self) -> GameResult<bool> {
        if self.is_at_tip() {
            return Ok(self.board.can_claim_draw());
        }
        let tip = self
            .snapshots
            .last()
            .ok_or(GameError::OutOfRangePly { ply: 0, len: 0 })?;
        Ok(Board::from_snapshot(tip.as_str())?.can_claim_draw())
    }

    #[inline]
    pub fn ply(&self) -> usize {
        self.ply
    }

    /// Number of recorded moves.
    #[inline]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    #[inline]
    pub fn is_at_tip(&self) -> bool {
        self.ply == self.moves.len()
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    #[inline]
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    #[inline]
    pub fn notation(&self) -> &[String] {
        &self.notation
    }

    /// Move that produced the current position, if any.
    pub fn last_move(&self) -> Option<&Move> {
        self.ply.checked_sub(1).and_then(|i| self.moves.get(i))
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::Game;
    use crate::game_state::board::Board;
    use crate::game_state::chess_types::{Color, PieceCode, Role, Square};
    use crate::game_state::errors::{GameError, IllegalMove};
    use crate::moves::move_model::Move;
    use crate::utils::random_playout::random_playout;

    fn sq(name: &str) -> Square {
        name.parse().expect("test square should parse")
    }

    fn std_move(orig: &str, dest: &str) -> Move {
        Move::standard(sq(orig), sq(dest))
    }

    fn opening() -> Vec<Move> {
        vec![
            std_move("e2", "e4"),
            std_move("e7", "e5"),
            std_move("g1", "f3"),
            std_move("b8", "c6"),
            std_move("f1", "c4"),
        ]
    }

    #[test]
    fn goto_ply_matches_replay_from_scratch() {
        let moves = opening();
        let mut game = Game::from_moves(&moves).expect("opening should replay");
        for ply in 0..=moves.len() {
            game.goto_ply(ply).expect("ply in range");
            let replayed = Game::from_moves(&moves[..ply]).expect("prefix should replay");
            assert_eq!(game.board(), replayed.board());
            assert_eq!(game.ply(), ply);
        }
        assert_eq!(
            game.goto_ply(6),
            Err(GameError::OutOfRangePly { ply: 6, len: 5 })
        );
        assert_eq!(game.ply(), 5);
    }

    #[test]
    fn random_games_round_trip_through_snapshots() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..4 {
            let moves = random_playout(&Board::new_game(), 40, &mut rng);
            let mut game = Game::from_moves(&moves).expect("random playout should replay");
            for ply in 0..=game.len() {
                game.goto_ply(ply).expect("ply in range");
                let board = game.board();
                let decoded = Board::from_snapshot(board.to_snapshot().as_str())
                    .expect("snapshot should decode");
                assert_eq!(&decoded, board);
            }
        }
    }

    #[test]
    fn illegal_move_changes_nothing() {
        let mut game = Game::from_moves(&opening()).expect("opening should replay");
        game.goto_ply(3).expect("ply in range");
        let before = game.clone();

        let err = game.make_move(&std_move("e1", "e3"));
        assert_eq!(
            err,
            Err(GameError::IllegalMove(IllegalMove::NotYourPiece(sq("e1"))))
        );
        assert_eq!(game, before);
    }

    #[test]
    fn replay_reports_index_of_illegal_move() {
        let mut moves = opening();
        moves.insert(2, std_move("e4", "e6"));
        match Game::from_moves(&moves) {
            Err(GameError::IllegalReplay { index, .. }) => assert_eq!(index, 2),
            other => panic!("expected replay failure, got {other:?}"),
        }
    }

    #[test]
    fn moving_from_earlier_ply_truncates_future() {
        let mut game = Game::from_moves(&opening()).expect("opening should replay");
        assert_eq!(game.len(), 5);
        game.goto_ply(2).expect("ply in range");
        assert!(!game.is_at_tip());
        game.make_move(&std_move("d2", "d4")).expect("d4 is legal");

        assert_eq!(game.len(), 3);
        assert_eq!(game.ply(), 3);
        assert_eq!(game.snapshots().len(), 4);
        assert_eq!(game.notation(), &["e4", "e5", "d4"]);
        assert_eq!(game.last_move(), Some(&std_move("d2", "d4")));
    }

    #[test]
    fn standard_move_adds_exactly_one_trace() {
        let mut game = Game::new();
        game.make_move(&std_move("g1", "f3")).expect("Nf3 is legal");
        let pools: Vec<_> = game.board().pools().collect();
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].0, sq("g1"));
        assert_eq!(pools[0].1.total(), 1);
        assert_eq!(
            game.board().pool_count(sq("g1"), PieceCode::new(Color::White, Role::Knight)),
            1
        );
    }

    #[test]
    fn tap_then_unblink_spends_one_trace_each() {
        let start = "4k3/8/8/8/8/8/8/4K3 w - - 0 1 g1:N2B1 - -";
        let knight = PieceCode::new(Color::White, Role::Knight);
        let mut game = Game::from_snapshot(start, &[]).expect("start should parse");

        // The bishop trace cannot reach f3, so only the knight is a candidate.
        game.make_move(&Move::tap(sq("g1"), sq("f3"), Role::Knight, None))
            .expect("tap is legal");
        assert_eq!(game.board().pool_count(sq("g1"), knight), 1);
        let tapped = game.board().piece_at(sq("f3")).expect("tapped piece on f3");
        assert!(tapped.is_pending());
        assert_eq!(tapped.role(), None);

        game.make_move(&std_move("e8", "d8")).expect("Kd8 is legal");
        game.make_move(&Move::unblink(sq("f3"), Role::Knight))
            .expect("unblink is legal");
        assert_eq!(game.board().pool_count(sq("g1"), knight), 0);
        assert_eq!(
            game.board().pool_count(sq("g1"), PieceCode::new(Color::White, Role::Bishop)),
            1
        );
        assert!(game.board().piece_at(sq("f3")).is_some_and(|p| p.is(Color::White, Role::Knight)));
        assert_eq!(game.notation(), &["N*g1f3", "Kd8", "f3!N"]);
    }

    #[test]
    fn en_passant_capture_removes_the_pushed_pawn() {
        let moves = [
            std_move("d2", "d4"),
            std_move("g8", "f6"),
            std_move("d4", "d5"),
            std_move("e7", "e5"),
        ];
        let mut game = Game::from_moves(&moves).expect("setup should replay");
        game.make_move(&std_move("d5", "e6")).expect("dxe6 e.p. is legal");
        assert!(game.board().is_empty(sq("e5")));
        assert_eq!(game.notation().last().map(String::as_str), Some("dxe6"));

        let mut black = Game::from_snapshot(
            "4k3/8/8/8/3p4/8/4P3/4K3 w - - 0 1 - - -",
            &[std_move("e2", "e4")],
        )
        .expect("setup should replay");
        black.make_move(&std_move("d4", "e3")).expect("dxe3 e.p. is legal");
        assert!(black.board().is_empty(sq("e4")));
    }

    #[test]
    fn promotion_requires_an_allowed_role() {
        let start = "4k3/1P6/8/8/8/8/8/4K3 w - - 0 1 - - -";
        let mut game = Game::from_snapshot(start, &[]).expect("start should parse");
        assert_eq!(
            game.make_move(&std_move("b7", "b8")),
            Err(GameError::IllegalMove(IllegalMove::PromotionRequired))
        );
        // b7 and b8 differ in color: no bishop on a straight push.
        assert_eq!(
            game.make_move(&Move::promotion(sq("b7"), sq("b8"), Role::Bishop)),
            Err(GameError::IllegalMove(IllegalMove::BadPromotionRole(Role::Bishop)))
        );
        assert_eq!(
            game.make_move(&Move::promotion(sq("b7"), sq("b8"), Role::King)),
            Err(GameError::IllegalMove(IllegalMove::BadPromotionRole(Role::King)))
        );
        game.make_move(&Move::promotion(sq("b7"), sq("b8"), Role::Knight))
            .expect("knight promotion is legal");
        assert!(game.board().piece_at(sq("b8")).is_some_and(|p| p.is(Color::White, Role::Knight)));
        assert_eq!(
            game.board().pool_count(sq("b7"), PieceCode::new(Color::White, Role::Pawn)),
            1
        );
    }

    #[test]
    fn repetition_enables_draw_claim_at_tip() {
        let shuffle = [
            std_move("g1", "f3"),
            std_move("g8", "f6"),
            std_move("f3", "g1"),
            std_move("f6", "g8"),
        ];
        let moves: Vec<Move> = shuffle.iter().chain(shuffle.iter()).cloned().collect();
        let mut game = Game::from_moves(&moves).expect("shuffle should replay");
        assert_eq!(game.can_claim_draw(), Ok(true));
        game.goto_ply(4).expect("ply in range");
        assert!(!game.board().can_claim_draw());
        assert_eq!(game.can_claim_draw(), Ok(true));
    }

    #[test]
    fn record_round_trips_through_json() {
        let game = Game::from_moves(&opening()).expect("opening should replay");
        let record = game.to_record();
        assert_eq!(record.start, None);
        let json = serde_json::to_string(&record).expect("record should serialize");
        let decoded: super::GameRecord = serde_json::from_str(&json).expect("record should parse");
        assert_eq!(Game::from_record(&decoded).expect("record should replay"), game);
    }
}
