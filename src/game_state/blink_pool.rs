//! Latent traces left behind on vacated squares.
//!
//! Each square owns a multiset of piece codes. Stored counts are always
//! positive: consuming the last copy removes the entry, so two pools holding
//! the same traces compare equal.

use std::collections::BTreeMap;

use crate::game_state::chess_rules::MAX_TRACE_COUNT;
use crate::game_state::chess_types::{Color, PieceCode, Role};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlinkPool {
    counts: BTreeMap<PieceCode, u32>,
}

impl BlinkPool {
    #[inline]
    pub fn count(&self, code: PieceCode) -> u32 {
        self.counts.get(&code).copied().unwrap_or(0)
    }

    #[inline]
    pub fn contains(&self, code: PieceCode) -> bool {
        self.count(code) > 0
    }

    /// Add one copy. Returns `false` and leaves the pool untouched once the
    /// entry holds `MAX_TRACE_COUNT`.
    pub fn add(&mut self, code: PieceCode) -> bool {
        let count = self.counts.entry(code).or_insert(0);
        if *count >= MAX_TRACE_COUNT {
            return false;
        }
        *count += 1;
        true
    }

    /// Add `amount` copies at once (snapshot decoding), capped at `MAX_TRACE_COUNT`.
    pub fn add_many(&mut self, code: PieceCode, amount: u32) {
        if amount > 0 {
            let count = self.counts.entry(code).or_insert(0);
            *count = count.saturating_add(amount).min(MAX_TRACE_COUNT);
        }
    }

    /// Remove one copy. Returns `false` and leaves the pool untouched when
    /// there is nothing to consume.
    pub fn consume(&mut self, code: PieceCode) -> bool {
        match self.counts.get_mut(&code) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                self.counts.remove(&code);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Roles of `color` with at least one trace here.
    pub fn roles_for(&self, color: Color) -> impl Iterator<Item = Role> + '_ {
        self.counts
            .keys()
            .filter(move |code| code.color == color)
            .map(|code| code.role)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PieceCode, u32)> + '_ {
        self.counts.iter().map(|(code, count)| (*code, *count))
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::BlinkPool;
    use crate::game_state::chess_rules::MAX_TRACE_COUNT;
    use crate::game_state::chess_types::{Color, PieceCode, Role};

    #[test]
    fn consuming_last_copy_removes_entry() {
        let knight = PieceCode::new(Color::White, Role::Knight);
        let mut pool = BlinkPool::default();
        pool.add(knight);
        pool.add(knight);
        assert_eq!(pool.count(knight), 2);

        assert!(pool.consume(knight));
        assert!(pool.consume(knight));
        assert!(pool.is_empty());
        assert_eq!(pool, BlinkPool::default());
    }

    #[test]
    fn consuming_absent_code_is_refused() {
        let mut pool = BlinkPool::default();
        pool.add(PieceCode::new(Color::Black, Role::Rook));
        let before = pool.clone();

        assert!(!pool.consume(PieceCode::new(Color::White, Role::Rook)));
        assert_eq!(pool, before);
    }

    #[test]
    fn full_entry_refuses_another_copy() {
        let knight = PieceCode::new(Color::White, Role::Knight);
        let mut pool = BlinkPool::default();
        pool.add_many(knight, MAX_TRACE_COUNT);
        let before = pool.clone();

        assert!(!pool.add(knight));
        assert_eq!(pool, before);
        assert!(pool.consume(knight));
        assert!(pool.add(knight));
        assert_eq!(pool.count(knight), MAX_TRACE_COUNT);
    }

    #[test]
    fn roles_are_filtered_by_color() {
        let mut pool = BlinkPool::default();
        pool.add(PieceCode::new(Color::White, Role::Bishop));
        pool.add(PieceCode::new(Color::Black, Role::Queen));
        pool.add_many(PieceCode::new(Color::White, Role::Pawn), 3);

        let white: Vec<Role> = pool.roles_for(Color::White).collect();
        assert_eq!(white, vec![Role::Pawn, Role::Bishop]);
        assert_eq!(pool.total(), 5);
    }
}
