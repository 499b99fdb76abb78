use std::cmp::Reverse;

use chess::ChessMove;

use crate::position::Position;
use crate::types::*;

/// Sorts candidate moves so the likely-best ones are searched first.
/// Ordering never drops a move.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveOrderer;

impl MoveOrderer {
    /// Value of the captured piece plus a small bonus for giving check.
    #[inline]
    pub fn move_score(&self, pos: &Position, mv: ChessMove) -> i32 {
        let mut k = 0;
        if let Some(victim) = pos.captured_piece(mv) { k += capture_value(victim); }
        if pos.gives_check(mv) { k += ORDER_CHECK_BONUS; }
        k
    }

    /// Stable sort by `move_score`: descending when maximizing, ascending otherwise.
    /// Equal scores keep their generation order.
    pub fn order(&self, pos: &Position, moves: Vec<ChessMove>, maximizing: bool) -> Vec<ChessMove> {
        let mut keyed: Vec<(i32, ChessMove)> = moves.into_iter().map(|m| (self.move_score(pos, m), m)).collect();
        if maximizing {
            keyed.sort_by_key(|&(k, _)| Reverse(k));
        } else {
            keyed.sort_by_key(|&(k, _)| k);
        }
        keyed.into_iter().map(|(_, m)| m).collect()
    }
}
