//! Caller-owned move buffers.
//!
//! Every table lookup appends into a `MoveSink`. The contract is append-only: a lookup never
//! clears or reorders what the caller already put in the buffer.
//!
//! `MoveList` is a fixed-size array that avoids heap allocations during move generation. Each
//! search node can create a MoveList on the stack instead of allocating a Vec on the heap.

use crate::types::{Move, PieceType};

/// Maximum number of moves in any legal chess position.
/// The theoretical maximum is 218, but 256 provides nice alignment.
pub const MAX_MOVES: usize = 256;

/// Anything a table can append moves to.
pub trait MoveSink {
    fn push(&mut self, mv: Move);

    fn extend_from_slice(&mut self, moves: &[Move]) {
        for &mv in moves {
            self.push(mv);
        }
    }
}

impl MoveSink for Vec<Move> {
    #[inline(always)]
    fn push(&mut self, mv: Move) {
        Vec::push(self, mv);
    }

    #[inline(always)]
    fn extend_from_slice(&mut self, moves: &[Move]) {
        Vec::extend_from_slice(self, moves);
    }
}

/// Stack-allocated move list.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    count: usize,
}

impl MoveList {
    const EMPTY_SLOT: Move = Move::quiet(0, 0, PieceType::Pawn);

    /// Create a new empty move list.
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            moves: [Self::EMPTY_SLOT; MAX_MOVES],
            count: 0,
        }
    }

    /// Get the number of moves in the list.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Get a move by index (copy by value).
    #[inline(always)]
    pub fn get(&self, idx: usize) -> Move {
        debug_assert!(idx < self.count, "MoveList index out of bounds");
        self.moves[idx]
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.count]
    }

    /// Clear the list (reset count, no need to clear data).
    #[inline(always)]
    pub fn clear(&mut self) {
        self.count = 0;
    }

    /// Iterate over all moves (by value).
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Move> + '_ {
        self.as_slice().iter().copied()
    }
}

impl MoveSink for MoveList {
    #[inline(always)]
    fn push(&mut self, mv: Move) {
        debug_assert!(self.count < MAX_MOVES, "MoveList overflow");
        self.moves[self.count] = mv;
        self.count += 1;
    }

    #[inline]
    fn extend_from_slice(&mut self, moves: &[Move]) {
        let end = self.count + moves.len();
        debug_assert!(end <= MAX_MOVES, "MoveList overflow");
        self.moves[self.count..end].copy_from_slice(moves);
        self.count = end;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveList")
            .field("count", &self.count)
            .field(
                "moves",
                &self.moves[..self.count.min(10)]
                    .iter()
                    .map(|m| m.to_uci())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
