//! Knight moves keyed by the occupancy of the knight's destination squares.
//!
//! Two dictionaries per square. The quiet one is keyed by `all & mask` and lists the empty
//! destinations. The capture one is keyed by `opponent & mask` and lists the enemy-held ones. A
//! destination holding an own piece is in the first key but not the second, so neither lookup
//! produces it. Pinned knights are excluded by the caller.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::bitboard::{all_subsets, Bitboard, BitboardIter, Square, KNIGHT_ATTACKS};
use crate::error::missing_key;
use crate::movelist::MoveSink;
use crate::types::{Move, PieceType};

type MovesByOccupancy = FxHashMap<Bitboard, Box<[Move]>>;

pub struct KnightTable {
    quiet: Vec<MovesByOccupancy>,
    captures: Vec<MovesByOccupancy>,
}

impl KnightTable {
    pub fn build() -> Self {
        let mut quiet = Vec::with_capacity(64);
        let mut captures = Vec::with_capacity(64);
        for sq in 0..64u8 {
            let mask = KNIGHT_ATTACKS[sq as usize];
            let mut quiet_sq = MovesByOccupancy::default();
            let mut captures_sq = MovesByOccupancy::default();
            for occupied in all_subsets(mask) {
                let empty = BitboardIter(mask & !occupied)
                    .map(|to| Move::quiet(sq, to, PieceType::Knight))
                    .collect();
                let taken = BitboardIter(occupied)
                    .map(|to| Move::capture(sq, to, PieceType::Knight))
                    .collect();
                quiet_sq.insert(occupied, empty);
                captures_sq.insert(occupied, taken);
            }
            quiet.push(quiet_sq);
            captures.push(captures_sq);
        }
        let keys: usize = quiet.iter().map(|m| m.len()).sum();
        debug!(keys, "built knight moves");
        Self { quiet, captures }
    }

    #[inline(always)]
    pub fn mask(&self, sq: Square) -> Bitboard {
        KNIGHT_ATTACKS[sq as usize]
    }

    /// Quiet moves then captures
    #[inline]
    pub fn append_moves<S: MoveSink>(&self, sq: Square, all: Bitboard, opponent: Bitboard, sink: &mut S) {
        let key = all & self.mask(sq);
        match self.quiet[sq as usize].get(&key) {
            Some(moves) => sink.extend_from_slice(moves),
            None => missing_key("knight quiet", sq, key),
        }
        self.append_captures(sq, opponent, sink);
    }

    #[inline]
    pub fn append_captures<S: MoveSink>(&self, sq: Square, opponent: Bitboard, sink: &mut S) {
        let key = opponent & self.mask(sq);
        match self.captures[sq as usize].get(&key) {
            Some(moves) => sink.extend_from_slice(moves),
            None => missing_key("knight capture", sq, key),
        }
    }

    pub fn move_count(&self) -> usize {
        self.quiet
            .iter()
            .chain(&self.captures)
            .flat_map(|m| m.values())
            .map(|moves| moves.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitboard::{pos_to_sq, sq_to_bb};

    #[test]
    fn test_knight_in_corner() {
        let table = KnightTable::build();
        let a1 = pos_to_sq(1, 1);
        let mut moves = Vec::new();
        table.append_moves(a1, sq_to_bb(a1), 0, &mut moves);
        let targets: Vec<_> = moves.iter().map(|m| m.to()).collect();
        assert_eq!(targets, vec![pos_to_sq(2, 3), pos_to_sq(3, 2)]);
    }

    #[test]
    fn test_own_and_enemy_destinations() {
        let table = KnightTable::build();
        let g1 = pos_to_sq(1, 7);
        let e2 = pos_to_sq(2, 5); // own
        let f3 = pos_to_sq(3, 6); // enemy
        let h3 = pos_to_sq(3, 8);
        let all = sq_to_bb(g1) | sq_to_bb(e2) | sq_to_bb(f3);
        let mut moves = Vec::new();
        table.append_moves(g1, all, sq_to_bb(f3), &mut moves);
        assert_eq!(
            moves,
            vec![
                Move::quiet(g1, h3, PieceType::Knight),
                Move::capture(g1, f3, PieceType::Knight),
            ]
        );

        moves.clear();
        table.append_captures(g1, sq_to_bb(f3), &mut moves);
        assert_eq!(moves, vec![Move::capture(g1, f3, PieceType::Knight)]);
    }

    #[test]
    #[should_panic(expected = "knight quiet table has no entry")]
    fn test_missing_key_panics() {
        missing_key("knight quiet", 0, 1);
    }
}
