//! Queen moves as a composition of the rook and bishop tables.
//!
//! The two base tables cover disjoint line families, so the queen table is both of them with
//! every move relabeled. No ray is walked again.

use crate::bitboard::{Bitboard, Square};
use crate::movelist::MoveSink;
use crate::sliders::SliderTable;
use crate::types::PieceType;

#[derive(Clone)]
pub struct QueenTable {
    straight: SliderTable,
    diagonal: SliderTable,
}

impl QueenTable {
    pub fn compose(rook: &SliderTable, bishop: &SliderTable) -> Self {
        Self {
            straight: rook.relabel(PieceType::Queen),
            diagonal: bishop.relabel(PieceType::Queen),
        }
    }

    /// Straight lines first, then diagonals
    #[inline]
    pub fn append_moves<S: MoveSink>(&self, sq: Square, all: Bitboard, opponent: Bitboard, sink: &mut S) {
        self.straight.append_moves(sq, all, opponent, sink);
        self.diagonal.append_moves(sq, all, opponent, sink);
    }

    #[inline]
    pub fn append_captures<S: MoveSink>(
        &self,
        sq: Square,
        all: Bitboard,
        opponent: Bitboard,
        sink: &mut S,
    ) {
        self.straight.append_captures(sq, all, opponent, sink);
        self.diagonal.append_captures(sq, all, opponent, sink);
    }

    /// At most one of the two halves holds the line through the king
    #[inline]
    pub fn append_pinned_moves<S: MoveSink>(
        &self,
        sq: Square,
        king: Square,
        all: Bitboard,
        opponent: Bitboard,
        sink: &mut S,
    ) {
        self.straight.append_pinned_moves(sq, king, all, opponent, sink);
        self.diagonal.append_pinned_moves(sq, king, all, opponent, sink);
    }

    #[inline]
    pub fn append_pinned_captures<S: MoveSink>(
        &self,
        sq: Square,
        king: Square,
        all: Bitboard,
        opponent: Bitboard,
        sink: &mut S,
    ) {
        self.straight.append_pinned_captures(sq, king, all, opponent, sink);
        self.diagonal.append_pinned_captures(sq, king, all, opponent, sink);
    }

    pub fn move_count(&self) -> usize {
        self.straight.move_count() + self.diagonal.move_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitboard::{pos_to_sq, sq_to_bb};
    use crate::tables::MoveTables;
    use crate::types::Move;

    #[test]
    fn test_queen_is_rook_plus_bishop() {
        let tables = MoveTables::shared();
        let (rook, bishop, queen) = (&tables.rook, &tables.bishop, &tables.queen);
        assert_eq!(queen.move_count(), rook.move_count() + bishop.move_count());

        let d4 = pos_to_sq(4, 4);
        let f6 = pos_to_sq(6, 6);
        let d7 = pos_to_sq(7, 4);
        let all = sq_to_bb(d4) | sq_to_bb(f6) | sq_to_bb(d7);
        let opponent = sq_to_bb(f6);

        let mut expected = Vec::new();
        rook.append_moves(d4, all, opponent, &mut expected);
        bishop.append_moves(d4, all, opponent, &mut expected);
        let expected: Vec<_> = expected.iter().map(|m| m.with_piece(PieceType::Queen)).collect();

        let mut moves = Vec::new();
        queen.append_moves(d4, all, opponent, &mut moves);
        assert_eq!(moves, expected);
        assert_eq!(moves.iter().filter(|m| m.is_capture()).count(), 1);
    }

    #[test]
    fn test_pinned_queen_keeps_diagonal() {
        // queen c3 pinned to the king on a1 by a bishop on e5; c6 is an enemy off the pin line
        let queen = &MoveTables::shared().queen;
        let a1 = pos_to_sq(1, 1);
        let c3 = pos_to_sq(3, 3);
        let e5 = pos_to_sq(5, 5);
        let c6 = pos_to_sq(6, 3);
        let all = sq_to_bb(a1) | sq_to_bb(c3) | sq_to_bb(e5) | sq_to_bb(c6);
        let opponent = sq_to_bb(e5) | sq_to_bb(c6);

        let mut moves = Vec::new();
        queen.append_pinned_moves(c3, a1, all, opponent, &mut moves);
        assert_eq!(
            moves,
            vec![
                Move::quiet(c3, pos_to_sq(2, 2), PieceType::Queen),
                Move::quiet(c3, pos_to_sq(4, 4), PieceType::Queen),
                Move::capture(c3, e5, PieceType::Queen),
            ]
        );

        moves.clear();
        queen.append_pinned_captures(c3, a1, all, opponent, &mut moves);
        assert_eq!(moves, vec![Move::capture(c3, e5, PieceType::Queen)]);

        // unpinned, the c6 capture comes back
        moves.clear();
        queen.append_captures(c3, all, opponent, &mut moves);
        assert_eq!(moves.len(), 2);
        assert!(moves.iter().any(|m| m.to() == c6));
    }
}
