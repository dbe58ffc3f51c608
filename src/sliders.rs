//! Rook and bishop move lists, derived from the sliding-ray tables.
//!
//! Every line entry keeps its quiet slides ready to copy plus the (at most two) blocker squares as
//! capture candidates. Whether a blocker is an enemy is only known at query time, so the candidates
//! are filtered against the opponent bitboard then.

use tracing::debug;

use crate::bitboard::{all_subsets, line_family, sq_to_bb, Bitboard, BitboardIter, LineFamily, Square};
use crate::movelist::MoveSink;
use crate::rays::{LineIndex, RayTables};
use crate::types::{Move, PieceType};

#[derive(Debug, Clone)]
struct LineMoves {
    quiet: Box<[Move]>,
    captures: [Option<Move>; 2],
}

impl LineMoves {
    #[inline(always)]
    fn append_captures<S: MoveSink>(&self, opponent: Bitboard, sink: &mut S) {
        for mv in self.captures.iter().flatten() {
            if opponent & sq_to_bb(mv.to()) != 0 {
                sink.push(*mv);
            }
        }
    }
}

#[derive(Clone)]
struct SliderLine {
    index: LineIndex,
    moves: Box<[LineMoves]>,
}

#[derive(Clone)]
pub struct SliderTable {
    piece: PieceType,
    families: [LineFamily; 2],
    /// Indexed `slot * 64 + square`, slot being the position in `families`
    lines: Vec<SliderLine>,
}

impl SliderTable {
    pub fn rook(rays: &RayTables) -> Self {
        Self::build(rays, PieceType::Rook, LineFamily::STRAIGHT)
    }

    pub fn bishop(rays: &RayTables) -> Self {
        Self::build(rays, PieceType::Bishop, LineFamily::DIAGONAL)
    }

    fn build(rays: &RayTables, piece: PieceType, families: [LineFamily; 2]) -> Self {
        let mut lines = Vec::with_capacity(128);
        for family in families {
            for sq in 0..64u8 {
                let index = *rays.line_index(family, sq);
                let mut slots: Vec<Option<LineMoves>> = vec![None; 1 << index.bits()];
                for occupied in all_subsets(index.mask()) {
                    let attack = rays.entry(family, sq, occupied).attack();
                    let quiet = BitboardIter(attack & !occupied)
                        .map(|to| Move::quiet(sq, to, piece))
                        .collect();
                    let mut captures = [None; 2];
                    for (slot, to) in captures.iter_mut().zip(BitboardIter(attack & occupied)) {
                        *slot = Some(Move::capture(sq, to, piece));
                    }
                    slots[index.index(occupied)] = Some(LineMoves { quiet, captures });
                }
                let moves: Box<[LineMoves]> = slots.into_iter().flatten().collect();
                assert_eq!(moves.len(), 1 << index.bits());
                lines.push(SliderLine { index, moves });
            }
        }
        let table = Self {
            piece,
            families,
            lines,
        };
        debug!(piece = piece.to_human(), moves = table.move_count(), "built slider moves");
        table
    }

    pub fn piece(&self) -> PieceType {
        self.piece
    }

    /// Same table with every move made by `piece` instead
    pub fn relabel(&self, piece: PieceType) -> Self {
        let lines = self
            .lines
            .iter()
            .map(|line| SliderLine {
                index: line.index,
                moves: line
                    .moves
                    .iter()
                    .map(|m| LineMoves {
                        quiet: m.quiet.iter().map(|mv| mv.with_piece(piece)).collect(),
                        captures: m.captures.map(|c| c.map(|mv| mv.with_piece(piece))),
                    })
                    .collect(),
            })
            .collect();
        Self {
            piece,
            families: self.families,
            lines,
        }
    }

    #[inline(always)]
    fn line(&self, slot: usize, sq: Square, all: Bitboard) -> &LineMoves {
        let line = &self.lines[slot * 64 + sq as usize];
        &line.moves[line.index.index(all)]
    }

    /// Slot of the line joining `sq` and `king`, if this piece moves along it
    #[inline(always)]
    fn pin_slot(&self, sq: Square, king: Square) -> Option<usize> {
        let family = line_family(sq, king)?;
        self.families.iter().position(|&f| f == family)
    }

    /// Every destination, quiet moves before captures per line
    #[inline]
    pub fn append_moves<S: MoveSink>(&self, sq: Square, all: Bitboard, opponent: Bitboard, sink: &mut S) {
        for slot in 0..2 {
            let line = self.line(slot, sq, all);
            sink.extend_from_slice(&line.quiet);
            line.append_captures(opponent, sink);
        }
    }

    #[inline]
    pub fn append_captures<S: MoveSink>(
        &self,
        sq: Square,
        all: Bitboard,
        opponent: Bitboard,
        sink: &mut S,
    ) {
        for slot in 0..2 {
            self.line(slot, sq, all).append_captures(opponent, sink);
        }
    }

    /// Moves of a piece pinned to `king`: only the line through the king survives.
    #[inline]
    pub fn append_pinned_moves<S: MoveSink>(
        &self,
        sq: Square,
        king: Square,
        all: Bitboard,
        opponent: Bitboard,
        sink: &mut S,
    ) {
        if let Some(slot) = self.pin_slot(sq, king) {
            let line = self.line(slot, sq, all);
            sink.extend_from_slice(&line.quiet);
            line.append_captures(opponent, sink);
        }
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
        if let Some(slot) = self.pin_slot(sq, king) {
            self.line(slot, sq, all).append_captures(opponent, sink);
        }
    }

    /// Total number of stored moves
    pub fn move_count(&self) -> usize {
        self.lines
            .iter()
            .flat_map(|line| line.moves.iter())
            .map(|m| m.quiet.len() + m.captures.iter().flatten().count())
            .sum()
    }
}
