//! White pawn moves keyed by the occupancy of the squares a pawn cares about.
//!
//! The key is `(all & push_mask) | (opponent & capture_mask)`: push squares block when anything
//! stands on them, capture squares count only when an enemy does. Black pawns are the mirror
//! image and live outside this table.
//!
//! Besides the unfiltered moves, each square has a variant per aligned king square that keeps only
//! the destinations staying on the line to that king. Every king square off the pawn's lines
//! shares the unfiltered map.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::bitboard::{all_subsets, sq_file, sq_rank, sq_to_bb, Bitboard, BitboardIter, Square};
use crate::connectivity::Connectivity;
use crate::error::missing_key;
use crate::movelist::MoveSink;
use crate::types::{Move, PieceType, PIECES_CAN_PROMOTE_TO};

type MovesByOccupancy = FxHashMap<Bitboard, Box<[Move]>>;

#[derive(Default)]
struct PawnSquare {
    push_mask: Bitboard,
    capture_mask: Bitboard,
    unfiltered: MovesByOccupancy,
    /// Per king square; `None` when the king is not aligned with the pawn
    pinned: Vec<Option<MovesByOccupancy>>,
}

impl PawnSquare {
    fn build(sq: Square, connectivity: &Connectivity) -> Self {
        let mut push_mask = sq_to_bb(sq + 8);
        if sq_rank(sq) == 2 {
            push_mask |= sq_to_bb(sq + 16);
        }
        let mut capture_mask = 0;
        if sq_file(sq) > 1 {
            capture_mask |= sq_to_bb(sq + 7);
        }
        if sq_file(sq) < 8 {
            capture_mask |= sq_to_bb(sq + 9);
        }

        let build_map = |keep: &dyn Fn(Square) -> bool| -> MovesByOccupancy {
            all_subsets(push_mask | capture_mask)
                .map(|key| (key, pawn_moves(sq, key, capture_mask, keep)))
                .collect()
        };

        let unfiltered = build_map(&|_: Square| true);
        let pinned = (0..64u8)
            .map(|king| {
                connectivity.get(king, sq)?;
                Some(build_map(&|dest: Square| connectivity.keeps_line(king, sq, dest)))
            })
            .collect();

        Self {
            push_mask,
            capture_mask,
            unfiltered,
            pinned,
        }
    }

    #[inline(always)]
    fn key(&self, all: Bitboard, opponent: Bitboard) -> Bitboard {
        (all & self.push_mask) | (opponent & self.capture_mask)
    }

    /// Push squares count as blocked, leaving only captures
    #[inline(always)]
    fn capture_key(&self, opponent: Bitboard) -> Bitboard {
        self.push_mask | (opponent & self.capture_mask)
    }

    #[inline(always)]
    fn map_for(&self, king: Square) -> &MovesByOccupancy {
        match self.pinned.get(king as usize) {
            Some(Some(map)) => map,
            _ => &self.unfiltered,
        }
    }
}

/// Moves for one key: push, captures on the lower then higher diagonal, then the double push.
fn pawn_moves(
    sq: Square,
    key: Bitboard,
    capture_mask: Bitboard,
    keep: &dyn Fn(Square) -> bool,
) -> Box<[Move]> {
    let mut moves = Vec::with_capacity(12);
    let push = sq + 8;

    if key & sq_to_bb(push) == 0 && keep(push) {
        add_pawn_move(&mut moves, sq, push, false);
    }
    for to in BitboardIter(capture_mask & key) {
        if keep(to) {
            add_pawn_move(&mut moves, sq, to, true);
        }
    }
    if sq_rank(sq) == 2 {
        let double = sq + 16;
        if key & (sq_to_bb(push) | sq_to_bb(double)) == 0 && keep(double) {
            moves.push(Move::double_push(sq, double));
        }
    }
    moves.into_boxed_slice()
}

/// Back-rank destinations expand to one move per promotion piece
fn add_pawn_move(moves: &mut Vec<Move>, from: Square, to: Square, capture: bool) {
    if sq_rank(to) == 8 {
        moves.extend(
            PIECES_CAN_PROMOTE_TO
                .iter()
                .map(|&piece| Move::promotion(from, to, piece, capture)),
        );
    } else {
        moves.push(Move::new(from, to, PieceType::Pawn, capture));
    }
}

pub struct PawnTable {
    squares: Vec<PawnSquare>,
    /// Per square, the en passant capture onto the lower and higher diagonal
    en_passant: [[Option<Move>; 2]; 64],
}

impl PawnTable {
    pub fn build(connectivity: &Connectivity) -> Self {
        let squares: Vec<PawnSquare> = (0..64u8)
            .map(|sq| {
                if (2..=7).contains(&sq_rank(sq)) {
                    PawnSquare::build(sq, connectivity)
                } else {
                    PawnSquare::default()
                }
            })
            .collect();

        let mut en_passant = [[None; 2]; 64];
        for sq in BitboardIter(0xFF << 32) {
            if sq_file(sq) > 1 {
                en_passant[sq as usize][0] = Some(Move::en_passant(sq, sq + 7, sq - 1));
            }
            if sq_file(sq) < 8 {
                en_passant[sq as usize][1] = Some(Move::en_passant(sq, sq + 9, sq + 1));
            }
        }

        let pinned_maps = squares
            .iter()
            .flat_map(|s| s.pinned.iter())
            .filter(|m| m.is_some())
            .count();
        debug!(pinned_maps, "built pawn moves");
        Self {
            squares,
            en_passant,
        }
    }

    #[inline(always)]
    fn lookup<S: MoveSink>(map: &MovesByOccupancy, sq: Square, key: Bitboard, sink: &mut S) {
        match map.get(&key) {
            Some(moves) => sink.extend_from_slice(moves),
            None => missing_key("pawn", sq, key),
        }
    }

    #[inline]
    pub fn append_moves<S: MoveSink>(&self, sq: Square, all: Bitboard, opponent: Bitboard, sink: &mut S) {
        let square = &self.squares[sq as usize];
        Self::lookup(&square.unfiltered, sq, square.key(all, opponent), sink);
    }

    /// Moves of a pawn pinned to `king`. Falls back to the unfiltered moves when the two are
    /// not aligned.
    #[inline]
    pub fn append_pinned_moves<S: MoveSink>(
        &self,
        sq: Square,
        king: Square,
        all: Bitboard,
        opponent: Bitboard,
        sink: &mut S,
    ) {
        let square = &self.squares[sq as usize];
        Self::lookup(square.map_for(king), sq, square.key(all, opponent), sink);
    }

    #[inline]
    pub fn append_captures<S: MoveSink>(&self, sq: Square, opponent: Bitboard, sink: &mut S) {
        let square = &self.squares[sq as usize];
        Self::lookup(&square.unfiltered, sq, square.capture_key(opponent), sink);
    }

    #[inline]
    pub fn append_pinned_captures<S: MoveSink>(
        &self,
        sq: Square,
        king: Square,
        opponent: Bitboard,
        sink: &mut S,
    ) {
        let square = &self.squares[sq as usize];
        Self::lookup(square.map_for(king), sq, square.capture_key(opponent), sink);
    }

    /// En passant capture onto `target`, if a pawn on `sq` can make one. Whether it exposes the
    /// king is left to the caller.
    #[inline]
    pub fn append_en_passant<S: MoveSink>(&self, sq: Square, target: Square, sink: &mut S) {
        for mv in self.en_passant[sq as usize].iter().flatten() {
            if mv.to() == target {
                sink.push(*mv);
            }
        }
    }

    /// Number of stored moves, counting each shared map once
    pub fn move_count(&self) -> usize {
        self.squares
            .iter()
            .flat_map(|s| std::iter::once(&s.unfiltered).chain(s.pinned.iter().flatten()))
            .flat_map(|m| m.values())
            .map(|moves| moves.len())
            .sum()
    }
}
