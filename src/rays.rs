//! Sliding-ray tables: attack bitboards and pins for every occupancy of every line.
//!
//! Each (line family, square) pair owns a dense table with one entry per occupancy subset of
//! the line. The occupancy of a line is gathered into a byte with a multiply-and-shift, then the
//! square's own bit is squeezed out, giving a perfect index in `0..2^n` where `n` is the number of
//! other squares on the line (at most 7).
//!
//! An entry holds the attack bitboard plus up to four king links. Per side of the square:
//! - the blocker is pinned when the king is the next occupied square beyond it;
//! - when the blocker *is* the king, the attack extends one square behind it.

use std::ops::BitOr;

use itertools::iproduct;
use tracing::debug;

use crate::bitboard::{
    all_subsets, line_mask, ray, sq_to_bb, Bitboard, LineFamily, Square, FILE_A, NO_SQUARE,
};

/// Multiplier that collects one file into the top byte (rank r lands on bit 7 - r)
const FILE_GATHER: u64 = 0x8040_2010_0804_0201;

#[derive(Debug, Clone, Copy)]
enum Gather {
    /// Shift of the rank's byte
    Rank(u8),
    /// File number
    File(u8),
    Diagonal,
}

/// Perfect index of a line's occupancy.
#[derive(Debug, Clone, Copy)]
pub struct LineIndex {
    mask: Bitboard,
    gather: Gather,
    /// Lowest byte bit the line uses
    shift: u8,
    /// Byte bit of the square itself, after `shift`
    pos: u8,
    bits: u8,
}

impl LineIndex {
    fn new(sq: Square, family: LineFamily) -> Self {
        let mask = line_mask(sq, family);
        let rank = sq >> 3;
        let file = sq & 7;
        let (gather, shift, pos) = match family {
            LineFamily::Rank => (Gather::Rank(rank * 8), 0, file),
            LineFamily::File => (Gather::File(file), 0, 7 - rank),
            LineFamily::Rising | LineFamily::Falling => {
                let line = mask | sq_to_bb(sq);
                // Gathered byte bit f is file f; the lowest used bit is the leftmost file on the line
                let lowest_file = (0..8u8)
                    .find(|f| line & (FILE_A << f) != 0)
                    .unwrap_or(file);
                (Gather::Diagonal, lowest_file, file - lowest_file)
            }
        };
        Self {
            mask,
            gather,
            shift,
            pos,
            bits: mask.count_ones() as u8,
        }
    }

    /// Other squares on the line
    #[inline(always)]
    pub fn mask(&self) -> Bitboard {
        self.mask
    }

    /// Number of index bits; the table has `1 << bits` entries
    #[inline(always)]
    pub fn bits(&self) -> u32 {
        self.bits as u32
    }

    #[inline(always)]
    pub fn index(&self, occupied: Bitboard) -> usize {
        let byte = match self.gather {
            Gather::Rank(shift) => (occupied >> shift) & 0xFF,
            Gather::File(file) => ((occupied >> file) & FILE_A).wrapping_mul(FILE_GATHER) >> 56,
            Gather::Diagonal => (occupied & self.mask).wrapping_mul(FILE_A) >> 56,
        } >> self.shift;
        let low = byte & ((1 << self.pos) - 1);
        (low | (byte >> (self.pos + 1)) << self.pos) as usize
    }
}

/// What a king on `king` changes about an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct KingLink {
    king: Square,
    pinned: Square,
    xray: Square,
}

impl KingLink {
    const NONE: KingLink = KingLink {
        king: NO_SQUARE,
        pinned: NO_SQUARE,
        xray: NO_SQUARE,
    };
}

/// Attack and pin for one slider, one line, one occupancy, one king square
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RayHit {
    pub attack: Bitboard,
    pub pinned: Bitboard,
}

impl BitOr for RayHit {
    type Output = RayHit;

    #[inline(always)]
    fn bitor(self, rhs: RayHit) -> RayHit {
        RayHit {
            attack: self.attack | rhs.attack,
            pinned: self.pinned | rhs.pinned,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RayEntry {
    attack: Bitboard,
    links: [KingLink; 4],
}

impl RayEntry {
    fn build(sq: Square, family: LineFamily, occupied: Bitboard) -> Self {
        let mut attack = 0;
        let mut links = [KingLink::NONE; 4];
        let mut n_links = 0;

        for ascending in [true, false] {
            let squares = ray(sq, family, ascending);
            let Some(first) = squares.iter().position(|&s| occupied & sq_to_bb(s) != 0) else {
                attack |= squares.iter().fold(0, |bb, &s| bb | sq_to_bb(s));
                continue;
            };
            attack |= squares[..=first].iter().fold(0, |bb, &s| bb | sq_to_bb(s));
            let blocker = squares[first];
            let behind = &squares[first + 1..];

            // the blocker is the king: it cannot step back along the line
            links[n_links] = KingLink {
                king: blocker,
                pinned: NO_SQUARE,
                xray: behind.first().copied().unwrap_or(NO_SQUARE),
            };
            n_links += 1;

            if let Some(&king) = behind.iter().find(|&&s| occupied & sq_to_bb(s) != 0) {
                links[n_links] = KingLink {
                    king,
                    pinned: blocker,
                    xray: NO_SQUARE,
                };
                n_links += 1;
            }
        }
        Self { attack, links }
    }

    /// Squares attacked regardless of where the king is
    #[inline(always)]
    pub fn attack(&self) -> Bitboard {
        self.attack
    }

    #[inline(always)]
    pub fn resolve(&self, king: Square) -> RayHit {
        let mut hit = RayHit {
            attack: self.attack,
            pinned: 0,
        };
        for link in &self.links {
            if link.king == king {
                if link.pinned != NO_SQUARE {
                    hit.pinned |= sq_to_bb(link.pinned);
                }
                if link.xray != NO_SQUARE {
                    hit.attack |= sq_to_bb(link.xray);
                }
            }
        }
        hit
    }
}

struct LineTable {
    index: LineIndex,
    entries: Box<[RayEntry]>,
}

impl LineTable {
    fn build(sq: Square, family: LineFamily) -> Self {
        let index = LineIndex::new(sq, family);
        let mut slots: Vec<Option<RayEntry>> = vec![None; 1 << index.bits()];
        for occupied in all_subsets(index.mask) {
            let slot = &mut slots[index.index(occupied)];
            assert!(
                slot.is_none(),
                "{} index collision on square {sq} for occupancy {occupied:#x}",
                family.to_human()
            );
            *slot = Some(RayEntry::build(sq, family, occupied));
        }
        let entries: Box<[RayEntry]> = slots.into_iter().flatten().collect();
        assert_eq!(entries.len(), 1 << index.bits());
        Self { index, entries }
    }

    #[inline(always)]
    fn get(&self, occupied: Bitboard) -> &RayEntry {
        &self.entries[self.index.index(occupied)]
    }
}

/// King-agnostic view of a pair of line families
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeenSquares {
    pub attack: Bitboard,
    pub count: u32,
}

struct PairTable {
    entries: Box<[SeenSquares]>,
}

pub struct RayTables {
    /// Indexed `family * 64 + square`
    lines: Vec<LineTable>,
    diagonal_seen: Vec<PairTable>,
    straight_seen: Vec<PairTable>,
}

impl RayTables {
    pub fn build() -> Self {
        let lines: Vec<LineTable> = iproduct!(LineFamily::ALL, 0..64u8)
            .map(|(family, sq)| LineTable::build(sq, family))
            .collect();
        let line_entries: usize = lines.iter().map(|t| t.entries.len()).sum();
        debug!(line_entries, "built sliding ray lines");

        let mut tables = Self {
            lines,
            diagonal_seen: Vec::with_capacity(64),
            straight_seen: Vec::with_capacity(64),
        };
        for sq in 0..64u8 {
            let diagonal = tables.build_pair(sq, LineFamily::DIAGONAL);
            let straight = tables.build_pair(sq, LineFamily::STRAIGHT);
            tables.diagonal_seen.push(diagonal);
            tables.straight_seen.push(straight);
        }
        let seen_entries: usize = tables
            .diagonal_seen
            .iter()
            .chain(&tables.straight_seen)
            .map(|t| t.entries.len())
            .sum();
        debug!(seen_entries, "built combined attack tables");
        tables
    }

    fn build_pair(&self, sq: Square, [first, second]: [LineFamily; 2]) -> PairTable {
        let a = self.table(first, sq);
        let b = self.table(second, sq);
        let mut slots: Vec<Option<SeenSquares>> = vec![None; 1 << (a.index.bits() + b.index.bits())];
        for (occ_a, occ_b) in iproduct!(all_subsets(a.index.mask), all_subsets(b.index.mask)) {
            let occupied = occ_a | occ_b;
            let slot = &mut slots[Self::pair_index(a, b, occupied)];
            assert!(slot.is_none(), "combined index collision on square {sq}");
            let attack = a.get(occupied).attack | b.get(occupied).attack;
            *slot = Some(SeenSquares {
                attack,
                count: attack.count_ones(),
            });
        }
        let entries: Box<[SeenSquares]> = slots.into_iter().flatten().collect();
        assert_eq!(entries.len(), 1 << (a.index.bits() + b.index.bits()));
        PairTable { entries }
    }

    #[inline(always)]
    fn pair_index(a: &LineTable, b: &LineTable, occupied: Bitboard) -> usize {
        a.index.index(occupied) << b.index.bits() | b.index.index(occupied)
    }

    #[inline(always)]
    fn table(&self, family: LineFamily, sq: Square) -> &LineTable {
        &self.lines[family.index() * 64 + sq as usize]
    }

    /// Index of the occupancy of one line through `sq`
    #[inline(always)]
    pub fn line_index(&self, family: LineFamily, sq: Square) -> &LineIndex {
        &self.table(family, sq).index
    }

    /// Raw entry, for tables derived from this one
    #[inline(always)]
    pub fn entry(&self, family: LineFamily, sq: Square, occupied: Bitboard) -> &RayEntry {
        self.table(family, sq).get(occupied)
    }

    /// Attack and pin of a slider on `sq` along one family
    #[inline(always)]
    pub fn line(&self, family: LineFamily, sq: Square, occupied: Bitboard, king: Square) -> RayHit {
        self.entry(family, sq, occupied).resolve(king)
    }

    #[inline(always)]
    pub fn diagonal(&self, sq: Square, occupied: Bitboard, king: Square) -> RayHit {
        self.line(LineFamily::Rising, sq, occupied, king)
            | self.line(LineFamily::Falling, sq, occupied, king)
    }

    #[inline(always)]
    pub fn straight(&self, sq: Square, occupied: Bitboard, king: Square) -> RayHit {
        self.line(LineFamily::File, sq, occupied, king)
            | self.line(LineFamily::Rank, sq, occupied, king)
    }

    #[inline(always)]
    pub fn queen(&self, sq: Square, occupied: Bitboard, king: Square) -> RayHit {
        self.diagonal(sq, occupied, king) | self.straight(sq, occupied, king)
    }

    #[inline(always)]
    pub fn diagonal_seen(&self, sq: Square, occupied: Bitboard) -> SeenSquares {
        let a = self.table(LineFamily::Rising, sq);
        let b = self.table(LineFamily::Falling, sq);
        self.diagonal_seen[sq as usize].entries[Self::pair_index(a, b, occupied)]
    }

    #[inline(always)]
    pub fn straight_seen(&self, sq: Square, occupied: Bitboard) -> SeenSquares {
        let a = self.table(LineFamily::File, sq);
        let b = self.table(LineFamily::Rank, sq);
        self.straight_seen[sq as usize].entries[Self::pair_index(a, b, occupied)]
    }

    #[inline(always)]
    pub fn diagonal_square_count(&self, sq: Square, occupied: Bitboard) -> u32 {
        self.diagonal_seen(sq, occupied).count
    }

    #[inline(always)]
    pub fn straight_square_count(&self, sq: Square, occupied: Bitboard) -> u32 {
        self.straight_seen(sq, occupied).count
    }

    #[inline(always)]
    pub fn queen_square_count(&self, sq: Square, occupied: Bitboard) -> u32 {
        self.diagonal_square_count(sq, occupied) + self.straight_square_count(sq, occupied)
    }

    /// Number of stored entries (per-line plus combined)
    pub fn entry_count(&self) -> usize {
        let lines: usize = self.lines.iter().map(|t| t.entries.len()).sum();
        let pairs: usize = self
            .diagonal_seen
            .iter()
            .chain(&self.straight_seen)
            .map(|t| t.entries.len())
            .sum();
        lines + pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitboard::{pos_to_sq, slide_attacks_slow};
    use crate::tables::MoveTables;

    fn tables() -> &'static RayTables {
        &MoveTables::shared().rays
    }

    #[test]
    fn test_index_is_perfect() {
        for family in LineFamily::ALL {
            for sq in 0..64u8 {
                let index = LineIndex::new(sq, family);
                let mut seen = vec![false; 1 << index.bits()];
                for occ in all_subsets(index.mask()) {
                    let i = index.index(occ);
                    assert!(!seen[i], "{family:?} {sq} {occ:#x}");
                    seen[i] = true;
                    // squares off the line do not move the index
                    assert_eq!(index.index(occ | !index.mask()), i);
                }
            }
        }
    }

    #[test]
    fn test_corner_diagonal_is_empty() {
        let index = LineIndex::new(pos_to_sq(1, 8), LineFamily::Rising);
        assert_eq!(index.bits(), 0);
        assert_eq!(index.index(u64::MAX), 0);
        let hit = tables().line(LineFamily::Rising, pos_to_sq(1, 8), u64::MAX, NO_SQUARE);
        assert_eq!(hit, RayHit::default());
    }

    #[test]
    fn test_empty_line_reaches_edges() {
        let e4 = pos_to_sq(4, 5);
        let hit = tables().straight(e4, sq_to_bb(e4), NO_SQUARE);
        assert_eq!(hit.attack, slide_attacks_slow(e4, 0, &LineFamily::STRAIGHT));
        assert_eq!(hit.pinned, 0);
    }

    #[test]
    fn test_pin_on_file() {
        // rook e1, knight e4, king e8, nothing else on the file
        let e1 = pos_to_sq(1, 5);
        let e4 = pos_to_sq(4, 5);
        let e8 = pos_to_sq(8, 5);
        let occupied = sq_to_bb(e1) | sq_to_bb(e4) | sq_to_bb(e8);
        let hit = tables().line(LineFamily::File, e1, occupied, e8);
        assert_eq!(hit.pinned, sq_to_bb(e4));
        assert_eq!(hit.attack & sq_to_bb(e8), 0);

        // with a second piece between blocker and king there is no pin
        let e6 = pos_to_sq(6, 5);
        let hit = tables().line(LineFamily::File, e1, occupied | sq_to_bb(e6), e8);
        assert_eq!(hit.pinned, 0);

        // a king elsewhere sees no pin
        let hit = tables().line(LineFamily::File, e1, occupied, pos_to_sq(7, 5));
        assert_eq!(hit.pinned, 0);
    }

    #[test]
    fn test_check_xrays_king() {
        // bishop a1 checks king d4: e5 is attacked through the king, f6 is not
        let a1 = pos_to_sq(1, 1);
        let d4 = pos_to_sq(4, 4);
        let occupied = sq_to_bb(a1) | sq_to_bb(d4);
        let hit = tables().diagonal(a1, occupied, d4);
        assert!(hit.attack & sq_to_bb(d4) != 0);
        assert!(hit.attack & sq_to_bb(pos_to_sq(5, 5)) != 0);
        assert_eq!(hit.attack & sq_to_bb(pos_to_sq(6, 6)), 0);
        assert_eq!(hit.pinned, 0);

        // without that king the blocker is an ordinary piece
        let plain = tables().diagonal(a1, occupied, NO_SQUARE);
        assert_eq!(plain.attack & sq_to_bb(pos_to_sq(5, 5)), 0);
    }

    #[test]
    fn test_xray_stops_at_edge() {
        // rook a4 checks king h4: nothing behind the king, no wrap onto the next rank
        let a4 = pos_to_sq(4, 1);
        let h4 = pos_to_sq(4, 8);
        let occupied = sq_to_bb(a4) | sq_to_bb(h4);
        let hit = tables().straight(a4, occupied, h4);
        assert_eq!(hit.attack, slide_attacks_slow(a4, occupied, &LineFamily::STRAIGHT));
    }

    #[test]
    fn test_seen_counts() {
        let d4 = pos_to_sq(4, 4);
        assert_eq!(tables().straight_square_count(d4, 0), 14);
        assert_eq!(tables().diagonal_square_count(d4, 0), 13);
        assert_eq!(tables().queen_square_count(d4, 0), 27);

        let occupied = sq_to_bb(pos_to_sq(6, 6)) | sq_to_bb(pos_to_sq(4, 2));
        let seen = tables().diagonal_seen(d4, occupied);
        assert_eq!(seen.attack, slide_attacks_slow(d4, occupied, &LineFamily::DIAGONAL));
        assert_eq!(seen.count, seen.attack.count_ones());
    }
}
