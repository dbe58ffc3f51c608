//! Bitboard representation and board geometry shared by every precomputed table.
//!
//! A bitboard is a 64-bit integer where each bit represents a square on the chess board.
//! Square indexing: a1 = 0, b1 = 1, ..., h1 = 7, a2 = 8, ..., h8 = 63
//! This corresponds to: square_index = (rank - 1) * 8 + (file - 1) where rank/file are 1-indexed.
//!
//! Sliding movement is described by four line families. Each family splits into an ascending
//! half ray (towards higher square indices) and a descending half ray.

use itertools::Itertools;

pub type Bitboard = u64;
pub type Square = u8;

/// Sentinel for "no square". Never a valid index into a 64-entry table.
pub const NO_SQUARE: Square = 64;

pub const FILE_A: Bitboard = 0x0101_0101_0101_0101;
pub const RANK_1: Bitboard = 0x0000_0000_0000_00FF;
/// The a1-h8 diagonal
pub const MAIN_DIAGONAL: Bitboard = 0x8040_2010_0804_0201;

/// Convert a 1-indexed rank/file pair to a square index (0-63)
#[inline(always)]
pub const fn pos_to_sq(rank: u8, file: u8) -> Square {
    (rank - 1) * 8 + (file - 1)
}

/// Convert a square index to a bitboard with that single bit set
#[inline(always)]
pub const fn sq_to_bb(sq: Square) -> Bitboard {
    1u64 << sq
}

/// Get the rank (1-8) from a square index
#[inline(always)]
pub const fn sq_rank(sq: Square) -> u8 {
    (sq >> 3) + 1
}

/// Get the file (1-8) from a square index
#[inline(always)]
pub const fn sq_file(sq: Square) -> u8 {
    (sq & 7) + 1
}

#[inline(always)]
pub const fn is_set(bb: Bitboard, sq: Square) -> bool {
    bb & sq_to_bb(sq) != 0
}

/// Algebraic name of a square, e.g. `e4`
pub fn square_name(sq: Square) -> String {
    format!(
        "{}{}",
        (sq_file(sq) - 1 + b'a') as char,
        (sq_rank(sq) + b'0') as char
    )
}

/// Parse an algebraic square name (`a1`..`h8`)
pub fn parse_square(s: &str) -> Option<Square> {
    let mut chars = s.trim().chars();
    let file = chars.next()?.to_ascii_lowercase();
    let rank = chars.next()?;
    if chars.next().is_some() || !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
        return None;
    }
    Some(pos_to_sq(rank as u8 - b'0', file as u8 - b'a' + 1))
}

/// Iterate over set bits in a bitboard, returning square indices
pub struct BitboardIter(pub Bitboard);

impl Iterator for BitboardIter {
    type Item = Square;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            None
        } else {
            let sq = self.0.trailing_zeros() as Square;
            self.0 &= self.0 - 1; // Clear the lowest set bit
            Some(sq)
        }
    }
}

/// Generate all subsets of a mask using Carry-Rippler technique.
/// The empty set comes first, the full mask last.
pub fn all_subsets(mask: Bitboard) -> impl Iterator<Item = Bitboard> + Clone {
    let mut subset = 0u64;
    let mut done = false;
    std::iter::from_fn(move || {
        if done {
            return None;
        }
        let current = subset;
        subset = subset.wrapping_sub(mask) & mask;
        if subset == 0 {
            done = true;
        }
        Some(current)
    })
}

/// The four lines a sliding piece can travel along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineFamily {
    /// a1-h8 direction, +9 per step
    Rising,
    /// h1-a8 direction, +7 per step
    Falling,
    /// Vertical, +8 per step
    File,
    /// Horizontal, +1 per step
    Rank,
}

impl LineFamily {
    pub const ALL: [LineFamily; 4] = [
        LineFamily::Rising,
        LineFamily::Falling,
        LineFamily::File,
        LineFamily::Rank,
    ];
    pub const DIAGONAL: [LineFamily; 2] = [LineFamily::Rising, LineFamily::Falling];
    pub const STRAIGHT: [LineFamily; 2] = [LineFamily::File, LineFamily::Rank];

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// (rank delta, file delta) of one ascending step
    pub const fn ascending_delta(self) -> (i8, i8) {
        match self {
            LineFamily::Rising => (1, 1),
            LineFamily::Falling => (1, -1),
            LineFamily::File => (1, 0),
            LineFamily::Rank => (0, 1),
        }
    }

    pub fn to_human(self) -> &'static str {
        match self {
            LineFamily::Rising => "rising diagonal",
            LineFamily::Falling => "falling diagonal",
            LineFamily::File => "file",
            LineFamily::Rank => "rank",
        }
    }
}

/// Squares from `sq` (exclusive) to the board edge, nearest first.
pub fn ray(sq: Square, family: LineFamily, ascending: bool) -> Vec<Square> {
    let (mut dr, mut df) = family.ascending_delta();
    if !ascending {
        dr = -dr;
        df = -df;
    }
    let mut squares = Vec::with_capacity(7);
    let mut r = (sq >> 3) as i8 + dr;
    let mut f = (sq & 7) as i8 + df;
    while (0..8).contains(&r) && (0..8).contains(&f) {
        squares.push((r * 8 + f) as Square);
        r += dr;
        f += df;
    }
    squares
}

/// All other squares on `family` through `sq`: the relevant occupancy mask.
pub fn line_mask(sq: Square, family: LineFamily) -> Bitboard {
    ray(sq, family, true)
        .into_iter()
        .chain(ray(sq, family, false))
        .fold(0, |bb, s| bb | sq_to_bb(s))
}

/// The line family both squares lie on, if any
pub fn line_family(a: Square, b: Square) -> Option<LineFamily> {
    if a == b {
        return None;
    }
    let dr = (b >> 3) as i8 - (a >> 3) as i8;
    let df = (b & 7) as i8 - (a & 7) as i8;
    if dr == 0 {
        Some(LineFamily::Rank)
    } else if df == 0 {
        Some(LineFamily::File)
    } else if dr == df {
        Some(LineFamily::Rising)
    } else if dr == -df {
        Some(LineFamily::Falling)
    } else {
        None
    }
}

/// Squares strictly between two aligned squares; empty if they are not aligned.
pub fn between(a: Square, b: Square) -> Bitboard {
    let Some(family) = line_family(a, b) else {
        return 0;
    };
    let ascending = b > a;
    let mut bb = 0;
    for s in ray(a, family, ascending) {
        if s == b {
            return bb;
        }
        bb |= sq_to_bb(s);
    }
    0
}

const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

/// Knight destinations for each square, built at compile time
pub const KNIGHT_ATTACKS: [Bitboard; 64] = knight_attacks();

const fn knight_attacks() -> [Bitboard; 64] {
    let mut table = [0u64; 64];
    let mut sq: u8 = 0;
    while sq < 64 {
        let rank = (sq >> 3) as i8;
        let file = (sq & 7) as i8;
        let mut i = 0;
        while i < 8 {
            let (dr, df) = KNIGHT_DELTAS[i];
            let nr = rank + dr;
            let nf = file + df;
            if nr >= 0 && nr < 8 && nf >= 0 && nf < 8 {
                table[sq as usize] |= 1u64 << (nr * 8 + nf);
            }
            i += 1;
        }
        sq += 1;
    }
    table
}

/// Compute slider attacks by walking each ray step by step.
///
/// This is the reference the precomputed tables are checked against; it is far too slow
/// for move generation.
pub fn slide_attacks_slow(sq: Square, occupied: Bitboard, families: &[LineFamily]) -> Bitboard {
    let rank = (sq >> 3) as i8;
    let file = (sq & 7) as i8;
    let mut attacks = 0u64;

    for family in families {
        let (dr, df) = family.ascending_delta();
        for (dr, df) in [(dr, df), (-dr, -df)] {
            let mut r = rank + dr;
            let mut f = file + df;
            while (0..8).contains(&r) && (0..8).contains(&f) {
                let target = 1u64 << (r * 8 + f);
                attacks |= target;
                if occupied & target != 0 {
                    break;
                }
                r += dr;
                f += df;
            }
        }
    }
    attacks
}

/// Render a bitboard with rank 8 on top. `x` marks set bits, `*` marks `highlight`.
pub fn draw(bb: Bitboard, highlight: Square) -> String {
    (1..=8u8)
        .rev()
        .map(|rank| {
            let row = (1..=8u8)
                .map(|file| {
                    let sq = pos_to_sq(rank, file);
                    if sq == highlight {
                        '*'
                    } else if is_set(bb, sq) {
                        'x'
                    } else {
                        '.'
                    }
                })
                .join(" ");
            format!("{rank} {row}")
        })
        .chain(std::iter::once("  a b c d e f g h".to_string()))
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knight_attacks() {
        // Knight on e4 (sq = 28) should attack d2, f2, c3, g3, c5, g5, d6, f6
        let sq = pos_to_sq(4, 5); // e4
        let attacks = KNIGHT_ATTACKS[sq as usize];

        assert!(attacks & sq_to_bb(pos_to_sq(2, 4)) != 0); // d2
        assert!(attacks & sq_to_bb(pos_to_sq(2, 6)) != 0); // f2
        assert!(attacks & sq_to_bb(pos_to_sq(3, 3)) != 0); // c3
        assert!(attacks & sq_to_bb(pos_to_sq(3, 7)) != 0); // g3
        assert!(attacks & sq_to_bb(pos_to_sq(5, 3)) != 0); // c5
        assert!(attacks & sq_to_bb(pos_to_sq(5, 7)) != 0); // g5
        assert!(attacks & sq_to_bb(pos_to_sq(6, 4)) != 0); // d6
        assert!(attacks & sq_to_bb(pos_to_sq(6, 6)) != 0); // f6
        assert_eq!(attacks.count_ones(), 8);
    }

    #[test]
    fn test_knight_corner() {
        // Knight on a1 should only attack b3 and c2
        let attacks = KNIGHT_ATTACKS[pos_to_sq(1, 1) as usize];
        assert_eq!(attacks, sq_to_bb(pos_to_sq(2, 3)) | sq_to_bb(pos_to_sq(3, 2)));
    }

    #[test]
    fn test_bitboard_iter() {
        let bb = sq_to_bb(0) | sq_to_bb(7) | sq_to_bb(63); // a1, h1, h8
        let squares: Vec<u8> = BitboardIter(bb).collect();
        assert_eq!(squares, vec![0, 7, 63]);
    }

    #[test]
    fn test_all_subsets_counts() {
        let mask = line_mask(pos_to_sq(4, 5), LineFamily::Rank);
        let subsets: Vec<_> = all_subsets(mask).collect();
        assert_eq!(subsets.len(), 128);
        assert_eq!(subsets[0], 0);
        assert!(subsets.iter().all(|s| s & !mask == 0));
        assert_eq!(all_subsets(0).count(), 1);
    }

    #[test]
    fn test_rays_are_ordered_outwards() {
        let e4 = pos_to_sq(4, 5);
        assert_eq!(
            ray(e4, LineFamily::Rising, true),
            vec![pos_to_sq(5, 6), pos_to_sq(6, 7), pos_to_sq(7, 8)]
        );
        assert_eq!(
            ray(e4, LineFamily::Rank, false),
            vec![pos_to_sq(4, 4), pos_to_sq(4, 3), pos_to_sq(4, 2), pos_to_sq(4, 1)]
        );
        assert!(ray(pos_to_sq(1, 1), LineFamily::Falling, true).is_empty());
        assert!(ray(pos_to_sq(1, 1), LineFamily::Falling, false).is_empty());
    }

    #[test]
    fn test_line_masks() {
        let e4 = pos_to_sq(4, 5);
        assert_eq!(line_mask(e4, LineFamily::File), (FILE_A << 4) & !sq_to_bb(e4));
        assert_eq!(line_mask(e4, LineFamily::Rank), (RANK_1 << 24) & !sq_to_bb(e4));
        assert_eq!(line_mask(0, LineFamily::Rising), MAIN_DIAGONAL & !1);
        assert_eq!(line_mask(e4, LineFamily::Rising).count_ones(), 6);
        assert_eq!(line_mask(e4, LineFamily::Falling).count_ones(), 7);
    }

    #[test]
    fn test_line_family() {
        let e4 = pos_to_sq(4, 5);
        assert_eq!(line_family(e4, pos_to_sq(8, 5)), Some(LineFamily::File));
        assert_eq!(line_family(e4, pos_to_sq(4, 1)), Some(LineFamily::Rank));
        assert_eq!(line_family(e4, pos_to_sq(1, 2)), Some(LineFamily::Rising));
        assert_eq!(line_family(e4, pos_to_sq(8, 1)), Some(LineFamily::Falling));
        assert_eq!(line_family(e4, pos_to_sq(6, 6)), None);
        assert_eq!(line_family(e4, e4), None);
        // h4 and a5 are 1 apart in index but not on a line
        assert_eq!(line_family(pos_to_sq(4, 8), pos_to_sq(5, 1)), None);
    }

    #[test]
    fn test_between() {
        let a1 = pos_to_sq(1, 1);
        let d4 = pos_to_sq(4, 4);
        assert_eq!(between(a1, d4), sq_to_bb(pos_to_sq(2, 2)) | sq_to_bb(pos_to_sq(3, 3)));
        assert_eq!(between(d4, a1), between(a1, d4));
        assert_eq!(between(a1, pos_to_sq(1, 2)), 0);
        assert_eq!(between(a1, pos_to_sq(2, 3)), 0);
    }

    #[test]
    fn test_slow_attacks() {
        let e4 = pos_to_sq(4, 5);
        assert_eq!(slide_attacks_slow(e4, 0, &LineFamily::STRAIGHT).count_ones(), 14);
        assert_eq!(slide_attacks_slow(e4, 0, &LineFamily::DIAGONAL).count_ones(), 13);

        // Rook on e4, with pieces on e2 and g4
        let occupied = sq_to_bb(pos_to_sq(2, 5)) | sq_to_bb(pos_to_sq(4, 7));
        let attacks = slide_attacks_slow(e4, occupied, &LineFamily::STRAIGHT);
        assert!(attacks & sq_to_bb(pos_to_sq(2, 5)) != 0); // e2 (blocker)
        assert!(attacks & sq_to_bb(pos_to_sq(4, 7)) != 0); // g4 (blocker)
        assert!(attacks & sq_to_bb(pos_to_sq(1, 5)) == 0); // e1 (blocked)
        assert!(attacks & sq_to_bb(pos_to_sq(4, 8)) == 0); // h4 (blocked)
    }

    #[test]
    fn test_square_names() {
        assert_eq!(square_name(0), "a1");
        assert_eq!(square_name(63), "h8");
        assert_eq!(parse_square("e4"), Some(pos_to_sq(4, 5)));
        assert_eq!(parse_square("E4"), Some(pos_to_sq(4, 5)));
        assert_eq!(parse_square("i4"), None);
        assert_eq!(parse_square("e9"), None);
        assert_eq!(parse_square("e44"), None);
    }

    #[test]
    fn test_draw() {
        let picture = draw(sq_to_bb(pos_to_sq(8, 1)), pos_to_sq(1, 8));
        let lines: Vec<_> = picture.lines().collect();
        assert_eq!(lines[0], "8 x . . . . . . .");
        assert_eq!(lines[7], "1 . . . . . . . *");
        assert_eq!(lines[8], "  a b c d e f g h");
    }
}
