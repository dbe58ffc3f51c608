//! Which line, if any, joins two squares.
//!
//! The pawn table uses this to decide which destinations keep a pinned pawn on the line to its
//! king. The canonical classification comes from board geometry; one can also be loaded from the
//! legacy flat code array (4096 entries indexed `king << 6 | square`).

use crate::bitboard::{line_family, LineFamily, Square};
use crate::error::{TableError, TableResult};

/// Legacy codes: file = 1, rank = -1, falling = 2, rising = -2, none = 0
pub const fn line_code(line: Option<LineFamily>) -> i8 {
    match line {
        None => 0,
        Some(LineFamily::File) => 1,
        Some(LineFamily::Rank) => -1,
        Some(LineFamily::Falling) => 2,
        Some(LineFamily::Rising) => -2,
    }
}

fn decode(code: i8) -> Option<Option<LineFamily>> {
    match code {
        0 => Some(None),
        1 => Some(Some(LineFamily::File)),
        -1 => Some(Some(LineFamily::Rank)),
        2 => Some(Some(LineFamily::Falling)),
        -2 => Some(Some(LineFamily::Rising)),
        _ => None,
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Connectivity {
    lines: Box<[Option<LineFamily>; 4096]>,
}

impl Connectivity {
    /// Classification derived from rank/file arithmetic
    pub fn standard() -> Self {
        let mut lines = Box::new([None; 4096]);
        for a in 0..64u8 {
            for b in 0..64u8 {
                lines[Self::slot(a, b)] = line_family(a, b);
            }
        }
        Self { lines }
    }

    /// Load legacy codes. Every entry must be a known code and must agree with the geometry,
    /// otherwise nothing is built from it.
    ///
    /// The legacy generator tried the `% 7` diagonal before the `% 9` one, so it wrote 0 for the
    /// a1-h8 pair (63 apart, both multiples). That one gap is accepted and filled from geometry.
    pub fn from_codes(codes: &[i8]) -> TableResult<Self> {
        if codes.len() != 4096 {
            return Err(TableError::ConnectivityLength {
                expected: 4096,
                found: codes.len(),
            });
        }
        let mut lines = Box::new([None; 4096]);
        for (slot, &code) in codes.iter().enumerate() {
            let from = (slot >> 6) as Square;
            let to = (slot & 63) as Square;
            let line = decode(code).ok_or(TableError::UnknownLineCode { from, to, code })?;
            let expected = line_family(from, to);
            if line != expected && !(line.is_none() && Self::is_legacy_gap(from, to)) {
                return Err(TableError::LineMismatch {
                    from,
                    to,
                    expected: line_code(expected),
                    found: code,
                });
            }
            lines[slot] = expected;
        }
        Ok(Self { lines })
    }

    /// a1 <-> h8, the pair legacy arrays leave unconnected
    fn is_legacy_gap(from: Square, to: Square) -> bool {
        matches!((from, to), (0, 63) | (63, 0))
    }

    pub fn to_codes(&self) -> Vec<i8> {
        self.lines.iter().map(|&line| line_code(line)).collect()
    }

    #[inline(always)]
    fn slot(a: Square, b: Square) -> usize {
        (a as usize) << 6 | b as usize
    }

    #[inline(always)]
    pub fn get(&self, a: Square, b: Square) -> Option<LineFamily> {
        self.lines[Self::slot(a, b)]
    }

    /// A piece on `sq` pinned to `king` may move to `dest` only if it stays on their line.
    /// Squares not aligned with the king are unrestricted.
    #[inline]
    pub fn keeps_line(&self, king: Square, sq: Square, dest: Square) -> bool {
        match self.get(king, sq) {
            None => true,
            line => line == self.get(king, dest),
        }
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for Connectivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let aligned = self.lines.iter().filter(|l| l.is_some()).count();
        f.debug_struct("Connectivity")
            .field("aligned_pairs", &aligned)
            .finish()
    }
}
