//! Errors raised while building tables from external data.
//!
//! Lookups never fail; these only come out of parsing a connectivity classification, before
//! any table is built. A missing key at lookup time is a build defect and panics instead.

use crate::bitboard::{square_name, Bitboard, Square};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TableError {
    /// The classification must cover every ordered square pair
    #[error("connectivity data has {found} entries, expected {expected}")]
    ConnectivityLength { expected: usize, found: usize },

    #[error("unknown line code {code} for {} -> {}", name(.from), name(.to))]
    UnknownLineCode { from: Square, to: Square, code: i8 },

    /// A code that is valid but disagrees with where the squares actually are
    #[error("line code {found} for {} -> {} does not match board geometry (expected {expected})", name(.from), name(.to))]
    LineMismatch {
        from: Square,
        to: Square,
        expected: i8,
        found: i8,
    },
}

pub type TableResult<T> = Result<T, TableError>;

fn name(sq: &Square) -> String {
    square_name(*sq)
}

/// Every masked occupancy is a key, so getting here means the table was built wrong.
#[cold]
#[inline(never)]
pub(crate) fn missing_key(table: &str, sq: Square, key: Bitboard) -> ! {
    panic!("{table} table has no entry for {} with key {key:#018x}", square_name(sq))
}
