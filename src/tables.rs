//! Every move table, built once and shared read-only.

use std::time::Instant;

use once_cell::sync::OnceCell;
use tracing::{debug, info};

use crate::connectivity::Connectivity;
use crate::error::TableResult;
use crate::knight::KnightTable;
use crate::pawn::PawnTable;
use crate::queen::QueenTable;
use crate::rays::RayTables;
use crate::sliders::SliderTable;

pub struct MoveTables {
    pub rays: RayTables,
    pub rook: SliderTable,
    pub bishop: SliderTable,
    pub queen: QueenTable,
    pub knight: KnightTable,
    pub pawn: PawnTable,
}

/// Stored entry and move counts, for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSizes {
    pub ray_entries: usize,
    pub rook_moves: usize,
    pub bishop_moves: usize,
    pub queen_moves: usize,
    pub knight_moves: usize,
    pub pawn_moves: usize,
}

static SHARED: OnceCell<MoveTables> = OnceCell::new();

impl MoveTables {
    pub fn build() -> Self {
        Self::build_with(&Connectivity::standard())
    }

    pub fn build_with(connectivity: &Connectivity) -> Self {
        let start = Instant::now();

        let rays = RayTables::build();
        debug!(elapsed = ?start.elapsed(), "ray tables ready");
        let rook = SliderTable::rook(&rays);
        let bishop = SliderTable::bishop(&rays);
        let queen = QueenTable::compose(&rook, &bishop);
        debug!(elapsed = ?start.elapsed(), "slider tables ready");
        let knight = KnightTable::build();
        let pawn = PawnTable::build(connectivity);

        let tables = Self {
            rays,
            rook,
            bishop,
            queen,
            knight,
            pawn,
        };
        info!(elapsed = ?start.elapsed(), sizes = ?tables.sizes(), "move tables built");
        tables
    }

    /// The process-wide tables. The first caller builds them; concurrent callers wait for that
    /// build and get the same instance.
    #[inline]
    pub fn shared() -> &'static MoveTables {
        SHARED.get_or_init(Self::build)
    }

    /// Like [`MoveTables::shared`], with the connectivity loaded from legacy codes. The codes are
    /// validated before anything is built.
    pub fn init_with_codes(codes: &[i8]) -> TableResult<&'static MoveTables> {
        let connectivity = Connectivity::from_codes(codes)?;
        Ok(SHARED.get_or_init(|| Self::build_with(&connectivity)))
    }

    pub fn sizes(&self) -> TableSizes {
        TableSizes {
            ray_entries: self.rays.entry_count(),
            rook_moves: self.rook.move_count(),
            bishop_moves: self.bishop.move_count(),
            queen_moves: self.queen.move_count(),
            knight_moves: self.knight.move_count(),
            pawn_moves: self.pawn.move_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TableError;

    #[test]
    fn test_shared_is_built_once() {
        let a = MoveTables::shared();
        let b = MoveTables::shared();
        assert!(std::ptr::eq(a, b));

        let codes = Connectivity::standard().to_codes();
        let c = MoveTables::init_with_codes(&codes).unwrap();
        assert!(std::ptr::eq(a, c));
    }

    #[test]
    fn test_bad_codes_are_rejected() {
        assert!(matches!(
            MoveTables::init_with_codes(&[]),
            Err(TableError::ConnectivityLength { found: 0, .. })
        ));
    }

    #[test]
    fn test_sizes() {
        let sizes = MoveTables::shared().sizes();
        assert_eq!(sizes.queen_moves, sizes.rook_moves + sizes.bishop_moves);
        assert!(sizes.ray_entries > 0);
        assert!(sizes.knight_moves > 0);
        assert!(sizes.pawn_moves > 0);
    }
}
