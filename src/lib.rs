pub mod bitboard;
pub mod connectivity;
pub mod error;
pub mod knight;
pub mod movelist;
pub mod pawn;
pub mod queen;
pub mod rays;
pub mod sliders;
pub mod tables;
pub mod types;

pub use error::{TableError, TableResult};
pub use movelist::{MoveList, MoveSink};
pub use tables::MoveTables;
pub use types::{Move, PieceType};
