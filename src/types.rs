use std::fmt;

use crate::bitboard::{sq_to_bb, square_name, Bitboard, Square};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum PieceType {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

impl PieceType {
    /// Id packed into the move hash
    pub const fn id(&self) -> u32 {
        match self {
            Self::Pawn => 1,
            Self::Knight => 2,
            Self::Bishop => 3,
            Self::Rook => 4,
            Self::Queen => 5,
            Self::King => 6,
        }
    }

    pub fn to_human(&self) -> &str {
        match self {
            Self::Pawn => "pawn",
            Self::Rook => "rook",
            Self::Knight => "knight",
            Self::Bishop => "bishop",
            Self::Queen => "queen",
            Self::King => "king",
        }
    }

    pub fn to_char(&self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Rook => 'R',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }
}

pub const PIECES_CAN_PROMOTE_TO: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Knight,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveFlag {
    Regular,
    /// King move that also relocates a rook. Contains the rook's start and end squares
    Castle { rook_from: Square, rook_to: Square },
    /// Pawn promotion. Contains the piece promoted to
    Promotion(PieceType),
    /// Double pawn push at first pawn move. Contains the skipped (en passant) square
    DoublePawnPush(Square),
    /// Contains the square of the pawn being removed
    EnPassantCapture(Square),
}

impl MoveFlag {
    pub fn is_castle(&self) -> bool {
        matches!(self, MoveFlag::Castle { .. })
    }
}

/// One precomputed move. Built once when the tables are built, then only copied around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    from: Square,
    to: Square,
    piece: PieceType,
    capture: bool,
    flag: MoveFlag,
    hash: u32,
}

impl Move {
    pub const fn new(from: Square, to: Square, piece: PieceType, capture: bool) -> Self {
        Self::with_flag(from, to, piece, capture, MoveFlag::Regular)
    }

    pub const fn quiet(from: Square, to: Square, piece: PieceType) -> Self {
        Self::new(from, to, piece, false)
    }

    pub const fn capture(from: Square, to: Square, piece: PieceType) -> Self {
        Self::new(from, to, piece, true)
    }

    /// White double push; the en passant square is the one skipped over.
    pub const fn double_push(from: Square, to: Square) -> Self {
        Self::with_flag(
            from,
            to,
            PieceType::Pawn,
            false,
            MoveFlag::DoublePawnPush((from + to) / 2),
        )
    }

    pub const fn promotion(from: Square, to: Square, promote_to: PieceType, capture: bool) -> Self {
        Self::with_flag(from, to, PieceType::Pawn, capture, MoveFlag::Promotion(promote_to))
    }

    pub const fn en_passant(from: Square, to: Square, captured: Square) -> Self {
        Self::with_flag(from, to, PieceType::Pawn, true, MoveFlag::EnPassantCapture(captured))
    }

    pub const fn castle(from: Square, to: Square, rook_from: Square, rook_to: Square) -> Self {
        Self::with_flag(
            from,
            to,
            PieceType::King,
            false,
            MoveFlag::Castle { rook_from, rook_to },
        )
    }

    const fn with_flag(
        from: Square,
        to: Square,
        piece: PieceType,
        capture: bool,
        flag: MoveFlag,
    ) -> Self {
        let promotion_id = match flag {
            MoveFlag::Promotion(p) => p.id(),
            _ => 0,
        };
        Self {
            from,
            to,
            piece,
            capture,
            flag,
            hash: from as u32 | (to as u32) << 6 | piece.id() << 12 | promotion_id << 15,
        }
    }

    /// Copy of this move made by another piece type (rook and bishop moves become queen moves)
    pub const fn with_piece(&self, piece: PieceType) -> Self {
        Self::with_flag(self.from, self.to, piece, self.capture, self.flag)
    }

    #[inline(always)]
    pub fn from(&self) -> Square {
        self.from
    }

    #[inline(always)]
    pub fn to(&self) -> Square {
        self.to
    }

    #[inline(always)]
    pub fn piece(&self) -> PieceType {
        self.piece
    }

    #[inline(always)]
    pub fn flag(&self) -> MoveFlag {
        self.flag
    }

    #[inline(always)]
    pub fn is_capture(&self) -> bool {
        self.capture
    }

    pub fn is_promotion(&self) -> bool {
        matches!(self.flag, MoveFlag::Promotion(_))
    }

    pub fn promotion_piece(&self) -> Option<PieceType> {
        match self.flag {
            MoveFlag::Promotion(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_castle(&self) -> bool {
        self.flag.is_castle()
    }

    pub fn is_en_passant(&self) -> bool {
        matches!(self.flag, MoveFlag::EnPassantCapture(_))
    }

    /// Skipped square of a double push, or the captured pawn's square of an en passant capture
    pub fn en_passant_square(&self) -> Option<Square> {
        match self.flag {
            MoveFlag::DoublePawnPush(sq) | MoveFlag::EnPassantCapture(sq) => Some(sq),
            _ => None,
        }
    }

    /// `from | to << 6 | piece << 12 | promotion << 15`
    #[inline(always)]
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// XOR mask for the moving side's pieces
    pub fn own_delta(&self) -> Bitboard {
        let delta = sq_to_bb(self.from) | sq_to_bb(self.to);
        match self.flag {
            MoveFlag::Castle { rook_from, rook_to } => delta ^ sq_to_bb(rook_from) ^ sq_to_bb(rook_to),
            _ => delta,
        }
    }

    /// XOR mask for the opponent's pieces
    pub fn opp_delta(&self) -> Bitboard {
        match self.flag {
            MoveFlag::EnPassantCapture(sq) => sq_to_bb(sq),
            _ if self.capture => sq_to_bb(self.to),
            _ => 0,
        }
    }

    pub fn to_uci(&self) -> String {
        let promotion = self
            .promotion_piece()
            .map(|p| p.to_char().to_ascii_lowercase().to_string())
            .unwrap_or_default();
        format!("{}{}{}", square_name(self.from), square_name(self.to), promotion)
    }

    pub fn to_human(&self) -> String {
        if let MoveFlag::Castle { rook_from, .. } = self.flag {
            let side = if rook_from > self.from { "kingside" } else { "queenside" };
            return format!("king castles {side}");
        }
        let capture_str = match self.flag {
            MoveFlag::EnPassantCapture(sq) => format!(" capturing en passant at {}", square_name(sq)),
            _ if self.capture => " capturing".to_string(),
            _ => "".to_string(),
        };
        let promotion_str = match self.flag {
            MoveFlag::Promotion(p) => format!(" promoting to {}", p.to_human()),
            _ => "".to_string(),
        };
        format!(
            "{} moves from {} to {}{}{}",
            self.piece.to_human(),
            square_name(self.from),
            square_name(self.to),
            capture_str,
            promotion_str,
        )
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitboard::pos_to_sq;

    #[test]
    fn test_hash_layout() {
        let e2 = pos_to_sq(2, 5);
        let e4 = pos_to_sq(4, 5);
        let mv = Move::quiet(e2, e4, PieceType::Pawn);
        assert_eq!(mv.hash(), e2 as u32 | (e4 as u32) << 6 | 1 << 12);

        let e7 = pos_to_sq(7, 5);
        let e8 = pos_to_sq(8, 5);
        let promo = Move::promotion(e7, e8, PieceType::Knight, false);
        assert_eq!(promo.hash(), e7 as u32 | (e8 as u32) << 6 | 1 << 12 | 2 << 15);
    }

    #[test]
    fn test_with_piece_rehashes() {
        let mv = Move::capture(0, 7, PieceType::Rook);
        let queen = mv.with_piece(PieceType::Queen);
        assert_eq!(queen.piece(), PieceType::Queen);
        assert!(queen.is_capture());
        assert_eq!(queen.hash() >> 12, 5);
        assert_eq!(queen.hash() & 0xFFF, mv.hash() & 0xFFF);
    }

    #[test]
    fn test_double_push_en_passant_square() {
        let mv = Move::double_push(pos_to_sq(2, 4), pos_to_sq(4, 4));
        assert_eq!(mv.en_passant_square(), Some(pos_to_sq(3, 4)));
        assert!(!mv.is_capture());
        assert!(!mv.is_en_passant());
    }

    #[test]
    fn test_en_passant_deltas() {
        // e5xd6 en passant removes the pawn on d5
        let e5 = pos_to_sq(5, 5);
        let d6 = pos_to_sq(6, 4);
        let d5 = pos_to_sq(5, 4);
        let mv = Move::en_passant(e5, d6, d5);
        assert!(mv.is_capture());
        assert!(mv.is_en_passant());
        assert_eq!(mv.own_delta(), sq_to_bb(e5) | sq_to_bb(d6));
        assert_eq!(mv.opp_delta(), sq_to_bb(d5));
        assert_eq!(mv.en_passant_square(), Some(d5));
    }

    #[test]
    fn test_castle_deltas() {
        let e1 = pos_to_sq(1, 5);
        let g1 = pos_to_sq(1, 7);
        let h1 = pos_to_sq(1, 8);
        let f1 = pos_to_sq(1, 6);
        let mv = Move::castle(e1, g1, h1, f1);
        assert!(mv.is_castle());
        assert_eq!(mv.piece(), PieceType::King);
        assert_eq!(mv.own_delta(), sq_to_bb(e1) | sq_to_bb(f1) | sq_to_bb(g1) | sq_to_bb(h1));
        assert_eq!(mv.opp_delta(), 0);
        assert_eq!(mv.to_human(), "king castles kingside");
    }

    #[test]
    fn test_capture_deltas() {
        let mv = Move::capture(pos_to_sq(1, 1), pos_to_sq(1, 5), PieceType::Rook);
        assert_eq!(mv.opp_delta(), sq_to_bb(pos_to_sq(1, 5)));
        assert_eq!(Move::quiet(0, 1, PieceType::Rook).opp_delta(), 0);
    }

    #[test]
    fn test_text_forms() {
        let mv = Move::promotion(pos_to_sq(7, 5), pos_to_sq(8, 4), PieceType::Queen, true);
        assert_eq!(mv.to_uci(), "e7d8q");
        assert_eq!(mv.to_string(), "e7d8q");
        assert_eq!(mv.to_human(), "pawn moves from e7 to d8 capturing promoting to queen");
        assert_eq!(Move::quiet(pos_to_sq(1, 2), pos_to_sq(3, 3), PieceType::Knight).to_uci(), "b1c3");
    }
}
