use super::{san, uci};
use crate::geometry;
use crate::movegen::{IllegalMoveError, Rules};
use crate::position::Position;
use crate::types::{CastlingSide, Color, File, PieceKind, Rank, Square};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Move kind
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveKind {
    /// Non-pawn move or capture (except castling)
    Simple = 0,
    /// Kingside castling
    CastlingKingside = 1,
    /// Queenside castling
    CastlingQueenside = 2,
    /// Single pawn move (either non-capture or capture) without promotion
    PawnSimple = 3,
    /// Double pawn move
    PawnDouble = 4,
    /// En passant capture
    Enpassant = 5,
    /// Pawn promotes to knight (either non-capture or capture)
    PromoteKnight = 6,
    /// Pawn promotes to bishop (either non-capture or capture)
    PromoteBishop = 7,
    /// Pawn promotes to rook (either non-capture or capture)
    PromoteRook = 8,
    /// Pawn promotes to queen (either non-capture or capture)
    PromoteQueen = 9,
}

/// Target piece for promotion
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PromotePiece {
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
}

impl PromotePiece {
    pub const ALL: [PromotePiece; 4] = [
        PromotePiece::Knight,
        PromotePiece::Bishop,
        PromotePiece::Rook,
        PromotePiece::Queen,
    ];

    /// Returns the kind of the piece the pawn becomes
    #[inline]
    pub const fn kind(self) -> PieceKind {
        match self {
            PromotePiece::Knight => PieceKind::Knight,
            PromotePiece::Bishop => PieceKind::Bishop,
            PromotePiece::Rook => PieceKind::Rook,
            PromotePiece::Queen => PieceKind::Queen,
        }
    }
}

impl From<PromotePiece> for PieceKind {
    #[inline]
    fn from(p: PromotePiece) -> Self {
        p.kind()
    }
}

impl TryFrom<PieceKind> for PromotePiece {
    type Error = ();

    #[inline]
    fn try_from(p: PieceKind) -> Result<Self, Self::Error> {
        match p {
            PieceKind::Knight => Ok(PromotePiece::Knight),
            PieceKind::Bishop => Ok(PromotePiece::Bishop),
            PieceKind::Rook => Ok(PromotePiece::Rook),
            PieceKind::Queen => Ok(PromotePiece::Queen),
            _ => Err(()),
        }
    }
}

impl From<CastlingSide> for MoveKind {
    #[inline]
    fn from(side: CastlingSide) -> Self {
        match side {
            CastlingSide::King => Self::CastlingKingside,
            CastlingSide::Queen => Self::CastlingQueenside,
        }
    }
}

impl From<PromotePiece> for MoveKind {
    #[inline]
    fn from(kind: PromotePiece) -> Self {
        match kind {
            PromotePiece::Knight => Self::PromoteKnight,
            PromotePiece::Bishop => Self::PromoteBishop,
            PromotePiece::Rook => Self::PromoteRook,
            PromotePiece::Queen => Self::PromoteQueen,
        }
    }
}

impl MoveKind {
    /// Returns the piece after promotion if this move kind represents a promotion
    #[inline]
    pub const fn promote(self) -> Option<PromotePiece> {
        match self {
            MoveKind::PromoteKnight => Some(PromotePiece::Knight),
            MoveKind::PromoteBishop => Some(PromotePiece::Bishop),
            MoveKind::PromoteRook => Some(PromotePiece::Rook),
            MoveKind::PromoteQueen => Some(PromotePiece::Queen),
            _ => None,
        }
    }

    /// Returns the castling side if this move kind represents castling
    #[inline]
    pub const fn castling_side(self) -> Option<CastlingSide> {
        match self {
            MoveKind::CastlingKingside => Some(CastlingSide::King),
            MoveKind::CastlingQueenside => Some(CastlingSide::Queen),
            _ => None,
        }
    }

    /// Returns `true` if the move with this kind is made by a pawn
    #[inline]
    pub const fn is_pawn(self) -> bool {
        !matches!(
            self,
            MoveKind::Simple | MoveKind::CastlingKingside | MoveKind::CastlingQueenside
        )
    }
}

/// Chess move
///
/// The move knows its kind, its source and destination squares and the side which makes it. It
/// doesn't know what stands on the board, so queries like [`Move::is_capture()`] take the position
/// before the move.
///
/// Moves can have different degrees of validity:
///
/// - _Well-formed_. The move is geometrically consistent with its kind: pawns go forward, double
///   moves start from the second rank, promotions end on the last rank, and so on. Every `Move`
///   created via public constructors is well-formed.
///
/// - _Pseudo-legal_. The move follows the rules of chess, except that the own king may remain under
///   attack after it.
///
/// - _Legal_. The move is pseudo-legal and the own king is safe after it. Use
///   [`movegen::validate()`](crate::movegen::validate) to check this.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    kind: MoveKind,
    src: Square,
    dst: Square,
    side: Color,
}

/// Error creating move
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum CreateError {
    /// Move is not well-formed
    #[error("move is not well-formed")]
    NotWellFormed,
    /// Pawn reaches the last rank, but the promotion piece is not specified
    #[error("promotion piece is not specified")]
    MissingPromotion,
}

impl Move {
    /// Creates a move from raw parts without any checks
    #[inline]
    pub(crate) const fn from_parts(kind: MoveKind, src: Square, dst: Square, side: Color) -> Move {
        Move {
            kind,
            src,
            dst,
            side,
        }
    }

    /// Creates a castling move made by `color` with side `side`
    #[inline]
    pub fn from_castling(color: Color, side: CastlingSide) -> Move {
        let rank = geometry::castling_rank(color);
        let dst = match side {
            CastlingSide::King => Square::from_parts(File::G, rank),
            CastlingSide::Queen => Square::from_parts(File::C, rank),
        };
        Move {
            kind: MoveKind::from(side),
            src: Square::from_parts(File::E, rank),
            dst,
            side: color,
        }
    }

    /// Creates a new move from its raw parts and validates it for well-formedness
    ///
    /// A single pawn move which ends on the last rank needs a promotion kind, so it is rejected with
    /// [`CreateError::MissingPromotion`].
    pub fn new(kind: MoveKind, src: Square, dst: Square, side: Color) -> Result<Move, CreateError> {
        let mv = Move {
            kind,
            src,
            dst,
            side,
        };
        if mv.is_well_formed() {
            return Ok(mv);
        }
        let promoted = Move {
            kind: MoveKind::PromoteQueen,
            ..mv
        };
        if kind == MoveKind::PawnSimple && promoted.is_well_formed() {
            return Err(CreateError::MissingPromotion);
        }
        Err(CreateError::NotWellFormed)
    }

    /// Creates a legal move from the UCI string `s` in position `pos`
    #[inline]
    pub fn from_uci(s: &str, pos: &Position) -> Result<Move, uci::ParseError> {
        Ok(uci::Move::from_str(s)?.into_legal(pos)?)
    }

    /// Creates a legal move from the SAN string `s` in position `pos`
    #[inline]
    pub fn from_san(s: &str, pos: &Position, rules: &dyn Rules) -> Result<Move, san::SanError> {
        san::San::from_str(s)?.to_move(pos, rules)
    }

    /// Returns `true` if the move is well-formed
    pub fn is_well_formed(&self) -> bool {
        let side = self.side;
        let file_diff = self.src.file().index().abs_diff(self.dst.file().index());
        let is_forward = match side {
            Color::White => self.src.rank().index() == self.dst.rank().index() + 1,
            Color::Black => self.src.rank().index() + 1 == self.dst.rank().index(),
        };

        match self.kind {
            MoveKind::Simple => self.src != self.dst,
            MoveKind::CastlingKingside | MoveKind::CastlingQueenside => {
                let rank = geometry::castling_rank(side);
                let dst_file = match self.kind {
                    MoveKind::CastlingKingside => File::G,
                    _ => File::C,
                };
                self.src == Square::from_parts(File::E, rank)
                    && self.dst == Square::from_parts(dst_file, rank)
            }
            MoveKind::PawnSimple => {
                file_diff <= 1
                    && is_forward
                    && !matches!(self.src.rank(), Rank::R1 | Rank::R8)
                    && !matches!(self.dst.rank(), Rank::R1 | Rank::R8)
            }
            MoveKind::PawnDouble => {
                self.src.file() == self.dst.file()
                    && self.src.rank() == geometry::double_move_src_rank(side)
                    && self.dst.rank() == geometry::double_move_dst_rank(side)
            }
            MoveKind::Enpassant => {
                file_diff == 1
                    && self.src.rank() == geometry::enpassant_src_rank(side)
                    && self.dst.rank() == geometry::enpassant_dst_rank(side)
            }
            MoveKind::PromoteKnight
            | MoveKind::PromoteBishop
            | MoveKind::PromoteRook
            | MoveKind::PromoteQueen => {
                file_diff <= 1
                    && self.src.rank() == geometry::promote_src_rank(side)
                    && self.dst.rank() == geometry::promote_dst_rank(side)
            }
        }
    }

    #[inline]
    pub const fn kind(&self) -> MoveKind {
        self.kind
    }

    #[inline]
    pub const fn src(&self) -> Square {
        self.src
    }

    #[inline]
    pub const fn dst(&self) -> Square {
        self.dst
    }

    /// Returns the side which makes this move
    #[inline]
    pub const fn side(&self) -> Color {
        self.side
    }

    /// Returns `true` if the move captures a piece in position `pos`, which precedes the move
    #[inline]
    pub fn is_capture(&self, pos: &Position) -> bool {
        match self.kind {
            MoveKind::Enpassant => true,
            MoveKind::CastlingKingside | MoveKind::CastlingQueenside => false,
            _ => pos.get(self.dst).is_some(),
        }
    }

    #[inline]
    pub const fn castling_side(&self) -> Option<CastlingSide> {
        self.kind.castling_side()
    }

    #[inline]
    pub const fn promotion(&self) -> Option<PromotePiece> {
        self.kind.promote()
    }

    #[inline]
    pub fn is_en_passant(&self) -> bool {
        self.kind == MoveKind::Enpassant
    }

    /// Converts this move into a parsed UCI representation
    #[inline]
    pub fn uci(&self) -> uci::Move {
        (*self).into()
    }

    /// Converts this move into SAN in position `pos`
    ///
    /// This function returns an error if the move is not legal in the given position.
    #[inline]
    pub fn san(&self, pos: &Position, rules: &dyn Rules) -> Result<san::San, IllegalMoveError> {
        san::San::from_move(*self, pos, rules)
    }
}

impl fmt::Display for Move {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        self.uci().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::StandardRules;
    use crate::moves::make::ApplyError;
    use std::mem;

    fn sq(s: &str) -> Square {
        Square::from_str(s).unwrap()
    }

    #[test]
    fn test_size() {
        assert_eq!(mem::size_of::<Move>(), 4);
    }

    #[test]
    fn test_new() {
        assert!(Move::new(MoveKind::PawnDouble, sq("e2"), sq("e4"), Color::White).is_ok());
        assert_eq!(
            Move::new(MoveKind::PawnDouble, sq("e2"), sq("e4"), Color::Black),
            Err(CreateError::NotWellFormed)
        );
        assert_eq!(
            Move::new(MoveKind::PawnSimple, sq("c3"), sq("c5"), Color::White),
            Err(CreateError::NotWellFormed)
        );
        assert_eq!(
            Move::new(MoveKind::PawnSimple, sq("b7"), sq("b8"), Color::White),
            Err(CreateError::MissingPromotion)
        );
        assert_eq!(
            Move::new(MoveKind::PawnSimple, sq("g2"), sq("h1"), Color::Black),
            Err(CreateError::MissingPromotion)
        );
        assert!(Move::new(MoveKind::PromoteRook, sq("g2"), sq("h1"), Color::Black).is_ok());
        assert_eq!(
            Move::new(MoveKind::CastlingKingside, sq("e1"), sq("c1"), Color::White),
            Err(CreateError::NotWellFormed)
        );
        assert_eq!(
            Move::new(MoveKind::Simple, sq("e1"), sq("e1"), Color::White),
            Err(CreateError::NotWellFormed)
        );
        assert_eq!(
            Move::new(MoveKind::CastlingQueenside, sq("e8"), sq("c8"), Color::Black),
            Ok(Move::from_castling(Color::Black, CastlingSide::Queen))
        );
    }

    #[test]
    fn test_flags() {
        let pos =
            Position::from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3")
                .unwrap();
        let ep = Move::from_uci("e5d6", &pos).unwrap();
        assert_eq!(ep.kind(), MoveKind::Enpassant);
        assert!(ep.is_en_passant());
        assert!(ep.is_capture(&pos));
        assert_eq!(ep.castling_side(), None);
        assert_eq!(ep.promotion(), None);

        let push = Move::from_uci("e5e6", &pos).unwrap();
        assert!(!push.is_capture(&pos));
        assert!(!push.is_en_passant());

        let mv = Move::from_castling(Color::White, CastlingSide::King);
        assert_eq!(mv.castling_side(), Some(CastlingSide::King));
        assert_eq!(mv.to_string(), "e1g1");

        let mv = Move::new(MoveKind::PromoteKnight, sq("a7"), sq("b8"), Color::White).unwrap();
        assert_eq!(mv.promotion(), Some(PromotePiece::Knight));
        assert_eq!(mv.to_string(), "a7b8n");
    }

    #[test]
    fn test_from_uci() {
        let pos =
            Position::from_fen("r1bqk2r/ppp2ppp/2np1n2/1Bb1p3/4P3/2PP1N2/PP3PPP/RNBQK2R w KQkq - 0 6")
                .unwrap();
        let mv = Move::from_uci("e1g1", &pos).unwrap();
        assert_eq!(mv.kind(), MoveKind::CastlingKingside);
        assert_eq!(mv.san(&pos, &StandardRules).unwrap().to_string(), "O-O");

        for s in ["e1c1", "b5e8", "a3a4", "e1d1"] {
            assert!(
                matches!(
                    Move::from_uci(s, &pos),
                    Err(uci::ParseError::Apply(ApplyError::Illegal(_)))
                ),
                "{} must be illegal",
                s
            );
        }
        assert!(matches!(
            Move::from_uci("c3c5", &pos),
            Err(uci::ParseError::Apply(ApplyError::Illegal(_)))
        ));
        assert!(matches!(
            Move::from_uci("e2e", &pos),
            Err(uci::ParseError::Parse(uci::RawParseError::BadLength))
        ));
    }

    #[test]
    fn test_from_san() {
        let pos = Position::initial();
        let mv = Move::from_san("Nf3", &pos, &StandardRules).unwrap();
        assert_eq!(mv, Move::from_uci("g1f3", &pos).unwrap());
        assert_eq!(mv.san(&pos, &StandardRules).unwrap().to_string(), "Nf3");
        assert_eq!(
            Move::from_san("Nf4", &pos, &StandardRules),
            Err(san::SanError::NotFound)
        );
    }
}
