//! Moves in UCI format

use super::base::{self, CreateError, MoveKind, PromotePiece};
use super::make::ApplyError;
use crate::movegen::{self, IllegalMoveError};
use crate::position::Position;
use crate::types::{Color, File, Piece, PieceKind, Square, SquareParseError};
use crate::{generic, geometry};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error creating a parsed UCI representation from string
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum RawParseError {
    /// Bad string length
    #[error("bad string length")]
    BadLength,
    /// Bad source square
    #[error("bad source: {0}")]
    BadSrc(SquareParseError),
    /// Bad destination square
    #[error("bad destination: {0}")]
    BadDst(SquareParseError),
    /// Bad promote character
    #[error("bad promote char {0:?}")]
    BadPromote(char),
}

/// Error parsing UCI into a legal [`Move`](super::Move)
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ParseError {
    /// Error parsing move
    #[error("cannot parse move: {0}")]
    Parse(#[from] RawParseError),
    /// Move cannot be made in the given position
    #[error("cannot apply move: {0}")]
    Apply(#[from] ApplyError),
}

/// Parsed move in UCI format
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Move {
    /// Source square
    pub src: Square,
    /// Destination square
    pub dst: Square,
    /// Piece to promote, if any
    pub promote: Option<PromotePiece>,
}

impl Move {
    fn do_into_move<C: generic::Color>(&self, pos: &Position) -> Result<base::Move, CreateError> {
        let (src, dst) = (self.src, self.dst);
        let kind = self.promote.map(MoveKind::from).unwrap_or_else(|| {
            let moved = pos.get(src);
            if moved == Some(Piece::new(C::COLOR, PieceKind::Pawn)) {
                if src.rank() == geometry::double_move_src_rank(C::COLOR)
                    && dst.rank() == geometry::double_move_dst_rank(C::COLOR)
                {
                    return MoveKind::PawnDouble;
                }
                if src.file() != dst.file() && pos.get(dst).is_none() {
                    return MoveKind::Enpassant;
                }
                return MoveKind::PawnSimple;
            }

            if moved == Some(Piece::new(C::COLOR, PieceKind::King))
                && src == geometry::king_home(C::COLOR)
            {
                let rank = geometry::castling_rank(C::COLOR);
                if dst == Square::from_parts(File::G, rank) {
                    return MoveKind::CastlingKingside;
                }
                if dst == Square::from_parts(File::C, rank) {
                    return MoveKind::CastlingQueenside;
                }
            }

            MoveKind::Simple
        });

        base::Move::new(kind, src, dst, C::COLOR)
    }

    /// Converts the UCI move into a well-formed [`Move`](super::Move) in position `pos`
    ///
    /// The returned move is **not** guaranteed to be legal.
    pub fn into_move(self, pos: &Position) -> Result<base::Move, CreateError> {
        match pos.side() {
            Color::White => self.do_into_move::<generic::White>(pos),
            Color::Black => self.do_into_move::<generic::Black>(pos),
        }
    }

    /// Converts the UCI move into a legal [`Move`](super::Move) in position `pos`
    pub fn into_legal(self, pos: &Position) -> Result<base::Move, ApplyError> {
        let mv = match self.into_move(pos) {
            Ok(mv) => mv,
            Err(CreateError::MissingPromotion) => {
                return Err(ApplyError::MissingPromotion(self.dst));
            }
            Err(CreateError::NotWellFormed) => {
                return Err(ApplyError::Illegal(IllegalMoveError {
                    mv: self,
                    fen: pos.as_fen(),
                }));
            }
        };
        movegen::validate(pos, mv)?;
        Ok(mv)
    }
}

impl From<base::Move> for Move {
    #[inline]
    fn from(mv: base::Move) -> Move {
        Move {
            src: mv.src(),
            dst: mv.dst(),
            promote: mv.promotion(),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.src, self.dst)?;
        if let Some(promote) = self.promote {
            write!(f, "{}", promote.kind().as_char().to_ascii_lowercase())?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = RawParseError;

    fn from_str(s: &str) -> Result<Move, Self::Err> {
        if !s.is_ascii() || !matches!(s.len(), 4 | 5) {
            return Err(RawParseError::BadLength);
        }
        let src = Square::from_str(&s[0..2]).map_err(RawParseError::BadSrc)?;
        let dst = Square::from_str(&s[2..4]).map_err(RawParseError::BadDst)?;
        let promote = if s.len() == 5 {
            Some(match s.as_bytes()[4] {
                b'n' => PromotePiece::Knight,
                b'b' => PromotePiece::Bishop,
                b'r' => PromotePiece::Rook,
                b'q' => PromotePiece::Queen,
                b => return Err(RawParseError::BadPromote(b as char)),
            })
        } else {
            None
        };
        Ok(Move { src, dst, promote })
    }
}
