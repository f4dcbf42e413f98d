//! FEN parsing and formatting

use crate::position::{Position, RawPosition, ValidateError};
use crate::types::{
    self, CastlingRights, Color, File, Piece, Rank, Square, SquareParseError,
};

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

/// Error parsing the first field of FEN (i.e. the positions of pieces on the board)
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum PlacementParseError {
    /// Rank is too large
    #[error("too many items in rank {0}")]
    RankOverflow(Rank),
    /// Rank is too small
    #[error("not enough items in rank {0}")]
    RankUnderflow(Rank),
    /// Too many ranks
    #[error("too many ranks")]
    Overflow,
    /// Not enough ranks
    #[error("not enough ranks")]
    Underflow,
    /// Unexpected character
    #[error("unexpected char {0:?}")]
    UnexpectedChar(char),
}

/// Error parsing a position from FEN
///
/// Every field is checked separately, and a missing field is reported by its name.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum FenParseError {
    /// FEN contains non-ASCII characters
    #[error("non-ASCII data in FEN")]
    NonAscii,
    /// FEN doesn't have piece placement
    #[error("no piece placement")]
    NoPlacement,
    /// Error parsing piece placement
    #[error("bad piece placement: {0}")]
    Placement(#[from] PlacementParseError),
    /// FEN doesn't have side to move
    #[error("no side to move")]
    NoSide,
    /// Error parsing side to move
    #[error("bad side to move: {0}")]
    Side(#[from] types::ColorParseError),
    /// FEN doesn't have castling rights
    #[error("no castling rights")]
    NoCastling,
    /// Error parsing castling rights
    #[error("bad castling rights: {0}")]
    Castling(#[from] types::CastlingRightsParseError),
    /// FEN doesn't have en passant target
    #[error("no en passant target")]
    NoEnpassant,
    /// Error parsing en passant target
    #[error("bad en passant target: {0}")]
    Enpassant(#[from] SquareParseError),
    /// En passant target is on a rank where it cannot be
    #[error("invalid en passant rank {0}")]
    InvalidEnpassantRank(Rank),
    /// FEN doesn't have halfmove clock
    #[error("no halfmove clock")]
    NoHalfmoveClock,
    /// Error parsing halfmove clock
    #[error("bad halfmove clock: {0}")]
    HalfmoveClock(ParseIntError),
    /// FEN doesn't have fullmove number
    #[error("no fullmove number")]
    NoFullmoveNumber,
    /// Error parsing fullmove number
    #[error("bad fullmove number: {0}")]
    FullmoveNumber(ParseIntError),
    /// Fullmove number is zero
    #[error("fullmove number must be positive")]
    ZeroFullmoveNumber,
    /// FEN contains extra data
    #[error("extra data in FEN")]
    ExtraData,
    /// Position was parsed, but it's invalid
    #[error("invalid position: {0}")]
    Invalid(#[from] ValidateError),
}

fn parse_placement(s: &str) -> Result<[Option<Piece>; 64], PlacementParseError> {
    type Error = PlacementParseError;

    let mut file = 0_usize;
    let mut rank = 0_usize;
    let mut pos = 0_usize;
    let mut cells = [None; 64];
    for b in s.bytes() {
        match b {
            b'1'..=b'8' => {
                let add = (b - b'0') as usize;
                if file + add > 8 {
                    return Err(Error::RankOverflow(Rank::from_index(rank)));
                }
                file += add;
                pos += add;
            }
            b'/' => {
                if file < 8 {
                    return Err(Error::RankUnderflow(Rank::from_index(rank)));
                }
                rank += 1;
                file = 0;
                if rank >= 8 {
                    return Err(Error::Overflow);
                }
            }
            _ => {
                let piece = Piece::from_char(b as char).ok_or(Error::UnexpectedChar(b as char))?;
                if file >= 8 {
                    return Err(Error::RankOverflow(Rank::from_index(rank)));
                }
                cells[pos] = Some(piece);
                file += 1;
                pos += 1;
            }
        };
    }

    if file < 8 {
        return Err(Error::RankUnderflow(Rank::from_index(rank)));
    }
    if rank < 7 {
        return Err(Error::Underflow);
    }

    Ok(cells)
}

fn parse_ep_target(s: &str, side: Color) -> Result<Option<Square>, FenParseError> {
    if s == "-" {
        return Ok(None);
    }
    let target = Square::from_str(s)?;
    if target.rank() != crate::geometry::enpassant_dst_rank(side) {
        return Err(FenParseError::InvalidEnpassantRank(target.rank()));
    }
    Ok(Some(target))
}

impl FromStr for RawPosition {
    type Err = FenParseError;

    fn from_str(s: &str) -> Result<RawPosition, Self::Err> {
        type Error = FenParseError;

        if !s.is_ascii() {
            return Err(Error::NonAscii);
        }
        let mut iter = s.split_ascii_whitespace().fuse();

        let cells = parse_placement(iter.next().ok_or(Error::NoPlacement)?)?;
        let side = Color::from_str(iter.next().ok_or(Error::NoSide)?)?;
        let castling = CastlingRights::from_str(iter.next().ok_or(Error::NoCastling)?)?;
        let ep_target = parse_ep_target(iter.next().ok_or(Error::NoEnpassant)?, side)?;
        let halfmove_clock = u16::from_str(iter.next().ok_or(Error::NoHalfmoveClock)?)
            .map_err(Error::HalfmoveClock)?;
        let fullmove_number = u16::from_str(iter.next().ok_or(Error::NoFullmoveNumber)?)
            .map_err(Error::FullmoveNumber)?;
        if fullmove_number == 0 {
            return Err(Error::ZeroFullmoveNumber);
        }

        if iter.next().is_some() {
            return Err(Error::ExtraData);
        }

        Ok(RawPosition {
            cells,
            side,
            castling,
            ep_target,
            halfmove_clock,
            fullmove_number,
        })
    }
}

impl FromStr for Position {
    type Err = FenParseError;

    fn from_str(s: &str) -> Result<Position, Self::Err> {
        Ok(RawPosition::from_str(s)?.try_into()?)
    }
}

fn format_placement(cells: &[Option<Piece>; 64], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for rank in Rank::iter() {
        if rank.index() != 0 {
            write!(f, "/")?;
        }
        let mut empty = 0;
        for file in File::iter() {
            let piece = match cells[Square::from_parts(file, rank).index()] {
                Some(piece) => piece,
                None => {
                    empty += 1;
                    continue;
                }
            };
            if empty != 0 {
                write!(f, "{}", empty)?;
                empty = 0;
            }
            write!(f, "{}", piece)?;
        }
        if empty != 0 {
            write!(f, "{}", empty)?;
        }
    }
    Ok(())
}

impl fmt::Display for RawPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_placement(&self.cells, f)?;
        write!(f, " {} {}", self.side, self.castling)?;
        match self.ep_target {
            Some(sq) => write!(f, " {}", sq)?,
            None => write!(f, " -")?,
        };
        write!(f, " {} {}", self.halfmove_clock, self.fullmove_number)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.r.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CastlingSide, PieceKind};

    const INI_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_initial() {
        assert_eq!(RawPosition::initial().to_string(), INI_FEN);
        assert_eq!(Position::initial().to_string(), INI_FEN);
        assert_eq!(RawPosition::from_str(INI_FEN), Ok(RawPosition::initial()));
        assert_eq!(Position::from_str(INI_FEN), Ok(Position::initial()));
    }

    #[test]
    fn test_midgame() {
        const FEN: &str = "1rq1r1k1/1p3ppp/pB3n2/3ppP2/Pbb1P3/1PN2B2/2P2QPP/R1R4K w - - 1 21";

        let pos = Position::from_fen(FEN).unwrap();
        assert_eq!(pos.as_fen(), FEN);
        assert_eq!(
            pos.get2(File::B, Rank::R4),
            Some(Piece::new(Color::Black, PieceKind::Bishop))
        );
        assert_eq!(
            pos.get2(File::F, Rank::R2),
            Some(Piece::new(Color::White, PieceKind::Queen))
        );
        assert_eq!(
            pos.king_square(Color::White),
            Square::from_parts(File::H, Rank::R1)
        );
        assert_eq!(pos.side(), Color::White);
        assert_eq!(pos.castling(), CastlingRights::EMPTY);
        assert_eq!(pos.ep_target(), None);
        assert_eq!(pos.halfmove_clock(), 1);
        assert_eq!(pos.fullmove_number(), 21);
    }

    #[test]
    fn test_enpassant() {
        const FEN: &str = "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3";
        let pos = Position::from_fen(FEN).unwrap();
        assert_eq!(pos.ep_target(), Some(Square::from_parts(File::D, Rank::R6)));
        assert_eq!(pos.as_fen(), FEN);

        assert_eq!(
            RawPosition::from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d3 0 3"),
            Err(FenParseError::InvalidEnpassantRank(Rank::R3))
        );
        assert_eq!(
            Position::from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 3"),
            Err(FenParseError::Invalid(ValidateError::InvalidEnpassant(
                Square::from_parts(File::E, Rank::R6)
            )))
        );
    }

    #[test]
    fn test_castling_mismatch() {
        assert_eq!(
            Position::from_fen("r1bq1b1r/ppppkppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK1R1 w KQkq - 6 5"),
            Err(FenParseError::Invalid(ValidateError::InvalidCastling(
                Color::White,
                CastlingSide::King
            )))
        );
        let pos =
            Position::from_fen("r1bq1b1r/ppppkppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK1R1 w Q - 6 5")
                .unwrap();
        assert!(pos.castling().has(Color::White, CastlingSide::Queen));
    }

    #[test]
    fn test_missing_fields() {
        const BOARD: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";
        assert_eq!(RawPosition::from_fen(""), Err(FenParseError::NoPlacement));
        assert_eq!(RawPosition::from_fen(BOARD), Err(FenParseError::NoSide));
        assert_eq!(
            RawPosition::from_fen(&format!("{} w", BOARD)),
            Err(FenParseError::NoCastling)
        );
        assert_eq!(
            RawPosition::from_fen(&format!("{} w KQkq", BOARD)),
            Err(FenParseError::NoEnpassant)
        );
        assert_eq!(
            RawPosition::from_fen(&format!("{} w KQkq -", BOARD)),
            Err(FenParseError::NoHalfmoveClock)
        );
        assert_eq!(
            RawPosition::from_fen(&format!("{} w KQkq - 0", BOARD)),
            Err(FenParseError::NoFullmoveNumber)
        );
        assert_eq!(
            RawPosition::from_fen(&format!("{} w KQkq - 0 1 x", BOARD)),
            Err(FenParseError::ExtraData)
        );
    }

    #[test]
    fn test_bad_fields() {
        const BOARD: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";
        assert_eq!(
            RawPosition::from_fen("rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenParseError::Placement(PlacementParseError::UnexpectedChar('9')))
        );
        assert_eq!(
            RawPosition::from_fen("rnbqkbnr/ppppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenParseError::Placement(PlacementParseError::RankOverflow(
                Rank::R7
            )))
        );
        assert_eq!(
            RawPosition::from_fen("rnbqkbnr/ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenParseError::Placement(PlacementParseError::RankUnderflow(
                Rank::R7
            )))
        );
        assert_eq!(
            RawPosition::from_fen("rnbqkbnr/pppppppp/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenParseError::Placement(PlacementParseError::Underflow))
        );
        assert_eq!(
            RawPosition::from_fen("rnbqkbnr/pppppppp/8/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenParseError::Placement(PlacementParseError::Overflow))
        );
        assert_eq!(
            RawPosition::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNx w KQkq - 0 1"),
            Err(FenParseError::Placement(PlacementParseError::UnexpectedChar('x')))
        );
        assert_eq!(
            RawPosition::from_fen(&format!("{} x KQkq - 0 1", BOARD)),
            Err(FenParseError::Side(types::ColorParseError::UnexpectedChar(
                'x'
            )))
        );
        assert_eq!(
            RawPosition::from_fen(&format!("{} w KQkk - 0 1", BOARD)),
            Err(FenParseError::Castling(
                types::CastlingRightsParseError::DuplicateChar('k')
            ))
        );
        assert!(matches!(
            RawPosition::from_fen(&format!("{} w KQkq - x 1", BOARD)),
            Err(FenParseError::HalfmoveClock(_))
        ));
        assert!(matches!(
            RawPosition::from_fen(&format!("{} w KQkq - 0 -3", BOARD)),
            Err(FenParseError::FullmoveNumber(_))
        ));
        assert_eq!(
            RawPosition::from_fen(&format!("{} w KQkq - 0 0", BOARD)),
            Err(FenParseError::ZeroFullmoveNumber)
        );
        assert_eq!(
            RawPosition::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 ♔"),
            Err(FenParseError::NonAscii)
        );
    }

    #[test]
    fn test_invalid() {
        assert_eq!(
            Position::from_fen("8/8/8/8/8/8/8/K7 w - - 0 1"),
            Err(FenParseError::Invalid(ValidateError::NoKing(Color::Black)))
        );
        assert_eq!(
            Position::from_fen("k7/8/8/8/8/8/8/KQ6 w - - 0 1").map(|p| p.as_fen()),
            Ok("k7/8/8/8/8/8/8/KQ6 w - - 0 1".to_string())
        );
        assert_eq!(
            Position::from_fen("k7/8/8/8/8/8/8/KR6 b - - 0 1").map(|p| p.is_check()),
            Ok(false)
        );
        assert_eq!(
            Position::from_fen("k7/8/8/8/8/8/8/R6K w - - 0 1"),
            Err(FenParseError::Invalid(ValidateError::OpponentKingAttacked))
        );
    }
}
