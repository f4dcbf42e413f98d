//! Moves in SAN format

use super::base::{Move, MoveKind, PromotePiece};
use super::make;
use crate::bitboard::Bitboard;
use crate::movegen::{IllegalMoveError, MoveList, MovePush, Rules};
use crate::position::Position;
use crate::types::{CastlingSide, File, PieceKind, Rank, Square, SquareParseError};
use crate::bitboard_consts;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error parsing SAN representation from string
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum RawParseError {
    /// String is empty
    #[error("string is empty")]
    EmptyString,
    /// String contains non-ASCII characters
    #[error("non-ASCII data")]
    NonAscii,
    /// Destination square is invalid
    #[error("invalid destination square: {0}")]
    InvalidDst(#[from] SquareParseError),
    /// Extra characters in non-pawn move
    #[error("non-pawn move too long")]
    NonPawnMoveTooLong,
    /// String for pawn move is too short
    #[error("pawn move too short")]
    PawnMoveTooShort,
    /// Extra characters in pawn move
    #[error("pawn move too long")]
    PawnMoveTooLong,
    /// Parsing failed for unspecified reasons
    #[error("syntax error")]
    Syntax,
}

/// Error decoding a SAN token into a legal [`Move`]
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum SanError {
    /// Token is not a syntactically valid SAN
    #[error("cannot parse move: {0}")]
    Syntax(#[from] RawParseError),
    /// No legal move matches the token
    #[error("no such move")]
    NotFound,
    /// The token matches more than one legal move
    #[error("ambiguous move (candidates are at least `{0}` and `{1}`)")]
    Ambiguous(Move, Move),
    /// Capture sign is put when the move is non-capture
    #[error("got capture sign on a non-capture move")]
    CaptureExpected,
    /// Pawn reaches the last rank, but the promotion piece is not specified
    #[error("promotion piece is not specified")]
    MissingPromotion,
    /// Promotion piece is specified for a move which doesn't promote
    #[error("unexpected promotion")]
    UnexpectedPromotion,
}

/// Parsed SAN string, without check indicator
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Data {
    /// Castling
    Castling(CastlingSide),
    /// Pawn move without capture
    PawnMove {
        /// Destination square
        dst: Square,
        /// Piece to promote, if any
        promote: Option<PromotePiece>,
    },
    /// Pawn capture, including en passant
    PawnCapture {
        /// Source file
        src: File,
        /// Destination square
        dst: Square,
        /// Piece to promote, if any
        promote: Option<PromotePiece>,
    },
    /// Non-pawn move
    Simple {
        /// Piece to move
        piece: PieceKind,
        /// Source file, if specified
        file: Option<File>,
        /// Source rank, if specified
        rank: Option<Rank>,
        /// Is the move capture?
        is_capture: bool,
        /// Destination square
        dst: Square,
    },
}

struct PromoteFmt(Option<PromotePiece>);

impl fmt::Display for PromoteFmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.0 {
            None => Ok(()),
            Some(promote) => write!(f, "={}", promote.kind().as_char()),
        }
    }
}

/// Finds out which parts of the source square are needed to tell the move apart from others
struct AmbigDetector {
    mv: Move,
    sim_any: bool,
    sim_file: bool,
    sim_rank: bool,
}

impl AmbigDetector {
    fn new(mv: Move) -> Self {
        Self {
            mv,
            sim_any: false,
            sim_file: false,
            sim_rank: false,
        }
    }

    /// Source file hint: written when another candidate exists, unless only the file is shared
    ///
    /// If both the file and the rank clash with other candidates, both hints are written.
    fn file(&self) -> Option<File> {
        if self.sim_any && (self.sim_rank || !self.sim_file) {
            return Some(self.mv.src().file());
        }
        None
    }

    /// Source rank hint: written only when some other candidate shares the source file
    fn rank(&self) -> Option<Rank> {
        if self.sim_any && self.sim_file {
            return Some(self.mv.src().rank());
        }
        None
    }
}

impl MovePush for AmbigDetector {
    fn push(&mut self, mv: Move) {
        if mv == self.mv {
            return;
        }
        self.sim_any = true;
        if self.mv.src().file() == mv.src().file() {
            self.sim_file = true;
        }
        if self.mv.src().rank() == mv.src().rank() {
            self.sim_rank = true;
        }
    }
}

#[derive(Copy, Clone)]
enum AmbigSearcherState {
    Empty,
    Found(Move),
    Ambiguity(Move, Move),
}

struct AmbigSearcher {
    srcs: Bitboard,
    state: AmbigSearcherState,
}

impl AmbigSearcher {
    fn new(file: Option<File>, rank: Option<Rank>) -> AmbigSearcher {
        let mut srcs = Bitboard::FULL;
        if let Some(file) = file {
            srcs &= bitboard_consts::file(file);
        }
        if let Some(rank) = rank {
            srcs &= bitboard_consts::rank(rank);
        }
        AmbigSearcher {
            srcs,
            state: AmbigSearcherState::Empty,
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self.state, AmbigSearcherState::Empty)
    }

    fn get_move(&self) -> Result<Move, SanError> {
        match self.state {
            AmbigSearcherState::Empty => Err(SanError::NotFound),
            AmbigSearcherState::Found(mv) => Ok(mv),
            AmbigSearcherState::Ambiguity(mv, mv2) => Err(SanError::Ambiguous(mv, mv2)),
        }
    }
}

impl MovePush for AmbigSearcher {
    fn push(&mut self, mv: Move) {
        if !self.srcs.has(mv.src()) {
            return;
        }
        self.state = match self.state {
            AmbigSearcherState::Empty => AmbigSearcherState::Found(mv),
            AmbigSearcherState::Found(mv2) => AmbigSearcherState::Ambiguity(mv2, mv),
            s @ AmbigSearcherState::Ambiguity(_, _) => s,
        };
    }
}

/// Picks the pawn moves from `moves` which match `promote`
///
/// Promotion mismatches are reported only if nothing matches.
fn search_pawn_moves<'a>(
    moves: impl Iterator<Item = &'a Move>,
    promote: Option<PromotePiece>,
) -> Result<Move, SanError> {
    let mut searcher = AmbigSearcher::new(None, None);
    let mut missing = false;
    let mut unexpected = false;
    for &mv in moves {
        match (mv.promotion(), promote) {
            (Some(p), Some(q)) if p == q => searcher.push(mv),
            (None, None) => searcher.push(mv),
            (Some(_), None) => missing = true,
            (None, Some(_)) => unexpected = true,
            (Some(_), Some(_)) => {}
        }
    }
    if searcher.is_empty() {
        if missing {
            return Err(SanError::MissingPromotion);
        }
        if unexpected {
            return Err(SanError::UnexpectedPromotion);
        }
    }
    searcher.get_move()
}

impl Data {
    fn encode(mv: Move, pos: &Position, legal: &MoveList) -> Option<Data> {
        Some(match mv.kind() {
            MoveKind::PawnDouble => Data::PawnMove {
                dst: mv.dst(),
                promote: None,
            },
            MoveKind::Enpassant => Data::PawnCapture {
                src: mv.src().file(),
                dst: mv.dst(),
                promote: None,
            },
            MoveKind::PawnSimple
            | MoveKind::PromoteKnight
            | MoveKind::PromoteBishop
            | MoveKind::PromoteRook
            | MoveKind::PromoteQueen => {
                if mv.src().file() == mv.dst().file() {
                    Data::PawnMove {
                        dst: mv.dst(),
                        promote: mv.promotion(),
                    }
                } else {
                    Data::PawnCapture {
                        src: mv.src().file(),
                        dst: mv.dst(),
                        promote: mv.promotion(),
                    }
                }
            }
            MoveKind::CastlingKingside => Data::Castling(CastlingSide::King),
            MoveKind::CastlingQueenside => Data::Castling(CastlingSide::Queen),
            MoveKind::Simple => {
                let piece = pos.kind_at(mv.src())?;
                let mut detector = AmbigDetector::new(mv);
                for &other in legal {
                    if other.kind() == MoveKind::Simple
                        && other.dst() == mv.dst()
                        && pos.kind_at(other.src()) == Some(piece)
                    {
                        detector.push(other);
                    }
                }
                Data::Simple {
                    piece,
                    file: detector.file(),
                    rank: detector.rank(),
                    is_capture: pos.get(mv.dst()).is_some(),
                    dst: mv.dst(),
                }
            }
        })
    }

    /// Finds the legal move described by this SAN in position `pos`
    pub fn to_move(&self, pos: &Position, rules: &dyn Rules) -> Result<Move, SanError> {
        let legal = rules.legal_moves(pos);
        match *self {
            Data::Castling(side) => {
                let mv = Move::from_castling(pos.side(), side);
                if !legal.contains(&mv) {
                    return Err(SanError::NotFound);
                }
                Ok(mv)
            }
            Data::PawnMove { dst, promote } => search_pawn_moves(
                legal.iter().filter(|mv| {
                    mv.kind().is_pawn() && mv.dst() == dst && mv.src().file() == dst.file()
                }),
                promote,
            ),
            Data::PawnCapture { src, dst, promote } => {
                if pos.get(dst).is_none() && pos.ep_target() != Some(dst) {
                    return Err(SanError::CaptureExpected);
                }
                search_pawn_moves(
                    legal.iter().filter(|mv| {
                        mv.kind().is_pawn()
                            && mv.dst() == dst
                            && mv.src().file() == src
                            && src != dst.file()
                    }),
                    promote,
                )
            }
            Data::Simple {
                piece,
                file,
                rank,
                is_capture,
                dst,
            } => {
                if is_capture && pos.get(dst).is_none() {
                    return Err(SanError::CaptureExpected);
                }
                let mut searcher = AmbigSearcher::new(file, rank);
                for &mv in &legal {
                    if mv.kind() == MoveKind::Simple
                        && mv.dst() == dst
                        && pos.kind_at(mv.src()) == Some(piece)
                    {
                        searcher.push(mv);
                    }
                }
                searcher.get_move()
            }
        }
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match *self {
            Self::Castling(CastlingSide::King) => write!(f, "O-O"),
            Self::Castling(CastlingSide::Queen) => write!(f, "O-O-O"),
            Self::PawnMove { dst, promote } => write!(f, "{}{}", dst, PromoteFmt(promote)),
            Self::PawnCapture { src, dst, promote } => {
                write!(f, "{}x{}{}", src.as_char(), dst, PromoteFmt(promote))
            }
            Self::Simple {
                piece,
                file,
                rank,
                is_capture,
                dst,
            } => {
                write!(f, "{}", piece.as_char())?;
                if let Some(file) = file {
                    write!(f, "{}", file.as_char())?;
                }
                if let Some(rank) = rank {
                    write!(f, "{}", rank.as_char())?;
                }
                if is_capture {
                    write!(f, "x")?;
                }
                write!(f, "{}", dst)
            }
        }
    }
}

fn parse_promote(b: u8) -> Option<PromotePiece> {
    match b {
        b'N' => Some(PromotePiece::Knight),
        b'B' => Some(PromotePiece::Bishop),
        b'R' => Some(PromotePiece::Rook),
        b'Q' => Some(PromotePiece::Queen),
        _ => None,
    }
}

impl FromStr for Data {
    type Err = RawParseError;

    fn from_str(data: &str) -> Result<Data, Self::Err> {
        match data {
            "O-O" | "0-0" => return Ok(Self::Castling(CastlingSide::King)),
            "O-O-O" | "0-0-0" => return Ok(Self::Castling(CastlingSide::Queen)),
            "" => return Err(RawParseError::EmptyString),
            _ => {}
        }
        if !data.is_ascii() {
            return Err(RawParseError::NonAscii);
        }

        let bytes = data.as_bytes();

        if let Some(piece) = PieceKind::from_char(bytes[0] as char) {
            if piece == PieceKind::Pawn {
                return Err(RawParseError::Syntax);
            }
            let rest = &data[1..];
            if rest.len() < 2 {
                return Err(RawParseError::Syntax);
            }
            let (hints, dst) = rest.split_at(rest.len() - 2);
            let dst = Square::from_str(dst)?;
            let hints = hints.as_bytes();
            let (file, hints) = match hints.first() {
                Some(b @ b'a'..=b'h') => (File::from_char(*b as char), &hints[1..]),
                _ => (None, hints),
            };
            let (rank, hints) = match hints.first() {
                Some(b @ b'1'..=b'8') => (Rank::from_char(*b as char), &hints[1..]),
                _ => (None, hints),
            };
            let (is_capture, hints) = match hints.first() {
                Some(b'x' | b':') => (true, &hints[1..]),
                _ => (false, hints),
            };
            if !hints.is_empty() {
                return Err(RawParseError::NonPawnMoveTooLong);
            }
            return Ok(Data::Simple {
                piece,
                file,
                rank,
                is_capture,
                dst,
            });
        }

        let (promote, data) = match bytes.last().copied().and_then(parse_promote) {
            Some(promote) => {
                let rest = &data[..data.len() - 1];
                (Some(promote), rest.strip_suffix('=').unwrap_or(rest))
            }
            None => (None, data),
        };

        if data.len() < 2 {
            return Err(RawParseError::PawnMoveTooShort);
        }
        let (prefix, dst) = data.split_at(data.len() - 2);
        let dst = Square::from_str(dst)?;

        match prefix.as_bytes() {
            [] => Ok(Data::PawnMove { dst, promote }),
            [src @ b'a'..=b'h', b'x' | b':'] => Ok(Data::PawnCapture {
                src: File::from_char(*src as char).ok_or(RawParseError::Syntax)?,
                dst,
                promote,
            }),
            [_] | [_, _] => Err(RawParseError::Syntax),
            _ => Err(RawParseError::PawnMoveTooLong),
        }
    }
}

/// Check indication
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CheckMark {
    /// Check (a.k.a. "+")
    Single,
    /// Double check (a.k.a "++")
    ///
    /// This one is never produced while encoding a move and is only accepted while parsing.
    Double,
    /// Checkmate (a.k.a "#")
    Checkmate,
}

/// Parsed SAN move with a [`CheckMark`]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct San {
    /// Data without check mark
    pub data: Data,
    /// Check mark, if any
    pub check: Option<CheckMark>,
}

impl San {
    /// Encodes the legal move `mv` in position `pos`
    ///
    /// The check mark is computed by making the move.
    pub fn from_move(mv: Move, pos: &Position, rules: &dyn Rules) -> Result<San, IllegalMoveError> {
        let illegal = || IllegalMoveError {
            mv: mv.uci(),
            fen: pos.as_fen(),
        };
        let legal = rules.legal_moves(pos);
        if !legal.contains(&mv) {
            return Err(illegal());
        }
        let data = Data::encode(mv, pos, &legal).ok_or_else(illegal)?;
        let next = make::apply_unchecked(pos, mv);
        let check = if next.is_check() {
            if rules.has_legal_moves(&next) {
                Some(CheckMark::Single)
            } else {
                Some(CheckMark::Checkmate)
            }
        } else {
            None
        };
        Ok(San { data, check })
    }

    /// Decodes the SAN into a legal move in position `pos`
    ///
    /// The check mark is not verified.
    #[inline]
    pub fn to_move(&self, pos: &Position, rules: &dyn Rules) -> Result<Move, SanError> {
        self.data.to_move(pos, rules)
    }
}

impl fmt::Display for San {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        self.data.fmt(f)?;
        match self.check {
            Some(CheckMark::Single) => write!(f, "+"),
            Some(CheckMark::Double) => write!(f, "++"),
            Some(CheckMark::Checkmate) => write!(f, "#"),
            None => Ok(()),
        }
    }
}

impl FromStr for San {
    type Err = RawParseError;

    fn from_str(s: &str) -> Result<San, Self::Err> {
        // Annotation glyphs like "!?" go after the check mark
        let s = s.trim_end_matches(|c| c == '!' || c == '?');
        let (check, s) = if let Some(rest) = s.strip_suffix('#') {
            (Some(CheckMark::Checkmate), rest)
        } else if let Some(rest) = s.strip_suffix("++") {
            (Some(CheckMark::Double), rest)
        } else if let Some(rest) = s.strip_suffix('+') {
            (Some(CheckMark::Single), rest)
        } else {
            (None, s)
        };
        Ok(San {
            data: Data::from_str(s)?,
            check,
        })
    }
}
