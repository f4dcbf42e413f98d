//! Position and related things

use crate::bitboard::Bitboard;
use crate::fen::FenParseError;
use crate::moves::make::Make;
use crate::types::{CastlingRights, CastlingSide, Color, File, Piece, PieceKind, Rank, Square};
use crate::{bitboard_consts, geometry, movegen};

use thiserror::Error;

/// Position validation error
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// En passant target is not on the right rank, or there is no pawn which could just make
    /// a double move through it
    #[error("invalid en passant target {0}")]
    InvalidEnpassant(Square),
    /// Castling right is set, but the king or the rook is not on its home square
    #[error("invalid castling right for {0:?} on {1:?} side")]
    InvalidCastling(Color, CastlingSide),
    /// Too many pieces of given color
    ///
    /// No more than 16 pieces of each color is allowed.
    #[error("too many pieces of color {0:?}")]
    TooManyPieces(Color),
    /// One of the sides doesn't have a king
    #[error("no king of color {0:?}")]
    NoKing(Color),
    /// One of the sides has more than one king
    #[error("more than one king of color {0:?}")]
    TooManyKings(Color),
    /// There is a pawn on the 1st or on the 8th rank
    #[error("invalid pawn position {0}")]
    InvalidPawn(Square),
    /// Opponent's king is under attack
    #[error("opponent's king is attacked")]
    OpponentKingAttacked,
}

/// Forced state of the game in the given position
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    /// The side to move has legal moves
    Ongoing,
    /// The side to move is checkmated, the contained color is the winner
    Checkmate(Color),
    /// The side to move has no legal moves, but is not in check
    Stalemate,
}

/// Unvalidated chess position
///
/// Raw position contains all the necessary information about the chess position. But, unlike
/// [`Position`], it is not validated and may contain an invalid position.
///
/// Raw position can be used to build or edit the position programmatically. After changing the
/// necessary fields, it must be converted to [`Position`] via [`Position::try_from()`].
///
/// # Example
///
/// ```
/// # use pgnfen::{RawPosition, Position, File, Rank, Color, Piece, PieceKind, CastlingRights};
/// #
/// let mut raw = RawPosition {
///     cells: [None; 64],
///     side: Color::White,
///     castling: CastlingRights::EMPTY,
///     ep_target: None,
///     halfmove_clock: 10,
///     fullmove_number: 42,
/// };
/// raw.put2(File::B, Rank::R2, Some(Piece::new(Color::White, PieceKind::King)));
/// raw.put2(File::D, Rank::R5, Some(Piece::new(Color::Black, PieceKind::King)));
///
/// let pos: Position = raw.try_into().unwrap();
/// assert_eq!(pos.as_fen(), "8/8/8/3k4/8/8/1K6/8 w - - 10 42");
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RawPosition {
    /// Contents of the board, indexed by [`Square::index()`]
    pub cells: [Option<Piece>; 64],
    /// Side to move
    pub side: Color,
    /// Castling rights
    pub castling: CastlingRights,
    /// En passant target square
    ///
    /// This is the square skipped over by the pawn which has just made a double move, as written
    /// in FEN.
    pub ep_target: Option<Square>,
    /// Number of half-moves since the last capture or pawn move
    pub halfmove_clock: u16,
    /// Move number, incremented after each move by Black
    pub fullmove_number: u16,
}

impl RawPosition {
    /// Returns an empty `RawPosition`
    #[inline]
    pub const fn empty() -> RawPosition {
        RawPosition {
            cells: [None; 64],
            side: Color::White,
            castling: CastlingRights::EMPTY,
            ep_target: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Returns the standard starting position
    pub fn initial() -> RawPosition {
        let mut res = RawPosition {
            castling: CastlingRights::FULL,
            ..RawPosition::empty()
        };
        for file in File::iter() {
            res.put2(file, Rank::R2, Some(Piece::new(Color::White, PieceKind::Pawn)));
            res.put2(file, Rank::R7, Some(Piece::new(Color::Black, PieceKind::Pawn)));
        }
        const BACK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (color, rank) in [(Color::White, Rank::R1), (Color::Black, Rank::R8)] {
            for (file, kind) in File::iter().zip(BACK) {
                res.put2(file, rank, Some(Piece::new(color, kind)));
            }
        }
        res
    }

    /// Parses a raw position from FEN
    #[inline]
    pub fn from_fen(fen: &str) -> Result<RawPosition, FenParseError> {
        fen.parse()
    }

    /// Returns the contents of the square `sq`
    #[inline]
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.cells[sq.index()]
    }

    /// Returns the contents of the square with file `file` and rank `rank`
    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Option<Piece> {
        self.get(Square::from_parts(file, rank))
    }

    #[inline]
    pub fn put(&mut self, sq: Square, piece: Option<Piece>) {
        self.cells[sq.index()] = piece;
    }

    #[inline]
    pub fn put2(&mut self, file: File, rank: Rank, piece: Option<Piece>) {
        self.put(Square::from_parts(file, rank), piece);
    }

    /// Converts the position into a FEN string
    #[inline]
    pub fn as_fen(&self) -> String {
        self.to_string()
    }
}

impl Default for RawPosition {
    #[inline]
    fn default() -> RawPosition {
        RawPosition::empty()
    }
}

/// Valid chess position
///
/// This type always holds a valid position, which is an immutable snapshot. Making a move
/// produces a new `Position` and leaves the original one untouched.
///
/// It contains a [`RawPosition`] alongside with per-piece bitboards used for move generation
/// and attack detection.
#[derive(Debug, Clone)]
pub struct Position {
    pub(crate) r: RawPosition,
    pub(crate) white: Bitboard,
    pub(crate) black: Bitboard,
    pub(crate) all: Bitboard,
    pub(crate) pieces: [Bitboard; Piece::COUNT],
}

impl Position {
    /// Returns the standard starting position
    pub fn initial() -> Position {
        Position::from_raw_unchecked(RawPosition::initial())
    }

    /// Parses a position from FEN
    #[inline]
    pub fn from_fen(fen: &str) -> Result<Position, FenParseError> {
        fen.parse()
    }

    /// Builds the bitboards for `raw` without checking it
    pub(crate) fn from_raw_unchecked(raw: RawPosition) -> Position {
        let mut res = Position {
            r: raw,
            white: Bitboard::EMPTY,
            black: Bitboard::EMPTY,
            all: Bitboard::EMPTY,
            pieces: [Bitboard::EMPTY; Piece::COUNT],
        };
        for sq in Square::iter() {
            if let Some(piece) = raw.get(sq) {
                res.pieces[piece.index()].set(sq);
                res.color_mut(piece.color()).set(sq);
            }
        }
        res.all = res.white | res.black;
        res
    }

    /// Returns a view over the raw position
    #[inline]
    pub fn raw(&self) -> &RawPosition {
        &self.r
    }

    /// Returns the piece standing on `sq`, if any
    #[inline]
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.r.get(sq)
    }

    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Option<Piece> {
        self.r.get2(file, rank)
    }

    /// Returns the kind of the piece standing on `sq`, if any
    #[inline]
    pub fn kind_at(&self, sq: Square) -> Option<PieceKind> {
        self.get(sq).map(|p| p.kind())
    }

    /// Returns side to move
    #[inline]
    pub fn side(&self) -> Color {
        self.r.side
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.r.castling
    }

    #[inline]
    pub fn ep_target(&self) -> Option<Square> {
        self.r.ep_target
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.r.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.r.fullmove_number
    }

    /// Returns the bitboard over all the pieces with color `c`
    #[inline]
    pub fn color_bb(&self, c: Color) -> Bitboard {
        match c {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    #[inline]
    fn color_mut(&mut self, c: Color) -> &mut Bitboard {
        match c {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    /// Returns the bitboard over all the squares occupied by `p`
    #[inline]
    pub fn piece_bb(&self, p: Piece) -> Bitboard {
        self.pieces[p.index()]
    }

    /// Returns the bitboard over all the pieces of color `c` and kind `k`
    #[inline]
    pub fn piece2(&self, c: Color, k: PieceKind) -> Bitboard {
        self.piece_bb(Piece::new(c, k))
    }

    /// Returns the bitboard over all the occupied squares
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.all
    }

    /// Returns the square of the king of color `c`
    #[inline]
    pub fn king_square(&self, c: Color) -> Square {
        // Every valid position has exactly one king of each color.
        self.piece2(c, PieceKind::King)
            .first()
            .unwrap_or_else(|| geometry::king_home(c))
    }

    /// Puts `piece` on `sq`, keeping the bitboards in sync
    pub(crate) fn put(&mut self, sq: Square, piece: Option<Piece>) {
        if let Some(old) = self.r.get(sq) {
            self.pieces[old.index()].unset(sq);
            self.color_mut(old.color()).unset(sq);
        }
        if let Some(new) = piece {
            self.pieces[new.index()].set(sq);
            self.color_mut(new.color()).set(sq);
        }
        self.r.put(sq, piece);
        self.all = self.white | self.black;
    }

    /// Returns `true` if `sq` is attacked by any piece of color `by`
    #[inline]
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        movegen::is_square_attacked(self, sq, by)
    }

    /// Returns all the pieces of color `by` attacking `sq`
    #[inline]
    pub fn attackers(&self, sq: Square, by: Color) -> Bitboard {
        movegen::square_attackers(self, sq, by)
    }

    /// Returns `true` if the king of the side not to move is under attack
    ///
    /// Such position cannot arise in a game. It is only observed while testing a pseudo-legal
    /// move for legality.
    #[inline]
    pub fn is_opponent_king_attacked(&self) -> bool {
        let c = self.r.side;
        self.is_square_attacked(self.king_square(c.inv()), c)
    }

    /// Returns `true` if the current side is in check
    #[inline]
    pub fn is_check(&self) -> bool {
        let c = self.r.side;
        self.is_square_attacked(self.king_square(c), c.inv())
    }

    /// Returns all the pieces that give check currently
    #[inline]
    pub fn checkers(&self) -> Bitboard {
        let c = self.r.side;
        self.attackers(self.king_square(c), c.inv())
    }

    /// Returns `true` if the current side has at least one legal move
    #[inline]
    pub fn has_legal_moves(&self) -> bool {
        movegen::has_legal_moves(self)
    }

    /// Reports checkmate or stalemate in the current position
    ///
    /// Draws which are not forced by the rules (repetitions, fifty moves, insufficient material)
    /// are not considered here.
    pub fn status(&self) -> Status {
        if self.has_legal_moves() {
            return Status::Ongoing;
        }
        if self.is_check() {
            Status::Checkmate(self.r.side.inv())
        } else {
            Status::Stalemate
        }
    }

    /// Convenience alias for [`Make::make`]
    #[inline]
    pub fn make_move<M: Make>(&self, m: M) -> Result<Position, M::Err> {
        m.make(self)
    }

    /// Converts the position into a FEN string
    #[inline]
    pub fn as_fen(&self) -> String {
        self.to_string()
    }
}

impl PartialEq for Position {
    #[inline]
    fn eq(&self, other: &Position) -> bool {
        self.r == other.r
    }
}

impl Eq for Position {}

impl std::hash::Hash for Position {
    #[inline]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.r.hash(state)
    }
}

fn validate_enpassant(raw: &RawPosition, target: Square) -> Result<(), ValidateError> {
    let side = raw.side;
    if target.rank() != geometry::enpassant_dst_rank(side) {
        return Err(ValidateError::InvalidEnpassant(target));
    }
    // The pawn has just passed `target`, so it stands one step further and the square it
    // started from is free.
    let pawn_sq = target.add(-geometry::pawn_forward_delta(side));
    let origin_sq = target.add(geometry::pawn_forward_delta(side));
    if raw.get(pawn_sq) != Some(Piece::new(side.inv(), PieceKind::Pawn))
        || raw.get(target).is_some()
        || raw.get(origin_sq).is_some()
    {
        return Err(ValidateError::InvalidEnpassant(target));
    }
    Ok(())
}

fn validate_castling(raw: &RawPosition) -> Result<(), ValidateError> {
    for color in [Color::White, Color::Black] {
        let rank = geometry::castling_rank(color);
        let king = Some(Piece::new(color, PieceKind::King));
        let rook = Some(Piece::new(color, PieceKind::Rook));
        for (side, rook_file) in [(CastlingSide::King, File::H), (CastlingSide::Queen, File::A)] {
            if raw.castling.has(color, side)
                && (raw.get2(File::E, rank) != king || raw.get2(rook_file, rank) != rook)
            {
                return Err(ValidateError::InvalidCastling(color, side));
            }
        }
    }
    Ok(())
}

impl TryFrom<RawPosition> for Position {
    type Error = ValidateError;

    fn try_from(raw: RawPosition) -> Result<Position, ValidateError> {
        if let Some(target) = raw.ep_target {
            validate_enpassant(&raw, target)?;
        }
        validate_castling(&raw)?;

        let res = Position::from_raw_unchecked(raw);

        for color in [Color::White, Color::Black] {
            if res.color_bb(color).popcount() > 16 {
                return Err(ValidateError::TooManyPieces(color));
            }
            match res.piece2(color, PieceKind::King).popcount() {
                0 => return Err(ValidateError::NoKing(color)),
                1 => {}
                _ => return Err(ValidateError::TooManyKings(color)),
            }
        }

        let pawns =
            res.piece2(Color::White, PieceKind::Pawn) | res.piece2(Color::Black, PieceKind::Pawn);
        if let Some(sq) = (pawns & bitboard_consts::BACK_RANKS).first() {
            return Err(ValidateError::InvalidPawn(sq));
        }

        if res.is_opponent_king_attacked() {
            return Err(ValidateError::OpponentKingAttacked);
        }

        Ok(res)
    }
}

impl TryFrom<&RawPosition> for Position {
    type Error = ValidateError;

    fn try_from(raw: &RawPosition) -> Result<Position, ValidateError> {
        (*raw).try_into()
    }
}
