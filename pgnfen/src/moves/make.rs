//! Applying moves to positions

use super::base::{Move, MoveKind};
use super::{san, uci};
use crate::bitboard::Bitboard;
use crate::movegen::{self, IllegalMoveError, StandardRules};
use crate::position::Position;
use crate::types::{CastlingSide, Color, File, Piece, PieceKind, Square};
use crate::{castling, geometry};

use std::str::FromStr;

use thiserror::Error;

/// Error applying a move
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ApplyError {
    /// Pawn reaches the last rank, but the promotion piece is not specified
    #[error("pawn reaches {0} without promotion piece")]
    MissingPromotion(Square),
    /// Move is not legal
    #[error("{0}")]
    Illegal(#[from] IllegalMoveError),
}

fn update_castling(next: &mut Position, mv: Move) {
    let change = Bitboard::from_square(mv.src()) | Bitboard::from_square(mv.dst());
    if (change & castling::ALL_SRCS).is_empty() {
        return;
    }
    for c in [Color::White, Color::Black] {
        for s in [CastlingSide::King, CastlingSide::Queen] {
            if (change & castling::srcs(c, s)).is_nonempty() {
                next.r.castling.unset(c, s);
            }
        }
    }
}

fn do_castling(next: &mut Position, side: Color, s: CastlingSide) {
    let rank = geometry::castling_rank(side);
    let (king_dst, rook_src, rook_dst) = match s {
        CastlingSide::King => (File::G, File::H, File::F),
        CastlingSide::Queen => (File::C, File::A, File::D),
    };
    next.put(geometry::king_home(side), None);
    next.put(Square::from_parts(rook_src, rank), None);
    next.put(
        Square::from_parts(king_dst, rank),
        Some(Piece::new(side, PieceKind::King)),
    );
    next.put(
        Square::from_parts(rook_dst, rank),
        Some(Piece::new(side, PieceKind::Rook)),
    );
}

/// Applies `mv` to `pos` without checking its legality
///
/// The move must be pseudo-legal. The resulting position may leave the own king under attack,
/// so it must be checked via [`Position::is_opponent_king_attacked()`] before it is exposed.
pub(crate) fn apply_unchecked(pos: &Position, mv: Move) -> Position {
    let mut next = pos.clone();
    let side = pos.side();
    let moved = pos.get(mv.src());
    let captured = pos.get(mv.dst());
    next.r.ep_target = None;

    match mv.kind() {
        MoveKind::Simple | MoveKind::PawnSimple => {
            next.put(mv.src(), None);
            next.put(mv.dst(), moved);
        }
        MoveKind::PawnDouble => {
            next.put(mv.src(), None);
            next.put(mv.dst(), moved);
            next.r.ep_target = Some(mv.src().add(geometry::pawn_forward_delta(side)));
        }
        MoveKind::Enpassant => {
            next.put(mv.src(), None);
            next.put(mv.dst(), moved);
            // The captured pawn stands behind the destination
            next.put(mv.dst().add(-geometry::pawn_forward_delta(side)), None);
        }
        MoveKind::PromoteKnight
        | MoveKind::PromoteBishop
        | MoveKind::PromoteRook
        | MoveKind::PromoteQueen => {
            next.put(mv.src(), None);
            next.put(
                mv.dst(),
                mv.promotion().map(|p| Piece::new(side, p.kind())),
            );
        }
        MoveKind::CastlingKingside => do_castling(&mut next, side, CastlingSide::King),
        MoveKind::CastlingQueenside => do_castling(&mut next, side, CastlingSide::Queen),
    }

    update_castling(&mut next, mv);

    if captured.is_some() || mv.kind().is_pawn() {
        next.r.halfmove_clock = 0;
    } else {
        next.r.halfmove_clock = next.r.halfmove_clock.saturating_add(1);
    }
    next.r.side = side.inv();
    if side == Color::Black {
        next.r.fullmove_number = next.r.fullmove_number.saturating_add(1);
    }

    next
}

/// Applies the legal move `mv` to `pos`, producing a new position
///
/// The original position is left untouched.
pub fn apply(pos: &Position, mv: Move) -> Result<Position, ApplyError> {
    movegen::validate(pos, mv)?;
    Ok(apply_unchecked(pos, mv))
}

/// Something that can be made as a move
pub trait Make {
    type Err;

    fn make(&self, pos: &Position) -> Result<Position, Self::Err>;
}

impl Make for Move {
    type Err = ApplyError;

    #[inline]
    fn make(&self, pos: &Position) -> Result<Position, Self::Err> {
        apply(pos, *self)
    }
}

impl Make for uci::Move {
    type Err = ApplyError;

    #[inline]
    fn make(&self, pos: &Position) -> Result<Position, Self::Err> {
        let mv = self.into_legal(pos)?;
        Ok(apply_unchecked(pos, mv))
    }
}

/// Move given as a UCI string
pub struct Uci<S: AsRef<str>>(pub S);

impl<S: AsRef<str>> Make for Uci<S> {
    type Err = uci::ParseError;

    #[inline]
    fn make(&self, pos: &Position) -> Result<Position, Self::Err> {
        let mv = Move::from_uci(self.0.as_ref(), pos)?;
        Ok(apply_unchecked(pos, mv))
    }
}

/// Move given as a SAN string, decoded with the standard rules
pub struct San<S: AsRef<str>>(pub S);

impl<S: AsRef<str>> Make for San<S> {
    type Err = san::SanError;

    #[inline]
    fn make(&self, pos: &Position) -> Result<Position, Self::Err> {
        let mv = san::San::from_str(self.0.as_ref())?.to_move(pos, &StandardRules)?;
        Ok(apply_unchecked(pos, mv))
    }
}
