//! Move generation and legality checks

use crate::bitboard::Bitboard;
use crate::moves::{make, uci, Move, MoveKind, PromotePiece};
use crate::position::Position;
use crate::types::{CastlingSide, Color, PieceKind, Square};
use crate::{attack, bitboard_consts, castling, generic, geometry, pawns};

use std::convert::Infallible;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::slice;

use arrayvec::ArrayVec;
use thiserror::Error;

fn diag_pieces(p: &Position, c: Color) -> Bitboard {
    p.piece2(c, PieceKind::Bishop) | p.piece2(c, PieceKind::Queen)
}

fn line_pieces(p: &Position, c: Color) -> Bitboard {
    p.piece2(c, PieceKind::Rook) | p.piece2(c, PieceKind::Queen)
}

fn do_is_square_attacked<C: generic::Color>(p: &Position, sq: Square) -> bool {
    // Pawn attacks are traced backwards from the target, so the map of the opposite color is used
    let pawn_attacks = attack::pawn(C::COLOR.inv(), sq);

    if (p.piece2(C::COLOR, PieceKind::Pawn) & pawn_attacks).is_nonempty()
        || (p.piece2(C::COLOR, PieceKind::King) & attack::king(sq)).is_nonempty()
        || (p.piece2(C::COLOR, PieceKind::Knight) & attack::knight(sq)).is_nonempty()
    {
        return true;
    }

    (attack::bishop(sq, p.all) & diag_pieces(p, C::COLOR)).is_nonempty()
        || (attack::rook(sq, p.all) & line_pieces(p, C::COLOR)).is_nonempty()
}

fn do_square_attackers<C: generic::Color>(p: &Position, sq: Square) -> Bitboard {
    let pawn_attacks = attack::pawn(C::COLOR.inv(), sq);
    (p.piece2(C::COLOR, PieceKind::Pawn) & pawn_attacks)
        | (p.piece2(C::COLOR, PieceKind::King) & attack::king(sq))
        | (p.piece2(C::COLOR, PieceKind::Knight) & attack::knight(sq))
        | (attack::bishop(sq, p.all) & diag_pieces(p, C::COLOR))
        | (attack::rook(sq, p.all) & line_pieces(p, C::COLOR))
}

/// Returns `true` if `sq` is attacked by any piece of color `by`
pub fn is_square_attacked(p: &Position, sq: Square, by: Color) -> bool {
    match by {
        Color::White => do_is_square_attacked::<generic::White>(p, sq),
        Color::Black => do_is_square_attacked::<generic::Black>(p, sq),
    }
}

/// Returns all the pieces of color `by` which attack `sq`
pub fn square_attackers(p: &Position, sq: Square, by: Color) -> Bitboard {
    match by {
        Color::White => do_square_attackers::<generic::White>(p, sq),
        Color::Black => do_square_attackers::<generic::Black>(p, sq),
    }
}

/// Error indicating that the move is not legal in the given position
#[derive(Debug, Clone, Error, Eq, PartialEq)]
#[error("move {mv} is not legal in position {fen}")]
pub struct IllegalMoveError {
    /// Offending move
    pub mv: uci::Move,
    /// Position in which the move was attempted
    pub fen: String,
}

trait MaybeMovePush {
    type Err;

    fn push(&mut self, m: Move) -> Result<(), Self::Err>;
}

/// List of moves which fits every position reachable in a game
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct MoveList(ArrayVec<Move, 256>);

impl Deref for MoveList {
    type Target = ArrayVec<Move, 256>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MoveList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl MoveList {
    pub fn new() -> MoveList {
        MoveList(ArrayVec::new())
    }
}

/// Sink for generated moves
pub trait MovePush {
    fn push(&mut self, m: Move);
}

impl<const N: usize> MovePush for ArrayVec<Move, N> {
    fn push(&mut self, m: Move) {
        self.push(m);
    }
}

impl MovePush for MoveList {
    fn push(&mut self, m: Move) {
        self.0.push(m);
    }
}

impl MovePush for Vec<Move> {
    fn push(&mut self, m: Move) {
        self.push(m);
    }
}

impl<T: MovePush> MaybeMovePush for T {
    type Err = Infallible;

    fn push(&mut self, m: Move) -> Result<(), Self::Err> {
        <Self as MovePush>::push(self, m);
        Ok(())
    }
}

/// Passes through only the moves which don't leave the own king under attack
struct LegalFilter<'a, P> {
    pos: &'a Position,
    inner: &'a mut P,
}

impl<'a, P: MaybeMovePush> MaybeMovePush for LegalFilter<'a, P> {
    type Err = P::Err;

    fn push(&mut self, mv: Move) -> Result<(), Self::Err> {
        let next = make::apply_unchecked(self.pos, mv);
        if next.is_opponent_king_attacked() {
            return Ok(());
        }
        self.inner.push(mv)
    }
}

/// Stops the generation as soon as the first move arrives
struct ErrOnFirst;

impl MaybeMovePush for ErrOnFirst {
    type Err = ();

    fn push(&mut self, _mv: Move) -> Result<(), ()> {
        Err(())
    }
}

struct MoveGenImpl<'a, P, C> {
    pos: &'a Position,
    dst: &'a mut P,
    _c: PhantomData<C>,
}

impl<'a, P: MaybeMovePush, C: generic::Color> MoveGenImpl<'a, P, C> {
    fn new(pos: &'a Position, dst: &'a mut P, _c: C) -> Self {
        MoveGenImpl {
            pos,
            dst,
            _c: PhantomData,
        }
    }

    #[inline]
    fn add_move(&mut self, kind: MoveKind, src: Square, dst: Square) -> Result<(), P::Err> {
        self.dst.push(Move::from_parts(kind, src, dst, C::COLOR))
    }

    fn add_pawn_with_promote<const IS_PROMOTE: bool>(
        &mut self,
        src: Square,
        dst: Square,
    ) -> Result<(), P::Err> {
        if IS_PROMOTE {
            for piece in PromotePiece::ALL {
                self.add_move(MoveKind::from(piece), src, dst)?;
            }
        } else {
            self.add_move(MoveKind::PawnSimple, src, dst)?;
        }
        Ok(())
    }

    fn gen_pawn_single<const IS_PROMOTE: bool>(&mut self, pawns: Bitboard) -> Result<(), P::Err> {
        let back = -geometry::pawn_forward_delta(C::COLOR);
        for dst in pawns::advance_forward(C::COLOR, pawns) & !self.pos.all {
            self.add_pawn_with_promote::<IS_PROMOTE>(dst.add(back), dst)?;
        }
        Ok(())
    }

    fn gen_pawn_double(&mut self, pawns: Bitboard) -> Result<(), P::Err> {
        let tmp = pawns::advance_forward(C::COLOR, pawns) & !self.pos.all;
        let back = -2 * geometry::pawn_forward_delta(C::COLOR);
        for dst in pawns::advance_forward(C::COLOR, tmp) & !self.pos.all {
            self.add_move(MoveKind::PawnDouble, dst.add(back), dst)?;
        }
        Ok(())
    }

    fn gen_pawn_capture<const IS_PROMOTE: bool>(&mut self, pawns: Bitboard) -> Result<(), P::Err> {
        let enemy = self.pos.color_bb(C::COLOR.inv());
        let left_delta = geometry::pawn_left_delta(C::COLOR);
        for dst in pawns::advance_left(C::COLOR, pawns) & enemy {
            self.add_pawn_with_promote::<IS_PROMOTE>(dst.add(-left_delta), dst)?;
        }
        let right_delta = geometry::pawn_right_delta(C::COLOR);
        for dst in pawns::advance_right(C::COLOR, pawns) & enemy {
            self.add_pawn_with_promote::<IS_PROMOTE>(dst.add(-right_delta), dst)?;
        }
        Ok(())
    }

    fn gen_pawn_enpassant(&mut self) -> Result<(), P::Err> {
        if let Some(target) = self.pos.ep_target() {
            // Our pawns which attack the target are the ones an enemy pawn on it would attack
            let pawns = self.pos.piece2(C::COLOR, PieceKind::Pawn);
            for src in attack::pawn(C::COLOR.inv(), target) & pawns {
                self.add_move(MoveKind::Enpassant, src, target)?;
            }
        }
        Ok(())
    }

    fn gen_pawns(&mut self) -> Result<(), P::Err> {
        let promote_mask = bitboard_consts::rank(geometry::promote_src_rank(C::COLOR));
        let double_mask = bitboard_consts::rank(geometry::double_move_src_rank(C::COLOR));
        let pawns = self.pos.piece2(C::COLOR, PieceKind::Pawn);
        self.gen_pawn_single::<false>(pawns & !promote_mask)?;
        self.gen_pawn_single::<true>(pawns & promote_mask)?;
        self.gen_pawn_double(pawns & double_mask)?;
        self.gen_pawn_capture::<false>(pawns & !promote_mask)?;
        self.gen_pawn_capture::<true>(pawns & promote_mask)?;
        self.gen_pawn_enpassant()
    }

    fn gen_near(&mut self, kind: PieceKind) -> Result<(), P::Err> {
        let allowed = !self.pos.color_bb(C::COLOR);
        for src in self.pos.piece2(C::COLOR, kind) {
            let attack = match kind {
                PieceKind::Knight => attack::knight(src),
                _ => attack::king(src),
            };
            for dst in attack & allowed {
                self.add_move(MoveKind::Simple, src, dst)?;
            }
        }
        Ok(())
    }

    fn gen_sliding<const IS_DIAG: bool>(&mut self, pieces: Bitboard) -> Result<(), P::Err> {
        let allowed = !self.pos.color_bb(C::COLOR);
        for src in pieces {
            let attack = match IS_DIAG {
                true => attack::bishop(src, self.pos.all),
                false => attack::rook(src, self.pos.all),
            };
            for dst in attack & allowed {
                self.add_move(MoveKind::Simple, src, dst)?;
            }
        }
        Ok(())
    }

    fn gen_castling(&mut self) -> Result<(), P::Err> {
        let rights = self.pos.castling();
        if !rights.has(C::COLOR, CastlingSide::King) && !rights.has(C::COLOR, CastlingSide::Queen)
        {
            return Ok(());
        }
        if do_is_square_attacked::<C::Inv>(self.pos, geometry::king_home(C::COLOR)) {
            return Ok(());
        }
        for side in [CastlingSide::King, CastlingSide::Queen] {
            if rights.has(C::COLOR, side)
                && (castling::pass(C::COLOR, side) & self.pos.all).is_empty()
                && !castling::king_path(C::COLOR, side)
                    .into_iter()
                    .any(|sq| do_is_square_attacked::<C::Inv>(self.pos, sq))
            {
                self.dst.push(Move::from_castling(C::COLOR, side))?;
            }
        }
        Ok(())
    }

    fn gen_all(&mut self) -> Result<(), P::Err> {
        self.gen_near(PieceKind::King)?;
        self.gen_sliding::<true>(diag_pieces(self.pos, C::COLOR))?;
        self.gen_sliding::<false>(line_pieces(self.pos, C::COLOR))?;
        self.gen_near(PieceKind::Knight)?;
        self.gen_pawns()?;
        self.gen_castling()
    }
}

fn gen_into<P: MaybeMovePush>(pos: &Position, dst: &mut P) -> Result<(), P::Err> {
    match pos.side() {
        Color::White => MoveGenImpl::new(pos, dst, generic::White).gen_all(),
        Color::Black => MoveGenImpl::new(pos, dst, generic::Black).gen_all(),
    }
}

/// Pushes all the pseudo-legal moves into `dst`
///
/// A move is pseudo-legal if it follows the rules of chess, except that the own king may remain
/// under attack after it.
pub fn pseudo_legal_moves_into<P: MovePush>(pos: &Position, dst: &mut P) {
    let _ = gen_into(pos, dst);
}

/// Returns all the pseudo-legal moves
pub fn pseudo_legal_moves(pos: &Position) -> MoveList {
    let mut res = MoveList::new();
    pseudo_legal_moves_into(pos, &mut res);
    res
}

/// Pushes all the legal moves into `dst`
pub fn legal_moves_into<P: MovePush>(pos: &Position, dst: &mut P) {
    let mut filter = LegalFilter { pos, inner: dst };
    let _ = gen_into(pos, &mut filter);
}

/// Returns all the legal moves
pub fn legal_moves(pos: &Position) -> MoveList {
    let mut res = MoveList::new();
    legal_moves_into(pos, &mut res);
    res
}

/// Returns `true` if there is at least one legal move
///
/// This is faster than checking [`legal_moves()`] for emptiness, as the generation stops at the
/// first legal move.
pub fn has_legal_moves(pos: &Position) -> bool {
    let mut err_on_first = ErrOnFirst;
    let mut filter = LegalFilter {
        pos,
        inner: &mut err_on_first,
    };
    gen_into(pos, &mut filter).is_err()
}

/// Checks that `mv` is legal in `pos`
pub fn validate(pos: &Position, mv: Move) -> Result<(), IllegalMoveError> {
    if mv.side() == pos.side() && legal_moves(pos).contains(&mv) {
        return Ok(());
    }
    Err(IllegalMoveError {
        mv: mv.uci(),
        fen: pos.as_fen(),
    })
}

/// Counts the leaf nodes of the legal move tree of depth `depth`
pub fn perft(pos: &Position, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = legal_moves(pos);
    if depth == 1 {
        return moves.len() as u64;
    }
    moves
        .iter()
        .map(|&mv| perft(&make::apply_unchecked(pos, mv), depth - 1))
        .sum()
}

/// Source of legal moves
///
/// Notation codecs only depend on this trait, so they don't need to know how the moves are
/// generated.
pub trait Rules {
    /// Returns all the legal moves in `pos`
    fn legal_moves(&self, pos: &Position) -> MoveList;

    /// Returns `true` if `pos` has at least one legal move
    fn has_legal_moves(&self, pos: &Position) -> bool {
        !self.legal_moves(pos).is_empty()
    }
}

/// Standard rules of chess
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct StandardRules;

impl Rules for StandardRules {
    #[inline]
    fn legal_moves(&self, pos: &Position) -> MoveList {
        legal_moves(pos)
    }

    #[inline]
    fn has_legal_moves(&self, pos: &Position) -> bool {
        has_legal_moves(pos)
    }
}
