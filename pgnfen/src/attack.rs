use crate::bitboard::Bitboard;
use crate::types::{Color, Square};

#[inline]
const fn bb(val: u64) -> Bitboard {
    Bitboard::from_raw(val)
}

include!(concat!(env!("OUT_DIR"), "/near_attacks.rs"));
include!(concat!(env!("OUT_DIR"), "/rays.rs"));

// Indices into `RAYS`. A direction is "positive" if it goes towards higher square indices.
const NORTH: usize = 0;
const SOUTH: usize = 1;
const WEST: usize = 2;
const EAST: usize = 3;
const NORTH_WEST: usize = 4;
const NORTH_EAST: usize = 5;
const SOUTH_WEST: usize = 6;
const SOUTH_EAST: usize = 7;

#[inline]
fn slide<const POSITIVE: bool>(dir: usize, sq: Square, occupied: Bitboard) -> Bitboard {
    let ray = RAYS[dir][sq.index()];
    let blockers = ray & occupied;
    let first = if POSITIVE {
        blockers.first()
    } else {
        blockers.last()
    };
    match first {
        Some(stop) => ray ^ RAYS[dir][stop.index()],
        None => ray,
    }
}

#[inline]
pub fn king(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.index()]
}

#[inline]
pub fn knight(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.index()]
}

/// Squares attacked by a pawn of color `color` standing on `sq`
#[inline]
pub fn pawn(color: Color, sq: Square) -> Bitboard {
    match color {
        Color::White => WHITE_PAWN_ATTACKS[sq.index()],
        Color::Black => BLACK_PAWN_ATTACKS[sq.index()],
    }
}

/// Squares attacked by a rook on `sq`
///
/// Every ray stops at the first occupied square, which is included into the result.
#[inline]
pub fn rook(sq: Square, occupied: Bitboard) -> Bitboard {
    slide::<false>(NORTH, sq, occupied)
        | slide::<true>(SOUTH, sq, occupied)
        | slide::<false>(WEST, sq, occupied)
        | slide::<true>(EAST, sq, occupied)
}

/// Squares attacked by a bishop on `sq`
///
/// Every ray stops at the first occupied square, which is included into the result.
#[inline]
pub fn bishop(sq: Square, occupied: Bitboard) -> Bitboard {
    slide::<false>(NORTH_WEST, sq, occupied)
        | slide::<false>(NORTH_EAST, sq, occupied)
        | slide::<true>(SOUTH_WEST, sq, occupied)
        | slide::<true>(SOUTH_EAST, sq, occupied)
}
