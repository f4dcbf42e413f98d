use crate::bitboard::Bitboard;
use crate::types::{CastlingSide, Color};

const fn on_rank(c: Color, x: u64) -> Bitboard {
    Bitboard::from_raw(match c {
        Color::White => x << 56,
        Color::Black => x,
    })
}

/// Squares between the king and the rook, which must be empty
#[inline]
pub const fn pass(c: Color, s: CastlingSide) -> Bitboard {
    on_rank(
        c,
        match s {
            CastlingSide::King => 0x60,
            CastlingSide::Queen => 0x0e,
        },
    )
}

/// Squares the king crosses and lands on, which must not be attacked
#[inline]
pub const fn king_path(c: Color, s: CastlingSide) -> Bitboard {
    on_rank(
        c,
        match s {
            CastlingSide::King => 0x60,
            CastlingSide::Queen => 0x0c,
        },
    )
}

/// Home squares of the king and the rook
///
/// If any piece moves from or to one of these squares, the corresponding right is lost.
#[inline]
pub const fn srcs(c: Color, s: CastlingSide) -> Bitboard {
    on_rank(
        c,
        match s {
            CastlingSide::King => 0x90,
            CastlingSide::Queen => 0x11,
        },
    )
}

pub const ALL_SRCS: Bitboard = Bitboard::from_raw(0x91 | (0x91 << 56));

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Square;
    use std::str::FromStr;

    fn squares(s: &str) -> Bitboard {
        s.split_whitespace()
            .map(|x| Square::from_str(x).unwrap())
            .fold(Bitboard::EMPTY, |b, sq| b.with(sq))
    }

    #[test]
    fn test_masks() {
        assert_eq!(pass(Color::White, CastlingSide::King), squares("f1 g1"));
        assert_eq!(pass(Color::White, CastlingSide::Queen), squares("b1 c1 d1"));
        assert_eq!(king_path(Color::Black, CastlingSide::Queen), squares("c8 d8"));
        assert_eq!(srcs(Color::Black, CastlingSide::King), squares("e8 h8"));
        assert_eq!(ALL_SRCS, squares("a1 e1 h1 a8 e8 h8"));
    }
}
