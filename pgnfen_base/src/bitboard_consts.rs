use crate::bitboard::Bitboard;
use crate::types::{File, Rank};

const RANK_8: u64 = 0xff;
const FILE_A: u64 = 0x0101010101010101;

pub const fn rank(r: Rank) -> Bitboard {
    Bitboard::from_raw(RANK_8 << (r.index() * 8))
}

pub const fn file(f: File) -> Bitboard {
    Bitboard::from_raw(FILE_A << f.index())
}

/// Ranks where a pawn is never allowed to stand
pub const BACK_RANKS: Bitboard =
    Bitboard::from_raw((RANK_8 << (Rank::R8.index() * 8)) | (RANK_8 << (Rank::R1.index() * 8)));

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Square;

    #[test]
    fn test_lines() {
        for f in File::iter() {
            for r in Rank::iter() {
                let sq = Square::from_parts(f, r);
                assert!(file(f).has(sq));
                assert!(rank(r).has(sq));
            }
            assert_eq!(file(f).popcount(), 8);
        }
        assert_eq!(rank(Rank::R1).as_raw(), 0xff00000000000000);
        assert_eq!(file(File::H).as_raw(), 0x8080808080808080);
        assert_eq!(BACK_RANKS, rank(Rank::R1) | rank(Rank::R8));
    }
}
