use std::path::Path;
use std::{env, io};

/// Steps along files and ranks for each sliding direction
///
/// The first four are rook directions and the last four are bishop directions. Positive
/// `delta_rank` points towards rank 1, which is towards higher square indices.
const DIRECTIONS: [(isize, isize); 8] = [
    (0, -1),
    (0, 1),
    (-1, 0),
    (1, 0),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

fn print_bitboards<W: io::Write>(
    w: &mut W,
    name: &str,
    bs: &[pgnfen_base::bitboard::Bitboard; 64],
) -> io::Result<()> {
    writeln!(w, "const {}: [Bitboard; 64] = [", name)?;
    for (i, b) in bs.iter().enumerate() {
        writeln!(w, "    /*{:2}*/ bb(0x{:016x}),", i, b.as_raw())?;
    }
    writeln!(w, "];")?;
    Ok(())
}

mod near_attacks {
    use std::io::{self, BufWriter, Write};
    use std::{fs, path::Path};

    use pgnfen_base::bitboard::Bitboard;
    use pgnfen_base::types::Square;

    fn generate_directed<const N: usize>(d_file: [isize; N], d_rank: [isize; N]) -> [Bitboard; 64] {
        let mut res = [Bitboard::EMPTY; 64];
        for sq in Square::iter() {
            let mut bb = Bitboard::EMPTY;
            for (&delta_file, &delta_rank) in d_file.iter().zip(d_rank.iter()) {
                if let Some(dst) = sq.shift(delta_file, delta_rank) {
                    bb.set(dst);
                }
            }
            res[sq.index()] = bb;
        }
        res
    }

    pub fn gen(out_path: &Path) -> io::Result<()> {
        let f = fs::File::create(out_path)?;
        let mut w = BufWriter::new(&f);

        super::print_bitboards(
            &mut w,
            "KING_ATTACKS",
            &generate_directed([-1, -1, -1, 0, 0, 1, 1, 1], [-1, 0, 1, -1, 1, -1, 0, 1]),
        )?;
        writeln!(&mut w)?;
        super::print_bitboards(
            &mut w,
            "KNIGHT_ATTACKS",
            &generate_directed([-2, -2, -1, -1, 2, 2, 1, 1], [-1, 1, -2, 2, -1, 1, -2, 2]),
        )?;
        writeln!(&mut w)?;
        super::print_bitboards(
            &mut w,
            "WHITE_PAWN_ATTACKS",
            &generate_directed([-1, 1], [-1, -1]),
        )?;
        writeln!(&mut w)?;
        super::print_bitboards(
            &mut w,
            "BLACK_PAWN_ATTACKS",
            &generate_directed([-1, 1], [1, 1]),
        )?;

        Ok(())
    }
}

mod rays {
    use std::io::{self, BufWriter, Write};
    use std::{fs, path::Path};

    use pgnfen_base::bitboard::Bitboard;
    use pgnfen_base::types::Square;

    fn generate_ray(delta_file: isize, delta_rank: isize) -> [Bitboard; 64] {
        let mut res = [Bitboard::EMPTY; 64];
        for sq in Square::iter() {
            let mut bb = Bitboard::EMPTY;
            let mut p = sq;
            while let Some(next) = p.shift(delta_file, delta_rank) {
                bb.set(next);
                p = next;
            }
            res[sq.index()] = bb;
        }
        res
    }

    pub fn gen(out_path: &Path) -> io::Result<()> {
        let f = fs::File::create(out_path)?;
        let mut w = BufWriter::new(&f);

        for (i, &(delta_file, delta_rank)) in super::DIRECTIONS.iter().enumerate() {
            super::print_bitboards(
                &mut w,
                &format!("RAY_{}", i),
                &generate_ray(delta_file, delta_rank),
            )?;
            writeln!(&mut w)?;
        }
        writeln!(
            &mut w,
            "const RAYS: [[Bitboard; 64]; 8] = [RAY_0, RAY_1, RAY_2, RAY_3, RAY_4, RAY_5, RAY_6, RAY_7];"
        )?;

        Ok(())
    }
}

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = env::var("OUT_DIR").map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    near_attacks::gen(&Path::new(&out_dir).join("near_attacks.rs"))?;
    rays::gen(&Path::new(&out_dir).join("rays.rs"))?;

    Ok(())
}
