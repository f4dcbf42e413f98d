// Reads a PGN game from stdin and prints the positions and moves

use pgnfen::{End, NumberPolicy, Status};
use std::io::{self, Read};
use std::process;

fn main() {
    let mut src = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut src) {
        eprintln!("Cannot read stdin: {}", e);
        process::exit(2);
    }

    let replay = match pgnfen::replay(&src) {
        Ok(replay) => replay,
        Err(e) => {
            eprintln!("Cannot replay: {}", e);
            process::exit(1);
        }
    };

    let game = &replay.game;
    let fens = game.fens();
    println!("{}", fens[0]);
    for (ply, fen) in game.plies().iter().zip(&fens[1..]) {
        println!("{:8} {}", ply.san.to_string(), fen);
    }

    match &replay.end {
        End::Complete => {
            println!();
            println!("{}", game.movetext(NumberPolicy::FromPosition));
            match game.status() {
                Status::Checkmate(winner) => println!("Checkmate, {:?} wins", winner),
                Status::Stalemate => println!("Stalemate"),
                Status::Ongoing => {}
            }
        }
        End::Failed {
            index,
            token,
            error,
        } => {
            println!();
            println!("Failed at token #{} ({:?}): {}", index, token, error);
            if error.is_engine_defect() {
                println!("This is a bug, please report it");
            }
            process::exit(1);
        }
    }
}
