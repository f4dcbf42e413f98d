//! # pgnfen
//!
//! Replays chess games written in PGN into the sequence of positions (as FEN) and moves (as
//! canonical SAN). Every move is checked against the full rules of chess, including castling,
//! en passant and promotions.
//!
//! # Example
//!
//! ```
//! use pgnfen::{replay, Status, Color};
//!
//! let replay = replay("1. f3 e5 2. g4 Qh4#").unwrap();
//! assert!(replay.is_complete());
//! assert_eq!(replay.game.sans(), vec!["f3", "e5", "g4", "Qh4#"]);
//! assert_eq!(replay.game.fens().len(), 5);
//! assert_eq!(replay.game.status(), Status::Checkmate(Color::Black));
//! ```

pub use pgnfen_base::{bitboard, bitboard_consts, geometry, types};

mod attack;
mod castling;
mod generic;
mod pawns;

pub mod error;
pub mod fen;
pub mod movegen;
pub mod moves;
pub mod pgn;
pub mod position;
pub mod replay;

pub use bitboard::Bitboard;
pub use error::Error;
pub use fen::FenParseError;
pub use movegen::{IllegalMoveError, MoveList, Rules, StandardRules};
pub use moves::{Make, Move, MoveKind, PromotePiece, San, SanError};
pub use pgn::{GameResult, Tags};
pub use position::{Position, RawPosition, Status, ValidateError};
pub use replay::{
    replay, End, Game, GameRecord, NumberPolicy, Ply, Replay, ReplayOptions, Replayer,
};
pub use types::{CastlingRights, CastlingSide, Color, File, Piece, PieceKind, Rank, Square};
