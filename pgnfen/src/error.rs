//! Crate-level error type

use crate::fen::FenParseError;
use crate::movegen::IllegalMoveError;
use crate::moves::san::SanError;

use thiserror::Error;

/// Error replaying a game
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum Error {
    /// Initial position (either given or taken from the `FEN` tag) cannot be parsed
    #[error("malformed position: {0}")]
    MalformedPosition(#[from] FenParseError),
    /// Movetext contains no moves
    #[error("movetext contains no moves")]
    EmptyMovetext,
    /// Token cannot be resolved into exactly one legal move
    #[error("cannot resolve move {token:?}: {source}")]
    AmbiguousOrUnknownMove {
        /// Offending token
        token: String,
        /// Reason
        source: SanError,
    },
    /// Resolved move was rejected by the legality check
    #[error("illegal move: {0}")]
    IllegalMove(#[from] IllegalMoveError),
    /// Pawn reaches the last rank without promotion piece
    #[error("promotion piece is not specified in {token:?}")]
    MissingPromotion {
        /// Offending token
        token: String,
    },
    /// Re-encoded SAN doesn't resolve back into the same move
    #[error("move {token:?} was encoded as {encoded:?}, which doesn't decode back")]
    NotationMismatch {
        /// Token from the movetext
        token: String,
        /// SAN produced by the encoder
        encoded: String,
    },
}

impl Error {
    /// Wraps the error from decoding SAN token `token`
    pub(crate) fn from_san(token: &str, err: SanError) -> Error {
        match err {
            SanError::MissingPromotion => Error::MissingPromotion {
                token: token.to_string(),
            },
            source => Error::AmbiguousOrUnknownMove {
                token: token.to_string(),
                source,
            },
        }
    }

    /// Returns `true` if the error indicates a bug in this crate rather than bad input
    pub fn is_engine_defect(&self) -> bool {
        matches!(self, Error::IllegalMove(_) | Error::NotationMismatch { .. })
    }
}
