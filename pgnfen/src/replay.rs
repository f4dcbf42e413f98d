//! Replaying games from PGN

use crate::error::Error;
use crate::movegen::{Rules, StandardRules};
use crate::moves::make::{self, ApplyError};
use crate::moves::san::San;
use crate::moves::Move;
use crate::pgn::{self, GameResult, Tags};
use crate::position::{Position, Status};
use crate::types::Color;

use std::fmt::Write;
use std::str::FromStr;

use log::{debug, error, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options for [`Replayer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOptions {
    /// Initial position. Takes priority over the `FEN` tag
    pub initial: Option<Position>,
    /// Start from the position in the `FEN` tag, if present
    pub honor_fen_tag: bool,
    /// Check that every emitted SAN decodes back into the same move
    pub verify_notation: bool,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        ReplayOptions {
            initial: None,
            honor_fen_tag: true,
            verify_notation: true,
        }
    }
}

/// Single replayed move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ply {
    /// Move made
    pub mv: Move,
    /// Canonical SAN of the move
    pub san: San,
    /// Position after the move
    pub position: Position,
}

/// How to number moves in [`Game::movetext()`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NumberPolicy {
    /// No move numbers
    Omit,
    /// Start from the fullmove number of the initial position
    FromPosition,
    /// Start from the given number
    Custom(u16),
}

/// Replayed game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    initial: Position,
    plies: Vec<Ply>,
    tags: Tags,
    result: Option<GameResult>,
}

impl Game {
    #[inline]
    pub fn initial(&self) -> &Position {
        &self.initial
    }

    #[inline]
    pub fn plies(&self) -> &[Ply] {
        &self.plies
    }

    #[inline]
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Result marker of the game, as written in PGN
    #[inline]
    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    /// Position after the last replayed move
    pub fn last(&self) -> &Position {
        self.plies.last().map_or(&self.initial, |p| &p.position)
    }

    /// FEN of the initial position, followed by FEN after each move
    pub fn fens(&self) -> Vec<String> {
        let mut fens = Vec::with_capacity(self.plies.len() + 1);
        fens.push(self.initial.as_fen());
        fens.extend(self.plies.iter().map(|p| p.position.as_fen()));
        fens
    }

    /// SAN of each move
    pub fn sans(&self) -> Vec<String> {
        self.plies.iter().map(|p| p.san.to_string()).collect()
    }

    /// Outcome forced by the rules in the last position
    pub fn status(&self) -> Status {
        self.last().status()
    }

    /// Formats the moves as movetext, like `1. e4 e5 2. Nf3`
    pub fn movetext(&self, numbers: NumberPolicy) -> String {
        let mut number = match numbers {
            NumberPolicy::Omit => None,
            NumberPolicy::FromPosition => Some(self.initial.fullmove_number()),
            NumberPolicy::Custom(n) => Some(n),
        };
        let mut side = self.initial.side();
        let mut res = String::new();
        for (i, ply) in self.plies.iter().enumerate() {
            if i != 0 {
                res.push(' ');
            }
            if let Some(n) = number {
                match side {
                    Color::White => write!(res, "{}. ", n).ok(),
                    Color::Black if i == 0 => write!(res, "{}... ", n).ok(),
                    Color::Black => None,
                };
            }
            write!(res, "{}", ply.san).ok();
            if side == Color::Black {
                number = number.map(|n| n.saturating_add(1));
            }
            side = side.inv();
        }
        res
    }

    /// Converts the game into the shape consumed by web clients
    pub fn record(&self) -> GameRecord {
        GameRecord {
            fens: self.fens(),
            moves: self.sans(),
        }
    }
}

/// How the replay ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum End {
    /// All the moves were replayed
    Complete,
    /// Replay stopped at token `index` (zero-based)
    Failed {
        index: usize,
        token: String,
        error: Error,
    },
}

/// Result of replaying a game
///
/// If the replay failed, `game` contains all the moves before the failing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    pub game: Game,
    pub end: End,
}

impl Replay {
    #[inline]
    pub fn is_complete(&self) -> bool {
        matches!(self.end, End::Complete)
    }

    #[inline]
    pub fn record(&self) -> GameRecord {
        self.game.record()
    }

    /// Returns the game if the replay is complete, and the error otherwise
    pub fn into_result(self) -> Result<Game, Error> {
        match self.end {
            End::Complete => Ok(self.game),
            End::Failed { error, .. } => Err(error),
        }
    }
}

/// Positions and moves of a game, as strings
///
/// `fens` has one more element than `moves`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GameRecord {
    pub fens: Vec<String>,
    pub moves: Vec<String>,
}

/// Replays games with the given options
#[derive(Debug, Clone, Default)]
pub struct Replayer {
    options: ReplayOptions,
    rules: StandardRules,
}

impl Replayer {
    #[inline]
    pub fn new() -> Replayer {
        Replayer::default()
    }

    #[inline]
    pub fn with_options(options: ReplayOptions) -> Replayer {
        Replayer {
            options,
            rules: StandardRules,
        }
    }

    #[inline]
    pub fn options(&self) -> &ReplayOptions {
        &self.options
    }

    fn initial(&self, tags: &Tags) -> Result<Position, Error> {
        if let Some(pos) = &self.options.initial {
            return Ok(pos.clone());
        }
        match tags.get("FEN") {
            Some(fen) if self.options.honor_fen_tag => Ok(Position::from_fen(fen)?),
            _ => Ok(Position::initial()),
        }
    }

    fn step(&self, pos: &Position, token: &str) -> Result<Ply, Error> {
        let rules: &dyn Rules = &self.rules;
        let mv = San::from_str(token)
            .map_err(|e| Error::from_san(token, e.into()))?
            .to_move(pos, rules)
            .map_err(|e| Error::from_san(token, e))?;
        let position = make::apply(pos, mv).map_err(|e| match e {
            ApplyError::MissingPromotion(_) => Error::MissingPromotion {
                token: token.to_string(),
            },
            ApplyError::Illegal(e) => Error::IllegalMove(e),
        })?;
        let san = San::from_move(mv, pos, rules)?;
        if self.options.verify_notation && san.to_move(pos, rules) != Ok(mv) {
            return Err(Error::NotationMismatch {
                token: token.to_string(),
                encoded: san.to_string(),
            });
        }
        Ok(Ply { mv, san, position })
    }

    /// Replays the game from PGN or bare movetext
    ///
    /// Errors in the initial position or empty movetext are returned as `Err`. Errors in
    /// the moves are reported in [`Replay::end`].
    pub fn replay(&self, src: &str) -> Result<Replay, Error> {
        let pgn = pgn::parse(src)?;
        let initial = self.initial(&pgn.tags)?;
        debug!(
            "replaying {} tokens from {}",
            pgn.tokens.len(),
            initial.as_fen()
        );

        let mut plies: Vec<Ply> = Vec::with_capacity(pgn.tokens.len());
        let mut end = End::Complete;
        for (index, &token) in pgn.tokens.iter().enumerate() {
            let pos = plies.last().map_or(&initial, |p| &p.position);
            match self.step(pos, token) {
                Ok(ply) => {
                    debug!("ply {}: {} -> {}", index, ply.san, ply.position.as_fen());
                    plies.push(ply);
                }
                Err(err) => {
                    if err.is_engine_defect() {
                        error!("replay stopped at token {} ({:?}): {}", index, token, err);
                    } else {
                        warn!("replay stopped at token {} ({:?}): {}", index, token, err);
                    }
                    end = End::Failed {
                        index,
                        token: token.to_string(),
                        error: err,
                    };
                    break;
                }
            }
        }

        let result = pgn.result();
        Ok(Replay {
            game: Game {
                initial,
                plies,
                tags: pgn.tags,
                result,
            },
            end,
        })
    }
}

/// Replays the game with default options
#[inline]
pub fn replay(src: &str) -> Result<Replay, Error> {
    Replayer::new().replay(src)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::FenParseError;
    use crate::moves::san::SanError;

    #[test]
    fn test_fools_mate() {
        let replay = replay("1. f3 e5 2. g4 Qh4# 0-1").unwrap();
        assert!(replay.is_complete());
        let game = &replay.game;
        assert_eq!(game.sans(), vec!["f3", "e5", "g4", "Qh4#"]);
        assert_eq!(
            game.fens().last().unwrap(),
            "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3"
        );
        assert_eq!(game.status(), Status::Checkmate(Color::Black));
        assert_eq!(game.result(), Some(GameResult::BlackWins));
        assert_eq!(game.movetext(NumberPolicy::FromPosition), "1. f3 e5 2. g4 Qh4#");
        assert_eq!(game.movetext(NumberPolicy::Omit), "f3 e5 g4 Qh4#");
        assert_eq!(
            game.movetext(NumberPolicy::Custom(10)),
            "10. f3 e5 11. g4 Qh4#"
        );
    }

    #[test]
    fn test_failed() {
        let replay = replay("1. e4 e5 2. Nf3 Nc6 3. Nf3").unwrap();
        assert_eq!(replay.game.plies().len(), 4);
        assert_eq!(replay.game.fens().len(), 5);
        assert_eq!(
            replay.end,
            End::Failed {
                index: 4,
                token: "Nf3".to_string(),
                error: Error::AmbiguousOrUnknownMove {
                    token: "Nf3".to_string(),
                    source: SanError::NotFound,
                },
            }
        );
        let record = replay.record();
        assert_eq!(record.fens.len(), record.moves.len() + 1);
        assert!(replay.into_result().is_err());
    }

    #[test]
    fn test_syntax_error() {
        let replay = replay("e4 e5 Xz9").unwrap();
        match replay.end {
            End::Failed {
                index: 2,
                error:
                    Error::AmbiguousOrUnknownMove {
                        source: SanError::Syntax(_),
                        ..
                    },
                ..
            } => {}
            end => panic!("unexpected end: {:?}", end),
        }
    }

    #[test]
    fn test_missing_promotion() {
        let options = ReplayOptions {
            initial: Some(Position::from_fen("8/1P5k/8/8/8/8/8/K7 w - - 0 1").unwrap()),
            ..ReplayOptions::default()
        };
        let replayer = Replayer::with_options(options);
        let replay = replayer.replay("b8").unwrap();
        assert_eq!(
            replay.end,
            End::Failed {
                index: 0,
                token: "b8".to_string(),
                error: Error::MissingPromotion {
                    token: "b8".to_string()
                },
            }
        );
        let game = replayer.replay("b8=Q").unwrap().into_result().unwrap();
        assert_eq!(game.sans(), vec!["b8=Q"]);
    }

    #[test]
    fn test_fen_tag() {
        let src = "[FEN \"4k3/8/8/8/8/8/8/R3K3 b Q - 0 30\"]\n30... Kd7 31. O-O-O+";
        let game = replay(src).unwrap().into_result().unwrap();
        assert_eq!(game.sans(), vec!["Kd7", "O-O-O+"]);
        assert_eq!(game.initial().fullmove_number(), 30);
        assert_eq!(
            game.movetext(NumberPolicy::FromPosition),
            "30... Kd7 31. O-O-O+"
        );
        assert_eq!(game.last().as_fen(), "8/3k4/8/8/8/8/8/2KR4 b - - 2 31");

        let replayer = Replayer::with_options(ReplayOptions {
            honor_fen_tag: false,
            ..ReplayOptions::default()
        });
        let replay = replayer.replay(src).unwrap();
        assert!(matches!(replay.end, End::Failed { index: 0, .. }));

        assert!(matches!(
            super::replay("[FEN \"8/8/8/8/8/8/8/8 w - - 0 1\"] e4"),
            Err(Error::MalformedPosition(FenParseError::Invalid(_)))
        ));
    }

    #[test]
    fn test_empty() {
        assert_eq!(super::replay("1-0"), Err(Error::EmptyMovetext));
    }
}
