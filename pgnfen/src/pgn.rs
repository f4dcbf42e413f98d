//! Lexer for PGN games
//!
//! Only the parts needed to replay a game are extracted: tag pairs, move tokens and the result
//! marker. Comments, variations and NAGs are skipped. The lexer is lenient: unterminated
//! comments or variations swallow the rest of the input instead of failing.

use crate::error::Error;

use std::fmt;
use std::str::FromStr;

use log::warn;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ordered list of tag pairs
///
/// Lookup is case-sensitive, as PGN tag names are.
#[derive(Default, Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Tags(Vec<(String, String)>);

impl Tags {
    #[inline]
    pub fn new() -> Tags {
        Tags(Vec::new())
    }

    /// Returns the value of tag `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Sets the value of tag `name`
    ///
    /// If the tag is already present, its value is replaced and it keeps its place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(pair) => pair.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Iterates over tag pairs in the order they were added
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result marker of the game
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GameResult {
    #[cfg_attr(feature = "serde", serde(rename = "1-0"))]
    WhiteWins,
    #[cfg_attr(feature = "serde", serde(rename = "0-1"))]
    BlackWins,
    #[cfg_attr(feature = "serde", serde(rename = "1/2-1/2"))]
    Draw,
    /// Game is unfinished or the result is unknown (a.k.a. `*`)
    #[cfg_attr(feature = "serde", serde(rename = "*"))]
    Unknown,
}

impl GameResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::Unknown => "*",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameResult {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1-0" => Ok(GameResult::WhiteWins),
            "0-1" => Ok(GameResult::BlackWins),
            "1/2-1/2" => Ok(GameResult::Draw),
            "*" => Ok(GameResult::Unknown),
            _ => Err(()),
        }
    }
}

/// Lexed PGN game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pgn<'a> {
    /// Tag pairs
    pub tags: Tags,
    /// Move tokens, in order, with move numbers stripped
    pub tokens: Vec<&'a str>,
    /// Result marker found in the movetext, if any
    pub result: Option<GameResult>,
}

impl<'a> Pgn<'a> {
    /// Returns the result from the movetext, falling back to the `Result` tag
    pub fn result(&self) -> Option<GameResult> {
        self.result
            .or_else(|| self.tags.get("Result").and_then(|r| r.parse().ok()))
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn is_token_end(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'{' | b'}' | b'(' | b')' | b';' | b'[' | b'$')
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn skip_until(&mut self, end: u8) -> bool {
        match self.src.as_bytes()[self.pos..].iter().position(|&b| b == end) {
            Some(off) => {
                self.pos += off + 1;
                true
            }
            None => {
                self.pos = self.src.len();
                false
            }
        }
    }

    fn at_line_start(&self) -> bool {
        self.pos == 0 || self.src.as_bytes()[self.pos - 1] == b'\n'
    }

    fn read_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if pred(b)) {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    /// Reads the tag pair after `[`, returns `None` if it is malformed
    fn read_tag(&mut self) -> Option<(String, String)> {
        self.skip_whitespace();
        let name = self.read_while(|b| !b.is_ascii_whitespace() && b != b'"' && b != b']');
        self.skip_whitespace();
        if name.is_empty() || self.peek() != Some(b'"') {
            self.skip_until(b']');
            return None;
        }
        self.pos += 1;
        let bytes = self.src.as_bytes();
        let start = self.pos;
        while self.pos < bytes.len() && bytes[self.pos] != b'"' {
            if bytes[self.pos] == b'\\' {
                self.pos += 1;
            }
            self.pos += 1;
        }
        if self.pos >= bytes.len() {
            self.pos = bytes.len();
            warn!("unterminated tag value");
            return None;
        }
        let value = unescape(&self.src[start..self.pos]);
        self.pos += 1;
        self.skip_whitespace();
        if self.peek() != Some(b']') {
            self.skip_until(b']');
            return None;
        }
        self.pos += 1;
        Some((name.to_string(), value))
    }

    fn skip_variation(&mut self) {
        let mut depth = 1_usize;
        while let Some(b) = self.peek() {
            self.pos += 1;
            match b {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                b'{' => {
                    self.skip_until(b'}');
                }
                b';' => {
                    self.skip_until(b'\n');
                }
                _ => {}
            }
        }
        warn!("unterminated variation");
    }
}

/// Strips the move number prefix (`14.`, `14...`) from the token
fn strip_move_number(token: &str) -> &str {
    let digits = token.bytes().take_while(u8::is_ascii_digit).count();
    let rest = &token[digits..];
    if digits != 0 && !rest.starts_with('.') {
        return token;
    }
    rest.trim_start_matches('.')
}

/// Lexes a PGN game or bare movetext
///
/// Fails with [`Error::EmptyMovetext`] if no move tokens are found.
pub fn parse(src: &str) -> Result<Pgn<'_>, Error> {
    let mut lexer = Lexer { src, pos: 0 };
    let mut tags = Tags::new();
    let mut tokens = Vec::new();
    let mut result = None;

    loop {
        lexer.skip_whitespace();
        let b = match lexer.peek() {
            Some(b) => b,
            None => break,
        };
        match b {
            b'%' if lexer.at_line_start() => {
                lexer.skip_until(b'\n');
            }
            b'[' => {
                lexer.pos += 1;
                match lexer.read_tag() {
                    Some((name, value)) => tags.insert(name, value),
                    None => warn!("skipping malformed tag pair"),
                }
            }
            b'{' => {
                if !lexer.skip_until(b'}') {
                    warn!("unterminated comment");
                }
            }
            b';' => {
                lexer.skip_until(b'\n');
            }
            b'(' => {
                lexer.pos += 1;
                lexer.skip_variation();
            }
            b')' | b'}' | b']' => lexer.pos += 1,
            b'$' => {
                lexer.pos += 1;
                lexer.read_while(|b| b.is_ascii_digit());
            }
            _ => {
                let token = lexer.read_while(|b| !is_token_end(b));
                if let Ok(res) = GameResult::from_str(token) {
                    result = Some(res);
                    continue;
                }
                let token = strip_move_number(token);
                if !token.is_empty() {
                    tokens.push(token);
                }
            }
        }
    }

    if tokens.is_empty() {
        return Err(Error::EmptyMovetext);
    }
    Ok(Pgn {
        tags,
        tokens,
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare() {
        let pgn = parse("1. e4 e5 2.Nf3 Nc6 3... a6").unwrap();
        assert_eq!(pgn.tokens, vec!["e4", "e5", "Nf3", "Nc6", "a6"]);
        assert!(pgn.tags.is_empty());
        assert_eq!(pgn.result, None);

        let pgn = parse("e4 e5 O-O 0-0 0-0-0").unwrap();
        assert_eq!(pgn.tokens, vec!["e4", "e5", "O-O", "0-0", "0-0-0"]);
    }

    #[test]
    fn test_full() {
        let src = r#"[Event "Casual \"blitz\""]
[Site "C:\\games"]
[Result "0-1"]

% escaped line
1. f3 {bad move} e5 $2 2. g4?? (2. e4 {better} (2. Kf2)) ; comment
Qh4# 0-1
"#;
        let pgn = parse(src).unwrap();
        assert_eq!(pgn.tokens, vec!["f3", "e5", "g4??", "Qh4#"]);
        assert_eq!(pgn.result, Some(GameResult::BlackWins));
        assert_eq!(pgn.result(), Some(GameResult::BlackWins));
        assert_eq!(pgn.tags.len(), 3);
        assert_eq!(pgn.tags.get("Event"), Some("Casual \"blitz\""));
        assert_eq!(pgn.tags.get("Site"), Some("C:\\games"));
        assert_eq!(pgn.tags.get("event"), None);
        assert_eq!(
            pgn.tags.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            vec!["Event", "Site", "Result"]
        );
    }

    #[test]
    fn test_result_tag() {
        let pgn = parse("[Result \"1/2-1/2\"]\n1. e4").unwrap();
        assert_eq!(pgn.result, None);
        assert_eq!(pgn.result(), Some(GameResult::Draw));
        assert_eq!(parse("e4 *").unwrap().result, Some(GameResult::Unknown));
    }

    #[test]
    fn test_malformed() {
        let pgn = parse("[Event] [Site \"x\"] 1. e4 {unterminated e5").unwrap();
        assert_eq!(pgn.tokens, vec!["e4"]);
        assert_eq!(pgn.tags.get("Site"), Some("x"));
        assert_eq!(pgn.tags.get("Event"), None);

        let pgn = parse("1. e4 (1. d4 d5 e5").unwrap();
        assert_eq!(pgn.tokens, vec!["e4"]);
    }

    #[test]
    fn test_empty() {
        assert_eq!(parse(""), Err(Error::EmptyMovetext));
        assert_eq!(parse("   \n"), Err(Error::EmptyMovetext));
        assert_eq!(parse("[Event \"x\"]\n\n1-0"), Err(Error::EmptyMovetext));
        assert_eq!(parse("1. {no moves} 2. *"), Err(Error::EmptyMovetext));
    }

    #[test]
    fn test_tags() {
        let mut tags = Tags::new();
        tags.insert("White", "A");
        tags.insert("Black", "B");
        tags.insert("White", "C");
        assert_eq!(
            tags.iter().collect::<Vec<_>>(),
            vec![("White", "C"), ("Black", "B")]
        );
    }
}
