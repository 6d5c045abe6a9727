//! Lexer for arithmetic cell formulas.
//!
//! Recognises numbers (decimal, with an optional scientific exponent),
//! `A1`-style cell references, the four arithmetic operators, and
//! parentheses. Whitespace between tokens is skipped and never produces a
//! token.

use std::error::Error;
use std::fmt::{self, Display};

/// A custom error type for the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerError {
    pub message: String,
    pub pos: usize,
}

impl fmt::Display for TokenizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenizerError at {}: {}", self.pos, self.message)
    }
}

impl Error for TokenizerError {}

/// The kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Number,
    CellRef,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A token in a formula, with the byte span it was lexed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub value: String,
    pub token_type: TokenType,
    pub start: usize,
    pub end: usize,
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} {:?}>", self.token_type, self.value)
    }
}

impl Token {
    fn new(value: String, token_type: TokenType, start: usize, end: usize) -> Self {
        Token {
            value,
            token_type,
            start,
            end,
        }
    }
}

/// Tokenizes formula source text into a flat token stream.
pub struct Tokenizer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Tokenizer {
            source,
            bytes: source.as_bytes(),
            pos: 0,
        }
    }

    pub fn tokenize(source: &'a str) -> Result<Vec<Token>, TokenizerError> {
        Tokenizer::new(source).run()
    }

    fn run(mut self) -> Result<Vec<Token>, TokenizerError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            if self.pos >= self.bytes.len() {
                break;
            }
            tokens.push(self.next_token()?);
        }
        Ok(tokens)
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn next_token(&mut self) -> Result<Token, TokenizerError> {
        let start = self.pos;
        let c = self.bytes[start];
        match c {
            b'+' => self.single(TokenType::Plus),
            b'-' => self.single(TokenType::Minus),
            b'*' => self.single(TokenType::Star),
            b'/' => self.single(TokenType::Slash),
            b'(' => self.single(TokenType::LParen),
            b')' => self.single(TokenType::RParen),
            b'0'..=b'9' | b'.' => self.number(),
            b'A'..=b'Z' => self.cell_ref(),
            _ => Err(TokenizerError {
                message: format!("unexpected character '{}'", c as char),
                pos: start,
            }),
        }
    }

    fn single(&mut self, token_type: TokenType) -> Result<Token, TokenizerError> {
        let start = self.pos;
        self.pos += 1;
        Ok(Token::new(
            self.source[start..self.pos].to_string(),
            token_type,
            start,
            self.pos,
        ))
    }

    /// `decimal literal (scientific accepted)`: digits, an optional `.` with
    /// more digits, an optional `e`/`E` exponent with an optional sign.
    fn number(&mut self) -> Result<Token, TokenizerError> {
        let start = self.pos;
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        if self.pos < self.bytes.len() && self.bytes[self.pos] == b'.' {
            self.pos += 1;
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
        }
        if self.pos < self.bytes.len() && matches!(self.bytes[self.pos], b'e' | b'E') {
            let mark = self.pos;
            self.pos += 1;
            if self.pos < self.bytes.len() && matches!(self.bytes[self.pos], b'+' | b'-') {
                self.pos += 1;
            }
            if self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
                while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
                    self.pos += 1;
                }
            } else {
                // not actually an exponent (e.g. a bare trailing 'e'); back out.
                self.pos = mark;
            }
        }
        let text = &self.source[start..self.pos];
        if text.is_empty() || text == "." {
            return Err(TokenizerError {
                message: "expected a number".to_string(),
                pos: start,
            });
        }
        if text.parse::<f64>().is_err() {
            return Err(TokenizerError {
                message: format!("invalid numeric literal '{text}'"),
                pos: start,
            });
        }
        Ok(Token::new(text.to_string(), TokenType::Number, start, self.pos))
    }

    /// `cell_ref := [A-Z]+[0-9]+`
    fn cell_ref(&mut self) -> Result<Token, TokenizerError> {
        let start = self.pos;
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_uppercase() {
            self.pos += 1;
        }
        let digits_start = self.pos;
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        if self.pos == digits_start {
            return Err(TokenizerError {
                message: "cell reference is missing a row number".to_string(),
                pos: start,
            });
        }
        Ok(Token::new(
            self.source[start..self.pos].to_string(),
            TokenType::CellRef,
            start,
            self.pos,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenType> {
        Tokenizer::tokenize(src)
            .unwrap()
            .into_iter()
            .map(|t| t.token_type)
            .collect()
    }

    #[test]
    fn lexes_arithmetic() {
        use TokenType::*;
        assert_eq!(kinds("1+2*3"), vec![Number, Plus, Number, Star, Number]);
    }

    #[test]
    fn lexes_cell_ref() {
        assert_eq!(kinds("A1"), vec![TokenType::CellRef]);
        assert_eq!(Tokenizer::tokenize("A1").unwrap()[0].value, "A1");
    }

    #[test]
    fn skips_whitespace() {
        use TokenType::*;
        assert_eq!(kinds(" 1 + A1 "), vec![Number, Plus, CellRef]);
    }

    #[test]
    fn lexes_scientific_number() {
        let toks = Tokenizer::tokenize("1.5e3").unwrap();
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].value, "1.5e3");
    }

    #[test]
    fn rejects_unknown_character() {
        assert!(Tokenizer::tokenize("1+&2").is_err());
    }
}
