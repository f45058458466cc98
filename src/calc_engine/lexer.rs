//! Turns raw input into a flat token stream.
//!
//! Signs are never folded into number literals; the parser decides whether a
//! `-` is unary or binary.

use thiserror::Error;

use super::ast::{Constant, Function};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Ident(String),
    Op(char),
    LParen,
    RParen,
    Comma,
    Equals,
}

/// A token together with the character column it started at.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: usize,
}

impl Token {
    pub fn new(kind: TokenKind, pos: usize) -> Self {
        Token { kind, pos }
    }

    pub fn is_op(&self, op: char) -> bool {
        self.kind == TokenKind::Op(op)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unrecognized character '{ch}' at position {pos}")]
    UnrecognizedCharacter { ch: char, pos: usize },
    #[error("unknown identifier '{name}' at position {pos}")]
    UnknownIdentifier { name: String, pos: usize },
    #[error("invalid number '{literal}' at position {pos}")]
    InvalidNumber { literal: String, pos: usize },
}

/// Identifiers the tokenizer accepts as a single multi-letter word.
fn is_known_word(word: &str) -> bool {
    Function::from_name(word).is_some() || Constant::from_name(word).is_some()
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            _ if c.is_whitespace() => {
                i += 1;
            }
            '(' => {
                tokens.push(Token::new(TokenKind::LParen, i));
                i += 1;
            }
            ')' => {
                tokens.push(Token::new(TokenKind::RParen, i));
                i += 1;
            }
            ',' => {
                tokens.push(Token::new(TokenKind::Comma, i));
                i += 1;
            }
            '=' => {
                tokens.push(Token::new(TokenKind::Equals, i));
                i += 1;
            }
            '+' | '-' | '*' | '/' | '^' | '%' => {
                tokens.push(Token::new(TokenKind::Op(c), i));
                i += 1;
            }
            '×' => {
                tokens.push(Token::new(TokenKind::Op('*'), i));
                i += 1;
            }
            '÷' => {
                tokens.push(Token::new(TokenKind::Op('/'), i));
                i += 1;
            }
            '−' => {
                tokens.push(Token::new(TokenKind::Op('-'), i));
                i += 1;
            }
            '²' => {
                tokens.push(Token::new(TokenKind::Op('^'), i));
                tokens.push(Token::new(TokenKind::Number(2.0), i));
                i += 1;
            }
            'π' => {
                tokens.push(Token::new(TokenKind::Ident("pi".to_string()), i));
                i += 1;
            }
            '0'..='9' | '.' => {
                let (token, next) = read_number(&chars, i)?;
                tokens.push(token);
                i = next;
            }
            _ if c.is_ascii_alphabetic() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphabetic() {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                if word.len() == 1 || is_known_word(&word) {
                    tokens.push(Token::new(TokenKind::Ident(word), start));
                } else {
                    return Err(LexError::UnknownIdentifier { name: word, pos: start });
                }
            }
            _ => return Err(LexError::UnrecognizedCharacter { ch: c, pos: i }),
        }
    }

    Ok(tokens)
}

fn read_number(chars: &[char], start: usize) -> Result<(Token, usize), LexError> {
    let mut i = start;
    let mut has_dot = false;

    while i < chars.len() {
        match chars[i] {
            '0'..='9' => i += 1,
            '.' if !has_dot => {
                has_dot = true;
                i += 1;
            }
            _ => break,
        }
    }

    // Only take an exponent when digits follow, so `2e` stays `2` and `e`.
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }

    let literal: String = chars[start..i].iter().collect();
    literal
        .parse::<f64>()
        .map(|n| (Token::new(TokenKind::Number(n), start), i))
        .map_err(|_| LexError::InvalidNumber { literal, pos: start })
}
