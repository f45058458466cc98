//! Recursive-descent parser.
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := factor (('*' | '/') factor)*
//! factor  := unary ('^' factor)?
//! unary   := ('-')? postfix
//! postfix := primary ('%')*
//! primary := number | constant | variable | func '(' expr ')' | '(' expr ')'
//! ```
//!
//! Juxtaposition is never read as multiplication here; see
//! [`implicit_multiplication`] for the pass callers run beforehand.
//!
//! Nesting (brackets, calls, chained `^`) is capped at [`MAX_DEPTH`] and the
//! tree at [`MAX_OPERATORS`] operator nodes, so evaluation never runs out of
//! stack.

use thiserror::Error;

use super::ast::{BinaryOp, Constant, Expr, Function};
use super::lexer::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unexpected token at position {pos}")]
    UnexpectedToken { pos: usize },
    #[error("unbalanced parentheses")]
    UnbalancedParentheses,
    #[error("empty expression")]
    EmptyExpression,
    #[error("an equation needs exactly one '='")]
    InvalidEquationForm,
    #[error("expression is nested too deeply at position {pos}")]
    TooDeep { pos: usize },
    #[error("expression has more than {MAX_OPERATORS} operators")]
    TooLong,
}

pub const MAX_DEPTH: usize = 256;
pub const MAX_OPERATORS: usize = 1024;

pub struct Parser<'a> {
    tokens: &'a [Token],
    current: usize,
    depth: usize,
    operators: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Parser {
            tokens,
            current: 0,
            depth: 0,
            operators: 0,
        }
    }

    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        if self.tokens.is_empty() {
            return Err(ParseError::EmptyExpression);
        }
        let expr = self.expr()?;
        match self.peek() {
            None => Ok(expr),
            Some(token) if token.kind == TokenKind::RParen => Err(ParseError::UnbalancedParentheses),
            Some(token) => Err(ParseError::UnexpectedToken { pos: token.pos }),
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.current)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.current);
        if token.is_some() {
            self.current += 1;
        }
        token
    }

    /// Position reported when the input ends early.
    fn end_pos(&self) -> usize {
        self.tokens.last().map(|t| t.pos + 1).unwrap_or(0)
    }

    fn unexpected(&self) -> ParseError {
        ParseError::UnexpectedToken {
            pos: self.peek().map(|t| t.pos).unwrap_or_else(|| self.end_pos()),
        }
    }

    /// Runs `inner` one nesting level down.
    fn nested(
        &mut self,
        inner: impl FnOnce(&mut Self) -> Result<Expr, ParseError>,
    ) -> Result<Expr, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::TooDeep {
                pos: self.peek().map(|t| t.pos).unwrap_or_else(|| self.end_pos()),
            });
        }
        self.depth += 1;
        let result = inner(self);
        self.depth -= 1;
        result
    }

    fn count_operator(&mut self) -> Result<(), ParseError> {
        self.operators += 1;
        if self.operators > MAX_OPERATORS {
            return Err(ParseError::TooLong);
        }
        Ok(())
    }

    fn next_op_in(&self, ops: &[char]) -> Option<BinaryOp> {
        match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Op(c)) if ops.contains(c) => BinaryOp::from_char(*c),
            _ => None,
        }
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.term()?;
        while let Some(op) = self.next_op_in(&['+', '-']) {
            self.current += 1;
            self.count_operator()?;
            let right = self.term()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.factor()?;
        while let Some(op) = self.next_op_in(&['*', '/']) {
            self.current += 1;
            self.count_operator()?;
            let right = self.factor()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn factor(&mut self) -> Result<Expr, ParseError> {
        let base = self.unary()?;
        if self.next_op_in(&['^']).is_some() {
            self.current += 1;
            self.count_operator()?;
            let exponent = self.nested(Self::factor)?;
            return Ok(Expr::binary(BinaryOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.peek().is_some_and(|t| t.is_op('-')) {
            self.current += 1;
            self.count_operator()?;
            let operand = self.postfix()?;
            return Ok(Expr::neg(operand));
        }
        self.postfix()
    }

    /// `50%` is `50 / 100`.
    fn postfix(&mut self) -> Result<Expr, ParseError> {
        let mut operand = self.primary()?;
        while self.peek().is_some_and(|t| t.is_op('%')) {
            self.current += 1;
            self.count_operator()?;
            operand = Expr::binary(BinaryOp::Div, operand, Expr::Number(100.0));
        }
        Ok(operand)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = match self.peek() {
            Some(token) => token,
            None => return Err(self.unexpected()),
        };

        match &token.kind {
            TokenKind::Number(n) => {
                self.current += 1;
                Ok(Expr::Number(*n))
            }
            TokenKind::LParen => {
                self.current += 1;
                let inner = self.nested(Self::expr)?;
                self.expect_closing()?;
                Ok(inner)
            }
            TokenKind::Ident(name) => {
                self.current += 1;
                if let Some(function) = Function::from_name(name) {
                    match self.advance() {
                        Some(t) if t.kind == TokenKind::LParen => {}
                        Some(t) => return Err(ParseError::UnexpectedToken { pos: t.pos }),
                        None => return Err(ParseError::UnexpectedToken { pos: self.end_pos() }),
                    }
                    self.count_operator()?;
                    let argument = self.nested(Self::expr)?;
                    self.expect_closing()?;
                    return Ok(Expr::call(function, argument));
                }
                if let Some(constant) = Constant::from_name(name) {
                    return Ok(Expr::Constant(constant));
                }
                let mut letters = name.chars();
                match (letters.next(), letters.next()) {
                    (Some(v), None) => Ok(Expr::Variable(v)),
                    _ => Err(ParseError::UnexpectedToken { pos: token.pos }),
                }
            }
            _ => Err(ParseError::UnexpectedToken { pos: token.pos }),
        }
    }

    fn expect_closing(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            Some(t) if t.kind == TokenKind::RParen => {
                self.current += 1;
                Ok(())
            }
            Some(t) => Err(ParseError::UnexpectedToken { pos: t.pos }),
            None => Err(ParseError::UnbalancedParentheses),
        }
    }
}

pub fn parse(tokens: &[Token]) -> Result<Expr, ParseError> {
    Parser::new(tokens).parse()
}

/// Parses `lhs = rhs`, each side independently.
pub fn parse_equation(tokens: &[Token]) -> Result<(Expr, Expr), ParseError> {
    let mut separators = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| t.kind == TokenKind::Equals)
        .map(|(i, _)| i);

    let split = match (separators.next(), separators.next()) {
        (Some(i), None) => i,
        _ => return Err(ParseError::InvalidEquationForm),
    };

    let lhs = parse(&tokens[..split])?;
    let rhs = parse(&tokens[split + 1..])?;
    Ok((lhs, rhs))
}

fn ends_operand(token: &Token) -> bool {
    match &token.kind {
        TokenKind::Number(_) | TokenKind::RParen | TokenKind::Op('%') => true,
        TokenKind::Ident(name) => Function::from_name(name).is_none(),
        _ => false,
    }
}

fn starts_operand(prev: &Token, next: &Token) -> bool {
    match &next.kind {
        TokenKind::Ident(_) | TokenKind::LParen => true,
        TokenKind::Number(_) => prev.kind == TokenKind::RParen,
        _ => false,
    }
}

/// Makes juxtaposed operands explicit: `2x` becomes `2*x`, `(a)(b)` becomes
/// `(a)*(b)`, `2pi` becomes `2*pi` and `10%x` becomes `10%*x`. Two numbers in a row are left alone so
/// the parser still rejects `2 3`.
pub fn implicit_multiplication(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let Some(prev) = out.last() {
            if ends_operand(prev) && starts_operand(prev, &token) {
                out.push(Token::new(TokenKind::Op('*'), token.pos));
            }
        }
        out.push(token);
    }
    out
}
