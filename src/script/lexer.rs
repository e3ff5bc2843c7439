use std::f64::consts::PI;

use crate::script::error::ExprError;

/// Longest expression source accepted, in bytes.
pub(crate) const MAX_SOURCE_LEN: usize = 2048;

/// Unit suffix that turns a literal in degrees into radians (`45deg`).
const DEGREE_SUFFIX: &str = "deg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub(crate) start: usize,
    pub(crate) end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    Number(f64),
    True,
    False,

    LParen,
    RParen,
    Comma,
    Dot,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    Bang,

    EqEq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    AndAnd,
    OrOr,

    Question,
    Colon,

    Eof,
}

/// Split an operand expression into tokens, ending with [`TokenKind::Eof`].
pub(crate) fn lex(input: &str) -> Result<Vec<Token>, ExprError> {
    if input.len() > MAX_SOURCE_LEN {
        return Err(ExprError::new(
            MAX_SOURCE_LEN,
            format!("expression longer than {MAX_SOURCE_LEN} bytes"),
        ));
    }
    let mut cursor = Cursor { src: input, pos: 0 };
    let mut out = Vec::new();
    while let Some(token) = cursor.next_token()? {
        out.push(token);
    }
    out.push(Token {
        kind: TokenKind::Eof,
        span: Span {
            start: input.len(),
            end: input.len(),
        },
    });
    Ok(out)
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

impl Cursor<'_> {
    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + ahead).copied()
    }

    fn eat_while(&mut self, pred: impl Fn(u8) -> bool) -> usize {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            span: Span {
                start,
                end: self.pos,
            },
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, ExprError> {
        self.eat_while(|b| b.is_ascii_whitespace());
        let start = self.pos;
        let Some(b) = self.peek() else {
            return Ok(None);
        };
        if !b.is_ascii() {
            return Err(ExprError::new(start, "non-ASCII character"));
        }

        let starts_number =
            b.is_ascii_digit() || (b == b'.' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit()));
        if starts_number {
            return self.number(start).map(Some);
        }
        if b.is_ascii_alphabetic() || b == b'_' {
            self.eat_while(is_ident_byte);
            let kind = match &self.src[start..self.pos] {
                "true" => TokenKind::True,
                "false" => TokenKind::False,
                s => TokenKind::Ident(s.to_owned()),
            };
            return Ok(Some(self.token(kind, start)));
        }
        self.operator(b, start).map(Some)
    }

    // [0-9]* (.[0-9]+)? ([eE][+-]?[0-9]+)? (deg)?
    fn number(&mut self, start: usize) -> Result<Token, ExprError> {
        self.eat_while(|b| b.is_ascii_digit());
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) {
            self.pos += 1;
            self.eat_while(|b| b.is_ascii_digit());
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let e_pos = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.eat_while(|b| b.is_ascii_digit()) == 0 {
                return Err(ExprError::new(
                    e_pos,
                    "invalid number exponent (expected digits)",
                ));
            }
        }
        let mut value: f64 = self.src[start..self.pos]
            .parse()
            .map_err(|_| ExprError::new(start, "invalid number"))?;

        let suffix_at = self.pos;
        if self.eat_while(is_ident_byte) > 0 {
            if &self.src[suffix_at..self.pos] != DEGREE_SUFFIX {
                return Err(ExprError::new(
                    suffix_at,
                    format!("unknown number suffix '{}'", &self.src[suffix_at..self.pos]),
                ));
            }
            value *= PI / 180.0;
        }
        Ok(self.token(TokenKind::Number(value), start))
    }

    fn operator(&mut self, b: u8, start: usize) -> Result<Token, ExprError> {
        let pair = self.peek_at(1).and_then(|next| match (b, next) {
            (b'&', b'&') => Some(TokenKind::AndAnd),
            (b'|', b'|') => Some(TokenKind::OrOr),
            (b'=', b'=') => Some(TokenKind::EqEq),
            (b'!', b'=') => Some(TokenKind::Ne),
            (b'<', b'=') => Some(TokenKind::Le),
            (b'>', b'=') => Some(TokenKind::Ge),
            _ => None,
        });
        if let Some(kind) = pair {
            self.pos += 2;
            return Ok(self.token(kind, start));
        }

        let kind = match b {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b',' => TokenKind::Comma,
            b'.' => TokenKind::Dot,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'%' => TokenKind::Percent,
            b'!' => TokenKind::Bang,
            b'<' => TokenKind::Lt,
            b'>' => TokenKind::Gt,
            b'?' => TokenKind::Question,
            b':' => TokenKind::Colon,
            b'&' | b'|' | b'=' => {
                return Err(ExprError::new(
                    start,
                    format!("'{}' must be doubled", b as char),
                ));
            }
            _ => {
                return Err(ExprError::new(
                    start,
                    format!("unexpected character '{}'", b as char),
                ));
            }
        };
        self.pos += 1;
        Ok(self.token(kind, start))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/lexer.rs"]
mod tests;
