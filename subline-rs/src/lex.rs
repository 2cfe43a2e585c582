//! Template lexer.
//!
//! Converts raw template text into a flat token sequence.  Tokens never copy
//! text: each one carries a reference to the source buffer plus a byte span,
//! so the parser and evaluator slice the original text and error reporting
//! can re-derive the offending line.
//!
//! `if` and `else` are the only keywords, recognised by exact span match
//! after identifier scanning — `ifdef` stays an ordinary identifier.

use std::fmt;

use crate::diag::{Diagnostic, Error, Span};

// ── Token ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Number,
    Str,
    Color,
    Env,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Equals,
    If,
    Else,
    /// End-of-input sentinel with an empty span; terminates the parse loop.
    Eof,
}

impl TokenKind {
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Ident => "ident",
            TokenKind::Number => "number",
            TokenKind::Str => "string",
            TokenKind::Color => "color",
            TokenKind::Env => "env",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Equals => "'='",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::Eof => "end of input",
        }
    }
}

/// A token: a kind plus a view into the source buffer.
#[derive(Debug, Clone, Copy)]
pub struct Token<'a> {
    pub source: &'a str,
    pub kind: TokenKind,
    pub span: Span,
}

impl<'a> Token<'a> {
    /// The token's text as it appears in the source.
    pub fn text(&self) -> &'a str {
        &self.source[self.span.start..self.span.end]
    }

    /// A diagnostic whose caret points at this token.
    pub fn diagnostic(&self, message: impl Into<String>) -> Diagnostic {
        Diagnostic::new(self.source, self.span.start, message)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind.describe(), self.text())
    }
}

// ── Character classes ─────────────────────────────────────────────────────

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

fn is_hex(b: u8) -> bool {
    b.is_ascii_hexdigit()
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

// ── Lexer ─────────────────────────────────────────────────────────────────

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Lexer {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek();
        if b.is_some() {
            self.pos += 1;
        }
        b
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token<'a> {
        Token {
            source: self.src,
            kind,
            span: Span::new(start, self.pos),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace) {
            self.pos += 1;
        }
    }

    fn lex_error(&self, offset: usize, message: impl Into<String>) -> Error {
        Error::Lex(Diagnostic::new(self.src, offset, message))
    }

    fn scan_ident(&mut self) -> Token<'a> {
        let start = self.pos;
        self.pos += 1;
        while self.peek().is_some_and(is_ident) {
            self.pos += 1;
        }
        let kind = match &self.src[start..self.pos] {
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            _ => TokenKind::Ident,
        };
        self.token(kind, start)
    }

    fn scan_number(&mut self) -> Token<'a> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        let mut dot = false;
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' => self.pos += 1,
                b'.' if !dot => {
                    dot = true;
                    self.pos += 1;
                }
                _ => break,
            }
        }
        self.token(TokenKind::Number, start)
    }

    fn scan_string(&mut self) -> Result<Token<'a>, Error> {
        let start = self.pos;
        self.pos += 1; // opening quote
        loop {
            match self.advance() {
                None => return Err(self.lex_error(start, "Unterminated string")),
                Some(b'\\') => {
                    // Skip the escaped byte so \" does not end the literal.
                    // Decoding happens at evaluation time.
                    self.advance();
                }
                Some(b'"') => break,
                Some(_) => {}
            }
        }
        Ok(self.token(TokenKind::Str, start))
    }

    fn scan_color(&mut self) -> Result<Token<'a>, Error> {
        let start = self.pos;
        self.pos += 1; // '#'
        while self.peek().is_some_and(is_hex) {
            self.pos += 1;
        }
        let len = self.pos - start;
        if len != 4 && len != 7 {
            let text = &self.src[start..self.pos];
            return Err(self.lex_error(start, format!("{text} is not a valid hex color")));
        }
        Ok(self.token(TokenKind::Color, start))
    }

    fn scan_env(&mut self) -> Token<'a> {
        let start = self.pos;
        self.pos += 1; // '$'
        while self.peek().is_some_and(|b| !is_whitespace(b)) {
            self.pos += 1;
        }
        self.token(TokenKind::Env, start)
    }

    fn scan_symbol(&mut self) -> Result<Token<'a>, Error> {
        let kind = match self.peek() {
            Some(b'(') => TokenKind::LParen,
            Some(b')') => TokenKind::RParen,
            Some(b'{') => TokenKind::LBrace,
            Some(b'}') => TokenKind::RBrace,
            Some(b'[') => TokenKind::LBracket,
            Some(b']') => TokenKind::RBracket,
            Some(b',') => TokenKind::Comma,
            Some(b'=') => TokenKind::Equals,
            _ => {
                let ch = self.src[self.pos..].chars().next().unwrap_or('\0');
                return Err(self.lex_error(self.pos, format!("Unexpected character: {ch}")));
            }
        };
        let start = self.pos;
        self.pos += 1;
        Ok(self.token(kind, start))
    }

    fn tokenize(mut self) -> Result<Vec<Token<'a>>, Error> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let tok = match self.peek() {
                None => {
                    tokens.push(Token {
                        source: self.src,
                        kind: TokenKind::Eof,
                        span: Span::empty(self.src.len()),
                    });
                    break;
                }
                Some(b) if is_ident_start(b) => self.scan_ident(),
                Some(b'-' | b'0'..=b'9') => self.scan_number(),
                Some(b'"') => self.scan_string()?,
                Some(b'#') => self.scan_color()?,
                Some(b'$') => self.scan_env(),
                Some(_) => self.scan_symbol()?,
            };
            tokens.push(tok);
        }
        Ok(tokens)
    }
}

/// Tokenize a template.  The returned sequence always ends with an
/// [`TokenKind::Eof`] sentinel.
pub fn tokenize(src: &str) -> Result<Vec<Token<'_>>, Error> {
    Lexer::new(src).tokenize()
}

// ── Tests ─────────────────────────────────────────────────────────────────
