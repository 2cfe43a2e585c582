//! Recursive-descent parser.
//!
//! Grammar:
//!
//! ```text
//! program   := statement* EOF
//! statement := block | if | expr
//! expr      := IDENT | NUMBER | STRING | COLOR | ENV | call
//! call      := IDENT '(' [ param (',' param)* [','] ] ')'
//! param     := IDENT '=' expr | expr
//! if        := 'if' expr statement [ 'else' statement ]
//! block     := [ '[' [ param (',' param)* [','] ] ']' ] '{' statement* '}'
//! ```
//!
//! An ident directly followed by `(` is a call, otherwise a bare value.
//! Call parameter lists require positional parameters before named ones;
//! block parameter lists deliberately do not.  There is no error recovery:
//! the first structural mismatch aborts the parse with a caret diagnostic.

use crate::ast::{Ast, Node, NodeId, ValueKind};
use crate::diag::Error;
use crate::lex::{Token, TokenKind};

/// Parse a token sequence (as produced by [`crate::lex::tokenize`]) into an
/// [`Ast`].
pub fn parse(tokens: Vec<Token<'_>>) -> Result<Ast<'_>, Error> {
    let eof = *tokens.last().expect("token stream ends with Eof");
    let mut parser = Parser {
        tokens,
        pos: 0,
        ast: Ast::new(eof),
    };
    while parser.at(0).kind != TokenKind::Eof {
        let stmt = parser.parse_statement()?;
        parser.ast.statements.push(stmt);
    }
    Ok(parser.ast)
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    ast: Ast<'a>,
}

impl<'a> Parser<'a> {
    /// Token at `offset` from the cursor; reads past the end clamp to Eof.
    fn at(&self, offset: usize) -> Token<'a> {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        self.tokens[idx]
    }

    fn bump(&mut self) -> Token<'a> {
        let tok = self.at(0);
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token<'a>, Error> {
        let tok = self.at(0);
        if tok.kind != kind {
            return Err(self.unexpected(tok, kind.describe()));
        }
        Ok(self.bump())
    }

    fn unexpected(&self, tok: Token<'a>, wanted: &str) -> Error {
        let got = match tok.kind {
            TokenKind::Eof => "end of input".to_owned(),
            _ => tok.text().to_owned(),
        };
        Error::Syntax(tok.diagnostic(format!("Expected {wanted}, got {got}")))
    }

    // ── Grammar ───────────────────────────────────────────────────────────

    fn parse_statement(&mut self) -> Result<NodeId, Error> {
        match self.at(0).kind {
            TokenKind::LBracket | TokenKind::LBrace => self.parse_block(),
            TokenKind::If => self.parse_if(),
            _ => self.parse_expr(),
        }
    }

    fn parse_expr(&mut self) -> Result<NodeId, Error> {
        let tok = self.at(0);
        let kind = match tok.kind {
            TokenKind::Str => ValueKind::Str,
            TokenKind::Color => ValueKind::Color,
            TokenKind::Env => ValueKind::Env,
            TokenKind::Number => ValueKind::Number,
            TokenKind::Ident => {
                if self.at(1).kind == TokenKind::LParen {
                    return self.parse_call();
                }
                ValueKind::Ident
            }
            _ => return Err(self.unexpected(tok, "an expression")),
        };
        self.bump();
        Ok(self.ast.alloc(Node::Value { kind, token: tok }))
    }

    fn parse_param(&mut self) -> Result<NodeId, Error> {
        if self.at(0).kind == TokenKind::Ident && self.at(1).kind == TokenKind::Equals {
            let name = self.bump();
            self.bump(); // '='
            let value = self.parse_expr()?;
            return Ok(self.ast.alloc(Node::ParamNamed { name, value }));
        }
        self.parse_expr()
    }

    fn parse_call(&mut self) -> Result<NodeId, Error> {
        let name = self.expect(TokenKind::Ident)?;
        self.expect(TokenKind::LParen)?;

        let mut values = Vec::new();
        let mut first = true;
        let mut in_named = false;
        while self.at(0).kind != TokenKind::RParen {
            if !first {
                self.expect(TokenKind::Comma)?;
                // Trailing comma before ')'.
                if self.at(0).kind == TokenKind::RParen {
                    break;
                }
            }
            first = false;

            let param_tok = self.at(0);
            let param = self.parse_param()?;
            let named = matches!(self.ast.node(param), Node::ParamNamed { .. });
            if in_named && !named {
                return Err(Error::Syntax(param_tok.diagnostic(
                    "Positional parameters must come before named parameters",
                )));
            }
            in_named |= named;
            values.push(param);
        }
        self.bump(); // ')'

        let params = self.ast.alloc(Node::ParamList { values });
        Ok(self.ast.alloc(Node::Call { name, params }))
    }

    fn parse_if(&mut self) -> Result<NodeId, Error> {
        self.expect(TokenKind::If)?;
        let condition = self.parse_expr()?;
        let body = self.parse_statement()?;

        // Dangling else binds to the nearest if.
        let else_body = if self.at(0).kind == TokenKind::Else {
            self.bump();
            Some(self.parse_statement()?)
        } else {
            None
        };

        Ok(self.ast.alloc(Node::If {
            condition,
            body,
            else_body,
        }))
    }

    fn parse_block_params(&mut self) -> Result<NodeId, Error> {
        self.expect(TokenKind::LBracket)?;
        let mut values = Vec::new();
        let mut first = true;
        // No positional-before-named ordering here; only call lists check.
        while self.at(0).kind != TokenKind::RBracket {
            if !first {
                self.expect(TokenKind::Comma)?;
                if self.at(0).kind == TokenKind::RBracket {
                    break;
                }
            }
            first = false;
            values.push(self.parse_param()?);
        }
        self.bump(); // ']'
        Ok(self.ast.alloc(Node::ParamList { values }))
    }

    fn parse_block(&mut self) -> Result<NodeId, Error> {
        let params = if self.at(0).kind == TokenKind::LBracket {
            Some(self.parse_block_params()?)
        } else {
            None
        };

        let opener = self.expect(TokenKind::LBrace)?;
        let mut statements = Vec::new();
        while self.at(0).kind != TokenKind::RBrace {
            if self.at(0).kind == TokenKind::Eof {
                return Err(Error::Syntax(opener.diagnostic("Unclosed block")));
            }
            statements.push(self.parse_statement()?);
        }
        self.bump(); // '}'

        Ok(self.ast.alloc(Node::Block { params, statements }))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
