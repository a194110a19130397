//! Core parser struct and helper methods.

use crate::ast::Expr;
use crate::error::ParserError;
use crate::lexer::{Token, TokenKind};
use crate::span::Span;

pub type ParseResult<T> = Result<T, ParserError>;

/// The recursive-descent parser for Minilang.
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    /// Parse one complete top-level expression. Anything left over before
    /// end-of-input is trailing garbage.
    pub fn parse(&mut self) -> ParseResult<Expr> {
        let expr = self.expression()?;

        if !self.is_at_end() {
            return Err(ParserError::TrailingGarbage(self.current_span()));
        }

        Ok(expr)
    }

    // ===== Token manipulation =====

    pub(crate) fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.tokens[self.current - 1].clone()
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }
}
