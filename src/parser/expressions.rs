//! Recursive-descent grammar:
//!
//! ```text
//! Expr       ::= IfExpr | ExprTerm
//! IfExpr     ::= "if" "(" Expr ")" "then" Expr "else" Expr
//! ExprTerm   ::= Term { ("+"|"-") Term }
//! Term       ::= Factor { ("*"|"/") Factor }
//! Factor     ::= identifier | number | "(" Expr ")"
//! ```

use crate::ast::{BinaryOp, Expr, ExprKind};
use crate::error::ParserError;
use crate::lexer::TokenKind;

use super::core::{ParseResult, Parser};

impl Parser {
    pub(crate) fn expression(&mut self) -> ParseResult<Expr> {
        if self.check(&TokenKind::If) {
            self.if_expression()
        } else {
            self.additive()
        }
    }

    /// IfExpr ::= "if" "(" Expr ")" "then" Expr "else" Expr
    ///
    /// The else branch is mandatory here even though the tree allows its
    /// absence: without it the two paths of the compiled conditional would
    /// leave different stack depths behind.
    fn if_expression(&mut self) -> ParseResult<Expr> {
        let if_span = self.advance().span;

        if !self.match_token(&TokenKind::LeftParen) {
            return Err(ParserError::MissingParenthesis(self.current_span()));
        }
        let condition = self.expression()?;
        if !self.match_token(&TokenKind::RightParen) {
            return Err(ParserError::MissingParenthesis(self.current_span()));
        }

        if !self.match_token(&TokenKind::Then) {
            return Err(ParserError::missing_keyword(
                "then",
                self.peek().kind.to_string(),
                self.current_span(),
            ));
        }
        let then_branch = self.expression()?;

        if !self.match_token(&TokenKind::Else) {
            return Err(ParserError::MissingElse(self.current_span()));
        }
        let else_branch = self.expression()?;

        let span = if_span.merge(&else_branch.span);
        Ok(Expr::new(
            ExprKind::If {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Some(Box::new(else_branch)),
            },
            span,
        ))
    }

    /// ExprTerm ::= Term { ("+"|"-") Term }
    ///
    /// Left-associative: each right operand is folded under a new binary
    /// node whose left child is the subtree built so far.
    fn additive(&mut self) -> ParseResult<Expr> {
        let mut left = self.term()?;

        loop {
            let operator = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Subtract,
                _ => break,
            };
            self.advance();

            let right = self.operand(operator, Self::term)?;
            let span = left.span.merge(&right.span);
            left = Expr::new(
                ExprKind::Binary {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    /// Term ::= Factor { ("*"|"/") Factor }
    fn term(&mut self) -> ParseResult<Expr> {
        let mut left = self.factor()?;

        loop {
            let operator = match self.peek().kind {
                TokenKind::Star => BinaryOp::Multiply,
                TokenKind::Slash => BinaryOp::Divide,
                _ => break,
            };
            self.advance();

            let right = self.operand(operator, Self::factor)?;
            let span = left.span.merge(&right.span);
            left = Expr::new(
                ExprKind::Binary {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    /// Parse the right operand of a binary operator. End-of-input right
    /// after an operator is reported against the operator.
    fn operand(
        &mut self,
        operator: BinaryOp,
        parse: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        if self.is_at_end() {
            return Err(ParserError::missing_operand(
                operator.symbol(),
                self.current_span(),
            ));
        }
        parse(self)
    }

    /// Factor ::= identifier | number | "(" Expr ")"
    fn factor(&mut self) -> ParseResult<Expr> {
        match &self.peek().kind {
            TokenKind::Number(n) => {
                let n = *n;
                let span = self.advance().span;
                Ok(Expr::new(ExprKind::Number(n), span))
            }
            TokenKind::Identifier(name) => {
                let name = name.clone();
                let span = self.advance().span;
                Ok(Expr::new(ExprKind::Variable(name), span))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                if !self.match_token(&TokenKind::RightParen) {
                    return Err(ParserError::MissingParenthesis(self.current_span()));
                }
                Ok(expr)
            }
            _ => Err(ParserError::MissingFactor(self.current_span())),
        }
    }
}
