//! Lexer/Scanner for Minilang source code.

use crate::error::LexerError;
use crate::lexer::token::{Token, TokenKind};
use crate::span::Span;

/// Identifiers longer than this are rejected, not truncated.
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// The lexer transforms source code into a stream of tokens.
pub struct Scanner<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    line: usize,
    column: usize,
    start_pos: usize,
    start_line: usize,
    start_column: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.char_indices().peekable(),
            current_pos: 0,
            line: 1,
            column: 1,
            start_pos: 0,
            start_line: 1,
            start_column: 1,
        }
    }

    /// Scan all tokens from the source. The first error wins: once a token
    /// fails to scan, nothing after it is produced.
    pub fn scan_tokens(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.scan_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        Ok(tokens)
    }

    /// Scan the next token.
    pub fn scan_token(&mut self) -> Result<Token, LexerError> {
        self.skip_whitespace();
        self.mark_start();

        let Some((_, c)) = self.advance() else {
            return Ok(Token::eof(self.current_pos, self.line, self.column));
        };

        match c {
            '+' => Ok(self.make_token(TokenKind::Plus)),
            '-' => Ok(self.make_token(TokenKind::Minus)),
            '*' => Ok(self.make_token(TokenKind::Star)),
            '/' => Ok(self.make_token(TokenKind::Slash)),
            '(' => Ok(self.make_token(TokenKind::LeftParen)),
            ')' => Ok(self.make_token(TokenKind::RightParen)),

            c if c.is_ascii_digit() => self.scan_number(c),

            c if c.is_ascii_alphabetic() || c == '_' => self.scan_identifier(c),

            _ => Err(LexerError::unknown_token(c, self.current_span())),
        }
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r') => {
                    self.advance();
                }
                Some('\n') => {
                    self.advance();
                    self.line += 1;
                    self.column = 1;
                }
                _ => break,
            }
        }
    }

    /// number ::= [0-9]+
    ///
    /// Accumulated as value * 10 + digit with checked arithmetic; a literal
    /// that does not fit in i64 is an error.
    fn scan_number(&mut self, first: char) -> Result<Token, LexerError> {
        let mut value = (first as u8 - b'0') as i64;

        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            let digit = (c as u8 - b'0') as i64;
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit))
                .ok_or_else(|| LexerError::NumericOverflow(self.current_span()))?;
            self.advance();
        }

        Ok(self.make_token(TokenKind::Number(value)))
    }

    /// identifier ::= [A-Za-z_][A-Za-z0-9_]*
    fn scan_identifier(&mut self, first: char) -> Result<Token, LexerError> {
        let mut value = String::from(first);

        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                if value.len() >= MAX_IDENTIFIER_LEN {
                    return Err(LexerError::IdentifierTooLong(self.current_span()));
                }
                value.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let kind = TokenKind::keyword(&value).unwrap_or(TokenKind::Identifier(value));
        Ok(self.make_token(kind))
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        if let Some((pos, c)) = self.chars.next() {
            self.current_pos = pos + c.len_utf8();
            self.column += 1;
            Some((pos, c))
        } else {
            None
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn mark_start(&mut self) {
        self.start_pos = self.current_pos;
        self.start_line = self.line;
        self.start_column = self.column;
    }

    fn current_span(&self) -> Span {
        Span::new(
            self.start_pos,
            self.current_pos,
            self.start_line,
            self.start_column,
        )
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.current_span())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> Vec<TokenKind> {
        Scanner::new(source)
            .scan_tokens()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn scan_err(source: &str) -> LexerError {
        Scanner::new(source).scan_tokens().unwrap_err()
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            scan("+-*/()"),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            scan("42 007"),
            vec![
                TokenKind::Number(42),
                TokenKind::Number(7),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            scan("if then else iff"),
            vec![
                TokenKind::If,
                TokenKind::Then,
                TokenKind::Else,
                TokenKind::Identifier("iff".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            scan("foo _bar x9"),
            vec![
                TokenKind::Identifier("foo".to_string()),
                TokenKind::Identifier("_bar".to_string()),
                TokenKind::Identifier("x9".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_line_tracking() {
        let tokens = Scanner::new("1\n  2").scan_tokens().unwrap();
        assert_eq!(tokens[0].span.line, 1);
        assert_eq!(tokens[1].span.line, 2);
        assert_eq!(tokens[1].span.column, 3);
    }

    #[test]
    fn test_unknown_token() {
        assert!(matches!(scan_err("2 + $"), LexerError::UnknownToken('$', _)));
    }

    #[test]
    fn test_identifier_too_long() {
        let long = "x".repeat(MAX_IDENTIFIER_LEN + 1);
        assert!(matches!(
            scan_err(&long),
            LexerError::IdentifierTooLong(_)
        ));
    }

    #[test]
    fn test_identifier_at_limit() {
        let ok = "y".repeat(MAX_IDENTIFIER_LEN);
        assert_eq!(
            scan(&ok),
            vec![TokenKind::Identifier(ok.clone()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_numeric_overflow() {
        // One more digit than i64::MAX can hold
        assert!(matches!(
            scan_err("92233720368547758070"),
            LexerError::NumericOverflow(_)
        ));
    }

    #[test]
    fn test_max_literal_fits() {
        assert_eq!(
            scan("9223372036854775807"),
            vec![TokenKind::Number(i64::MAX), TokenKind::Eof]
        );
    }

    #[test]
    fn test_first_error_wins() {
        // The '$' stops scanning before the trailing tokens are seen
        let err = scan_err("1 $ %");
        assert!(matches!(err, LexerError::UnknownToken('$', _)));
    }
}
