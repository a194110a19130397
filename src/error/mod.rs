//! Error types for all pipeline phases.

use crate::span::Span;
use thiserror::Error;

/// Lexer errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexerError {
    #[error("Unknown token '{0}' at {1}")]
    UnknownToken(char, Span),

    #[error("Identifier too long at {0}")]
    IdentifierTooLong(Span),

    #[error("Numeric literal overflows at {0}")]
    NumericOverflow(Span),
}

impl LexerError {
    pub fn unknown_token(c: char, span: Span) -> Self {
        Self::UnknownToken(c, span)
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UnknownToken(_, span) => *span,
            Self::IdentifierTooLong(span) => *span,
            Self::NumericOverflow(span) => *span,
        }
    }
}

/// Parser errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParserError {
    #[error("Missing parenthesis at {0}")]
    MissingParenthesis(Span),

    #[error("Missing operand after '{operator}' at {span}")]
    MissingOperand { operator: String, span: Span },

    #[error("Missing identifier or number at {0}")]
    MissingFactor(Span),

    #[error("Expected keyword '{expected}', found '{found}' at {span}")]
    MissingKeyword {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Conditional without 'else' branch at {0}")]
    MissingElse(Span),

    #[error("Trailing garbage after expression at {0}")]
    TrailingGarbage(Span),

    #[error("{0}")]
    Lexer(#[from] LexerError),
}

impl ParserError {
    pub fn missing_operand(operator: impl Into<String>, span: Span) -> Self {
        Self::MissingOperand {
            operator: operator.into(),
            span,
        }
    }

    pub fn missing_keyword(
        expected: impl Into<String>,
        found: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::MissingKeyword {
            expected: expected.into(),
            found: found.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::MissingParenthesis(span) => *span,
            Self::MissingOperand { span, .. } => *span,
            Self::MissingFactor(span) => *span,
            Self::MissingKeyword { span, .. } => *span,
            Self::MissingElse(span) => *span,
            Self::TrailingGarbage(span) => *span,
            Self::Lexer(e) => e.span(),
        }
    }
}

/// Bytecode compilation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("Code buffer overflow at {0}")]
    CodeBufferOverflow(Span),

    #[error("Jump displacement out of range at {0}")]
    JumpOutOfRange(Span),
}

impl CompileError {
    pub fn span(&self) -> Span {
        match self {
            Self::CodeBufferOverflow(span) => *span,
            Self::JumpOutOfRange(span) => *span,
        }
    }
}

/// Runtime errors raised by the virtual machine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Division by zero (line {line})")]
    DivideByZero { line: u32 },

    #[error("Stack overflow (line {line})")]
    StackOverflow { line: u32 },

    #[error("Stack underflow (line {line})")]
    StackUnderflow { line: u32 },

    #[error("Program counter out of bounds: {pc}")]
    ProgramCounterOutOfBounds { pc: usize },

    #[error("Invalid opcode {opcode} (line {line})")]
    InvalidOpcode { opcode: i64, line: u32 },

    #[error("Invalid global slot {slot} (line {line})")]
    InvalidSlot { slot: i64, line: u32 },
}

/// A unified error type for all phases.
#[derive(Debug, Error)]
pub enum MinilangError {
    #[error("Lexer error: {0}")]
    Lexer(#[from] LexerError),

    #[error("Parser error: {0}")]
    Parser(#[from] ParserError),

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
