//! Bytecode compiler: transforms the AST into a chunk.

use crate::ast::{BinaryOp, Expr, ExprKind};
use crate::bytecode::chunk::{Cell, Chunk};
use crate::bytecode::instruction::OpCode;
use crate::error::CompileError;
use crate::span::Span;

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// Number of global variable slots (one per letter a-z).
pub const GLOBAL_SLOTS: usize = 26;

/// The bytecode compiler. Walks the tree in post-order so that each
/// subexpression leaves exactly one value on the operand stack.
pub struct Compiler {
    chunk: Chunk,
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            chunk: Chunk::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            chunk: Chunk::with_capacity(capacity),
        }
    }

    /// Compile an expression tree into a chunk ending in HALT.
    pub fn compile(mut self, expr: &Expr) -> CompileResult<Chunk> {
        self.compile_expression(expr)?;
        self.emit_op(OpCode::Halt, expr.span)?;
        Ok(self.chunk)
    }

    fn compile_expression(&mut self, expr: &Expr) -> CompileResult<()> {
        let span = expr.span;

        match &expr.kind {
            ExprKind::Number(n) => {
                self.emit_op(OpCode::Push, span)?;
                self.emit_cell(*n, span)?;
            }

            ExprKind::Variable(name) => {
                self.emit_op(OpCode::Fetch, span)?;
                self.emit_cell(global_slot(name) as Cell, span)?;
            }

            ExprKind::Binary {
                operator,
                left,
                right,
            } => {
                self.compile_expression(left)?;
                self.compile_expression(right)?;
                let op = match operator {
                    BinaryOp::Add => OpCode::Add,
                    BinaryOp::Subtract => OpCode::Subtract,
                    BinaryOp::Multiply => OpCode::Multiply,
                    BinaryOp::Divide => OpCode::Divide,
                };
                self.emit_op(op, span)?;
            }

            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.compile_expression(condition)?;

                let else_jump = self.emit_jump(OpCode::JumpIfZero, span)?;
                self.compile_expression(then_branch)?;

                let end_jump = self.emit_jump(OpCode::Jump, span)?;
                self.patch_jump(else_jump, span)?;

                match else_branch {
                    Some(else_branch) => self.compile_expression(else_branch)?,
                    // The parser rejects a missing else; a hand-built tree
                    // without one still gets a balanced stack.
                    None => {
                        self.emit_op(OpCode::Push, span)?;
                        self.emit_cell(0, span)?;
                    }
                }

                self.patch_jump(end_jump, span)?;
            }
        }

        Ok(())
    }

    // ===== Bytecode emission =====

    fn emit_op(&mut self, op: OpCode, span: Span) -> CompileResult<()> {
        self.chunk.write_op(op, span.line as u32, span)
    }

    fn emit_cell(&mut self, cell: Cell, span: Span) -> CompileResult<()> {
        self.chunk.write_cell(cell, span.line as u32, span)
    }

    /// Emit a jump with a placeholder operand; returns the hole index for
    /// later patching.
    fn emit_jump(&mut self, op: OpCode, span: Span) -> CompileResult<usize> {
        self.emit_op(op, span)?;
        let hole = self.chunk.current_offset();
        self.emit_cell(Cell::MAX, span)?; // Placeholder
        Ok(hole)
    }

    fn patch_jump(&mut self, hole: usize, span: Span) -> CompileResult<()> {
        self.chunk.patch_jump(hole, span)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Map an identifier to one of the 26 global slots.
///
/// Only the first character matters, case-folded; a leading underscore
/// aliases to slot 0. Multi-character identifiers that share a first letter
/// share a slot. This is the language's documented (and deliberately
/// preserved) single-letter variable model.
pub fn global_slot(name: &str) -> usize {
    match name.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => (c.to_ascii_lowercase() as u8 - b'a') as usize,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Scanner;
    use crate::parser::Parser;

    fn compile_source(source: &str) -> CompileResult<Chunk> {
        let tokens = Scanner::new(source).scan_tokens().unwrap();
        let expr = Parser::new(tokens).parse().unwrap();
        Compiler::new().compile(&expr)
    }

    #[test]
    fn test_number_literal() {
        let chunk = compile_source("7").unwrap();
        assert_eq!(
            chunk.code,
            vec![OpCode::Push as Cell, 7, OpCode::Halt as Cell]
        );
    }

    #[test]
    fn test_binary_post_order() {
        let chunk = compile_source("2+3").unwrap();
        assert_eq!(
            chunk.code,
            vec![
                OpCode::Push as Cell,
                2,
                OpCode::Push as Cell,
                3,
                OpCode::Add as Cell,
                OpCode::Halt as Cell,
            ]
        );
    }

    #[test]
    fn test_variable_fetch() {
        let chunk = compile_source("c").unwrap();
        assert_eq!(
            chunk.code,
            vec![OpCode::Fetch as Cell, 2, OpCode::Halt as Cell]
        );
    }

    #[test]
    fn test_global_slot_aliasing() {
        assert_eq!(global_slot("a"), 0);
        assert_eq!(global_slot("Z"), 25);
        // Only the first letter counts
        assert_eq!(global_slot("abc"), global_slot("apple"));
        // Leading underscore aliases to slot 0
        assert_eq!(global_slot("_tmp"), 0);
    }

    #[test]
    fn test_conditional_layout() {
        let chunk = compile_source("if (1) then 5 else 9").unwrap();
        assert_eq!(
            chunk.code,
            vec![
                OpCode::Push as Cell,
                1,
                OpCode::JumpIfZero as Cell,
                4, // past the then-branch and the end-jump
                OpCode::Push as Cell,
                5,
                OpCode::Jump as Cell,
                2, // past the else-branch
                OpCode::Push as Cell,
                9,
                OpCode::Halt as Cell,
            ]
        );
    }

    #[test]
    fn test_ends_with_halt() {
        let chunk = compile_source("a * (b + 1)").unwrap();
        assert_eq!(*chunk.code.last().unwrap(), OpCode::Halt as Cell);
    }

    #[test]
    fn test_code_buffer_overflow() {
        let tokens = Scanner::new("1+2+3+4").scan_tokens().unwrap();
        let expr = Parser::new(tokens).parse().unwrap();
        let err = Compiler::with_capacity(4).compile(&expr).unwrap_err();
        assert!(matches!(err, CompileError::CodeBufferOverflow(_)));
    }

    #[test]
    fn test_missing_else_synthesizes_zero() {
        let expr = Expr::new(
            ExprKind::If {
                condition: Box::new(Expr::new(ExprKind::Number(0), Span::default())),
                then_branch: Box::new(Expr::new(ExprKind::Number(5), Span::default())),
                else_branch: None,
            },
            Span::default(),
        );
        let chunk = Compiler::new().compile(&expr).unwrap();
        assert_eq!(
            chunk.code,
            vec![
                OpCode::Push as Cell,
                0,
                OpCode::JumpIfZero as Cell,
                4,
                OpCode::Push as Cell,
                5,
                OpCode::Jump as Cell,
                2,
                OpCode::Push as Cell,
                0,
                OpCode::Halt as Cell,
            ]
        );
    }
}
