//! Bytecode chunk: a fixed-capacity buffer of cells.

use crate::bytecode::instruction::OpCode;
use crate::error::CompileError;
use crate::span::Span;

/// One bytecode cell: either an opcode or the untyped operand word
/// immediately following its opcode.
pub type Cell = i64;

/// Maximum compiled size, in cells.
pub const CODE_MAX: usize = 2048;

/// A chunk of bytecode with per-cell line information.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// The bytecode cells.
    pub code: Vec<Cell>,
    /// Source line for each cell, for runtime diagnostics.
    pub lines: Vec<u32>,
    /// Capacity in cells; writes past this fail.
    capacity: usize,
}

impl Chunk {
    pub fn new() -> Self {
        Self::with_capacity(CODE_MAX)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            code: Vec::new(),
            lines: Vec::new(),
            capacity,
        }
    }

    /// Write an opcode to the chunk.
    pub fn write_op(&mut self, op: OpCode, line: u32, span: Span) -> Result<(), CompileError> {
        self.write_cell(op.into(), line, span)
    }

    /// Write a raw cell to the chunk.
    pub fn write_cell(&mut self, cell: Cell, line: u32, span: Span) -> Result<(), CompileError> {
        if self.code.len() >= self.capacity {
            return Err(CompileError::CodeBufferOverflow(span));
        }
        self.code.push(cell);
        self.lines.push(line);
        Ok(())
    }

    /// Current offset in the code, i.e. the index of the next cell written.
    pub fn current_offset(&self) -> usize {
        self.code.len()
    }

    /// Resolve a jump hole: write into `hole` the displacement from the
    /// cell after the operand to the current end of the chunk. Execution
    /// later computes `pc += displacement` with the operand already
    /// consumed, so a zero displacement falls through.
    pub fn patch_jump(&mut self, hole: usize, span: Span) -> Result<(), CompileError> {
        let target = self.code.len();
        let displacement = target as i64 - hole as i64 - 1;
        if displacement < 0 {
            return Err(CompileError::JumpOutOfRange(span));
        }
        self.code[hole] = displacement;
        Ok(())
    }

    /// Get the source line recorded for a cell offset.
    pub fn line_at(&self, offset: usize) -> u32 {
        self.lines.get(offset).copied().unwrap_or(0)
    }
}

impl Default for Chunk {
    fn default() -> Self {
        Self::new()
    }
}
