//! Stack-based virtual machine for executing bytecode.

use crate::bytecode::chunk::{Cell, Chunk};
use crate::bytecode::compiler::GLOBAL_SLOTS;
use crate::bytecode::instruction::OpCode;
use crate::error::RuntimeError;

/// Maximum operand stack depth.
pub const STACK_MAX: usize = 128;

/// Result type for VM operations.
pub type VmResult<T> = Result<T, RuntimeError>;

/// The virtual machine. Created fresh per execution; `run` drives the
/// fetch-decode-execute loop until HALT or a fault.
pub struct Vm {
    stack: Vec<Cell>,
    globals: [Cell; GLOBAL_SLOTS],
    pc: usize,
}

impl Vm {
    pub fn new() -> Self {
        Self {
            stack: Vec::with_capacity(STACK_MAX),
            globals: [0; GLOBAL_SLOTS],
            pc: 0,
        }
    }

    /// Execute a chunk and return the value left on top of the stack by
    /// HALT. Any fault aborts immediately with no partial result.
    pub fn run(&mut self, chunk: &Chunk) -> VmResult<Cell> {
        self.stack.clear();
        self.pc = 0;
        self.globals = [0; GLOBAL_SLOTS];

        loop {
            let line = chunk.line_at(self.pc);
            let cell = self.fetch(chunk)?;
            let opcode = OpCode::from_cell(cell)
                .ok_or(RuntimeError::InvalidOpcode { opcode: cell, line })?;

            match opcode {
                OpCode::Halt => {
                    return self.pop(line);
                }

                OpCode::Fetch => {
                    let slot = self.slot_operand(chunk, line)?;
                    self.push(self.globals[slot], line)?;
                }

                OpCode::Store => {
                    let slot = self.slot_operand(chunk, line)?;
                    self.globals[slot] = self.pop(line)?;
                }

                OpCode::Push => {
                    let value = self.fetch(chunk)?;
                    self.push(value, line)?;
                }

                OpCode::Drop => {
                    self.pop(line)?;
                }

                OpCode::Add => self.binary_op(line, |a, b| Ok(a.wrapping_add(b)))?,
                OpCode::Subtract => self.binary_op(line, |a, b| Ok(a.wrapping_sub(b)))?,
                OpCode::Multiply => self.binary_op(line, |a, b| Ok(a.wrapping_mul(b)))?,

                OpCode::Divide => self.binary_op(line, |a, b| {
                    if b == 0 {
                        Err(RuntimeError::DivideByZero { line })
                    } else {
                        // Truncates toward zero
                        Ok(a.wrapping_div(b))
                    }
                })?,

                OpCode::Less => self.binary_op(line, |a, b| Ok((a < b) as Cell))?,

                OpCode::JumpIfZero => {
                    let displacement = self.fetch(chunk)?;
                    if self.pop(line)? == 0 {
                        self.jump(displacement, chunk)?;
                    }
                }

                OpCode::JumpIfNotZero => {
                    let displacement = self.fetch(chunk)?;
                    if self.pop(line)? != 0 {
                        self.jump(displacement, chunk)?;
                    }
                }

                OpCode::Jump => {
                    let displacement = self.fetch(chunk)?;
                    self.jump(displacement, chunk)?;
                }
            }
        }
    }

    /// Read the cell at pc and advance.
    fn fetch(&mut self, chunk: &Chunk) -> VmResult<Cell> {
        let cell = chunk
            .code
            .get(self.pc)
            .copied()
            .ok_or(RuntimeError::ProgramCounterOutOfBounds { pc: self.pc })?;
        self.pc += 1;
        Ok(cell)
    }

    /// Read an operand and validate it as a global slot index.
    fn slot_operand(&mut self, chunk: &Chunk, line: u32) -> VmResult<usize> {
        let slot = self.fetch(chunk)?;
        if (0..GLOBAL_SLOTS as Cell).contains(&slot) {
            Ok(slot as usize)
        } else {
            Err(RuntimeError::InvalidSlot { slot, line })
        }
    }

    /// Apply a relative displacement to pc. Landing anywhere outside the
    /// chunk is a fault; landing exactly at the end is caught by the next
    /// fetch.
    fn jump(&mut self, displacement: Cell, chunk: &Chunk) -> VmResult<()> {
        let target = self.pc as i64 + displacement;
        if target < 0 || target > chunk.code.len() as i64 {
            return Err(RuntimeError::ProgramCounterOutOfBounds {
                pc: target.max(0) as usize,
            });
        }
        self.pc = target as usize;
        Ok(())
    }

    fn push(&mut self, value: Cell, line: u32) -> VmResult<()> {
        if self.stack.len() >= STACK_MAX {
            return Err(RuntimeError::StackOverflow { line });
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop(&mut self, line: u32) -> VmResult<Cell> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow { line })
    }

    fn binary_op(
        &mut self,
        line: u32,
        op: impl FnOnce(Cell, Cell) -> VmResult<Cell>,
    ) -> VmResult<()> {
        let b = self.pop(line)?;
        let a = self.pop(line)?;
        let result = op(a, b)?;
        self.push(result, line)
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    fn chunk_of(cells: &[Cell]) -> Chunk {
        let mut chunk = Chunk::new();
        for &cell in cells {
            chunk.write_cell(cell, 1, Span::default()).unwrap();
        }
        chunk
    }

    fn run(cells: &[Cell]) -> VmResult<Cell> {
        Vm::new().run(&chunk_of(cells))
    }

    const PUSH: Cell = OpCode::Push as Cell;
    const HALT: Cell = OpCode::Halt as Cell;

    #[test]
    fn test_push_halt() {
        assert_eq!(run(&[PUSH, 42, HALT]), Ok(42));
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(run(&[PUSH, 7, PUSH, 3, OpCode::Subtract as Cell, HALT]), Ok(4));
        assert_eq!(run(&[PUSH, 7, PUSH, 3, OpCode::Multiply as Cell, HALT]), Ok(21));
        assert_eq!(run(&[PUSH, 7, PUSH, 3, OpCode::Divide as Cell, HALT]), Ok(2));
        assert_eq!(run(&[PUSH, -7, PUSH, 3, OpCode::Divide as Cell, HALT]), Ok(-2));
    }

    #[test]
    fn test_divide_by_zero() {
        assert_eq!(
            run(&[PUSH, 5, PUSH, 0, OpCode::Divide as Cell, HALT]),
            Err(RuntimeError::DivideByZero { line: 1 })
        );
    }

    #[test]
    fn test_less() {
        assert_eq!(run(&[PUSH, 1, PUSH, 2, OpCode::Less as Cell, HALT]), Ok(1));
        assert_eq!(run(&[PUSH, 2, PUSH, 1, OpCode::Less as Cell, HALT]), Ok(0));
    }

    #[test]
    fn test_store_and_fetch() {
        let fetch = OpCode::Fetch as Cell;
        let store = OpCode::Store as Cell;
        assert_eq!(run(&[PUSH, 9, store, 3, fetch, 3, HALT]), Ok(9));
    }

    #[test]
    fn test_globals_start_zeroed() {
        assert_eq!(run(&[OpCode::Fetch as Cell, 25, HALT]), Ok(0));
    }

    #[test]
    fn test_drop() {
        assert_eq!(
            run(&[PUSH, 1, PUSH, 2, OpCode::Drop as Cell, HALT]),
            Ok(1)
        );
    }

    #[test]
    fn test_jump_if_not_zero() {
        let jnz = OpCode::JumpIfNotZero as Cell;
        // Non-zero condition skips over PUSH 11
        assert_eq!(run(&[PUSH, 1, jnz, 2, PUSH, 11, PUSH, 22, HALT]), Ok(22));
        // Zero condition falls through and halts at the first HALT
        assert_eq!(run(&[PUSH, 0, jnz, 2, PUSH, 11, HALT, PUSH, 22, HALT]), Ok(11));
    }

    #[test]
    fn test_stack_underflow() {
        assert_eq!(
            run(&[OpCode::Add as Cell, HALT]),
            Err(RuntimeError::StackUnderflow { line: 1 })
        );
    }

    #[test]
    fn test_halt_on_empty_stack_underflows() {
        assert_eq!(run(&[HALT]), Err(RuntimeError::StackUnderflow { line: 1 }));
    }

    #[test]
    fn test_stack_overflow() {
        // JMP -4 loops back over the PUSH forever
        let cells = [PUSH, 1, OpCode::Jump as Cell, -4];
        assert_eq!(
            run(&cells),
            Err(RuntimeError::StackOverflow { line: 1 })
        );
    }

    #[test]
    fn test_pc_out_of_bounds_missing_halt() {
        assert_eq!(
            run(&[PUSH, 1]),
            Err(RuntimeError::ProgramCounterOutOfBounds { pc: 2 })
        );
    }

    #[test]
    fn test_pc_out_of_bounds_truncated_operand() {
        assert_eq!(
            run(&[PUSH]),
            Err(RuntimeError::ProgramCounterOutOfBounds { pc: 1 })
        );
    }

    #[test]
    fn test_jump_out_of_bounds() {
        assert_eq!(
            run(&[PUSH, 0, OpCode::Jump as Cell, 100, HALT]),
            Err(RuntimeError::ProgramCounterOutOfBounds { pc: 104 })
        );
    }

    #[test]
    fn test_invalid_opcode() {
        assert_eq!(
            run(&[99, HALT]),
            Err(RuntimeError::InvalidOpcode { opcode: 99, line: 1 })
        );
    }

    #[test]
    fn test_invalid_slot() {
        assert_eq!(
            run(&[OpCode::Fetch as Cell, 26, HALT]),
            Err(RuntimeError::InvalidSlot { slot: 26, line: 1 })
        );
    }
}
