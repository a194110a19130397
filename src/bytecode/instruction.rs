//! Bytecode instruction definitions for the Minilang VM.

use crate::bytecode::chunk::Cell;

/// Opcodes for the bytecode virtual machine.
///
/// Instructions with an operand occupy two cells: the opcode cell followed
/// by one untyped operand cell (an immediate, a global slot index, or a
/// relative jump displacement).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum OpCode {
    /// Stop; top of stack is the result
    Halt = 0,
    /// Push a global variable: FETCH <slot>
    Fetch,
    /// Pop into a global variable: STORE <slot>
    Store,
    /// Push an immediate value: PUSH <value>
    Push,
    /// Pop and discard the top value
    Drop,
    /// Add: pop b, pop a, push a + b
    Add,
    /// Subtract: pop b, pop a, push a - b
    Subtract,
    /// Multiply: pop b, pop a, push a * b
    Multiply,
    /// Divide: pop b, pop a, push a / b (truncating)
    Divide,
    /// Less than: pop b, pop a, push 1 if a < b else 0
    Less,
    /// Pop v; jump if v is zero: JUMP_IF_ZERO <disp>
    JumpIfZero,
    /// Pop v; jump if v is non-zero: JUMP_IF_NOT_ZERO <disp>
    JumpIfNotZero,
    /// Unconditional relative jump: JUMP <disp>
    Jump,
}

impl OpCode {
    /// Number of operand cells following this opcode.
    pub fn operand_size(self) -> usize {
        match self {
            OpCode::Halt
            | OpCode::Drop
            | OpCode::Add
            | OpCode::Subtract
            | OpCode::Multiply
            | OpCode::Divide
            | OpCode::Less => 0,

            OpCode::Fetch
            | OpCode::Store
            | OpCode::Push
            | OpCode::JumpIfZero
            | OpCode::JumpIfNotZero
            | OpCode::Jump => 1,
        }
    }

    /// Mnemonic used by the disassembler.
    pub fn name(self) -> &'static str {
        match self {
            OpCode::Halt => "HALT",
            OpCode::Fetch => "FETCH",
            OpCode::Store => "STORE",
            OpCode::Push => "PUSH",
            OpCode::Drop => "DROP",
            OpCode::Add => "ADD",
            OpCode::Subtract => "SUB",
            OpCode::Multiply => "MUL",
            OpCode::Divide => "DIV",
            OpCode::Less => "LESS",
            OpCode::JumpIfZero => "JZ",
            OpCode::JumpIfNotZero => "JNZ",
            OpCode::Jump => "JMP",
        }
    }

    /// Decode an opcode from a bytecode cell.
    pub fn from_cell(cell: Cell) -> Option<OpCode> {
        if (OpCode::Halt as Cell..=OpCode::Jump as Cell).contains(&cell) {
            Some(unsafe { std::mem::transmute::<Cell, OpCode>(cell) })
        } else {
            None
        }
    }
}

impl From<OpCode> for Cell {
    fn from(op: OpCode) -> Cell {
        op as Cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_roundtrip() {
        for i in OpCode::Halt as Cell..=OpCode::Jump as Cell {
            let op = OpCode::from_cell(i).expect("valid opcode");
            assert_eq!(i, op as Cell);
        }
    }

    #[test]
    fn test_invalid_opcode() {
        assert!(OpCode::from_cell(255).is_none());
        assert!(OpCode::from_cell(-1).is_none());
    }

    #[test]
    fn test_operand_sizes() {
        assert_eq!(OpCode::Add.operand_size(), 0);
        assert_eq!(OpCode::Push.operand_size(), 1);
        assert_eq!(OpCode::Jump.operand_size(), 1);
    }
}
