//! Bytecode disassembler for debugging.

use std::fmt::Write;

use crate::bytecode::chunk::Chunk;
use crate::bytecode::instruction::OpCode;

/// Disassemble a chunk into a human-readable listing.
pub fn disassemble_chunk(chunk: &Chunk) -> String {
    let mut output = String::new();
    let mut offset = 0;

    while offset < chunk.code.len() {
        offset = disassemble_instruction(chunk, offset, &mut output);
    }

    output
}

/// Disassemble a single instruction; returns the offset of the next one.
pub fn disassemble_instruction(chunk: &Chunk, offset: usize, output: &mut String) -> usize {
    write!(output, "{:04} ", offset).unwrap();

    // Line number, or | when unchanged from the previous cell
    let line = chunk.line_at(offset);
    if offset > 0 && line == chunk.line_at(offset - 1) {
        write!(output, "   | ").unwrap();
    } else {
        write!(output, "{:4} ", line).unwrap();
    }

    let cell = chunk.code[offset];
    let Some(opcode) = OpCode::from_cell(cell) else {
        writeln!(output, "Unknown opcode {}", cell).unwrap();
        return offset + 1;
    };

    match opcode.operand_size() {
        0 => {
            writeln!(output, "{}", opcode.name()).unwrap();
            offset + 1
        }
        _ => {
            let operand = chunk.code.get(offset + 1).copied();
            match operand {
                Some(operand) => match opcode {
                    // Jump operands also show the resolved target
                    OpCode::Jump | OpCode::JumpIfZero | OpCode::JumpIfNotZero => {
                        let target = offset as i64 + 2 + operand;
                        writeln!(output, "{:<8} {} -> {:04}", opcode.name(), operand, target)
                            .unwrap()
                    }
                    _ => writeln!(output, "{:<8} {}", opcode.name(), operand).unwrap(),
                },
                None => writeln!(output, "{:<8} <truncated>", opcode.name()).unwrap(),
            }
            offset + 2
        }
    }
}
