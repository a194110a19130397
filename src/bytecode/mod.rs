//! Bytecode compilation and execution.

pub mod chunk;
pub mod compiler;
pub mod disassembler;
pub mod instruction;
pub mod vm;

pub use chunk::{Cell, Chunk, CODE_MAX};
pub use compiler::{global_slot, CompileResult, Compiler, GLOBAL_SLOTS};
pub use disassembler::disassemble_chunk;
pub use instruction::OpCode;
pub use vm::{Vm, VmResult, STACK_MAX};
