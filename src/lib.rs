//! Minilang: a minimal expression language, end to end.
//!
//! The pipeline is a strict batch: the lexer fully tokenizes, the parser
//! builds (or rejects) one top-level expression, the code generator emits
//! bytecode into a fixed-capacity chunk, and the stack VM runs it to a
//! single numeric result. Each stage hands its output to the next by move.

pub mod ast;
pub mod bytecode;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;

use bytecode::{Cell, Chunk, Compiler, Vm};
use error::MinilangError;

/// Parse source code into an AST without compiling.
pub fn parse(source: &str) -> Result<ast::Expr, MinilangError> {
    let tokens = lexer::Scanner::new(source).scan_tokens()?;
    let expr = parser::Parser::new(tokens).parse()?;
    Ok(expr)
}

/// Compile source code to bytecode without executing.
pub fn compile(source: &str) -> Result<Chunk, MinilangError> {
    let expr = parse(source)?;
    let chunk = Compiler::new().compile(&expr)?;
    Ok(chunk)
}

/// Run a program from source and return its numeric result.
pub fn eval(source: &str) -> Result<Cell, MinilangError> {
    let chunk = compile(source)?;
    let result = Vm::new().run(&chunk)?;
    Ok(result)
}
