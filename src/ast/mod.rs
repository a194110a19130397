//! AST module for Minilang.

pub mod expr;

pub use expr::{BinaryOp, Expr, ExprKind};
