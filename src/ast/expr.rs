//! Expression AST nodes.

use std::fmt;

use crate::span::Span;

/// An expression in the AST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Render the tree as an s-expression, e.g. `(+ 2 (* 3 4))`.
    ///
    /// This is the human-readable dump printed by the CLI; it is not meant
    /// to be re-parsed. Use the `Display` impl for a parseable rendering.
    pub fn sexpr(&self) -> String {
        let mut out = String::new();
        self.write_sexpr(&mut out);
        out
    }

    fn write_sexpr(&self, out: &mut String) {
        match &self.kind {
            ExprKind::Number(n) => {
                out.push_str(&n.to_string());
            }
            ExprKind::Variable(name) => {
                out.push_str(name);
            }
            ExprKind::Binary {
                operator,
                left,
                right,
            } => {
                out.push('(');
                out.push_str(operator.symbol());
                out.push(' ');
                left.write_sexpr(out);
                out.push(' ');
                right.write_sexpr(out);
                out.push(')');
            }
            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                out.push_str("(if ");
                condition.write_sexpr(out);
                out.push(' ');
                then_branch.write_sexpr(out);
                if let Some(else_branch) = else_branch {
                    out.push(' ');
                    else_branch.write_sexpr(out);
                }
                out.push(')');
            }
        }
    }
}

/// All expression variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// Number literal: 42
    Number(i64),

    /// Variable reference: foo
    Variable(String),

    /// Binary operation: a + b
    Binary {
        operator: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Conditional: if (c) then t else e
    ///
    /// The else branch is optional in the tree; the parser always supplies
    /// it, so `None` only appears in programmatically built trees.
    If {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Option<Box<Expr>>,
    },
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Renders the expression as fully parenthesized source text, e.g.
/// `(2 + (3 * 4))`. The output re-parses to a structurally equal tree.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Number(n) => write!(f, "{}", n),
            ExprKind::Variable(name) => write!(f, "{}", name),
            ExprKind::Binary {
                operator,
                left,
                right,
            } => write!(f, "({} {} {})", left, operator, right),
            // Parenthesized so a conditional in operand position re-parses
            // as a factor.
            ExprKind::If {
                condition,
                then_branch,
                else_branch: Some(else_branch),
            } => write!(
                f,
                "(if ({}) then {} else {})",
                condition, then_branch, else_branch
            ),
            ExprKind::If {
                condition,
                then_branch,
                else_branch: None,
            } => write!(f, "(if ({}) then {})", condition, then_branch),
        }
    }
}
