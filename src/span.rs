//! Source positions for tokens, AST nodes, and diagnostics.

use std::fmt;

/// A region of source code: byte range plus the line/column where it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    /// 1-based line of the first character.
    pub line: usize,
    /// 1-based column of the first character.
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Combine two spans into one covering both.
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: self.line.min(other.line),
            column: if other.line < self.line {
                other.column
            } else {
                self.column
            },
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge() {
        let a = Span::new(0, 3, 1, 1);
        let b = Span::new(5, 9, 1, 6);
        assert_eq!(a.merge(&b), Span::new(0, 9, 1, 1));
    }

    #[test]
    fn test_display() {
        assert_eq!(Span::new(4, 5, 2, 3).to_string(), "line 2:3");
    }
}
