//! Abstract Syntax Tree definitions

mod expr;
mod span;

pub use expr::*;
pub use span::*;

use serde::{Deserialize, Serialize};

/// A program is a sequence of statements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

/// Statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

/// Statement kinds
///
/// The parser produces the general shapes of the host grammar; the validator
/// decides which of them the restricted grammar admits (a single plain-name
/// assignment target, and bare expressions only when they are calls).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StmtKind {
    /// Assignment: `target = value`, possibly chained (`a = b = 0`).
    /// Each element of `targets` is one target group; a group written
    /// `a, b` parses as a tuple expression.
    Assign {
        targets: Vec<Spanned<Expr>>,
        value: Spanned<Expr>,
    },
    /// Bare expression statement: `notify()`
    Expr(Spanned<Expr>),
}
