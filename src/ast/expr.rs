//! Expression AST nodes

use super::{Span, Spanned};
use serde::{Deserialize, Serialize};

/// Expression
///
/// This is the *general* expression tree of the host grammar. Only a subset
/// of it survives validation: literals, names, collection literals, and
/// calls whose callee is a plain name. Operator, attribute, and subscript
/// nodes exist so they can be parsed and then rejected with a precise
/// diagnostic instead of a generic parse failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    /// Integer literal
    IntLit(i64),
    /// Float literal
    FloatLit(f64),
    /// String literal
    StrLit(String),
    /// Boolean literal (`True` / `False`)
    BoolLit(bool),
    /// `None`
    NoneLit,

    /// Name reference
    Name(String),

    /// List literal: `[a, b, c]`
    List(Vec<Spanned<Expr>>),
    /// Tuple literal: `(a, b)`, `(a,)`, `()`
    Tuple(Vec<Spanned<Expr>>),
    /// Dict literal: `{k: v, ...}`
    Dict(Vec<(Spanned<Expr>, Spanned<Expr>)>),
    /// Set literal: `{a, b}` (never empty; `{}` parses as an empty dict)
    Set(Vec<Spanned<Expr>>),

    /// Call: `f(a, b, key=c)`
    Call {
        func: Box<Spanned<Expr>>,
        args: Vec<Spanned<Expr>>,
        kwargs: Vec<(Spanned<String>, Spanned<Expr>)>,
    },

    /// Binary operation (not part of the restricted grammar)
    Binary {
        left: Box<Spanned<Expr>>,
        op: BinOp,
        right: Box<Spanned<Expr>>,
    },
    /// Unary operation (not part of the restricted grammar)
    Unary {
        op: UnOp,
        expr: Box<Spanned<Expr>>,
    },
    /// Attribute access: `expr.attr` (not part of the restricted grammar)
    Attribute {
        expr: Box<Spanned<Expr>>,
        attr: Spanned<String>,
    },
    /// Subscript: `expr[index]` (not part of the restricted grammar)
    Subscript {
        expr: Box<Spanned<Expr>>,
        index: Box<Spanned<Expr>>,
    },
}

impl Expr {
    /// Short human-readable description for diagnostics
    pub fn describe(&self) -> &'static str {
        match self {
            Expr::IntLit(_) => "integer literal",
            Expr::FloatLit(_) => "float literal",
            Expr::StrLit(_) => "string literal",
            Expr::BoolLit(_) => "boolean literal",
            Expr::NoneLit => "None",
            Expr::Name(_) => "name",
            Expr::List(_) => "list literal",
            Expr::Tuple(_) => "tuple literal",
            Expr::Dict(_) => "dict literal",
            Expr::Set(_) => "set literal",
            Expr::Call { .. } => "call",
            Expr::Binary { .. } => "binary operator",
            Expr::Unary { .. } => "unary operator",
            Expr::Attribute { .. } => "attribute access",
            Expr::Subscript { .. } => "subscript",
        }
    }

    pub fn spanned(self, span: Span) -> Spanned<Expr> {
        Spanned::new(self, span)
    }
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinOp::Add => write!(f, "+"),
            BinOp::Sub => write!(f, "-"),
            BinOp::Mul => write!(f, "*"),
            BinOp::Div => write!(f, "/"),
            BinOp::Mod => write!(f, "%"),
            BinOp::Eq => write!(f, "=="),
            BinOp::Ne => write!(f, "!="),
            BinOp::Lt => write!(f, "<"),
            BinOp::Gt => write!(f, ">"),
            BinOp::Le => write!(f, "<="),
            BinOp::Ge => write!(f, ">="),
        }
    }
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    /// Negation (-)
    Neg,
}

impl std::fmt::Display for UnOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnOp::Neg => write!(f, "-"),
        }
    }
}
