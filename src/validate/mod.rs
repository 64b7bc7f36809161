//! Statement and expression validation
//!
//! The parser accepts a superset of the permitted grammar. This pass walks
//! the program and rejects every shape outside it: operators, attribute
//! access, subscripts, tuple or chained assignment targets, calls through
//! anything but a plain name, and any use of a reserved `__name__`
//! identifier. Validation runs before evaluation, so a rejected program
//! never touches the environment.

use crate::ast::{Expr, Program, Spanned, Stmt, StmtKind};
use crate::error::{Error, Result};
use crate::interp::{is_reserved, PluginStore, RuntimeError};

/// Check a parsed program against the restricted grammar
pub fn validate(program: &Program, plugins: &PluginStore) -> Result<()> {
    for stmt in &program.stmts {
        statement(stmt, plugins)?;
    }
    Ok(())
}

fn statement(stmt: &Stmt, plugins: &PluginStore) -> Result<()> {
    match &stmt.kind {
        StmtKind::Assign { targets, value } => {
            if targets.len() > 1 {
                return Err(Error::grammar(
                    "chained assignment is not permitted",
                    stmt.span,
                ));
            }
            target(&targets[0], plugins)?;
            expression(value, plugins)
        }
        StmtKind::Expr(expr) => {
            // A bare expression is only allowed as a call statement
            match &expr.node {
                Expr::Call { .. } => expression(expr, plugins),
                other => Err(Error::grammar(
                    format!("a bare {} is not a statement, only assignments and calls are permitted", other.describe()),
                    expr.span,
                )),
            }
        }
    }
}

fn target(expr: &Spanned<Expr>, plugins: &PluginStore) -> Result<()> {
    match &expr.node {
        Expr::Name(name) => {
            if is_reserved(name) {
                return Err(RuntimeError::reserved_name(name).into());
            }
            if plugins.has(name) {
                return Err(Error::grammar(
                    format!("cannot assign to `{name}`, it names a registered function"),
                    expr.span,
                ));
            }
            Ok(())
        }
        Expr::Tuple(_) | Expr::List(_) => Err(Error::grammar(
            "unpacking assignment is not permitted, assign to a single name",
            expr.span,
        )),
        other => Err(Error::grammar(
            format!("cannot assign to a {}, assign to a single name", other.describe()),
            expr.span,
        )),
    }
}

fn expression(expr: &Spanned<Expr>, plugins: &PluginStore) -> Result<()> {
    match &expr.node {
        Expr::IntLit(_)
        | Expr::FloatLit(_)
        | Expr::StrLit(_)
        | Expr::BoolLit(_)
        | Expr::NoneLit => Ok(()),
        Expr::Name(name) => {
            if is_reserved(name) {
                Err(RuntimeError::reserved_name(name).into())
            } else {
                Ok(())
            }
        }
        Expr::List(items) | Expr::Tuple(items) | Expr::Set(items) => {
            for item in items {
                expression(item, plugins)?;
            }
            Ok(())
        }
        Expr::Dict(entries) => {
            for (key, value) in entries {
                expression(key, plugins)?;
                expression(value, plugins)?;
            }
            Ok(())
        }
        Expr::Call { func, args, kwargs } => {
            callee(func)?;
            for arg in args {
                expression(arg, plugins)?;
            }
            for (name, value) in kwargs {
                if is_reserved(&name.node) {
                    return Err(RuntimeError::reserved_name(&name.node).into());
                }
                expression(value, plugins)?;
            }
            Ok(())
        }
        other @ (Expr::Binary { .. }
        | Expr::Unary { .. }
        | Expr::Attribute { .. }
        | Expr::Subscript { .. }) => Err(Error::grammar(
            format!("a {} is not permitted", other.describe()),
            expr.span,
        )),
    }
}

fn callee(func: &Spanned<Expr>) -> Result<()> {
    match &func.node {
        Expr::Name(name) => {
            if is_reserved(name) {
                Err(RuntimeError::reserved_name(name).into())
            } else {
                Ok(())
            }
        }
        other => Err(Error::grammar(
            format!("cannot call a {}, call a registered function by name", other.describe()),
            func.span,
        )),
    }
}
