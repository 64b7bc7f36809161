//! Expression evaluation
//!
//! Evaluates validated expressions against an environment and a plugin
//! registry. Operands evaluate depth-first, left to right, so a failing
//! call aborts before anything to its right runs.

use super::env::{EnvHandle, Environment};
use super::plugins::PluginStore;
use super::value::Value;
use crate::ast::{Expr, Spanned};
use crate::error::{Error, Result};
use crate::interp::error::RuntimeError;
use indexmap::{IndexMap, IndexSet};
use std::any::Any;
use std::rc::Rc;
use tracing::debug;

pub(super) struct Evaluator<'a> {
    env: &'a mut Environment,
    plugins: &'a PluginStore,
}

impl<'a> Evaluator<'a> {
    pub(super) fn new(env: &'a mut Environment, plugins: &'a PluginStore) -> Self {
        Self { env, plugins }
    }

    pub(super) fn eval(&mut self, expr: &Spanned<Expr>) -> Result<Value> {
        match &expr.node {
            Expr::IntLit(n) => Ok(Value::Int(*n)),
            Expr::FloatLit(x) => Ok(Value::Float(*x)),
            Expr::StrLit(s) => Ok(Value::Str(s.clone())),
            Expr::BoolLit(b) => Ok(Value::Bool(*b)),
            Expr::NoneLit => Ok(Value::None),
            Expr::Name(name) => self.name(name),
            Expr::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(item)?);
                }
                Ok(Value::List(values))
            }
            Expr::Tuple(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(item)?);
                }
                Ok(Value::Tuple(values))
            }
            Expr::Dict(entries) => {
                let mut map = IndexMap::with_capacity(entries.len());
                for (key_expr, value_expr) in entries {
                    let key = self.eval(key_expr)?;
                    let value = self.eval(value_expr)?;
                    // Hashability is checked at assembly, after both sides
                    // have evaluated
                    let key = key.as_key().ok_or_else(|| {
                        RuntimeError::type_mismatch(format!(
                            "unhashable dict key of type {}",
                            key.type_name()
                        ))
                    })?;
                    // A repeated key keeps its first position, last value wins
                    map.insert(key, value);
                }
                Ok(Value::Dict(map))
            }
            Expr::Set(items) => {
                let mut set = IndexSet::with_capacity(items.len());
                for item in items {
                    let value = self.eval(item)?;
                    let key = value.as_key().ok_or_else(|| {
                        RuntimeError::type_mismatch(format!(
                            "unhashable set element of type {}",
                            value.type_name()
                        ))
                    })?;
                    set.insert(key);
                }
                Ok(Value::Set(set))
            }
            Expr::Call { func, args, kwargs } => self.call(func, args, kwargs),
            // Validation rejects the remaining shapes before evaluation
            other => Err(Error::grammar(
                format!("a {} cannot be evaluated", other.describe()),
                expr.span,
            )),
        }
    }

    /// A name resolves to its binding first, then to a registered plugin
    fn name(&mut self, name: &str) -> Result<Value> {
        if self.env.contains(name) {
            return Ok(self.env.get(name)?);
        }
        if let Some(plugin) = self.plugins.get(name) {
            let inner: Rc<dyn Any> = plugin.clone();
            return Ok(Value::Opaque(super::value::OpaqueValue::from_rc(
                format!("function {name}"),
                inner,
            )));
        }
        Ok(self.env.get(name)?)
    }

    fn call(
        &mut self,
        func: &Spanned<Expr>,
        args: &[Spanned<Expr>],
        kwargs: &[(Spanned<String>, Spanned<Expr>)],
    ) -> Result<Value> {
        let name = match &func.node {
            Expr::Name(name) => name.clone(),
            other => {
                return Err(Error::grammar(
                    format!("cannot call a {}", other.describe()),
                    func.span,
                ));
            }
        };
        let plugin = self
            .plugins
            .get(&name)
            .ok_or_else(|| RuntimeError::unknown_function(&name))?
            .clone();

        let mut positional = Vec::with_capacity(args.len());
        for arg in args {
            positional.push(self.eval(arg)?);
        }
        let mut keyword = Vec::with_capacity(kwargs.len());
        for (kw_name, kw_expr) in kwargs {
            keyword.push((kw_name.node.clone(), self.eval(kw_expr)?));
        }

        let bound = plugin.signature().bind(&name, positional, keyword)?;
        debug!(plugin = %name, "invoking plugin");
        let result = if plugin.wants_env() {
            let mut handle = EnvHandle::new(self.env);
            plugin.invoke(bound, Some(&mut handle))
        } else {
            plugin.invoke(bound, None)
        };
        result.map_err(|err| RuntimeError::plugin_execution(&name, err).into())
    }
}
