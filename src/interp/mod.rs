//! Interpreter: environment, plugin registry, and the execution pipeline
//!
//! A source text runs in four stages: tokenize, parse, validate, then
//! statement-by-statement evaluation. Each statement commits its binding
//! before the next one runs, so a failure mid-program leaves every earlier
//! binding in place.

pub mod env;
pub mod error;
mod eval;
pub mod plugins;
pub mod value;

pub use env::{is_reserved, EnvAccess, EnvHandle, Environment};
pub use error::{PluginError, RuntimeError, RuntimeResult};
pub use plugins::{Plugin, PluginFn, PluginStore, Signature, ENV_PARAM};
pub use value::{Key, OpaqueValue, Value};

use crate::ast::{Expr, Program, Stmt, StmtKind};
use crate::error::{Error, Result};
use crate::lexer::tokenize;
use crate::parser::parse;
use crate::validate::validate;
use eval::Evaluator;
use std::io::Read;
use tracing::debug;

/// Customization points around the pipeline
///
/// Hooks run after validation: `on_program` once over the whole parsed
/// program, then `on_statement` before each statement evaluates. Either may
/// rewrite the tree it is given or fail, which aborts the run.
pub trait Hooks {
    fn on_program(&mut self, _program: &mut Program) -> Result<()> {
        Ok(())
    }

    fn on_statement(&mut self, _stmt: &mut Stmt, _env: &Environment) -> Result<()> {
        Ok(())
    }
}

/// The default hook set, which changes nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl Hooks for NoHooks {}

/// The interpreter
pub struct Interpreter {
    env: Environment,
    plugins: PluginStore,
    hooks: Box<dyn Hooks>,
}

impl Interpreter {
    /// Create an interpreter with an empty environment and no plugins
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
            plugins: PluginStore::new(),
            hooks: Box::new(NoHooks),
        }
    }

    /// Create an interpreter over a pre-seeded environment. Fails with
    /// `ReservedName` if any seeded name uses the reserved pattern.
    pub fn seeded(initial: impl IntoIterator<Item = (String, Value)>) -> Result<Self> {
        Ok(Self {
            env: Environment::seeded(initial)?,
            plugins: PluginStore::new(),
            hooks: Box::new(NoHooks),
        })
    }

    /// Replace the hook set
    pub fn with_hooks(mut self, hooks: impl Hooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    pub fn plugins(&self) -> &PluginStore {
        &self.plugins
    }

    pub fn plugins_mut(&mut self) -> &mut PluginStore {
        &mut self.plugins
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Run a source text against the environment
    ///
    /// Statements commit one at a time. On failure the run stops and the
    /// error propagates, but bindings committed by earlier statements stay.
    pub fn parse(&mut self, source: &str) -> Result<()> {
        let tokens = tokenize(source)?;
        let mut program = parse(tokens)?;
        validate(&program, &self.plugins)?;
        debug!(statements = program.stmts.len(), "program validated");

        self.hooks.on_program(&mut program)?;
        for stmt in &mut program.stmts {
            self.hooks.on_statement(stmt, &self.env)?;
            self.execute(stmt)?;
        }
        Ok(())
    }

    /// Read all of `reader` and run it as a source text
    pub fn parse_reader(&mut self, mut reader: impl Read) -> Result<()> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        self.parse(&source)
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<()> {
        match &stmt.kind {
            StmtKind::Assign { targets, value } => {
                let name = match targets.first().map(|t| &t.node) {
                    Some(Expr::Name(name)) => name.clone(),
                    // Hooks may have rewritten the statement after validation
                    _ => {
                        return Err(Error::grammar(
                            "assignment target must be a single name",
                            stmt.span,
                        ));
                    }
                };
                let value = Evaluator::new(&mut self.env, &self.plugins).eval(value)?;
                debug!(name = %name, "binding committed");
                self.env.set(&name, value)?;
            }
            StmtKind::Expr(expr) => {
                // A bare call runs for its effects, the result is discarded
                Evaluator::new(&mut self.env, &self.plugins).eval(expr)?;
            }
        }
        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("env", &self.env)
            .field("plugins", &self.plugins)
            .finish_non_exhaustive()
    }
}
