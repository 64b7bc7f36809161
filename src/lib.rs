//! Corral
//!
//! Safe evaluation of a restricted assignment grammar. A source text is a
//! sequence of `name = value` statements where values are literals,
//! collections, or calls to host-registered plugins; everything else the
//! parser can read is rejected before evaluation. Successful statements
//! commit their bindings into a named environment one at a time.
//!
//! # Example
//!
//! ```
//! use corral::{Interpreter, Signature, Value};
//!
//! let mut interp = Interpreter::new();
//! interp.plugins_mut().register(
//!     "repeat",
//!     Signature::positional(&["text", "count"])?,
//!     |args, _| {
//!         let text = args[0].as_str().ok_or("text must be a string")?;
//!         let count = args[1].as_int().ok_or("count must be an int")?;
//!         Ok(Value::Str(text.repeat(count.max(0) as usize)))
//!     },
//! );
//! interp.parse("banner = repeat('=', 3)")?;
//! assert_eq!(interp.env().get("banner")?, Value::Str("===".into()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod ast;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod validate;

pub use ast::Span;
pub use error::{report, Error, Result};
pub use interp::{
    is_reserved, EnvAccess, Environment, Hooks, Interpreter, Key, NoHooks, OpaqueValue,
    Plugin, PluginError, PluginStore, RuntimeError, Signature, Value, ENV_PARAM,
};
