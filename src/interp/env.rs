//! Environment for variable bindings

use super::error::{PluginError, RuntimeError, RuntimeResult};
use super::value::Value;
use indexmap::IndexMap;

/// True for identifiers using the reserved naming pattern: a leading and
/// trailing double underscore. These names are kept out of the environment
/// so user input can never collide with injection-internal names.
pub fn is_reserved(name: &str) -> bool {
    name.starts_with("__") && name.ends_with("__")
}

/// Insertion-ordered name→value store
///
/// This is the host-level surface: full get/set/iterate. Plugins receive the
/// deliberately narrower [`EnvAccess`] handle instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    bindings: IndexMap<String, Value>,
}

impl Environment {
    /// Create a new, empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an environment from an initial mapping. Fails with
    /// `ReservedName` if any seeded name uses the reserved pattern.
    pub fn seeded(
        initial: impl IntoIterator<Item = (String, Value)>,
    ) -> RuntimeResult<Self> {
        let mut env = Self::new();
        for (name, value) in initial {
            env.set(&name, value)?;
        }
        Ok(env)
    }

    /// Look up a binding; reserved names fail without being consulted
    pub fn get(&self, name: &str) -> RuntimeResult<Value> {
        if is_reserved(name) {
            return Err(RuntimeError::reserved_name(name));
        }
        self.bindings
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::name_not_bound(name))
    }

    /// Store or overwrite a binding; reserved names are rejected
    pub fn set(&mut self, name: &str, value: Value) -> RuntimeResult<()> {
        if is_reserved(name) {
            return Err(RuntimeError::reserved_name(name));
        }
        self.bindings.insert(name.to_string(), value);
        Ok(())
    }

    /// Whether a binding exists (always false for reserved names)
    pub fn contains(&self, name: &str) -> bool {
        !is_reserved(name) && self.bindings.contains_key(name)
    }

    /// Iterate bindings in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Immutable ordered view of all bindings
    pub fn snapshot(&self) -> IndexMap<String, Value> {
        self.bindings.clone()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// The capability surface handed to plugins that request environment access
///
/// Deliberately narrower than [`Environment`]: get/set/contains only, no
/// bulk enumeration, so a plugin cannot discover bindings it was not told
/// about. Reserved names are invisible through this surface in both
/// directions.
pub trait EnvAccess {
    /// Read a binding
    fn get(&self, name: &str) -> Result<Value, PluginError>;
    /// Create or overwrite a binding
    fn set(&mut self, name: &str, value: Value) -> Result<(), PluginError>;
    /// Whether a binding exists
    fn contains(&self, name: &str) -> bool;
}

/// Borrowed [`EnvAccess`] implementation over the live environment
pub struct EnvHandle<'a> {
    inner: &'a mut Environment,
}

impl<'a> EnvHandle<'a> {
    pub fn new(inner: &'a mut Environment) -> Self {
        Self { inner }
    }
}

impl EnvAccess for EnvHandle<'_> {
    fn get(&self, name: &str) -> Result<Value, PluginError> {
        self.inner.get(name).map_err(PluginError::from)
    }

    fn set(&mut self, name: &str, value: Value) -> Result<(), PluginError> {
        self.inner.set(name, value).map_err(PluginError::from)
    }

    fn contains(&self, name: &str) -> bool {
        self.inner.contains(name)
    }
}
