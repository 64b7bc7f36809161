//! Plugin registry and call-signature binding

use super::env::{is_reserved, EnvAccess};
use super::error::{PluginError, RuntimeError, RuntimeResult};
use super::value::Value;
use indexmap::IndexMap;
use std::rc::Rc;

/// The keyword-only parameter name that requests environment access.
/// Declaring it sets the plugin's `wants_env` flag; it can never be supplied
/// from call-site arguments.
pub const ENV_PARAM: &str = "env";

/// Plugin callable: bound arguments in declared parameter order, plus the
/// environment handle when the plugin declared the `env` parameter
pub type PluginFn =
    Rc<dyn Fn(Vec<Value>, Option<&mut dyn EnvAccess>) -> Result<Value, PluginError>>;

/// Declared parameter list of a plugin
///
/// Built explicitly at registration (there is no runtime reflection) and
/// validated eagerly: duplicate names, reserved names, and a positional
/// `env` parameter are rejected before the plugin ever becomes callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    positional: Vec<String>,
    keyword: Vec<String>,
    wants_env: bool,
}

impl Signature {
    /// A signature with no parameters and no environment access
    pub fn empty() -> Self {
        Self {
            positional: Vec::new(),
            keyword: Vec::new(),
            wants_env: false,
        }
    }

    /// Build a signature from positional and keyword-only parameter names.
    /// A keyword-only parameter named [`ENV_PARAM`] is not a bindable
    /// parameter; it flags the plugin as wanting environment access.
    pub fn new(positional: &[&str], keyword_only: &[&str]) -> Result<Self, PluginError> {
        let mut seen: Vec<&str> = Vec::new();
        for &name in positional.iter().chain(keyword_only) {
            if is_reserved(name) {
                return Err(PluginError::new(format!(
                    "parameter '{name}' uses the reserved naming pattern"
                )));
            }
            if seen.contains(&name) {
                return Err(PluginError::new(format!("duplicate parameter '{name}'")));
            }
            seen.push(name);
        }
        if positional.contains(&ENV_PARAM) {
            return Err(PluginError::new(format!(
                "the '{ENV_PARAM}' parameter must be keyword-only"
            )));
        }

        let wants_env = keyword_only.contains(&ENV_PARAM);
        Ok(Self {
            positional: positional.iter().map(|s| s.to_string()).collect(),
            keyword: keyword_only
                .iter()
                .filter(|&&s| s != ENV_PARAM)
                .map(|s| s.to_string())
                .collect(),
            wants_env,
        })
    }

    /// Positional-only shorthand
    pub fn positional(names: &[&str]) -> Result<Self, PluginError> {
        Self::new(names, &[])
    }

    pub fn positional_params(&self) -> &[String] {
        &self.positional
    }

    pub fn keyword_params(&self) -> &[String] {
        &self.keyword
    }

    pub fn wants_env(&self) -> bool {
        self.wants_env
    }

    /// Bind call-site arguments to declared parameters, Python-style.
    /// Returns values in declared order: positional parameters first, then
    /// keyword-only parameters.
    pub(crate) fn bind(
        &self,
        plugin: &str,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> RuntimeResult<Vec<Value>> {
        if args.len() > self.positional.len() {
            return Err(RuntimeError::argument_binding(
                plugin,
                format!(
                    "takes {} positional argument(s) but {} were given",
                    self.positional.len(),
                    args.len()
                ),
            ));
        }

        let total = self.positional.len() + self.keyword.len();
        let mut slots: Vec<Option<Value>> = std::iter::repeat_with(|| None).take(total).collect();
        for (i, value) in args.into_iter().enumerate() {
            slots[i] = Some(value);
        }

        for (name, value) in kwargs {
            if self.wants_env && name == ENV_PARAM {
                return Err(RuntimeError::reserved_name(ENV_PARAM));
            }
            let index = self
                .positional
                .iter()
                .position(|p| *p == name)
                .or_else(|| {
                    self.keyword
                        .iter()
                        .position(|p| *p == name)
                        .map(|i| self.positional.len() + i)
                })
                .ok_or_else(|| {
                    RuntimeError::argument_binding(
                        plugin,
                        format!("got an unexpected keyword argument '{name}'"),
                    )
                })?;
            if slots[index].is_some() {
                return Err(RuntimeError::argument_binding(
                    plugin,
                    format!("got multiple values for argument '{name}'"),
                ));
            }
            slots[index] = Some(value);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.ok_or_else(|| {
                    let name = if i < self.positional.len() {
                        &self.positional[i]
                    } else {
                        &self.keyword[i - self.positional.len()]
                    };
                    RuntimeError::argument_binding(
                        plugin,
                        format!("missing required argument '{name}'"),
                    )
                })
            })
            .collect()
    }
}

/// A registered plugin: name, declared signature, and the callable
#[derive(Clone)]
pub struct Plugin {
    name: String,
    signature: Signature,
    func: PluginFn,
}

impl Plugin {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn wants_env(&self) -> bool {
        self.signature.wants_env
    }

    /// Invoke the callable with already-bound arguments
    pub fn invoke(
        &self,
        args: Vec<Value>,
        env: Option<&mut dyn EnvAccess>,
    ) -> Result<Value, PluginError> {
        (self.func)(args, env)
    }
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Name→plugin registry
///
/// Populated by explicit host registration only, never from input text.
/// Re-registering a name replaces the previous descriptor silently; name
/// collisions are the host's responsibility.
#[derive(Debug, Clone, Default)]
pub struct PluginStore {
    plugins: IndexMap<String, Rc<Plugin>>,
}

impl PluginStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callable under `name` with its declared signature
    pub fn register<F>(&mut self, name: impl Into<String>, signature: Signature, func: F)
    where
        F: Fn(Vec<Value>, Option<&mut dyn EnvAccess>) -> Result<Value, PluginError> + 'static,
    {
        let name = name.into();
        let plugin = Plugin {
            name: name.clone(),
            signature,
            func: Rc::new(func),
        };
        self.plugins.insert(name, Rc::new(plugin));
    }

    pub fn has(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Rc<Plugin>> {
        self.plugins.get(name)
    }

    /// Registered names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.plugins.clear();
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
