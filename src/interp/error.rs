//! Runtime errors for the evaluator and plugin dispatch

use thiserror::Error;

/// Result alias for evaluation-side code
pub type RuntimeResult<T> = std::result::Result<T, RuntimeError>;

/// Evaluation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// An identifier with the reserved `__...__` prefix was used where the
    /// restricted grammar forbids it
    #[error("name '{name}' uses the reserved naming pattern")]
    ReservedName { name: String },

    /// A name reference did not resolve against the environment or the
    /// plugin store
    #[error("name '{name}' is not bound")]
    NameNotBound { name: String },

    /// A call referenced a function absent from the plugin store
    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    /// Call-site arguments do not fit the plugin's declared parameters
    #[error("cannot bind arguments for '{plugin}': {message}")]
    ArgumentBinding { plugin: String, message: String },

    /// A value of the wrong shape, e.g. an unhashable dict key
    #[error("type mismatch: {message}")]
    TypeMismatch { message: String },

    /// The invoked plugin itself failed; carries the plugin name and the
    /// underlying cause
    #[error("plugin '{plugin}' failed: {cause}")]
    PluginExecution { plugin: String, cause: String },
}

impl RuntimeError {
    pub fn reserved_name(name: impl Into<String>) -> Self {
        Self::ReservedName { name: name.into() }
    }

    pub fn name_not_bound(name: impl Into<String>) -> Self {
        Self::NameNotBound { name: name.into() }
    }

    pub fn unknown_function(name: impl Into<String>) -> Self {
        Self::UnknownFunction { name: name.into() }
    }

    pub fn argument_binding(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ArgumentBinding {
            plugin: plugin.into(),
            message: message.into(),
        }
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::TypeMismatch {
            message: message.into(),
        }
    }

    pub fn plugin_execution(plugin: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::PluginExecution {
            plugin: plugin.into(),
            cause: cause.to_string(),
        }
    }
}

/// Failure signaled from inside a plugin callable
///
/// Plugins report errors as plain messages; the evaluator re-signals them as
/// [`RuntimeError::PluginExecution`] together with the plugin name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PluginError(String);

impl PluginError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<String> for PluginError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for PluginError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

impl From<RuntimeError> for PluginError {
    fn from(err: RuntimeError) -> Self {
        Self(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            RuntimeError::unknown_function("len").to_string(),
            "unknown function 'len'"
        );
        assert_eq!(
            RuntimeError::reserved_name("__env__").to_string(),
            "name '__env__' uses the reserved naming pattern"
        );
        assert_eq!(
            RuntimeError::plugin_execution("repeat", "count must be positive").to_string(),
            "plugin 'repeat' failed: count must be positive"
        );
    }

    #[test]
    fn test_plugin_error_from_str() {
        let err: PluginError = "boom".into();
        assert_eq!(err.to_string(), "boom");
    }
}
