//! Runtime values

use indexmap::{IndexMap, IndexSet};
use ordered_float::OrderedFloat;
use std::any::Any;
use std::rc::Rc;

/// Runtime value
///
/// A closed union: everything the restricted grammar can express, plus
/// `Opaque` for host objects returned by plugins (or seeded into the
/// environment) that have no literal shape. Input syntax can never spell an
/// `Opaque` value.
#[derive(Debug, Clone)]
pub enum Value {
    /// `None`
    None,
    /// Boolean
    Bool(bool),
    /// 64-bit integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// String
    Str(String),
    /// Ordered list
    List(Vec<Value>),
    /// Ordered, immutable tuple
    Tuple(Vec<Value>),
    /// Insertion-ordered mapping; keys are restricted to hashable values
    Dict(IndexMap<Key, Value>),
    /// Set of hashable values (insertion-ordered for determinism)
    Set(IndexSet<Key>),
    /// Arbitrary host object carried without interpretation
    Opaque(OpaqueValue),
}

impl Value {
    /// Type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "None",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Dict(_) => "dict",
            Value::Set(_) => "set",
            Value::Opaque(_) => "opaque",
        }
    }

    /// Try to convert to i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to convert to f64 (ints coerce)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Try to convert to bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to view as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Try to view as a list slice
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Project into a hashable [`Key`], or `None` for unhashable values
    /// (lists, dicts, sets, opaque objects)
    pub fn as_key(&self) -> Option<Key> {
        match self {
            Value::None => Some(Key::None),
            Value::Bool(b) => Some(Key::Bool(*b)),
            Value::Int(n) => Some(Key::Int(*n)),
            Value::Float(x) => Some(Key::Float(OrderedFloat(*x))),
            Value::Str(s) => Some(Key::Str(s.clone())),
            Value::Tuple(items) => items
                .iter()
                .map(Value::as_key)
                .collect::<Option<Vec<_>>>()
                .map(Key::Tuple),
            Value::List(_) | Value::Dict(_) | Value::Set(_) | Value::Opaque(_) => None,
        }
    }

    /// Build a dict value from key/value pairs (last duplicate wins, first
    /// insertion position kept)
    pub fn dict(pairs: impl IntoIterator<Item = (Key, Value)>) -> Value {
        Value::Dict(pairs.into_iter().collect())
    }

    /// Build a set value from keys
    pub fn set(keys: impl IntoIterator<Item = Key>) -> Value {
        Value::Set(keys.into_iter().collect())
    }

    /// Wrap a host object as an opaque value
    pub fn opaque<T: Any>(label: impl Into<String>, value: T) -> Value {
        Value::Opaque(OpaqueValue::new(label, value))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a == b,
            (Value::Opaque(a), Value::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write_float(f, *x),
            Value::Str(s) => write_quoted(f, s),
            Value::List(items) => {
                write!(f, "[")?;
                write_joined(f, items)?;
                write!(f, "]")
            }
            Value::Tuple(items) => {
                write!(f, "(")?;
                write_joined(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Value::Dict(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Value::Set(keys) => {
                if keys.is_empty() {
                    return write!(f, "set()");
                }
                write!(f, "{{")?;
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}")?;
                }
                write!(f, "}}")
            }
            Value::Opaque(opaque) => write!(f, "{opaque}"),
        }
    }
}

fn write_joined(f: &mut std::fmt::Formatter<'_>, items: &[Value]) -> std::fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_float(f: &mut std::fmt::Formatter<'_>, x: f64) -> std::fmt::Result {
    if x.is_finite() && x.fract() == 0.0 {
        write!(f, "{x:.1}")
    } else {
        write!(f, "{x}")
    }
}

fn write_quoted(f: &mut std::fmt::Formatter<'_>, s: &str) -> std::fmt::Result {
    write!(f, "'")?;
    for c in s.chars() {
        match c {
            '\\' => write!(f, "\\\\")?,
            '\'' => write!(f, "\\'")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            _ => write!(f, "{c}")?,
        }
    }
    write!(f, "'")
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

/// Hashable projection of a [`Value`], used for dict keys and set members
///
/// Lists, dicts, sets, and opaque objects have no stable hash contract and
/// cannot become keys; converting them fails with a type mismatch at the
/// evaluation site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    None,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    Str(String),
    Tuple(Vec<Key>),
}

impl Key {
    /// Lift the key back into a full value
    pub fn to_value(&self) -> Value {
        match self {
            Key::None => Value::None,
            Key::Bool(b) => Value::Bool(*b),
            Key::Int(n) => Value::Int(*n),
            Key::Float(x) => Value::Float(x.into_inner()),
            Key::Str(s) => Value::Str(s.clone()),
            Key::Tuple(items) => Value::Tuple(items.iter().map(Key::to_value).collect()),
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_string())
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Int(n)
    }
}

/// An arbitrary host object carried through the environment without
/// interpretation
///
/// Equality is identity: two opaque values are equal only when they wrap the
/// same allocation.
#[derive(Clone)]
pub struct OpaqueValue {
    label: String,
    inner: Rc<dyn Any>,
}

impl OpaqueValue {
    pub fn new<T: Any>(label: impl Into<String>, value: T) -> Self {
        Self {
            label: label.into(),
            inner: Rc::new(value),
        }
    }

    pub fn from_rc(label: impl Into<String>, inner: Rc<dyn Any>) -> Self {
        Self {
            label: label.into(),
            inner,
        }
    }

    /// Short description of the wrapped object, for display
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Borrow the wrapped object, if it is a `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }
}

impl PartialEq for OpaqueValue {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OpaqueValue(<{}>)", self.label)
    }
}

impl std::fmt::Display for OpaqueValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}>", self.label)
    }
}
