//! Primitive types - Values, props and parameters.
//!
//! Props flow from the declarative tree into component constructors as an
//! ordered [`PropSet`] of dynamically typed [`Value`]s. Each registered
//! component declares its [`Param`]s; the registry checks a prop set against
//! them before construction.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::tree::Env;
use crate::error::BuildError;

// =============================================================================
// Value
// =============================================================================

/// A dynamically typed prop or binding value.
#[derive(Clone)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<Value>),
    /// Anything else, shared by reference.
    Any(Arc<dyn Any + Send + Sync>),
}

/// The type tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Str,
    Int,
    Float,
    Bool,
    List,
    Any,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Str => "string",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
            ValueKind::List => "list",
            ValueKind::Any => "opaque value",
        };
        f.write_str(name)
    }
}

impl Value {
    /// Wrap an arbitrary value.
    pub fn any<T: Any + Send + Sync>(value: T) -> Self {
        Value::Any(Arc::new(value))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Str(_) => ValueKind::Str,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
            Value::List(_) => ValueKind::List,
            Value::Any(_) => ValueKind::Any,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Any(value) => value.downcast_ref(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Any(a), Value::Any(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n:?}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::List(items) => f.debug_list().entries(items).finish(),
            Value::Any(_) => f.write_str("Any(..)"),
        }
    }
}

/// The text an expression slot shows for this value.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Any(_) => f.write_str("<opaque>"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

// =============================================================================
// Prop expressions
// =============================================================================

/// Computes a prop value from the binding environment.
pub type ComputeFn = Arc<dyn Fn(&Env) -> Value + Send + Sync>;

/// How a prop gets its value when the tree is materialized.
#[derive(Clone)]
pub enum PropExpr {
    /// A fixed value.
    Literal(Value),
    /// The value bound to a name (e.g. an iteration variable).
    Binding(String),
    /// Computed from the environment at build time.
    Computed(ComputeFn),
}

impl PropExpr {
    pub fn evaluate(&self, env: &Env) -> Result<Value, BuildError> {
        match self {
            PropExpr::Literal(value) => Ok(value.clone()),
            PropExpr::Binding(name) => env.get(name).cloned(),
            PropExpr::Computed(compute) => Ok(compute(env)),
        }
    }
}

impl From<Value> for PropExpr {
    fn from(value: Value) -> Self {
        PropExpr::Literal(value)
    }
}

impl fmt::Debug for PropExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropExpr::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            PropExpr::Binding(name) => f.debug_tuple("Binding").field(name).finish(),
            PropExpr::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

// =============================================================================
// Parameters and prop sets
// =============================================================================

/// One declared component parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub kind: ValueKind,
    pub required: bool,
}

impl Param {
    pub const fn required(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }

    /// Whether `value` satisfies this parameter. Ints widen to floats.
    pub fn accepts(&self, value: &Value) -> bool {
        value.kind() == self.kind || (self.kind == ValueKind::Float && value.kind() == ValueKind::Int)
    }
}

/// Ordered named props handed to a component constructor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropSet {
    entries: Vec<(String, Value)>,
}

impl PropSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a prop. A later insert of the same name replaces the earlier value
    /// in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Remove and return a prop.
    pub fn take(&mut self, name: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(existing, _)| existing == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn take_string(&mut self, name: &str) -> Option<String> {
        match self.take(name)? {
            Value::Str(s) => Some(s),
            other => Some(other.to_string()),
        }
    }

    pub fn take_int(&mut self, name: &str) -> Option<i64> {
        self.take(name).and_then(|value| value.as_int())
    }

    pub fn take_bool(&mut self, name: &str) -> Option<bool> {
        self.take(name).and_then(|value| value.as_bool())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check this set against declared parameters.
    ///
    /// Props are checked in order (unknown name, then type); missing
    /// required parameters are reported after that.
    pub fn validate(&self, component: &str, params: &[Param]) -> Result<(), BuildError> {
        for (name, value) in self.iter() {
            let Some(param) = params.iter().find(|param| param.name == name) else {
                return Err(BuildError::UnknownProp {
                    component: component.to_string(),
                    prop: name.to_string(),
                });
            };
            if !param.accepts(value) {
                return Err(BuildError::PropType {
                    component: component.to_string(),
                    prop: name.to_string(),
                    expected: param.kind,
                    found: value.kind(),
                });
            }
        }

        if let Some(missing) = params
            .iter()
            .find(|param| param.required && self.get(param.name).is_none())
        {
            return Err(BuildError::MissingProp {
                component: component.to_string(),
                prop: missing.name.to_string(),
            });
        }
        Ok(())
    }
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for PropSet {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut props = PropSet::new();
        for (name, value) in iter {
            props.insert(name, value);
        }
        props
    }
}
