//! Value: runtime parameter/property values.
//! All numeric values use f32.

use serde::{Deserialize, Serialize};

/// Lightweight kind enum for quick dispatch during interpolation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Float,
    Bool,
    Text,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    /// Scalar float (the only kind that interpolates continuously)
    Float(f32),

    /// Boolean (step-only)
    Bool(bool),

    /// Text / string; step-only for interpolation (colors, labels)
    Text(String),
}

impl Value {
    /// Return the coarse kind of this value.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
            Value::Text(_) => ValueKind::Text,
        }
    }

    /// Convenience constructor
    pub fn f(v: f32) -> Self {
        Value::Float(v)
    }

    /// Numeric view, if this value is a float.
    #[inline]
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// True when continuous interpolation applies (Float); Bool/Text step.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Float(_))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_json_forms() {
        let v: Value = serde_json::from_str("3.5").unwrap();
        assert_eq!(v, Value::Float(3.5));
        let v: Value = serde_json::from_str("true").unwrap();
        assert_eq!(v, Value::Bool(true));
        let v: Value = serde_json::from_str("\"#ff00aa\"").unwrap();
        assert_eq!(v, Value::Text("#ff00aa".into()));
    }

    #[test]
    fn kind_dispatch() {
        assert_eq!(Value::f(1.0).kind(), ValueKind::Float);
        assert!(!Value::Bool(false).is_numeric());
        assert_eq!(Value::f(2.0).as_float(), Some(2.0));
        assert_eq!(Value::Text("x".into()).as_float(), None);
    }
}
