//! Target-value expressions.
//!
//! A blueprint's `to` field is a JSON scalar:
//! - a literal number (or bool) is an absolute target,
//! - `"+=N"` means current + N,
//! - `"*=N"` means current * N (state modifiers multiply into N),
//! - `"reset"` / `"initial"` means the captured initial value for the
//!   property (resolved by the caller, which has the entity context),
//! - any other string is a non-numeric target taken verbatim; the consuming
//!   animation flips discretely at 50% progress instead of interpolating.
//!
//! Parsing is total: a malformed relative expression ("+=abc") degrades to a
//! verbatim text target rather than failing, so one bad blueprint entry can
//! never stall a trigger.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strata_api_core::Value;

#[derive(Clone, Debug, PartialEq)]
pub enum ValueExpr {
    /// Literal target value
    Absolute(Value),
    /// current + n
    Add(f32),
    /// current * n
    Mul(f32),
    /// Use the captured initial value (caller resolves)
    Reset,
    /// Non-numeric target, applied as a discrete flip
    Verbatim(String),
}

/// Result of resolving an expression against a current value.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolved {
    Value(Value),
    /// `reset`/`initial`: the caller substitutes the captured initial value.
    UseInitial,
}

impl ValueExpr {
    /// Parse an expression from a scalar value. Total; see module docs.
    pub fn parse(raw: &Value) -> Self {
        match raw {
            Value::Float(_) | Value::Bool(_) => ValueExpr::Absolute(raw.clone()),
            Value::Text(s) => Self::parse_str(s),
        }
    }

    fn parse_str(s: &str) -> Self {
        if s == "reset" || s == "initial" {
            return ValueExpr::Reset;
        }
        if let Some(rest) = s.strip_prefix("+=") {
            if let Ok(n) = rest.trim().parse::<f32>() {
                return ValueExpr::Add(n);
            }
            log::warn!("invalid relative expression '{s}', treating as text target");
            return ValueExpr::Verbatim(s.to_string());
        }
        if let Some(rest) = s.strip_prefix("*=") {
            if let Ok(n) = rest.trim().parse::<f32>() {
                return ValueExpr::Mul(n);
            }
            log::warn!("invalid relative expression '{s}', treating as text target");
            return ValueExpr::Verbatim(s.to_string());
        }
        if let Ok(n) = s.parse::<f32>() {
            return ValueExpr::Absolute(Value::Float(n));
        }
        ValueExpr::Verbatim(s.to_string())
    }

    /// Resolve against a current value. `multiplier` is a state-modifier
    /// factor applied to `*=` expressions only.
    pub fn resolve(&self, current: &Value, multiplier: Option<f32>) -> Resolved {
        match self {
            ValueExpr::Absolute(v) => Resolved::Value(v.clone()),
            ValueExpr::Add(n) => {
                let base = current.as_float().unwrap_or(0.0);
                Resolved::Value(Value::Float(base + n))
            }
            ValueExpr::Mul(n) => {
                let factor = n * multiplier.unwrap_or(1.0);
                let base = current.as_float().unwrap_or(0.0);
                Resolved::Value(Value::Float(base * factor))
            }
            ValueExpr::Reset => Resolved::UseInitial,
            ValueExpr::Verbatim(s) => Resolved::Value(Value::Text(s.clone())),
        }
    }
}

impl Serialize for ValueExpr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ValueExpr::Absolute(v) => v.serialize(serializer),
            ValueExpr::Add(n) => serializer.serialize_str(&format!("+={n}")),
            ValueExpr::Mul(n) => serializer.serialize_str(&format!("*={n}")),
            ValueExpr::Reset => serializer.serialize_str("reset"),
            ValueExpr::Verbatim(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for ValueExpr {
    fn deserialize<D>(deserializer: D) -> Result<ValueExpr, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(ValueExpr::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_f(expr: &ValueExpr, current: f32) -> f32 {
        match expr.resolve(&Value::Float(current), None) {
            Resolved::Value(Value::Float(v)) => v,
            other => panic!("expected float, got {other:?}"),
        }
    }

    #[test]
    fn relative_and_absolute_forms() {
        assert_eq!(resolve_f(&ValueExpr::parse(&Value::Text("*=2".into())), 5.0), 10.0);
        assert_eq!(resolve_f(&ValueExpr::parse(&Value::Text("+=3".into())), 5.0), 8.0);
        assert_eq!(resolve_f(&ValueExpr::parse(&Value::Float(7.0)), 5.0), 7.0);
    }

    #[test]
    fn reset_defers_to_caller() {
        let expr = ValueExpr::parse(&Value::Text("reset".into()));
        assert_eq!(expr.resolve(&Value::Float(5.0), None), Resolved::UseInitial);
        let expr = ValueExpr::parse(&Value::Text("initial".into()));
        assert_eq!(expr, ValueExpr::Reset);
    }

    #[test]
    fn modifier_multiplies_mul_only() {
        let mul = ValueExpr::parse(&Value::Text("*=2".into()));
        assert_eq!(
            mul.resolve(&Value::Float(5.0), Some(0.5)),
            Resolved::Value(Value::Float(5.0))
        );
        let add = ValueExpr::parse(&Value::Text("+=3".into()));
        assert_eq!(
            add.resolve(&Value::Float(5.0), Some(0.5)),
            Resolved::Value(Value::Float(8.0))
        );
    }

    #[test]
    fn non_numeric_strings_pass_through() {
        let expr = ValueExpr::parse(&Value::Text("#ff00aa".into()));
        assert_eq!(expr, ValueExpr::Verbatim("#ff00aa".into()));
        // Malformed relative expressions degrade to verbatim, never error.
        let expr = ValueExpr::parse(&Value::Text("+=abc".into()));
        assert_eq!(expr, ValueExpr::Verbatim("+=abc".into()));
    }

    #[test]
    fn numeric_string_is_absolute() {
        let expr = ValueExpr::parse(&Value::Text("0.25".into()));
        assert_eq!(expr, ValueExpr::Absolute(Value::Float(0.25)));
    }

    #[test]
    fn json_roundtrip() {
        let expr: ValueExpr = serde_json::from_str("\"+=0.1\"").unwrap();
        assert_eq!(expr, ValueExpr::Add(0.1));
        assert_eq!(serde_json::to_string(&expr).unwrap(), "\"+=0.1\"");
        let expr: ValueExpr = serde_json::from_str("0.6").unwrap();
        assert_eq!(expr, ValueExpr::Absolute(Value::Float(0.6)));
    }
}
