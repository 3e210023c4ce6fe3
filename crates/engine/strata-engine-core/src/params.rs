//! ParameterStore: the single authoritative table of named parameters.
//!
//! Every write in the engine funnels through `set`, so clamping has one
//! point of truth. Writes to undeclared names warn and no-op; blueprints
//! may reference parameters optimistically.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use strata_api_core::Value;

use crate::outputs::{Change, Outputs};

/// Declared numeric bounds for a parameter. Values are clamped on write,
/// never rejected. `step` is advisory (UI granularity) and not enforced.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f32>,
}

impl Constraints {
    /// Pure clamp of a candidate numeric value into the declared bounds.
    #[inline]
    pub fn clamp(&self, v: f32) -> f32 {
        let v = match self.min {
            Some(min) => v.max(min),
            None => v,
        };
        match self.max {
            Some(max) => v.min(max),
            None => v,
        }
    }
}

#[derive(Clone, Debug)]
struct Parameter {
    value: Value,
    initial: Value,
    constraints: Constraints,
}

/// Authoritative parameter table. Constructed once and injected; there is
/// no ambient singleton.
#[derive(Debug, Default)]
pub struct ParameterStore {
    inner: HashMap<String, Parameter>,
    updates: u64,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a parameter with its default value and constraints.
    /// Re-declaring a name replaces it (config reload).
    pub fn declare(&mut self, name: &str, value: Value, constraints: Constraints) {
        let value = match value {
            Value::Float(v) => Value::Float(constraints.clamp(v)),
            other => other,
        };
        self.inner.insert(
            name.to_string(),
            Parameter {
                initial: value.clone(),
                value,
                constraints,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.inner.get(name).map(|p| &p.value)
    }

    /// The declared default, used to resolve `reset` expressions on
    /// global parameters.
    pub fn initial(&self, name: &str) -> Option<&Value> {
        self.inner.get(name).map(|p| &p.initial)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    /// Pure, side-effect-free clamp against a parameter's constraints.
    /// Unknown names return the input unchanged.
    pub fn constrain(&self, name: &str, v: f32) -> f32 {
        match self.inner.get(name) {
            Some(p) => p.constraints.clamp(v),
            None => v,
        }
    }

    /// Write a parameter. Applies the constraint clamp, records the change
    /// for the host, and returns the applied value. Unknown names warn and
    /// return None.
    pub fn set(&mut self, name: &str, value: Value, outputs: &mut Outputs) -> Option<Value> {
        let Some(p) = self.inner.get_mut(name) else {
            log::warn!("write to unknown parameter '{name}' ignored");
            return None;
        };
        let applied = match value {
            Value::Float(v) => Value::Float(p.constraints.clamp(v)),
            other => other,
        };
        p.value = applied.clone();
        self.updates += 1;
        outputs.push_change(Change::Parameter {
            name: name.to_string(),
            value: applied.clone(),
        });
        Some(applied)
    }

    /// Snapshot of all current values, in stable name order.
    pub fn get_all(&self) -> BTreeMap<String, Value> {
        self.inner
            .iter()
            .map(|(k, p)| (k.clone(), p.value.clone()))
            .collect()
    }

    /// Total committed writes since construction (diagnostics).
    pub fn update_count(&self) -> u64 {
        self.updates
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_value_is_clamped() {
        let mut store = ParameterStore::new();
        store.declare(
            "u_dimension",
            Value::Float(9.0),
            Constraints {
                min: Some(3.0),
                max: Some(5.0),
                step: None,
            },
        );
        assert_eq!(store.get("u_dimension"), Some(&Value::Float(5.0)));
    }

    #[test]
    fn set_clamps_and_records_change() {
        let mut store = ParameterStore::new();
        store.declare(
            "u_dimension",
            Value::Float(3.5),
            Constraints {
                min: Some(3.0),
                max: Some(5.0),
                step: None,
            },
        );
        let mut out = Outputs::default();
        let applied = store.set("u_dimension", Value::Float(99.0), &mut out);
        assert_eq!(applied, Some(Value::Float(5.0)));
        assert_eq!(
            out.changes,
            vec![Change::Parameter {
                name: "u_dimension".into(),
                value: Value::Float(5.0)
            }]
        );
        assert_eq!(store.update_count(), 1);
    }

    #[test]
    fn unknown_name_is_a_noop() {
        let mut store = ParameterStore::new();
        let mut out = Outputs::default();
        assert_eq!(store.set("u_missing", Value::Float(1.0), &mut out), None);
        assert!(out.is_empty());
        assert_eq!(store.constrain("u_missing", 42.0), 42.0);
    }

    #[test]
    fn constrain_is_pure() {
        let mut store = ParameterStore::new();
        store.declare(
            "u_glow",
            Value::Float(0.5),
            Constraints {
                min: Some(0.0),
                max: Some(1.0),
                step: None,
            },
        );
        assert_eq!(store.constrain("u_glow", -2.0), 0.0);
        assert_eq!(store.get("u_glow"), Some(&Value::Float(0.5)));
        assert_eq!(store.update_count(), 0);
    }
}
