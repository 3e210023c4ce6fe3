//! Canonical engine-document loader.
//!
//! One JSON document carries everything the engine consumes from static
//! configuration: parameter declarations, states, the navigation sequence,
//! blueprints, and state modifiers. All tables are keyed by string id and
//! loaded once at startup.
//!
//! `parse_engine_doc_json` parses and validates; validation failures are
//! load-time errors (a host concern), unlike runtime faults which warn and
//! no-op.

use serde::{Deserialize, Serialize};
use strata_api_core::Value;

use crate::blueprint::{Blueprint, StateModifier};
use crate::params::Constraints;
use crate::state::State;

/// One parameter declaration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ParameterDecl {
    pub name: String,
    pub value: Value,
    #[serde(flatten)]
    pub constraints: Constraints,
}

/// The full engine configuration document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EngineDoc {
    #[serde(default)]
    pub parameters: Vec<ParameterDecl>,
    #[serde(default)]
    pub states: Vec<State>,
    /// Navigation order for next/previous/cycle. Defaults to state order.
    #[serde(default)]
    pub sequence: Vec<String>,
    #[serde(default)]
    pub blueprints: Vec<Blueprint>,
    #[serde(default)]
    pub modifiers: Vec<StateModifier>,
}

/// Parse an engine document from JSON and validate basic invariants.
pub fn parse_engine_doc_json(s: &str) -> Result<EngineDoc, String> {
    let doc: EngineDoc = serde_json::from_str(s).map_err(|e| format!("parse error: {e}"))?;
    validate_doc(&doc)?;
    Ok(doc)
}

fn validate_doc(doc: &EngineDoc) -> Result<(), String> {
    for (i, p) in doc.parameters.iter().enumerate() {
        if p.name.is_empty() {
            return Err(format!("parameter #{i} has an empty name"));
        }
        if doc.parameters[..i].iter().any(|q| q.name == p.name) {
            return Err(format!("duplicate parameter '{}'", p.name));
        }
        if let (Some(min), Some(max)) = (p.constraints.min, p.constraints.max) {
            if min > max {
                return Err(format!("parameter '{}': min {min} > max {max}", p.name));
            }
        }
    }
    for (i, s) in doc.states.iter().enumerate() {
        if s.id.is_empty() {
            return Err(format!("state #{i} has an empty id"));
        }
        if doc.states[..i].iter().any(|q| q.id == s.id) {
            return Err(format!("duplicate state '{}'", s.id));
        }
    }
    for id in &doc.sequence {
        if !doc.states.iter().any(|s| &s.id == id) {
            return Err(format!("sequence references unknown state '{id}'"));
        }
    }
    for (i, b) in doc.blueprints.iter().enumerate() {
        if b.name.is_empty() {
            return Err(format!("blueprint #{i} has an empty name"));
        }
        if doc.blueprints[..i].iter().any(|q| q.name == b.name) {
            return Err(format!("duplicate blueprint '{}'", b.name));
        }
        if b.revert_on.is_some() && b.revert_reactions.is_empty() {
            return Err(format!(
                "blueprint '{}' declares revertOn without revertReactions",
                b.name
            ));
        }
        if b.revert_delay_ms < 0.0 {
            return Err(format!("blueprint '{}': negative revertDelayMs", b.name));
        }
    }
    for m in &doc.modifiers {
        if !doc.blueprints.iter().any(|b| b.name == m.blueprint) {
            return Err(format!(
                "modifier for state '{}' references unknown blueprint '{}'",
                m.state_id, m.blueprint
            ));
        }
        // Modifier state ids are not required to exist: states may be
        // provided by a later document. Unknown ids simply never match.
    }
    Ok(())
}
