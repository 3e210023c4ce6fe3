//! Output contracts from the engine.
//!
//! Outputs carry the typed value changes for this tick plus a separate list
//! of semantic events. Hosts apply `Change::Parameter` to every render
//! surface (shared uniforms) and `Change::EntityProperty` to one surface.

use serde::{Deserialize, Serialize};
use strata_api_core::{EntityId, PropertyKey, Value};

/// One applied mutation this tick. Typed per notification kind so hosts
/// never dispatch on string event names.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Change {
    /// A shared-parameter write, visible to every entity.
    Parameter { name: String, value: Value },
    /// An entity-local property write.
    EntityProperty {
        entity: EntityId,
        property: PropertyKey,
        value: Value,
    },
}

/// Discrete semantic signals emitted during stepping.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub enum EngineEvent {
    TransitionStarted {
        from: Option<String>,
        to: String,
    },
    TransitionCompleted {
        state: String,
    },
    /// Navigation attempted while a transition was in flight (or to an
    /// unknown state); the request was dropped, not queued.
    TransitionRejected {
        requested: String,
    },
    BlueprintTriggered {
        blueprint: String,
        tasks_enqueued: usize,
    },
    RevertExecuted {
        blueprint: String,
        entity: EntityId,
    },
    /// A caught, non-fatal failure (single reaction or command).
    Error {
        message: String,
    },
}

/// Outputs returned by Engine::update().
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub events: Vec<EngineEvent>,
    /// Events beyond this count are dropped for the remainder of the tick.
    #[serde(skip)]
    event_limit: usize,
}

impl Outputs {
    pub fn with_event_limit(limit: usize) -> Self {
        Self {
            changes: Vec::new(),
            events: Vec::new(),
            event_limit: limit,
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_change(&mut self, change: Change) {
        self.changes.push(change);
    }

    #[inline]
    pub fn push_event(&mut self, event: EngineEvent) {
        if self.event_limit == 0 || self.events.len() < self.event_limit {
            self.events.push(event);
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }
}
