//! Entity records and the registry the core keeps over them.
//!
//! The host's element directory owns entity lifecycle and structure; the
//! core captures one read-only snapshot of the relationship edges at
//! registration time and never re-derives them. `current` is mutated only
//! by the scheduler and the state machine.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use strata_api_core::{EntityId, PropertyKey, PropertyMap, Value};

use crate::outputs::{Change, Outputs};

/// Relationship edges captured at registration.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Relationships {
    #[serde(default)]
    pub parent: Option<EntityId>,
    #[serde(default)]
    pub children: Vec<EntityId>,
    #[serde(default)]
    pub siblings: Vec<EntityId>,
    /// All other registered entities sharing this entity's kind.
    #[serde(default)]
    pub ecosystem: Vec<EntityId>,
}

/// Registration descriptor supplied by the host. Ecosystem edges are
/// computed by the registry, not supplied.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySeed {
    pub id: EntityId,
    pub kind: String,
    #[serde(default)]
    pub parent: Option<EntityId>,
    #[serde(default)]
    pub children: Vec<EntityId>,
    #[serde(default)]
    pub siblings: Vec<EntityId>,
    /// Initial property values (layout fields and custom properties).
    #[serde(default)]
    pub initial: HashMap<PropertyKey, Value>,
}

#[derive(Clone, Debug)]
pub struct EntityRecord {
    pub id: EntityId,
    pub kind: String,
    pub relationships: Relationships,
    pub initial: PropertyMap,
    pub current: PropertyMap,
}

/// Registry of registered entity snapshots.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    items: Vec<EntityRecord>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity. Ecosystem edges link every same-kind record in
    /// both directions at registration time; after that the edges are a
    /// frozen snapshot, never re-derived from later structural changes.
    /// Re-registering an id replaces its record wholesale.
    pub fn register(&mut self, seed: EntitySeed) {
        let ecosystem: Vec<EntityId> = self
            .items
            .iter()
            .filter(|r| r.kind == seed.kind && r.id != seed.id)
            .map(|r| r.id.clone())
            .collect();
        for r in self.items.iter_mut() {
            if r.kind == seed.kind
                && r.id != seed.id
                && !r.relationships.ecosystem.contains(&seed.id)
            {
                r.relationships.ecosystem.push(seed.id.clone());
            }
        }
        let record = EntityRecord {
            relationships: Relationships {
                parent: seed.parent,
                children: seed.children,
                siblings: seed.siblings,
                ecosystem,
            },
            initial: seed.initial.clone(),
            current: seed.initial,
            id: seed.id,
            kind: seed.kind,
        };
        if let Some(existing) = self.items.iter_mut().find(|r| r.id == record.id) {
            *existing = record;
        } else {
            self.items.push(record);
        }
    }

    pub fn get(&self, id: &str) -> Option<&EntityRecord> {
        self.items.iter().find(|r| r.id == id)
    }

    /// Current value of a property, falling back to the captured initial
    /// value when unset.
    pub fn current_value(&self, id: &str, key: &PropertyKey) -> Option<Value> {
        let record = self.get(id)?;
        record
            .current
            .get(key)
            .or_else(|| record.initial.get(key))
            .cloned()
    }

    pub fn initial_value(&self, id: &str, key: &PropertyKey) -> Option<Value> {
        self.get(id)?.initial.get(key).cloned()
    }

    /// Write an entity-local property and record the change for the host.
    /// Unknown entities warn and no-op.
    pub fn write(&mut self, id: &str, key: PropertyKey, value: Value, outputs: &mut Outputs) {
        let Some(record) = self.items.iter_mut().find(|r| r.id == id) else {
            log::warn!("property write to unknown entity '{id}' ignored");
            return;
        };
        record.current.insert(key.clone(), value.clone());
        outputs.push_change(Change::EntityProperty {
            entity: id.to_string(),
            property: key,
            value,
        });
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityRecord> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(id: &str, kind: &str) -> EntitySeed {
        EntitySeed {
            id: id.to_string(),
            kind: kind.to_string(),
            parent: None,
            children: Vec::new(),
            siblings: Vec::new(),
            initial: HashMap::new(),
        }
    }

    #[test]
    fn ecosystem_links_same_kind_both_directions() {
        let mut reg = EntityRegistry::new();
        reg.register(seed("card-1", "card"));
        reg.register(seed("card-2", "card"));
        reg.register(seed("panel-1", "panel"));
        reg.register(seed("card-3", "card"));

        let c3 = reg.get("card-3").unwrap();
        assert_eq!(c3.relationships.ecosystem, vec!["card-1", "card-2"]);
        // Registration order does not matter for ecosystem membership.
        let c1 = reg.get("card-1").unwrap();
        assert_eq!(c1.relationships.ecosystem, vec!["card-2", "card-3"]);
        // Different kinds never share an ecosystem.
        let p = reg.get("panel-1").unwrap();
        assert!(p.relationships.ecosystem.is_empty());
    }

    #[test]
    fn current_falls_back_to_initial() {
        let mut reg = EntityRegistry::new();
        let mut s = seed("card-1", "card");
        s.initial
            .insert(PropertyKey::parse("opacity"), Value::Float(1.0));
        reg.register(s);

        let key = PropertyKey::parse("opacity");
        assert_eq!(reg.current_value("card-1", &key), Some(Value::Float(1.0)));

        let mut out = Outputs::default();
        reg.write("card-1", key.clone(), Value::Float(0.6), &mut out);
        assert_eq!(reg.current_value("card-1", &key), Some(Value::Float(0.6)));
        assert_eq!(reg.initial_value("card-1", &key), Some(Value::Float(1.0)));
        assert_eq!(out.changes.len(), 1);
    }
}
