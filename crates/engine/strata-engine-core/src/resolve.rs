//! Relational target resolution: from a trigger's source entity and a
//! target-kind token to the concrete set of write destinations.

use serde::{Deserialize, Serialize};
use strata_api_core::{EntityId, TargetRef};

use crate::entity::EntityRegistry;

/// Relational target kind named by a reaction. JSON strings outside the
/// closed set deserialize to `Unknown`, which resolves to nothing (with a
/// warning) rather than failing the whole blueprint.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Subject,
    Parent,
    Siblings,
    Children,
    Ecosystem,
    Global,
    #[serde(other)]
    Unknown,
}

/// Resolve a target kind against the source entity's recorded relationships.
/// `global` ignores entity structure entirely and routes to the shared
/// parameter table.
pub fn resolve_targets(
    kind: TargetKind,
    source: Option<&EntityId>,
    registry: &EntityRegistry,
) -> Vec<TargetRef> {
    if kind == TargetKind::Global {
        return vec![TargetRef::Global];
    }
    if kind == TargetKind::Unknown {
        log::warn!("unknown relational target kind, resolving to no targets");
        return Vec::new();
    }
    let Some(source_id) = source else {
        log::warn!("relational target {kind:?} requires a source entity, resolving to no targets");
        return Vec::new();
    };
    let Some(record) = registry.get(source_id) else {
        log::warn!("source entity '{source_id}' is not registered, resolving to no targets");
        return Vec::new();
    };
    let rel = &record.relationships;
    let ids: Vec<&EntityId> = match kind {
        TargetKind::Subject => vec![&record.id],
        TargetKind::Parent => rel.parent.iter().collect(),
        TargetKind::Siblings => rel.siblings.iter().collect(),
        TargetKind::Children => rel.children.iter().collect(),
        TargetKind::Ecosystem => rel.ecosystem.iter().collect(),
        // Handled by the early returns above.
        TargetKind::Global | TargetKind::Unknown => Vec::new(),
    };
    ids.into_iter()
        .map(|id| TargetRef::Entity(id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntitySeed;

    fn registry_with_family() -> EntityRegistry {
        let mut reg = EntityRegistry::new();
        for id in ["card-2", "card-3"] {
            reg.register(EntitySeed {
                id: id.to_string(),
                kind: "card".into(),
                parent: None,
                children: Vec::new(),
                siblings: Vec::new(),
                initial: Default::default(),
            });
        }
        reg.register(EntitySeed {
            id: "card-1".into(),
            kind: "card".into(),
            parent: Some("deck".into()),
            children: vec!["badge-1".into()],
            siblings: vec!["card-2".into(), "card-3".into()],
            initial: Default::default(),
        });
        reg
    }

    #[test]
    fn table_matches_recorded_relationships() {
        let reg = registry_with_family();
        let src = "card-1".to_string();

        assert_eq!(
            resolve_targets(TargetKind::Subject, Some(&src), &reg),
            vec![TargetRef::Entity("card-1".into())]
        );
        assert_eq!(
            resolve_targets(TargetKind::Parent, Some(&src), &reg),
            vec![TargetRef::Entity("deck".into())]
        );
        assert_eq!(
            resolve_targets(TargetKind::Siblings, Some(&src), &reg),
            vec![
                TargetRef::Entity("card-2".into()),
                TargetRef::Entity("card-3".into())
            ]
        );
        assert_eq!(
            resolve_targets(TargetKind::Children, Some(&src), &reg),
            vec![TargetRef::Entity("badge-1".into())]
        );
        assert_eq!(
            resolve_targets(TargetKind::Ecosystem, Some(&src), &reg),
            vec![
                TargetRef::Entity("card-2".into()),
                TargetRef::Entity("card-3".into())
            ]
        );
    }

    #[test]
    fn global_ignores_entity_structure() {
        let reg = registry_with_family();
        let src = "card-1".to_string();
        assert_eq!(
            resolve_targets(TargetKind::Global, Some(&src), &reg),
            vec![TargetRef::Global]
        );
        assert_eq!(
            resolve_targets(TargetKind::Global, None, &reg),
            vec![TargetRef::Global]
        );
    }

    #[test]
    fn missing_parent_resolves_empty() {
        let reg = registry_with_family();
        let src = "card-2".to_string();
        assert!(resolve_targets(TargetKind::Parent, Some(&src), &reg).is_empty());
    }

    #[test]
    fn unknown_kind_resolves_empty_and_is_nonfatal() {
        let reg = registry_with_family();
        let kind: TargetKind = serde_json::from_str("\"everything\"").unwrap();
        assert_eq!(kind, TargetKind::Unknown);
        assert!(resolve_targets(kind, Some(&"card-1".to_string()), &reg).is_empty());
    }
}
