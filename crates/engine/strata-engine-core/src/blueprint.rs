//! Blueprints: declarative trigger -> relational-target -> animation rules,
//! and the executor that turns a trigger into scheduled animation tasks.
//!
//! Failure semantics: each reaction is resolved independently. An error in
//! one reaction is caught, logged, and surfaced as an `EngineEvent::Error`;
//! the remaining reactions of the same blueprint still run. Partial
//! application is accepted behavior.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strata_api_core::{CoreError, EntityId, PropertyKey, TargetRef, Value};

use crate::config::EngineConfig;
use crate::easing::Curve;
use crate::entity::EntityRegistry;
use crate::expr::{Resolved, ValueExpr};
use crate::outputs::{EngineEvent, Outputs};
use crate::params::ParameterStore;
use crate::resolve::{resolve_targets, TargetKind};
use crate::schedule::{AnimationScheduler, AnimationTask};

fn default_duration_ms() -> f32 {
    300.0
}

/// How one property moves: target expression, curve, duration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnimSpec {
    pub to: ValueExpr,
    #[serde(default)]
    pub curve: Curve,
    #[serde(default = "default_duration_ms")]
    pub duration_ms: f32,
}

/// One blueprint clause: a relational target kind and the property
/// animations applied to every resolved entity.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Reaction {
    pub target: TargetKind,
    pub animation: BTreeMap<PropertyKey, AnimSpec>,
}

/// When a blueprint's revert reactions run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RevertTrigger {
    OnRelease,
    OnLeave,
}

/// Declarative trigger->reactions rule. Immutable once loaded; a running
/// execution never mutates it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    pub name: String,
    /// Raw input trigger this blueprint is mapped from (informational; the
    /// event source delivers triggers already mapped to blueprint names).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    pub reactions: Vec<Reaction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revert_on: Option<RevertTrigger>,
    #[serde(default)]
    pub revert_delay_ms: f32,
    #[serde(default)]
    pub revert_reactions: Vec<Reaction>,
}

/// Per-state adjustment of a blueprint's `*=` targets.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StateModifier {
    pub state_id: String,
    pub blueprint: String,
    pub parameter_multipliers: BTreeMap<PropertyKey, f32>,
}

/// Blueprint and modifier storage.
#[derive(Debug, Default)]
pub struct BlueprintLibrary {
    items: Vec<Blueprint>,
    modifiers: Vec<StateModifier>,
}

impl BlueprintLibrary {
    pub fn insert(&mut self, blueprint: Blueprint) {
        if let Some(existing) = self.items.iter_mut().find(|b| b.name == blueprint.name) {
            *existing = blueprint;
        } else {
            self.items.push(blueprint);
        }
    }

    pub fn insert_modifier(&mut self, modifier: StateModifier) {
        self.modifiers.push(modifier);
    }

    pub fn get(&self, name: &str) -> Option<&Blueprint> {
        self.items.iter().find(|b| b.name == name)
    }

    fn modifier_for(&self, state_id: Option<&str>, blueprint: &str) -> Option<&StateModifier> {
        let state_id = state_id?;
        self.modifiers
            .iter()
            .find(|m| m.state_id == state_id && m.blueprint == blueprint)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A revert waiting for its release/leave event, then for its delay.
#[derive(Debug)]
struct PendingRevert {
    blueprint: String,
    source: EntityId,
    trigger: RevertTrigger,
    delay_ms: f32,
    /// None until the release event arrives; then the remaining delay.
    remaining_ms: Option<f32>,
}

/// Executes triggers against the blueprint library.
#[derive(Debug, Default)]
pub struct BlueprintExecutor {
    lib: BlueprintLibrary,
    pending: Vec<PendingRevert>,
}

impl BlueprintExecutor {
    pub fn new(lib: BlueprintLibrary) -> Self {
        Self {
            lib,
            pending: Vec::new(),
        }
    }

    pub fn library(&self) -> &BlueprintLibrary {
        &self.lib
    }

    pub fn library_mut(&mut self) -> &mut BlueprintLibrary {
        &mut self.lib
    }

    /// Execute a blueprint trigger: look it up, apply the current state's
    /// modifier, resolve each reaction's relational targets, and enqueue
    /// animation tasks. Unknown blueprints warn and no-op.
    #[allow(clippy::too_many_arguments)]
    pub fn trigger(
        &mut self,
        name: &str,
        source: Option<&EntityId>,
        current_state: Option<&str>,
        params: &ParameterStore,
        registry: &EntityRegistry,
        scheduler: &mut AnimationScheduler,
        cfg: &EngineConfig,
        outputs: &mut Outputs,
    ) {
        let Some(blueprint) = self.lib.get(name) else {
            log::warn!("trigger for unknown blueprint '{name}' ignored");
            return;
        };
        let modifier = self.lib.modifier_for(current_state, name);

        let mut enqueued = 0usize;
        for reaction in &blueprint.reactions {
            match run_reaction(reaction, source, modifier, params, registry, scheduler, cfg) {
                Ok(n) => enqueued += n,
                Err(err) => {
                    log::warn!("blueprint '{name}' reaction failed: {err}");
                    outputs.push_event(EngineEvent::Error {
                        message: format!("blueprint '{name}': {err}"),
                    });
                }
            }
        }
        outputs.push_event(EngineEvent::BlueprintTriggered {
            blueprint: name.to_string(),
            tasks_enqueued: enqueued,
        });

        // Register a one-shot revert when declared and we have a subject.
        if let (Some(revert_on), Some(source_id)) = (blueprint.revert_on, source) {
            let delay_ms = blueprint.revert_delay_ms;
            let blueprint_name = blueprint.name.clone();
            self.pending
                .retain(|p| !(p.blueprint == blueprint_name && p.source == *source_id));
            self.pending.push(PendingRevert {
                blueprint: blueprint_name,
                source: source_id.clone(),
                trigger: revert_on,
                delay_ms,
                remaining_ms: None,
            });
        }
    }

    /// Arm pending reverts matching a release/leave event on an entity.
    pub fn release(&mut self, entity: &EntityId, kind: RevertTrigger) {
        for p in &mut self.pending {
            if p.source == *entity && p.trigger == kind && p.remaining_ms.is_none() {
                p.remaining_ms = Some(p.delay_ms);
            }
        }
    }

    /// Count down armed reverts and execute those whose delay elapsed.
    #[allow(clippy::too_many_arguments)]
    pub fn tick(
        &mut self,
        dt: f32,
        current_state: Option<&str>,
        params: &ParameterStore,
        registry: &EntityRegistry,
        scheduler: &mut AnimationScheduler,
        cfg: &EngineConfig,
        outputs: &mut Outputs,
    ) {
        let dt_ms = dt * 1000.0;
        let mut due: Vec<(String, EntityId)> = Vec::new();
        for p in &mut self.pending {
            if let Some(rem) = p.remaining_ms.as_mut() {
                *rem -= dt_ms;
                if *rem <= 0.0 {
                    due.push((p.blueprint.clone(), p.source.clone()));
                }
            }
        }
        self.pending
            .retain(|p| !matches!(p.remaining_ms, Some(rem) if rem <= 0.0));

        for (name, source) in due {
            let Some(blueprint) = self.lib.get(&name) else {
                continue;
            };
            let modifier = self.lib.modifier_for(current_state, &name);
            for reaction in &blueprint.revert_reactions {
                if let Err(err) = run_reaction(
                    reaction,
                    Some(&source),
                    modifier,
                    params,
                    registry,
                    scheduler,
                    cfg,
                ) {
                    log::warn!("blueprint '{name}' revert reaction failed: {err}");
                    outputs.push_event(EngineEvent::Error {
                        message: format!("blueprint '{name}' revert: {err}"),
                    });
                }
            }
            outputs.push_event(EngineEvent::RevertExecuted {
                blueprint: name,
                entity: source,
            });
        }
    }

    /// Reverts waiting on a release or delay (diagnostics).
    pub fn pending_reverts(&self) -> usize {
        self.pending.len()
    }
}

/// Resolve one reaction: relational targets, current values, target
/// expressions, then task enqueue. Returns the number of tasks created.
fn run_reaction(
    reaction: &Reaction,
    source: Option<&EntityId>,
    modifier: Option<&StateModifier>,
    params: &ParameterStore,
    registry: &EntityRegistry,
    scheduler: &mut AnimationScheduler,
    cfg: &EngineConfig,
) -> Result<usize, CoreError> {
    let targets = resolve_targets(reaction.target, source, registry);
    let mut enqueued = 0usize;

    for target in &targets {
        for (property, spec) in &reaction.animation {
            // Current value: parameters read from the store, entity
            // properties from the entity's current snapshot (falling back
            // to its initial snapshot, then to a neutral zero).
            let current = match (property, target) {
                (PropertyKey::Param(name), _) => match params.get(name) {
                    Some(v) => v.clone(),
                    None => {
                        log::warn!("blueprint references unknown parameter '{name}', skipping");
                        continue;
                    }
                },
                (_, TargetRef::Entity(id)) => match registry.current_value(id, property) {
                    Some(v) => v,
                    None => {
                        log::warn!(
                            "entity '{id}' has no recorded value for '{property}', animating from 0"
                        );
                        Value::Float(0.0)
                    }
                },
                (_, TargetRef::Global) => {
                    return Err(CoreError::InvalidExpression(format!(
                        "global reaction cannot animate entity property '{property}'"
                    )));
                }
            };

            let multiplier = modifier.and_then(|m| m.parameter_multipliers.get(property).copied());
            let to = match spec.to.resolve(&current, multiplier) {
                Resolved::Value(v) => v,
                Resolved::UseInitial => {
                    let initial = match (property, target) {
                        (PropertyKey::Param(name), _) => params.initial(name).cloned(),
                        (_, TargetRef::Entity(id)) => registry.initial_value(id, property),
                        (_, TargetRef::Global) => None,
                    };
                    match initial {
                        Some(v) => v,
                        None => {
                            log::warn!(
                                "no initial value for '{property}' on {target}, skipping reset"
                            );
                            continue;
                        }
                    }
                }
            };

            scheduler.enqueue(AnimationTask {
                target: target.clone(),
                property: property.clone(),
                from: current,
                to,
                curve: spec.curve,
                duration_ms: if spec.duration_ms > 0.0 {
                    spec.duration_ms
                } else {
                    cfg.default_anim_duration_ms
                },
                elapsed_ms: 0.0,
            });
            enqueued += 1;
        }
    }

    Ok(enqueued)
}
