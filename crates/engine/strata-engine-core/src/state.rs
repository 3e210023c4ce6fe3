//! StateMachine: named states and the exclusive timed cross-fade between
//! them.
//!
//! At most one transition is in flight; a navigation request during a
//! transition is rejected, not queued. A transition captures start/target
//! snapshots of every parameter and every tracked entity-layout field, then
//! drives eased interpolation each tick. On completion it performs exact
//! final writes (no floating-point drift) and snapshots the resulting
//! parameter set into a bounded history ring.
//!
//! The engine ticks the state machine after the scheduler, so transition
//! writes are authoritative when both touch the same parameter in a tick.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use strata_api_core::{EntityId, LayoutField, PropertyKey, TargetRef, Value};

use crate::config::EngineConfig;
use crate::easing::{lerp_f32, Curve};
use crate::entity::EntityRegistry;
use crate::outputs::{EngineEvent, Outputs};
use crate::params::ParameterStore;
use crate::schedule::AnimationScheduler;

/// A named bundle of parameter overrides and entity-layout targets.
/// Immutable once loaded.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub id: String,
    #[serde(default)]
    pub parameter_overrides: BTreeMap<String, Value>,
    #[serde(default)]
    pub entity_layout: BTreeMap<EntityId, BTreeMap<LayoutField, Value>>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Options for a navigation request; unset fields use engine defaults.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateOptions {
    #[serde(default)]
    pub duration_ms: Option<f32>,
    #[serde(default)]
    pub curve: Option<Curve>,
}

/// The in-flight cross-fade. Ephemeral; destroyed at progress 1.
#[derive(Debug)]
struct Transition {
    from: Option<String>,
    to: String,
    elapsed_ms: f32,
    duration_ms: f32,
    curve: Curve,
    start_params: BTreeMap<String, Value>,
    target_params: BTreeMap<String, Value>,
    start_layout: BTreeMap<(EntityId, LayoutField), Value>,
    target_layout: BTreeMap<(EntityId, LayoutField), Value>,
}

impl Transition {
    fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (self.elapsed_ms / self.duration_ms).min(1.0)
    }
}

#[derive(Debug, Default)]
pub struct StateMachine {
    states: Vec<State>,
    /// Navigation order for next/previous/cycle (config order).
    sequence: Vec<String>,
    current: Option<String>,
    previous: Option<String>,
    transition: Option<Transition>,
    /// Parameter snapshots of completed transitions, oldest first.
    history: VecDeque<BTreeMap<String, Value>>,
    history_capacity: usize,
    state_changes: u64,
}

impl StateMachine {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            history_capacity,
            ..Self::default()
        }
    }

    /// Load a state definition. Sequence order follows load order unless a
    /// sequence is set explicitly.
    pub fn insert(&mut self, state: State) {
        if !self.sequence.contains(&state.id) {
            self.sequence.push(state.id.clone());
        }
        if let Some(existing) = self.states.iter_mut().find(|s| s.id == state.id) {
            *existing = state;
        } else {
            self.states.push(state);
        }
    }

    /// Replace the navigation sequence. Ids not matching a loaded state are
    /// dropped with a warning.
    pub fn set_sequence(&mut self, ids: Vec<String>) {
        let mut seq = Vec::with_capacity(ids.len());
        for id in ids {
            if self.states.iter().any(|s| s.id == id) {
                seq.push(id);
            } else {
                log::warn!("sequence references unknown state '{id}', dropped");
            }
        }
        self.sequence = seq;
    }

    pub fn get(&self, id: &str) -> Option<&State> {
        self.states.iter().find(|s| s.id == id)
    }

    pub fn current_state_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn previous_state_id(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Progress of the active transition, 0 when idle.
    pub fn transition_progress(&self) -> f32 {
        self.transition.as_ref().map_or(0.0, |t| t.progress())
    }

    /// Completed transitions recorded (diagnostics).
    pub fn state_change_count(&self) -> u64 {
        self.state_changes
    }

    pub fn history(&self) -> &VecDeque<BTreeMap<String, Value>> {
        &self.history
    }

    /// Begin a timed cross-fade to `target_id`. Returns false (warning, no
    /// state change) when the state is unknown or a transition is already
    /// in flight; concurrent requests are rejected, never queued.
    pub fn navigate_to(
        &mut self,
        target_id: &str,
        opts: NavigateOptions,
        params: &ParameterStore,
        registry: &EntityRegistry,
        scheduler: &mut AnimationScheduler,
        cfg: &EngineConfig,
        outputs: &mut Outputs,
    ) -> bool {
        if self.transition.is_some() {
            log::warn!("navigation to '{target_id}' rejected: transition in progress");
            outputs.push_event(EngineEvent::TransitionRejected {
                requested: target_id.to_string(),
            });
            return false;
        }
        let Some(target) = self.states.iter().find(|s| s.id == target_id) else {
            log::warn!("navigation to unknown state '{target_id}' ignored");
            outputs.push_event(EngineEvent::TransitionRejected {
                requested: target_id.to_string(),
            });
            return false;
        };

        // Start snapshot: every parameter entry. Target: start merged with
        // the state's overrides (unknown override names warn and drop).
        let start_params = params.get_all();
        let mut target_params = start_params.clone();
        for (name, value) in &target.parameter_overrides {
            if start_params.contains_key(name) {
                target_params.insert(name.clone(), value.clone());
            } else {
                log::warn!("state '{target_id}' overrides unknown parameter '{name}', dropped");
            }
        }

        // Layout snapshots for every entity the target state tracks.
        let mut start_layout = BTreeMap::new();
        let mut target_layout = BTreeMap::new();
        for (entity, fields) in &target.entity_layout {
            if registry.get(entity).is_none() {
                log::warn!("state '{target_id}' lays out unregistered entity '{entity}', dropped");
                continue;
            }
            for (field, value) in fields {
                let key = PropertyKey::Field(*field);
                let from = registry
                    .current_value(entity, &key)
                    .unwrap_or_else(|| value.clone());
                start_layout.insert((entity.clone(), *field), from);
                target_layout.insert((entity.clone(), *field), value.clone());
            }
        }

        // A full transition takes priority over in-flight reactions: cancel
        // every parameter task and the layout tasks this transition drives.
        scheduler.cancel_where(|task| match &task.property {
            PropertyKey::Param(_) => true,
            PropertyKey::Field(field) => match &task.target {
                TargetRef::Entity(id) => target_layout.contains_key(&(id.clone(), *field)),
                TargetRef::Global => false,
            },
            PropertyKey::Custom(_) => false,
        });

        outputs.push_event(EngineEvent::TransitionStarted {
            from: self.current.clone(),
            to: target_id.to_string(),
        });
        self.transition = Some(Transition {
            from: self.current.clone(),
            to: target_id.to_string(),
            elapsed_ms: 0.0,
            duration_ms: opts.duration_ms.unwrap_or(cfg.default_transition_ms),
            curve: opts.curve.unwrap_or(cfg.default_transition_curve),
            start_params,
            target_params,
            start_layout,
            target_layout,
        });
        true
    }

    /// Navigate along the configured sequence.
    pub fn navigate_next(
        &mut self,
        params: &ParameterStore,
        registry: &EntityRegistry,
        scheduler: &mut AnimationScheduler,
        cfg: &EngineConfig,
        outputs: &mut Outputs,
    ) -> bool {
        self.navigate_step(1, params, registry, scheduler, cfg, outputs)
    }

    pub fn navigate_previous(
        &mut self,
        params: &ParameterStore,
        registry: &EntityRegistry,
        scheduler: &mut AnimationScheduler,
        cfg: &EngineConfig,
        outputs: &mut Outputs,
    ) -> bool {
        self.navigate_step(-1, params, registry, scheduler, cfg, outputs)
    }

    fn navigate_step(
        &mut self,
        step: i64,
        params: &ParameterStore,
        registry: &EntityRegistry,
        scheduler: &mut AnimationScheduler,
        cfg: &EngineConfig,
        outputs: &mut Outputs,
    ) -> bool {
        if self.sequence.is_empty() {
            log::warn!("sequence navigation with no configured state sequence");
            return false;
        }
        let len = self.sequence.len() as i64;
        let idx = self
            .current
            .as_ref()
            .and_then(|c| self.sequence.iter().position(|id| id == c))
            .map(|i| i as i64)
            .unwrap_or(-step);
        let next = (idx + step).rem_euclid(len) as usize;
        let target = self.sequence[next].clone();
        self.navigate_to(&target, NavigateOptions::default(), params, registry, scheduler, cfg, outputs)
    }

    /// Advance the active transition, interpolating every captured
    /// parameter and layout field.
    pub fn tick(
        &mut self,
        dt: f32,
        params: &mut ParameterStore,
        registry: &mut EntityRegistry,
        outputs: &mut Outputs,
    ) {
        let Some(tr) = self.transition.as_mut() else {
            return;
        };
        tr.elapsed_ms += dt * 1000.0;
        let progress = tr.progress();
        let done = progress >= 1.0;
        let eased = tr.curve.eval(progress);

        for (name, from) in &tr.start_params {
            let Some(to) = tr.target_params.get(name) else {
                continue;
            };
            // Exact final write: take the target value itself at the end.
            let value = if done {
                to.clone()
            } else {
                interpolate(from, to, eased)
            };
            params.set(name, value, outputs);
        }
        for ((entity, field), from) in &tr.start_layout {
            let Some(to) = tr.target_layout.get(&(entity.clone(), *field)) else {
                continue;
            };
            let value = if done {
                to.clone()
            } else {
                interpolate(from, to, eased)
            };
            registry.write(entity, PropertyKey::Field(*field), value, outputs);
        }

        if done {
            let completed = self.transition.take();
            if let Some(tr) = completed {
                self.previous = tr.from;
                self.current = Some(tr.to.clone());
                self.state_changes += 1;
                self.push_history(params.get_all());
                outputs.push_event(EngineEvent::TransitionCompleted { state: tr.to });
            }
        }
    }

    fn push_history(&mut self, snapshot: BTreeMap<String, Value>) {
        self.history.push_back(snapshot);
        while self.history.len() > self.history_capacity.max(1) {
            self.history.pop_front();
        }
    }
}

/// Numeric pairs lerp; anything else flips discretely at 50% progress.
fn interpolate(from: &Value, to: &Value, eased: f32) -> Value {
    match (from, to) {
        (Value::Float(a), Value::Float(b)) => Value::Float(lerp_f32(*a, *b, eased)),
        _ => {
            if eased < 0.5 {
                from.clone()
            } else {
                to.clone()
            }
        }
    }
}
