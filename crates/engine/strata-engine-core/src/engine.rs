//! Engine: data ownership and public API.
//!
//! One Engine owns the parameter store, entity registry, scheduler,
//! blueprint executor, and state machine; everything is constructed once
//! and injected, never reached through ambient globals. Hosts call
//! `update(dt, inputs)` once per tick and apply the returned outputs.
//!
//! Within a tick the passes run in a fixed order: commands, revert
//! countdowns, scheduler, state machine. The state machine runs last so a
//! transition's writes override any in-flight reaction touching the same
//! parameter in the same tick.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strata_api_core::{EntityId, Value};

use crate::blueprint::{BlueprintExecutor, BlueprintLibrary, RevertTrigger};
use crate::config::EngineConfig;
use crate::entity::{EntityRegistry, EntitySeed};
use crate::inputs::{Command, Inputs};
use crate::outputs::Outputs;
use crate::params::ParameterStore;
use crate::schedule::AnimationScheduler;
use crate::state::{NavigateOptions, StateMachine};
use crate::stored_doc::EngineDoc;

/// Diagnostic snapshot for hosts (`getState` in the external contract).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub current_state_id: Option<String>,
    pub is_transitioning: bool,
    pub transition_progress: f32,
    pub parameters: BTreeMap<String, Value>,
}

/// Running counters for hosts (`getMetrics`).
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineMetrics {
    pub state_changes: u64,
    pub parameter_updates: u64,
    pub active_animations: usize,
}

#[derive(Debug)]
pub struct Engine {
    cfg: EngineConfig,
    params: ParameterStore,
    registry: EntityRegistry,
    scheduler: AnimationScheduler,
    executor: BlueprintExecutor,
    states: StateMachine,
    outputs: Outputs,
}

impl Engine {
    /// Create a new engine with the given config.
    pub fn new(cfg: EngineConfig) -> Self {
        Self {
            scheduler: AnimationScheduler::new(cfg.queue_drain_per_tick),
            executor: BlueprintExecutor::new(BlueprintLibrary::default()),
            states: StateMachine::new(cfg.history_capacity),
            outputs: Outputs::with_event_limit(cfg.max_events_per_tick),
            params: ParameterStore::new(),
            registry: EntityRegistry::new(),
            cfg,
        }
    }

    /// Load a configuration document: parameters, states, sequence,
    /// blueprints, modifiers. May be called more than once; later documents
    /// replace entries with the same id.
    pub fn load_doc(&mut self, doc: EngineDoc) {
        for p in doc.parameters {
            self.params.declare(&p.name, p.value, p.constraints);
        }
        for s in doc.states {
            self.states.insert(s);
        }
        if !doc.sequence.is_empty() {
            self.states.set_sequence(doc.sequence);
        }
        for b in doc.blueprints {
            self.executor.library_mut().insert(b);
        }
        for m in doc.modifiers {
            self.executor.library_mut().insert_modifier(m);
        }
    }

    /// Register an entity snapshot from the host's element directory.
    /// Relationship edges are captured once here and never re-derived.
    pub fn register_entity(&mut self, seed: EntitySeed) {
        self.registry.register(seed);
    }

    /// Execute a blueprint trigger immediately (the external
    /// `trigger(blueprintName, sourceEntityId, payload)` contract).
    pub fn trigger(&mut self, blueprint: &str, source: Option<&EntityId>) {
        let current = self.states.current_state_id().map(str::to_owned);
        self.executor.trigger(
            blueprint,
            source,
            current.as_deref(),
            &self.params,
            &self.registry,
            &mut self.scheduler,
            &self.cfg,
            &mut self.outputs,
        );
    }

    /// Begin a state transition (the external `navigateTo` contract).
    /// Returns false when the state is unknown or a transition is in flight.
    pub fn navigate_to(&mut self, state: &str, opts: NavigateOptions) -> bool {
        self.states.navigate_to(
            state,
            opts,
            &self.params,
            &self.registry,
            &mut self.scheduler,
            &self.cfg,
            &mut self.outputs,
        )
    }

    /// Arm pending reverts for a release/leave event on an entity.
    pub fn release(&mut self, entity: &EntityId, kind: RevertTrigger) {
        self.executor.release(entity, kind);
    }

    /// Step the engine by dt seconds with the given inputs, producing the
    /// tick's outputs. No error escapes this call; faults are logged and
    /// surfaced as `EngineEvent::Error`.
    pub fn update(&mut self, dt: f32, inputs: Inputs) -> &Outputs {
        self.outputs.clear();

        // 1) Apply commands in arrival order.
        for cmd in inputs.commands {
            match cmd {
                Command::Trigger {
                    blueprint, source, ..
                } => self.trigger(&blueprint, source.as_ref()),
                Command::NavigateTo {
                    state,
                    duration_ms,
                    curve,
                } => {
                    self.navigate_to(&state, NavigateOptions { duration_ms, curve });
                }
                Command::NavigateNext | Command::CycleState => {
                    self.states.navigate_next(
                        &self.params,
                        &self.registry,
                        &mut self.scheduler,
                        &self.cfg,
                        &mut self.outputs,
                    );
                }
                Command::NavigatePrevious => {
                    self.states.navigate_previous(
                        &self.params,
                        &self.registry,
                        &mut self.scheduler,
                        &self.cfg,
                        &mut self.outputs,
                    );
                }
                Command::Release { entity, kind } => self.executor.release(&entity, kind),
            }
        }

        // 2) Count down armed reverts; due ones enqueue their tasks now.
        let current = self.states.current_state_id().map(str::to_owned);
        self.executor.tick(
            dt,
            current.as_deref(),
            &self.params,
            &self.registry,
            &mut self.scheduler,
            &self.cfg,
            &mut self.outputs,
        );

        // 3) Reaction animations.
        self.scheduler
            .tick(dt, &mut self.params, &mut self.registry, &mut self.outputs);

        // 4) State transition last: authoritative over same-tick reaction
        // writes on shared parameters.
        self.states
            .tick(dt, &mut self.params, &mut self.registry, &mut self.outputs);

        &self.outputs
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            current_state_id: self.states.current_state_id().map(str::to_owned),
            is_transitioning: self.states.is_transitioning(),
            transition_progress: self.states.transition_progress(),
            parameters: self.params.get_all(),
        }
    }

    pub fn metrics(&self) -> EngineMetrics {
        EngineMetrics {
            state_changes: self.states.state_change_count(),
            parameter_updates: self.params.update_count(),
            active_animations: self.scheduler.active_count(),
        }
    }

    pub fn params(&self) -> &ParameterStore {
        &self.params
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn states(&self) -> &StateMachine {
        &self.states
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }
}
