//! Strata engine core (engine-agnostic)
//!
//! The single source of truth for shared render parameters, the
//! state-transition cross-fader, and the declarative
//! event -> relational-target -> animation pipeline. Hosts drive it with
//! `Engine::update(dt, inputs)` from their own loop and apply the returned
//! typed changes to their rendering layer.

pub mod blueprint;
pub mod config;
pub mod easing;
pub mod engine;
pub mod entity;
pub mod expr;
pub mod inputs;
pub mod outputs;
pub mod params;
pub mod resolve;
pub mod schedule;
pub mod state;
pub mod stored_doc;

// Re-exports for consumers (adapters)
pub use blueprint::{AnimSpec, Blueprint, BlueprintExecutor, Reaction, RevertTrigger, StateModifier};
pub use config::EngineConfig;
pub use easing::Curve;
pub use engine::{Engine, EngineMetrics, EngineSnapshot};
pub use entity::{EntityRecord, EntityRegistry, EntitySeed, Relationships};
pub use expr::{Resolved, ValueExpr};
pub use inputs::{Command, Inputs};
pub use outputs::{Change, EngineEvent, Outputs};
pub use params::{Constraints, ParameterStore};
pub use resolve::{resolve_targets, TargetKind};
pub use schedule::{AnimationScheduler, AnimationTask};
pub use state::{NavigateOptions, State, StateMachine};
pub use stored_doc::{parse_engine_doc_json, EngineDoc, ParameterDecl};
pub use strata_api_core::{CoreError, EntityId, LayoutField, PropertyKey, TargetRef, Value, ValueKind};
