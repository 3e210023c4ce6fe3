//! Input contracts for the engine.
//!
//! The event source delivers raw occurrences already mapped to blueprint
//! names / navigation requests; hosts batch them into `Inputs` and pass
//! them to Engine::update() each tick.

use serde::{Deserialize, Serialize};
use strata_api_core::EntityId;

use crate::blueprint::RevertTrigger;
use crate::easing::Curve;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Inputs {
    /// Commands applied, in order, before stepping.
    #[serde(default)]
    pub commands: Vec<Command>,
}

impl Inputs {
    pub fn push(&mut self, cmd: Command) {
        self.commands.push(cmd);
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    /// Fine-grained reaction trigger (pointer, keyboard, timer).
    Trigger {
        blueprint: String,
        #[serde(default)]
        source: Option<EntityId>,
        /// Opaque host payload; the core does not interpret it.
        #[serde(default)]
        payload: serde_json::Value,
    },
    /// Coarse-grained navigation to a named state.
    NavigateTo {
        state: String,
        #[serde(default)]
        duration_ms: Option<f32>,
        #[serde(default)]
        curve: Option<Curve>,
    },
    NavigateNext,
    NavigatePrevious,
    CycleState,
    /// Release/leave event arming a blueprint's pending revert.
    Release {
        entity: EntityId,
        kind: RevertTrigger,
    },
}
