//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::easing::Curve;

/// Sizing and default-behavior knobs for the engine.
/// Keep this minimal; expand as needed without breaking API.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How many queued animation tasks may start per tick.
    pub queue_drain_per_tick: usize,

    /// Fallback for blueprint animation specs with a non-positive duration.
    pub default_anim_duration_ms: f32,

    /// Defaults applied when a navigation request omits them.
    pub default_transition_ms: f32,
    pub default_transition_curve: Curve,

    /// Completed-transition parameter snapshots retained (oldest evicted).
    pub history_capacity: usize,

    /// Maximum events retained per tick before further events are dropped.
    pub max_events_per_tick: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            queue_drain_per_tick: 5,
            default_anim_duration_ms: 300.0,
            default_transition_ms: 600.0,
            default_transition_curve: Curve::EaseInOut,
            history_capacity: 10,
            max_events_per_tick: 1024,
        }
    }
}
