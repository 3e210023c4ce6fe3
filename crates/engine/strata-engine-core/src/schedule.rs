//! AnimationScheduler: the queue of pending animations and the set of
//! in-flight ones, advanced once per tick.
//!
//! Tasks move queued -> running -> retired. A bounded batch of queued tasks
//! starts each tick; running tasks advance by the tick's dt, write their
//! interpolated value, and retire at progress 1. Tasks are processed in
//! enqueue order and two tasks on the same (target, property) pair both
//! execute: the last write in iteration order wins for that tick. There is
//! no de-duplication or merging.
//!
//! The state machine may cancel in-flight tasks when a full transition
//! takes over a property; cancelled tasks leave the property at its
//! last-written value.

use std::collections::VecDeque;

use strata_api_core::{PropertyKey, TargetRef, Value};

use crate::easing::{lerp_f32, Curve};
use crate::entity::EntityRegistry;
use crate::outputs::Outputs;
use crate::params::ParameterStore;

/// One scheduled, time-bounded property interpolation.
#[derive(Clone, Debug)]
pub struct AnimationTask {
    pub target: TargetRef,
    pub property: PropertyKey,
    pub from: Value,
    pub to: Value,
    pub curve: Curve,
    pub duration_ms: f32,
    pub elapsed_ms: f32,
}

impl AnimationTask {
    #[inline]
    fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (self.elapsed_ms / self.duration_ms).min(1.0)
    }

    /// Interpolated value at eased progress. Numeric pairs lerp; anything
    /// else flips discretely at 50% progress.
    fn value_at(&self, eased: f32) -> Value {
        match (&self.from, &self.to) {
            (Value::Float(a), Value::Float(b)) => Value::Float(lerp_f32(*a, *b, eased)),
            (from, to) => {
                if eased < 0.5 {
                    from.clone()
                } else {
                    to.clone()
                }
            }
        }
    }
}

#[derive(Debug)]
pub struct AnimationScheduler {
    queued: VecDeque<AnimationTask>,
    running: Vec<AnimationTask>,
    drain_per_tick: usize,
}

impl AnimationScheduler {
    pub fn new(drain_per_tick: usize) -> Self {
        Self {
            queued: VecDeque::new(),
            running: Vec::new(),
            drain_per_tick: drain_per_tick.max(1),
        }
    }

    pub fn enqueue(&mut self, task: AnimationTask) {
        self.queued.push_back(task);
    }

    /// Queued plus in-flight tasks (diagnostics).
    pub fn active_count(&self) -> usize {
        self.queued.len() + self.running.len()
    }

    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    /// Remove every task (queued or running) matching the predicate.
    /// Properties keep their last-written value; nothing snaps back.
    pub fn cancel_where(&mut self, pred: impl Fn(&AnimationTask) -> bool) -> usize {
        let before = self.active_count();
        self.queued.retain(|t| !pred(t));
        self.running.retain(|t| !pred(t));
        before - self.active_count()
    }

    /// Advance the scheduler by one tick.
    pub fn tick(
        &mut self,
        dt: f32,
        params: &mut ParameterStore,
        registry: &mut EntityRegistry,
        outputs: &mut Outputs,
    ) {
        // 1) Start a bounded batch of queued tasks, preserving enqueue order.
        for _ in 0..self.drain_per_tick {
            match self.queued.pop_front() {
                Some(t) => self.running.push(t),
                None => break,
            }
        }

        // 2) Advance and apply every running task, in order.
        let dt_ms = dt * 1000.0;
        for task in &mut self.running {
            task.elapsed_ms += dt_ms;
            let progress = task.progress();
            let eased = task.curve.eval(progress);
            let value = task.value_at(eased);
            apply_write(&task.target, &task.property, value, params, registry, outputs);
        }

        // 3) Retire completed tasks.
        self.running.retain(|t| t.progress() < 1.0);
    }
}

/// Route a write to its destination: parameter-convention properties go
/// through the shared store (global side effect); everything else goes to
/// the entity's own property table.
fn apply_write(
    target: &TargetRef,
    property: &PropertyKey,
    value: Value,
    params: &mut ParameterStore,
    registry: &mut EntityRegistry,
    outputs: &mut Outputs,
) {
    match property {
        PropertyKey::Param(name) => {
            params.set(name, value, outputs);
        }
        _ => match target {
            TargetRef::Entity(id) => registry.write(id, property.clone(), value, outputs),
            TargetRef::Global => {
                log::warn!(
                    "global target with non-parameter property '{property}' has no destination"
                );
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntitySeed;
    use crate::outputs::Change;
    use crate::params::Constraints;

    fn task(to: f32, duration_ms: f32) -> AnimationTask {
        AnimationTask {
            target: TargetRef::Entity("card-1".into()),
            property: PropertyKey::parse("opacity"),
            from: Value::Float(1.0),
            to: Value::Float(to),
            curve: Curve::Linear,
            duration_ms,
            elapsed_ms: 0.0,
        }
    }

    fn world() -> (ParameterStore, EntityRegistry, Outputs) {
        let mut params = ParameterStore::new();
        params.declare(
            "u_glow",
            Value::Float(0.0),
            Constraints {
                min: Some(0.0),
                max: Some(1.0),
                step: None,
            },
        );
        let mut reg = EntityRegistry::new();
        reg.register(EntitySeed {
            id: "card-1".into(),
            kind: "card".into(),
            parent: None,
            children: Vec::new(),
            siblings: Vec::new(),
            initial: Default::default(),
        });
        (params, reg, Outputs::default())
    }

    #[test]
    fn drain_is_bounded_per_tick() {
        let (mut params, mut reg, mut out) = world();
        let mut sched = AnimationScheduler::new(5);
        for _ in 0..8 {
            sched.enqueue(task(0.0, 1000.0));
        }
        sched.tick(0.016, &mut params, &mut reg, &mut out);
        assert_eq!(sched.running_count(), 5);
        sched.tick(0.016, &mut params, &mut reg, &mut out);
        assert_eq!(sched.running_count(), 8);
    }

    #[test]
    fn numeric_task_lerps_and_retires() {
        let (mut params, mut reg, mut out) = world();
        let mut sched = AnimationScheduler::new(5);
        sched.enqueue(task(0.0, 200.0));

        sched.tick(0.1, &mut params, &mut reg, &mut out);
        match out.changes.last() {
            Some(Change::EntityProperty { value: Value::Float(v), .. }) => {
                assert!((v - 0.5).abs() < 1e-5, "got {v}");
            }
            other => panic!("unexpected change {other:?}"),
        }

        sched.tick(0.1, &mut params, &mut reg, &mut out);
        match out.changes.last() {
            Some(Change::EntityProperty { value: Value::Float(v), .. }) => {
                assert_eq!(*v, 0.0);
            }
            other => panic!("unexpected change {other:?}"),
        }
        assert_eq!(sched.active_count(), 0);
    }

    #[test]
    fn text_task_flips_at_half_progress() {
        let (mut params, mut reg, mut out) = world();
        let mut sched = AnimationScheduler::new(5);
        sched.enqueue(AnimationTask {
            target: TargetRef::Entity("card-1".into()),
            property: PropertyKey::parse("accent"),
            from: Value::Text("#000000".into()),
            to: Value::Text("#ff00aa".into()),
            curve: Curve::Linear,
            duration_ms: 100.0,
            elapsed_ms: 0.0,
        });

        sched.tick(0.040, &mut params, &mut reg, &mut out);
        assert_eq!(
            reg.current_value("card-1", &PropertyKey::parse("accent")),
            Some(Value::Text("#000000".into()))
        );
        sched.tick(0.020, &mut params, &mut reg, &mut out);
        assert_eq!(
            reg.current_value("card-1", &PropertyKey::parse("accent")),
            Some(Value::Text("#ff00aa".into()))
        );
    }

    #[test]
    fn param_property_routes_through_store() {
        let (mut params, mut reg, mut out) = world();
        let mut sched = AnimationScheduler::new(5);
        sched.enqueue(AnimationTask {
            target: TargetRef::Global,
            property: PropertyKey::parse("u_glow"),
            from: Value::Float(0.0),
            to: Value::Float(4.0),
            curve: Curve::Linear,
            duration_ms: 100.0,
            elapsed_ms: 0.0,
        });
        sched.tick(0.2, &mut params, &mut reg, &mut out);
        // Clamped by the store's constraints on the way through.
        assert_eq!(params.get("u_glow"), Some(&Value::Float(1.0)));
    }

    #[test]
    fn same_property_tasks_both_run_last_write_wins() {
        let (mut params, mut reg, mut out) = world();
        let mut sched = AnimationScheduler::new(5);
        sched.enqueue(task(0.2, 100.0));
        sched.enqueue(task(0.8, 100.0));
        sched.tick(0.2, &mut params, &mut reg, &mut out);
        assert_eq!(
            reg.current_value("card-1", &PropertyKey::parse("opacity")),
            Some(Value::Float(0.8))
        );
    }

    #[test]
    fn cancelled_tasks_hold_last_value() {
        let (mut params, mut reg, mut out) = world();
        let mut sched = AnimationScheduler::new(5);
        sched.enqueue(task(0.0, 200.0));
        sched.tick(0.1, &mut params, &mut reg, &mut out);
        let removed = sched.cancel_where(|t| t.property == PropertyKey::parse("opacity"));
        assert_eq!(removed, 1);
        sched.tick(0.1, &mut params, &mut reg, &mut out);
        match reg.current_value("card-1", &PropertyKey::parse("opacity")) {
            Some(Value::Float(v)) => assert!((v - 0.5).abs() < 1e-5),
            other => panic!("unexpected {other:?}"),
        }
    }
}
