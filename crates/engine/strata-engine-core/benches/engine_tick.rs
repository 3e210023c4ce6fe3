use criterion::{black_box, criterion_group, criterion_main, Criterion};

use strata_engine_core::{
    engine::Engine,
    entity::EntitySeed,
    inputs::{Command, Inputs},
    state::NavigateOptions,
    stored_doc::parse_engine_doc_json,
    EngineConfig,
};

fn engine_with_fixture() -> Engine {
    let mut engine = Engine::new(EngineConfig::default());
    let doc_json = strata_test_fixtures::engine_doc_json("showroom").expect("fixture");
    engine.load_doc(parse_engine_doc_json(&doc_json).expect("doc should parse"));
    let seeds_json = strata_test_fixtures::entity_seeds_json("cards").expect("fixture");
    let seeds: Vec<EntitySeed> = serde_json::from_str(&seeds_json).expect("seeds should parse");
    for seed in seeds {
        engine.register_entity(seed);
    }
    engine
}

fn idle_tick_benchmark(c: &mut Criterion) {
    let mut engine = engine_with_fixture();
    c.bench_function("idle_tick", |b| {
        b.iter(|| {
            let outputs = engine.update(black_box(1.0 / 60.0), Inputs::default());
            black_box(outputs.changes.len())
        })
    });
}

fn transition_tick_benchmark(c: &mut Criterion) {
    let mut engine = engine_with_fixture();
    c.bench_function("transition_tick", |b| {
        b.iter(|| {
            if !engine.snapshot().is_transitioning {
                let mut inputs = Inputs::default();
                inputs.push(Command::CycleState);
                engine.update(0.0, inputs);
            }
            let outputs = engine.update(black_box(1.0 / 60.0), Inputs::default());
            black_box(outputs.changes.len())
        })
    });
}

fn trigger_tick_benchmark(c: &mut Criterion) {
    let mut engine = engine_with_fixture();
    engine.navigate_to("home", NavigateOptions::default());
    engine.update(1.0, Inputs::default());
    c.bench_function("hover_trigger_and_tick", |b| {
        b.iter(|| {
            let mut inputs = Inputs::default();
            inputs.push(Command::Trigger {
                blueprint: "cardHoverResponse".into(),
                source: Some("card-1".into()),
                payload: serde_json::Value::Null,
            });
            let outputs = engine.update(black_box(1.0 / 60.0), inputs);
            black_box(outputs.events.len())
        })
    });
}

criterion_group!(
    benches,
    idle_tick_benchmark,
    transition_tick_benchmark,
    trigger_tick_benchmark
);
criterion_main!(benches);
