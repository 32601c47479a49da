use criterion::{criterion_group, criterion_main, Criterion};
use rand::Rng;
use stepwise_core::{Params, State, Value};
use stepwise_engine::{Model, Scheduler, Signals, Simulation, UpdateBlock};

fn sample_model() -> Model {
    let forage = UpdateBlock::new("forage")
        .decision("harvest", |ctx, rng| {
            let rate = ctx.params.f64("rate")?;
            let stock = ctx.state.f64("stock")?;
            Ok(Signals::new().with("take", stock * rate * rng.gen_range(0.5..1.5)))
        })
        .update("stock", |ctx, signals, _| {
            let stock = ctx.state.f64("stock")? + 2.0 - signals.f64_or("take", 0.0);
            Ok(("stock".into(), Value::Float(stock.max(0.0))))
        })
        .update("gathered", |ctx, signals, _| {
            let total = ctx.state.f64("gathered")? + signals.f64_or("take", 0.0);
            Ok(("gathered".into(), Value::Float(total)))
        });
    Model::new(
        State::from_pairs([("stock", 50.0), ("gathered", 0.0)]),
        vec![forage],
        Params::new().sweep("rate", [0.05, 0.1, 0.2]),
    )
    .unwrap()
}

fn bench_simulation(c: &mut Criterion) {
    let model = sample_model();
    let sequential = Simulation::new(model.clone(), 100, 8).with_seed(42);
    let parallel = Simulation::new(model, 100, 8)
        .with_seed(42)
        .with_scheduler(Scheduler::parallel(4));

    c.bench_function("simulation_sequential", |b| {
        b.iter(|| {
            let _ = sequential.run().unwrap();
        })
    });
    c.bench_function("simulation_parallel", |b| {
        b.iter(|| {
            let _ = parallel.run().unwrap();
        })
    });
}

criterion_group!(benches, bench_simulation);
criterion_main!(benches);
