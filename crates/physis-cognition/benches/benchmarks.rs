//! Physis Performance Benchmarks
//!
//! Critical paths:
//! - Model prediction, cold and cached
//! - Planner search at each thinking depth
//! - Reachability search over the real simulator

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use physis_cognition::{Planner, PredictiveModel, ReachabilityValidator, SkillLibrary};
use physis_common::{Action, Rule, Simulator, State};
use physis_world::{PhysicsWorld, LAND_TASK};

fn informed_model() -> PredictiveModel {
    let mut model = PredictiveModel::default();
    model.learn_rule(Rule::Gravity { value: 0.3 });
    model.learn_rule(Rule::Friction { value: 0.95 });
    model
}

// ============ MODEL BENCHMARKS ============

fn bench_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("model");
    let state = State::new(0.0, 10.0, 25.0);

    group.bench_function("predict_cold", |b| {
        let mut model = informed_model();
        b.iter(|| {
            model.invalidate_cache();
            black_box(model.predict(black_box(&state), Action::PushRight))
        });
    });

    group.bench_function("predict_cached", |b| {
        let mut model = informed_model();
        model.predict(&state, Action::PushRight);
        b.iter(|| black_box(model.predict(black_box(&state), Action::PushRight)));
    });

    group.finish();
}

// ============ PLANNER BENCHMARKS ============

fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("planner");
    group.measurement_time(Duration::from_secs(10));

    let world = PhysicsWorld::new();
    let start = world.reset(LAND_TASK).unwrap();
    let goal = world.goal(LAND_TASK).unwrap();
    let planner = Planner::default();
    let skills = SkillLibrary::new();

    for depth in [5usize, 10, 15] {
        group.bench_with_input(BenchmarkId::new("landing", depth), &depth, |b, &depth| {
            b.iter(|| {
                let mut model = informed_model();
                black_box(planner.plan(&mut model, &skills, &start, &goal, depth))
            });
        });
    }

    group.finish();
}

// ============ REACHABILITY BENCHMARKS ============

fn bench_reachability(c: &mut Criterion) {
    let mut group = c.benchmark_group("reachability");
    group.sample_size(10);

    let validator = ReachabilityValidator::new(PhysicsWorld::new());
    for tol in [0.55f64, 0.50] {
        group.bench_with_input(BenchmarkId::new("landing", tol), &tol, |b, &tol| {
            b.iter(|| black_box(validator.check(LAND_TASK, 30, Some(tol), 250_000).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(model, bench_predict);
criterion_group!(planning, bench_plan);
criterion_group!(search, bench_reachability);

criterion_main!(model, planning, search);
