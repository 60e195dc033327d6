//! # Wall Follow Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use host_if::eqpt::{Position, SensorFrame};
use nav_lib::wall_follow::{step, ControllerState, Params};

/// Number of ticks in the synthetic run.
const NUM_TICKS: usize = 1000;

fn wall_follow_benchmark(c: &mut Criterion) {
    // ---- Build a synthetic run ----

    // The right wall weaves in and out, with an obstacle appearing ahead every so often and the
    // robot slowly closing on the goal
    let frames: Vec<(SensorFrame, Position)> = (0..NUM_TICKS)
        .map(|i| {
            let t = i as f64 * 0.1;
            let wall = 30.0 + 20.0 * t.sin();
            let front = if i % 97 < 10 { 25.0 + (i % 97) as f64 * 5.0 } else { 200.0 };
            let right_back = if i % 211 < 5 { std::f64::NAN } else { wall + 2.0 };

            (
                SensorFrame::new([front, front + 10.0, front + 5.0, wall - 2.0, wall, right_back]),
                Position::new(t * 3.0, t * 2.0),
            )
        })
        .collect();

    let params = Params::default();

    c.bench_function("wall_follow::step", |b| {
        b.iter(|| {
            let mut state = ControllerState::default();
            for (frame, position) in frames.iter() {
                black_box(step(&params, &mut state, frame, position));
            }
        })
    });
}

criterion_group!(benches, wall_follow_benchmark);
criterion_main!(benches);
