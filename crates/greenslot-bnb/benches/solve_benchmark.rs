// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use greenslot_bnb::{
    bnb::BnbSolver,
    branching::{chronological::ChronologicalBuilder, greedy::GreedyEmissionsBuilder},
    monitor::no_op::NoOperationMonitor,
};
use greenslot_model::{
    model::{Model, ModelBuilder},
    repository::{Repository, Strategy, TimeSlot},
};
use rand::{Rng, SeedableRng, rngs::StdRng};

type IntegerType = i64;

/// A day with a diurnal-looking carbon curve and four strategies trading
/// latency against error.
fn build_model(num_slots: usize, threshold: u32, seed: u64) -> Model<IntegerType> {
    let mut rng = StdRng::seed_from_u64(seed);
    let slots = (0..num_slots)
        .map(|t| {
            let carbon = 150 + rng.gen_range(0..250);
            let requests = 200 + rng.gen_range(0..800);
            TimeSlot::new(format!("{:02}:{:02}", t / 2, (t % 2) * 30), carbon, carbon, requests, requests)
        })
        .collect();
    let strategies = vec![
        Strategy::new("precise", 120, 0),
        Strategy::new("balanced", 80, 250),
        Strategy::new("fast", 45, 600),
        Strategy::new("fastest", 30, 1100),
    ];
    let repository = Repository::new(slots, strategies);

    ModelBuilder::new(&repository)
        .error_threshold(threshold)
        .build()
        .expect("benchmark model should build")
}

fn bench_builders(c: &mut Criterion) {
    let mut group = c.benchmark_group("bnb_solve");
    group.sample_size(20);

    for &num_slots in &[8usize, 12, 16] {
        let model = build_model(num_slots, 5, 42);

        group.bench_with_input(
            BenchmarkId::new("greedy", num_slots),
            &model,
            |b, model| {
                let mut solver = BnbSolver::preallocated(model.num_slots(), model.num_strategies());
                let mut builder = GreedyEmissionsBuilder::new();
                b.iter(|| {
                    let outcome = solver.solve(black_box(model), &mut builder, NoOperationMonitor::new());
                    black_box(outcome.statistics().nodes_explored)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("chronological", num_slots),
            &model,
            |b, model| {
                let mut solver = BnbSolver::preallocated(model.num_slots(), model.num_strategies());
                let mut builder = ChronologicalBuilder::new();
                b.iter(|| {
                    let outcome = solver.solve(black_box(model), &mut builder, NoOperationMonitor::new());
                    black_box(outcome.statistics().nodes_explored)
                });
            },
        );
    }

    group.finish();
}

fn bench_tie_enumeration(c: &mut Criterion) {
    let model = build_model(12, 8, 7);
    let mut group = c.benchmark_group("bnb_ties");
    group.sample_size(20);

    for enumerate_ties in [true, false] {
        group.bench_with_input(
            BenchmarkId::from_parameter(enumerate_ties),
            &enumerate_ties,
            |b, &enumerate_ties| {
                let mut solver = BnbSolver::new().with_tie_enumeration(enumerate_ties);
                let mut builder = GreedyEmissionsBuilder::new();
                b.iter(|| {
                    let outcome = solver.solve(black_box(&model), &mut builder, NoOperationMonitor::new());
                    black_box(outcome.statistics().solutions_found)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_builders, bench_tie_enumeration);
criterion_main!(benches);
