// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use trellis_dirty::{CycleHandling, DepGraph, PendingSet, drain_affected_sorted, drain_sorted};

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 32) as u32
    }

    fn gen_range_usize(&mut self, upper_exclusive: usize) -> usize {
        if upper_exclusive == 0 {
            return 0;
        }
        (self.next_u32() as usize) % upper_exclusive
    }
}

fn build_dag(n: u32, edges_per_node: u32, seed: u64) -> DepGraph<u32> {
    let mut graph = DepGraph::new();
    let mut rng = Lcg::new(seed);

    // Ensure a DAG by only adding edges `from -> to` where `to < from`.
    for from in 1..n {
        let out = edges_per_node.min(from);
        for _ in 0..out {
            let to = rng.gen_range_usize(from as usize) as u32;
            let _ = graph
                .add_dependency(from, to, CycleHandling::Allow)
                .expect("CycleHandling::Allow never errors");
        }
    }

    graph
}

fn bench_dirty(c: &mut Criterion) {
    let mut group = c.benchmark_group("trellis_dirty");
    group.sample_size(50);

    for &(n, edges_per_node) in &[
        (256_u32, 1_u32),
        (256_u32, 4_u32),
        (4_096_u32, 1_u32),
        (4_096_u32, 4_u32),
    ] {
        group.bench_function(format!("build_checked(n={n},e={edges_per_node})"), |b| {
            b.iter(|| {
                let mut graph = DepGraph::new();
                let mut rng = Lcg::new(0x7E11_0000_0000_0001);
                for from in 1..n {
                    for _ in 0..edges_per_node.min(from) {
                        let to = rng.gen_range_usize(from as usize) as u32;
                        let _ = graph.add_dependency(from, to, CycleHandling::Error);
                    }
                }
                black_box(graph);
            });
        });

        group.bench_function(
            format!("drain_affected_from_root(n={n},e={edges_per_node})"),
            |b| {
                let graph = build_dag(n, edges_per_node, 0x7E11_0000_0000_0002);
                b.iter_batched(
                    || {
                        let mut pending = PendingSet::new();
                        pending.mark(0_u32);
                        pending
                    },
                    |mut pending| {
                        let sum: u64 = drain_affected_sorted(&mut pending, &graph)
                            .fold(0_u64, |acc, k| acc + u64::from(k));
                        black_box(sum);
                    },
                    BatchSize::SmallInput,
                );
            },
        );

        group.bench_function(
            format!("drain_sorted_all_pending(n={n},e={edges_per_node})"),
            |b| {
                let graph = build_dag(n, edges_per_node, 0x7E11_0000_0000_0003);
                b.iter_batched(
                    || {
                        let mut pending = PendingSet::new();
                        for k in 0..n {
                            pending.mark(k);
                        }
                        pending
                    },
                    |mut pending| {
                        let sum: u64 = drain_sorted(&mut pending, &graph)
                            .fold(0_u64, |acc, k| acc + u64::from(k));
                        black_box(sum);
                    },
                    BatchSize::LargeInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_dirty);
criterion_main!(benches);
