// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use trellis_attr::{Attr, AttrGraph, AttrPath};

struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn gen_range_usize(&mut self, upper_exclusive: usize) -> usize {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((self.0 >> 32) as usize) % upper_exclusive.max(1)
    }
}

/// A chain `a0 <- a1 <- ... <- an` on one object, each step adding one.
fn build_chain(n: usize) -> (AttrGraph, Attr<u64>) {
    let mut graph = AttrGraph::new();
    let obj = graph.create_object("chain");
    let root = graph.add_attribute(obj, "a0", 0_u64).unwrap();
    for i in 1..=n {
        let prev = format!("a{}", i - 1);
        graph
            .declare(obj, &format!("a{i}"), &[AttrPath::own(&prev)], |inputs| {
                Ok(inputs.get::<u64>(0)? + 1)
            })
            .unwrap();
    }
    (graph, root)
}

/// `sources` source attributes feeding `rules` rules with `fan_in` random
/// inputs each, drawn from everything declared before.
fn build_dag(sources: usize, rules: usize, fan_in: usize, seed: u64) -> (AttrGraph, Attr<u64>) {
    let mut graph = AttrGraph::new();
    let obj = graph.create_object("dag");
    let mut rng = Lcg::new(seed);
    let mut names: Vec<String> = Vec::with_capacity(sources + rules);
    let mut first = None;
    for i in 0..sources {
        let name = format!("s{i}");
        let attr = graph.add_attribute(obj, &name, i as u64).unwrap();
        first.get_or_insert(attr);
        names.push(name);
    }
    for i in 0..rules {
        let deps: Vec<String> = (0..fan_in)
            .map(|_| names[rng.gen_range_usize(names.len())].clone())
            .collect();
        let paths: Vec<AttrPath<'_>> = deps.iter().map(|d| AttrPath::own(d)).collect();
        let name = format!("r{i}");
        graph
            .declare(obj, &name, &paths, |inputs| {
                let mut acc = 0_u64;
                for i in 0..inputs.len() {
                    acc = acc.wrapping_add(*inputs.get::<u64>(i)?);
                }
                Ok(acc)
            })
            .unwrap();
        names.push(name);
    }
    (graph, first.expect("at least one source"))
}

fn bench_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("trellis_attr");
    group.sample_size(50);

    for &n in &[64_usize, 1_024] {
        group.bench_function(format!("chain_set_and_flush(n={n})"), |b| {
            b.iter_batched(
                || build_chain(n),
                |(mut graph, root)| {
                    graph.set(root, 1).unwrap();
                    let report = graph.flush().unwrap();
                    black_box(report.recomputed());
                },
                BatchSize::LargeInput,
            );
        });
    }

    for &(sources, rules, fan_in) in &[(16_usize, 256_usize, 2_usize), (64, 2_048, 4)] {
        group.bench_function(
            format!("dag_set_and_flush(s={sources},r={rules},f={fan_in})"),
            |b| {
                b.iter_batched(
                    || build_dag(sources, rules, fan_in, 0x7E11_0000_0000_0010),
                    |(mut graph, source)| {
                        graph.set(source, 1_000).unwrap();
                        let report = graph.flush().unwrap();
                        black_box(report.changed().len());
                    },
                    BatchSize::LargeInput,
                );
            },
        );

        // Equal writes should cost a lookup and nothing else.
        group.bench_function(
            format!("dag_equal_write(s={sources},r={rules},f={fan_in})"),
            |b| {
                let (mut graph, source) = build_dag(sources, rules, fan_in, 0x7E11_0000_0000_0011);
                b.iter(|| {
                    let changed = graph.set(source, 0).unwrap();
                    black_box(graph.flush().unwrap().is_empty() && !changed);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_flush);
criterion_main!(benches);
