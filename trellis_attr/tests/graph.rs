// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `trellis_attr` crate.
//!
//! These exercise propagation through `AttrGraph`: ordering, coalescing,
//! equality gating, cycle rejection, reference rewiring and rule failures.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use trellis_attr::{AttrGraph, AttrPath, CycleHandling, Error, ObjectId, RuleError};

/// Shared log of which rules ran, in order.
#[derive(Clone, Default)]
struct RunLog(Arc<Mutex<Vec<&'static str>>>);

impl RunLog {
    fn record(&self, name: &'static str) {
        self.0.lock().unwrap().push(name);
    }

    fn take(&self) -> Vec<&'static str> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

/// Declares `name = sum(deps) + 1` on `object`, logging each run.
fn plus_one(graph: &mut AttrGraph, log: &RunLog, object: ObjectId, name: &'static str, deps: &[&str]) {
    let paths: Vec<_> = deps.iter().map(|&d| AttrPath::own(d)).collect();
    let log = log.clone();
    graph
        .declare(object, name, &paths, move |inputs| {
            log.record(name);
            let mut total = 1_i64;
            for i in 0..inputs.len() {
                total += inputs.get::<i64>(i)?;
            }
            Ok(total)
        })
        .unwrap();
}

#[test]
fn chain_recomputes_each_once_in_order() {
    let mut graph = AttrGraph::new();
    let log = RunLog::default();
    let obj = graph.create_object("chain");
    let a = graph.add_attribute(obj, "a", 0_i64).unwrap();
    plus_one(&mut graph, &log, obj, "b", &["a"]);
    plus_one(&mut graph, &log, obj, "c", &["b"]);
    assert_eq!(log.take(), ["b", "c"]);

    graph.set(a, 5).unwrap();
    let report = graph.flush().unwrap();

    assert_eq!(log.take(), ["b", "c"]);
    assert_eq!(report.recomputed(), 2);
    assert_eq!(graph.get_by_name::<i64>(obj, "b"), Some(&6));
    assert_eq!(graph.get_by_name::<i64>(obj, "c"), Some(&7));

    let names: Vec<_> = report
        .changed()
        .iter()
        .map(|key| graph.name_str(key.name()))
        .collect();
    assert_eq!(names, ["a", "b", "c"]);
}

#[test]
fn diamond_join_runs_once_after_both_branches() {
    let mut graph = AttrGraph::new();
    let log = RunLog::default();
    let obj = graph.create_object("diamond");
    let a = graph.add_attribute(obj, "a", 0_i64).unwrap();
    plus_one(&mut graph, &log, obj, "b", &["a"]);
    plus_one(&mut graph, &log, obj, "d", &["a"]);
    plus_one(&mut graph, &log, obj, "c", &["b", "d"]);
    log.take();

    graph.set(a, 1).unwrap();
    graph.flush().unwrap();

    let runs = log.take();
    assert_eq!(runs.len(), 3);
    assert_eq!(runs.last(), Some(&"c"));
    assert_eq!(graph.get_by_name::<i64>(obj, "c"), Some(&5));
}

#[test]
fn simultaneous_writes_coalesce() {
    let mut graph = AttrGraph::new();
    let log = RunLog::default();
    let obj = graph.create_object("obj");
    let a = graph.add_attribute(obj, "a", 0_i64).unwrap();
    let b = graph.add_attribute(obj, "b", 0_i64).unwrap();
    plus_one(&mut graph, &log, obj, "sum", &["a", "b"]);
    log.take();

    graph.set(a, 1).unwrap();
    graph.set(b, 2).unwrap();
    graph.set(a, 3).unwrap();
    let report = graph.flush().unwrap();

    assert_eq!(log.take(), ["sum"]);
    assert_eq!(report.recomputed(), 1);
    assert_eq!(graph.get_by_name::<i64>(obj, "sum"), Some(&6));
}

#[test]
fn equal_write_triggers_nothing() {
    let mut graph = AttrGraph::new();
    let log = RunLog::default();
    let obj = graph.create_object("obj");
    let a = graph.add_attribute(obj, "a", 4_i64).unwrap();
    plus_one(&mut graph, &log, obj, "b", &["a"]);
    log.take();

    assert!(!graph.set(a, 4).unwrap());
    assert!(!graph.has_pending());
    let report = graph.flush().unwrap();
    assert!(report.is_empty());
    assert!(log.take().is_empty());
}

#[test]
fn unchanged_result_stops_propagation() {
    let mut graph = AttrGraph::new();
    let log = RunLog::default();
    let obj = graph.create_object("obj");
    let n = graph.add_attribute(obj, "n", 2_i64).unwrap();
    let parity_log = log.clone();
    graph
        .declare(obj, "parity", &[AttrPath::own("n")], move |inputs| {
            parity_log.record("parity");
            Ok(inputs.get::<i64>(0)? % 2)
        })
        .unwrap();
    plus_one(&mut graph, &log, obj, "after", &["parity"]);
    log.take();

    graph.set(n, 4).unwrap();
    let report = graph.flush().unwrap();

    assert_eq!(log.take(), ["parity"]);
    assert_eq!(report.changed(), &[n.key()]);
}

#[test]
fn zero_dependency_rule_never_refires() {
    let mut graph = AttrGraph::new();
    let log = RunLog::default();
    let obj = graph.create_object("obj");
    let a = graph.add_attribute(obj, "a", 0_i64).unwrap();
    plus_one(&mut graph, &log, obj, "constant", &[]);
    assert_eq!(log.take(), ["constant"]);

    graph.set(a, 1).unwrap();
    graph.flush().unwrap();
    assert!(log.take().is_empty());
    assert_eq!(graph.get_by_name::<i64>(obj, "constant"), Some(&1));
}

#[test]
fn transitive_cycle_rejected_and_graph_unchanged() {
    let mut graph = AttrGraph::new();
    let log = RunLog::default();
    let obj = graph.create_object("obj");
    graph.add_attribute(obj, "a", 0_i64).unwrap();
    plus_one(&mut graph, &log, obj, "b", &["a"]);
    plus_one(&mut graph, &log, obj, "c", &["b"]);
    let a_key = graph.lookup(obj, "a").unwrap();

    let err = graph
        .declare(obj, "a", &[AttrPath::own("c")], |_| Ok(0_i64))
        .unwrap_err();
    let Error::Cycle(cycle) = err else {
        panic!("expected a cycle");
    };
    assert_eq!(cycle.from, a_key);

    assert!(!graph.is_computed(a_key));
    assert_eq!(graph.dependencies(a_key).count(), 0);
    assert_eq!(graph.get_by_name::<i64>(obj, "a"), Some(&0));
    assert!(!graph.has_pending());
}

#[test]
fn cross_object_cycle_through_references_rejected() {
    let mut graph = AttrGraph::new();
    let left = graph.create_object("left");
    let right = graph.create_object("right");
    graph.add_attribute(right, "seed", 1_i64).unwrap();
    graph.set_reference(left, Some(right)).unwrap();
    graph
        .declare(left, "x", &[AttrPath::referent("seed")], |inputs| {
            Ok(*inputs.get::<i64>(0)?)
        })
        .unwrap();

    // right.seed becomes a rule over its referent's `x`; pointing right at
    // left would close left.x -> right.seed -> left.x.
    graph
        .declare(right, "seed", &[AttrPath::referent("x")], |inputs| {
            Ok(inputs.try_get::<i64>(0)?.copied().unwrap_or(1))
        })
        .unwrap();
    let err = graph.set_reference(right, Some(left)).unwrap_err();
    assert!(matches!(err, Error::Cycle(_)));
    assert_eq!(graph.reference(right), None);
}

#[test]
fn reference_reassignment_reevaluates_immediately() {
    let mut graph = AttrGraph::new();
    let light = graph.create_object("light");
    graph.add_attribute(light, "background", String::from("white")).unwrap();
    let dark = graph.create_object("dark");
    let dark_bg = graph
        .add_attribute(dark, "background", String::from("black"))
        .unwrap();

    let panel = graph.create_object("panel");
    graph.set_reference(panel, Some(light)).unwrap();
    let css = graph
        .declare(panel, "css", &[AttrPath::referent("background")], |inputs| {
            Ok(format!("body {{ background: {}; }}", inputs.get::<String>(0)?))
        })
        .unwrap();
    assert_eq!(graph.get(css), "body { background: white; }");

    let report = graph.set_reference(panel, Some(dark)).unwrap();
    assert_eq!(report.recomputed(), 1);
    assert_eq!(graph.get(css), "body { background: black; }");
    assert_eq!(graph.reference(panel), Some(dark));

    // Edges now point at the new referent.
    graph.set(dark_bg, String::from("#212121")).unwrap();
    graph.flush().unwrap();
    assert_eq!(graph.get(css), "body { background: #212121; }");

    let light_bg = graph.lookup(light, "background").unwrap();
    assert_eq!(graph.dependents(light_bg).count(), 0);
}

#[test]
fn clearing_the_reference_reads_inputs_as_missing() {
    let mut graph = AttrGraph::new();
    let scheme = graph.create_object("scheme");
    graph.add_attribute(scheme, "primary", String::from("#9C27B0")).unwrap();
    let generator = graph.create_object("generator");
    graph.set_reference(generator, Some(scheme)).unwrap();
    let css = graph
        .declare(generator, "css", &[AttrPath::referent("primary")], |inputs| {
            Ok(inputs.try_get::<String>(0)?.cloned().unwrap_or_default())
        })
        .unwrap();
    assert_eq!(graph.get(css), "#9C27B0");

    graph.set_reference(generator, None).unwrap();
    assert_eq!(graph.get(css), "");
}

#[test]
fn failing_rule_keeps_value_and_retries() {
    let mut graph = AttrGraph::new();
    let log = RunLog::default();
    let obj = graph.create_object("obj");
    let a = graph.add_attribute(obj, "a", 1_i64).unwrap();
    let fail = Arc::new(AtomicBool::new(false));

    let flag = fail.clone();
    let b = graph
        .declare(obj, "b", &[AttrPath::own("a")], move |inputs| {
            if flag.load(Ordering::Relaxed) {
                return Err(RuleError::message("refused"));
            }
            Ok(inputs.get::<i64>(0)? * 10)
        })
        .unwrap();
    plus_one(&mut graph, &log, obj, "c", &["b"]);
    log.take();

    fail.store(true, Ordering::Relaxed);
    graph.set(a, 2).unwrap();
    let err = graph.flush().unwrap_err();
    assert!(matches!(err, Error::Rule { attribute, .. } if attribute == b.key()));
    assert_eq!(*graph.get(b), 10);
    assert!(graph.has_pending());
    assert!(log.take().is_empty());

    fail.store(false, Ordering::Relaxed);
    let report = graph.flush().unwrap();
    assert_eq!(*graph.get(b), 20);
    assert_eq!(graph.get_by_name::<i64>(obj, "c"), Some(&21));
    assert_eq!(report.recomputed(), 2);
    assert_eq!(log.take(), ["c"]);
}

#[test]
fn failure_leaves_sibling_stale_until_retry() {
    let mut graph = AttrGraph::new();
    let log = RunLog::default();
    let obj = graph.create_object("obj");
    let a = graph.add_attribute(obj, "a", 1_i64).unwrap();
    let fail = Arc::new(AtomicBool::new(false));

    // `b` sorts before its sibling `d`, so it fails before `d` is visited.
    let flag = fail.clone();
    let b = graph
        .declare(obj, "b", &[AttrPath::own("a")], move |inputs| {
            if flag.load(Ordering::Relaxed) {
                return Err(RuleError::message("refused"));
            }
            Ok(inputs.get::<i64>(0)? * 10)
        })
        .unwrap();
    plus_one(&mut graph, &log, obj, "d", &["a"]);
    log.take();

    fail.store(true, Ordering::Relaxed);
    graph.set(a, 2).unwrap();
    let err = graph.flush().unwrap_err();
    assert!(matches!(err, Error::Rule { attribute, .. } if attribute == b.key()));
    assert_eq!(*graph.get(b), 10);
    assert_eq!(graph.get_by_name::<i64>(obj, "d"), Some(&2));
    assert!(log.take().is_empty());
    assert!(graph.has_pending());

    fail.store(false, Ordering::Relaxed);
    let report = graph.flush().unwrap();
    assert_eq!(*graph.get(b), 20);
    assert_eq!(graph.get_by_name::<i64>(obj, "d"), Some(&3));
    assert_eq!(report.recomputed(), 2);
    assert_eq!(log.take(), ["d"]);
    assert!(!graph.has_pending());
}

#[test]
fn rule_error_during_reference_swap_reaches_caller() {
    let mut graph = AttrGraph::new();
    let good = graph.create_object("good");
    graph.add_attribute(good, "size", 4_i64).unwrap();
    let bad = graph.create_object("bad");
    graph.add_attribute(bad, "size", -1_i64).unwrap();

    let owner = graph.create_object("owner");
    graph.set_reference(owner, Some(good)).unwrap();
    let area = graph
        .declare(owner, "area", &[AttrPath::referent("size")], |inputs| {
            let size = *inputs.get::<i64>(0)?;
            if size < 0 {
                return Err(RuleError::message("negative size"));
            }
            Ok(size * size)
        })
        .unwrap();
    assert_eq!(*graph.get(area), 16);

    let err = graph.set_reference(owner, Some(bad)).unwrap_err();
    assert!(matches!(err, Error::Rule { attribute, .. } if attribute == area.key()));
    // The rewiring stands; only the value is held back.
    assert_eq!(graph.reference(owner), Some(bad));
    assert_eq!(*graph.get(area), 16);

    let report = graph.set_reference(owner, Some(good)).unwrap();
    assert_eq!(report.recomputed(), 1);
    assert_eq!(*graph.get(area), 16);
    assert!(!graph.has_pending());
}

#[test]
fn allowed_cycle_surfaces_at_flush() {
    let mut graph = AttrGraph::new().with_cycle_handling(CycleHandling::Allow);
    let obj = graph.create_object("obj");
    let a = graph.add_attribute(obj, "a", 0_i64).unwrap();
    graph.add_attribute(obj, "b", 0_i64).unwrap();
    graph
        .declare(obj, "c", &[AttrPath::own("a"), AttrPath::own("b")], |inputs| {
            Ok(inputs.get::<i64>(0)? + inputs.get::<i64>(1)?)
        })
        .unwrap();
    // b = c closes b -> c -> b.
    graph
        .declare(obj, "b", &[AttrPath::own("c")], |inputs| Ok(*inputs.get::<i64>(0)?))
        .unwrap();

    graph.set(a, 1).unwrap();
    let b = graph.lookup(obj, "b").unwrap();
    let c = graph.lookup(obj, "c").unwrap();
    let Err(Error::Cycle(cycle)) = graph.flush() else {
        panic!("flush over a cycle must fail with Error::Cycle");
    };
    assert_eq!((cycle.from, cycle.to), (b, c));

    // The unordered attributes stay pending and fail the same way again.
    assert!(graph.has_pending());
    assert!(matches!(graph.flush(), Err(Error::Cycle(_))));
}

#[test]
fn ignored_cycle_edge_is_dropped() {
    let mut graph = AttrGraph::new().with_cycle_handling(CycleHandling::Ignore);
    let obj = graph.create_object("obj");
    graph.add_attribute(obj, "a", 0_i64).unwrap();
    let b = graph
        .declare(obj, "b", &[AttrPath::own("a")], |inputs| Ok(*inputs.get::<i64>(0)?))
        .unwrap();
    graph
        .declare(obj, "a", &[AttrPath::own("b")], |inputs| Ok(*inputs.get::<i64>(0)?))
        .unwrap();

    let a_key = graph.lookup(obj, "a").unwrap();
    assert_eq!(graph.dependencies(a_key).count(), 0);
    assert_eq!(graph.dependencies(b.key()).count(), 1);
    graph.flush().unwrap();
}

#[test]
fn typed_handle_lookup() {
    let mut graph = AttrGraph::new();
    let obj = graph.create_object("obj");
    let width = graph.add_attribute(obj, "width", 3.5_f64).unwrap();

    assert_eq!(graph.attribute::<f64>(obj, "width").unwrap(), width);
    assert!(matches!(
        graph.attribute::<String>(obj, "width"),
        Err(Error::TypeMismatch { .. })
    ));
    assert!(matches!(
        graph.attribute::<f64>(obj, "height"),
        Err(Error::UnknownAttribute { .. })
    ));
}

#[test]
fn foreign_handle_is_rejected() {
    let mut first = AttrGraph::new();
    let obj = first.create_object("obj");
    first.add_attribute(obj, "a", 0_i64).unwrap();
    let b = first.add_attribute(obj, "b", 0_i64).unwrap();

    let mut second = AttrGraph::new();
    let other = second.create_object("other");
    second.add_attribute(other, "b", 0_i64).unwrap();

    assert!(second.try_get(b).is_none());
    assert!(matches!(second.set(b, 1), Err(Error::UnknownAttribute { .. })));
}
