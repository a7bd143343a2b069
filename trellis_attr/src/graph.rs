// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The reactive attribute graph.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashSet;
use smallvec::SmallVec;
use trellis_dirty::intern::Interner;
use trellis_dirty::{CycleError, CycleHandling, DenseKey, DepGraph, PendingSet, drain_affected_sorted};

use crate::error::{Error, RuleError};
use crate::id::{Attr, AttrKey, Name, NodeId, ObjectId};
use crate::path::{AttrPath, ResolvedPath, Selector};
use crate::report::FlushReport;
use crate::rule::{RuleFn, RuleInputs, RuleSlot, erase_rule};
use crate::value::{AttrValue, ErasedValue};

struct Node {
    key: AttrKey,
    value: ErasedValue,
    rule: Option<RuleSlot>,
}

struct Object {
    label: String,
    reference: Option<ObjectId>,
    /// Sorted by name.
    attributes: SmallVec<[(Name, NodeId); 8]>,
    /// Computed attributes with at least one referent path.
    through_reference: SmallVec<[NodeId; 4]>,
}

impl Object {
    fn find(&self, name: Name) -> Option<NodeId> {
        self.attributes
            .binary_search_by_key(&name, |&(n, _)| n)
            .ok()
            .map(|i| self.attributes[i].1)
    }
}

type Resolution = (SmallVec<[ResolvedPath; 4]>, SmallVec<[Option<NodeId>; 4]>);

/// A graph of objects whose attributes are either written directly or
/// computed by rules over other attributes.
///
/// Writes are push-on-change: [`set`](Self::set) records the change and
/// [`flush`](Self::flush) propagates every pending change to a fixed point in
/// topological order. Reads never compute anything.
///
/// # Example
///
/// ```rust
/// use trellis_attr::{AttrGraph, AttrPath};
///
/// let mut graph = AttrGraph::new();
/// let scheme = graph.create_object("scheme");
/// let primary = graph.add_attribute(scheme, "primary", String::from("#9C27B0")).unwrap();
///
/// let button = graph.create_object("button");
/// graph.set_reference(button, Some(scheme)).unwrap();
/// let css = graph
///     .declare(button, "css", &[AttrPath::referent("primary")], |inputs| {
///         Ok(format!("background: {};", inputs.get::<String>(0)?))
///     })
///     .unwrap();
/// assert_eq!(graph.get(css), "background: #9C27B0;");
///
/// graph.set(primary, String::from("#F44336")).unwrap();
/// // Nothing is recomputed until the flush.
/// assert_eq!(graph.get(css), "background: #9C27B0;");
///
/// let report = graph.flush().unwrap();
/// assert_eq!(report.recomputed(), 1);
/// assert_eq!(graph.get(css), "background: #F44336;");
/// ```
pub struct AttrGraph {
    nodes: Vec<Node>,
    objects: Vec<Object>,
    names: Interner<String>,
    deps: DepGraph<NodeId>,
    pending: PendingSet<NodeId>,
    /// Computed attributes that must rerun on the next flush even if none of
    /// their inputs changed. Always a subset of `pending`.
    stale: HashSet<NodeId>,
    cycle_handling: CycleHandling,
}

impl Default for AttrGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AttrGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttrGraph")
            .field("objects", &self.objects.len())
            .field("attributes", &self.nodes.len())
            .field("edges", &self.deps.edge_count())
            .field("pending", &self.pending.len())
            .field("cycle_handling", &self.cycle_handling)
            .finish_non_exhaustive()
    }
}

impl AttrGraph {
    /// Creates an empty graph that rejects cycles.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            objects: Vec::new(),
            names: Interner::new(),
            deps: DepGraph::new(),
            pending: PendingSet::new(),
            stale: HashSet::new(),
            cycle_handling: CycleHandling::Error,
        }
    }

    /// Sets how dependency cycles are treated when rules are declared or
    /// references reassigned.
    ///
    /// With [`CycleHandling::Ignore`] or [`CycleHandling::DebugAssert`] the
    /// offending edge is dropped, so the rule no longer reruns when that
    /// input changes. With [`CycleHandling::Allow`] the edge is kept and the
    /// cycle surfaces as [`Error::Cycle`] from [`flush`](Self::flush).
    #[must_use]
    pub fn with_cycle_handling(mut self, handling: CycleHandling) -> Self {
        self.cycle_handling = handling;
        self
    }

    /// Returns the configured cycle handling.
    #[must_use]
    pub fn cycle_handling(&self) -> CycleHandling {
        self.cycle_handling
    }

    /// Creates a new object without attributes.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` objects are created.
    pub fn create_object(&mut self, label: impl Into<String>) -> ObjectId {
        let id = ObjectId::new(u32::try_from(self.objects.len()).expect("too many objects"));
        self.objects.push(Object {
            label: label.into(),
            reference: None,
            attributes: SmallVec::new(),
            through_reference: SmallVec::new(),
        });
        id
    }

    /// Number of objects in the graph.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// The label given at creation.
    #[must_use]
    pub fn object_label(&self, object: ObjectId) -> Option<&str> {
        self.objects.get(object.index()).map(|o| o.label.as_str())
    }

    /// The object `object` currently references.
    #[must_use]
    pub fn reference(&self, object: ObjectId) -> Option<ObjectId> {
        self.objects.get(object.index())?.reference
    }

    /// Adds a source attribute with an initial value.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownObject`] for a foreign object and
    /// [`Error::DuplicateAttribute`] if `object` already has `name`.
    pub fn add_attribute<T: AttrValue>(
        &mut self,
        object: ObjectId,
        name: &str,
        initial: T,
    ) -> Result<Attr<T>, Error> {
        self.object(object)?;
        let name_id = self.intern(name);
        if self.objects[object.index()].find(name_id).is_some() {
            return Err(Error::DuplicateAttribute {
                object,
                name: name.to_string(),
            });
        }
        let key = AttrKey::new(object, name_id);
        let node = self.push_node(key, ErasedValue::new(initial), None);
        Ok(Attr::new(key, node))
    }

    /// Returns a typed handle to an existing attribute.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownObject`], [`Error::UnknownAttribute`], or
    /// [`Error::TypeMismatch`] if the attribute does not hold a `T`.
    pub fn attribute<T: AttrValue>(&self, object: ObjectId, name: &str) -> Result<Attr<T>, Error> {
        let node = self.node_by_name(object, name)?;
        let stored = &self.nodes[node.index()];
        if !stored.value.is::<T>() {
            return Err(Error::TypeMismatch {
                attribute: stored.key,
                expected: stored.value.type_name(),
                found: core::any::type_name::<T>(),
            });
        }
        Ok(Attr::new(stored.key, node))
    }

    /// Looks up the key of `object`'s attribute `name`.
    #[must_use]
    pub fn lookup(&self, object: ObjectId, name: &str) -> Option<AttrKey> {
        self.node_by_name(object, name)
            .ok()
            .map(|node| self.nodes[node.index()].key)
    }

    /// Iterates the attributes of `object`.
    ///
    /// An unknown object has no attributes.
    pub fn attributes(&self, object: ObjectId) -> impl Iterator<Item = AttrKey> + '_ {
        self.objects
            .get(object.index())
            .into_iter()
            .flat_map(|o| o.attributes.iter())
            .map(move |&(_, node)| self.nodes[node.index()].key)
    }

    /// The text of an interned name.
    #[must_use]
    pub fn name_str(&self, name: Name) -> &str {
        self.names
            .get(name.intern_id())
            .map_or("", String::as_str)
    }

    /// Returns `true` if `key` is computed by a rule.
    #[must_use]
    pub fn is_computed(&self, key: AttrKey) -> bool {
        self.node_of_key(key)
            .is_some_and(|node| self.nodes[node.index()].rule.is_some())
    }

    /// Returns `true` if a change is waiting for [`flush`](Self::flush).
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// The attributes `key`'s rule currently reads.
    pub fn dependencies(&self, key: AttrKey) -> impl Iterator<Item = AttrKey> + '_ {
        self.node_of_key(key)
            .into_iter()
            .flat_map(move |node| self.deps.dependencies(node).iter())
            .map(move |dep| self.nodes[dep.index()].key)
    }

    /// The computed attributes that read `key`.
    pub fn dependents(&self, key: AttrKey) -> impl Iterator<Item = AttrKey> + '_ {
        self.node_of_key(key)
            .into_iter()
            .flat_map(move |node| self.deps.dependents(node).iter())
            .map(move |dep| self.nodes[dep.index()].key)
    }

    // --- Reads ---

    /// Returns the current value of `attr`.
    ///
    /// Reads are passive: a pending change is not propagated first.
    ///
    /// # Panics
    ///
    /// Panics if `attr` was returned by a different graph.
    #[must_use]
    pub fn get<T: AttrValue>(&self, attr: Attr<T>) -> &T {
        match self.try_get(attr) {
            Some(value) => value,
            None => panic!("{attr:?} does not belong to this graph"),
        }
    }

    /// Returns the current value of `attr`, or `None` for a foreign handle.
    #[must_use]
    pub fn try_get<T: AttrValue>(&self, attr: Attr<T>) -> Option<&T> {
        let node = self.handle_node(attr.key(), attr.node()).ok()?;
        self.nodes[node.index()].value.downcast_ref()
    }

    /// Returns the value of `object`'s attribute `name` if it exists and is
    /// a `T`.
    #[must_use]
    pub fn get_by_name<T: AttrValue>(&self, object: ObjectId, name: &str) -> Option<&T> {
        let node = self.node_by_name(object, name).ok()?;
        self.nodes[node.index()].value.downcast_ref()
    }

    /// Returns the type-erased value of `key`.
    #[must_use]
    pub fn get_erased(&self, key: AttrKey) -> Option<&ErasedValue> {
        let node = self.node_of_key(key)?;
        Some(&self.nodes[node.index()].value)
    }

    // --- Writes ---

    /// Writes a source attribute.
    ///
    /// Returns `Ok(true)` if the value changed, in which case the attribute
    /// is scheduled for the next [`flush`](Self::flush). Writing an equal
    /// value schedules nothing.
    ///
    /// # Errors
    ///
    /// [`Error::ComputedAttribute`] if a rule owns the attribute, and
    /// [`Error::UnknownAttribute`] for a foreign handle.
    pub fn set<T: AttrValue>(&mut self, attr: Attr<T>, value: T) -> Result<bool, Error> {
        let node = self.handle_node(attr.key(), attr.node())?;
        self.write(node, value)
    }

    /// Writes a source attribute by object and name.
    ///
    /// # Errors
    ///
    /// As [`set`](Self::set), plus [`Error::UnknownObject`],
    /// [`Error::UnknownAttribute`], and [`Error::TypeMismatch`].
    pub fn set_by_name<T: AttrValue>(
        &mut self,
        object: ObjectId,
        name: &str,
        value: T,
    ) -> Result<bool, Error> {
        let node = self.node_by_name(object, name)?;
        self.write(node, value)
    }

    /// Writes a type-erased value to a source attribute.
    ///
    /// # Errors
    ///
    /// As [`set_by_name`](Self::set_by_name).
    pub fn set_erased(&mut self, key: AttrKey, value: ErasedValue) -> Result<bool, Error> {
        let node = self
            .node_of_key(key)
            .ok_or_else(|| self.unknown_attribute(key))?;
        self.check_writable(node, value.type_name(), value.type_id())?;
        let stored = &mut self.nodes[node.index()];
        if stored.value == value {
            return Ok(false);
        }
        stored.value = value;
        self.pending.mark(node);
        tracing::trace!(attribute = ?key, "source written");
        Ok(true)
    }

    fn write<T: AttrValue>(&mut self, node: NodeId, value: T) -> Result<bool, Error> {
        self.check_writable(node, core::any::type_name::<T>(), core::any::TypeId::of::<T>())?;
        let stored = &mut self.nodes[node.index()];
        if stored.value.eq_value(&value) {
            return Ok(false);
        }
        stored.value = ErasedValue::new(value);
        self.pending.mark(node);
        tracing::trace!(attribute = ?stored.key, "source written");
        Ok(true)
    }

    fn check_writable(
        &self,
        node: NodeId,
        type_name: &'static str,
        type_id: core::any::TypeId,
    ) -> Result<(), Error> {
        let stored = &self.nodes[node.index()];
        if stored.rule.is_some() {
            return Err(Error::ComputedAttribute(stored.key));
        }
        if stored.value.type_id() != type_id {
            return Err(Error::TypeMismatch {
                attribute: stored.key,
                expected: stored.value.type_name(),
                found: type_name,
            });
        }
        Ok(())
    }

    // --- Rules ---

    /// Attaches a rule computing `object`'s attribute `name` from `deps`.
    ///
    /// If `name` exists as a source attribute it becomes computed; otherwise
    /// it is created. The rule runs once immediately and its result becomes
    /// the attribute's value. If that replaces a different source value, the
    /// attribute's dependents are scheduled for the next flush.
    ///
    /// An [`AttrPath::own`] dependency must name an existing attribute of
    /// `object`. An [`AttrPath::referent`] dependency must exist on the
    /// current referent; with no referent it reads as missing until
    /// [`set_reference`](Self::set_reference) supplies one. Repeated paths
    /// are read once.
    ///
    /// # Errors
    ///
    /// - [`Error::Cycle`] if the rule would read, directly or transitively,
    ///   its own attribute. A rule naming its own attribute is always
    ///   rejected, whatever the cycle handling.
    /// - [`Error::RuleAlreadyDeclared`] if the attribute already has a rule.
    /// - [`Error::TypeMismatch`] if an existing source does not hold a `T`.
    /// - [`Error::UnknownObject`] or [`Error::UnknownAttribute`] for
    ///   unresolvable paths.
    /// - [`Error::Rule`] if the initial evaluation fails.
    ///
    /// The graph is unchanged on error.
    pub fn declare<T, F>(
        &mut self,
        object: ObjectId,
        name: &str,
        deps: &[AttrPath<'_>],
        rule: F,
    ) -> Result<Attr<T>, Error>
    where
        T: AttrValue,
        F: Fn(&RuleInputs<'_>) -> Result<T, RuleError> + Send + Sync + 'static,
    {
        self.object(object)?;
        let target = self.intern(name);
        let key = AttrKey::new(object, target);
        let existing = self.objects[object.index()].find(target);

        if let Some(node) = existing {
            let stored = &self.nodes[node.index()];
            if stored.rule.is_some() {
                return Err(Error::RuleAlreadyDeclared(key));
            }
            if !stored.value.is::<T>() {
                return Err(Error::TypeMismatch {
                    attribute: key,
                    expected: stored.value.type_name(),
                    found: core::any::type_name::<T>(),
                });
            }
        }

        let (paths, resolved) = self.resolve_paths(object, target, deps)?;
        let func = erase_rule(rule);

        let from = existing.unwrap_or_else(|| self.next_node());
        self.deps
            .replace_dependencies(from, resolved.iter().flatten().copied(), self.cycle_handling)
            .map_err(|e| self.cycle_error(e, key))?;

        let value = match evaluate(&self.nodes, &self.names, object, &paths, &resolved, &func) {
            Ok(value) => value,
            Err(source) => {
                // Sources never have edges of their own, so clearing restores
                // the previous state for both new and converted attributes.
                let _ = self
                    .deps
                    .replace_dependencies(from, core::iter::empty(), CycleHandling::Allow);
                return Err(Error::Rule {
                    attribute: key,
                    source,
                });
            }
        };

        let through_reference = paths.iter().any(|p| p.selector == Selector::Referent);
        let slot = RuleSlot {
            paths,
            resolved,
            func,
        };
        let node = match existing {
            Some(node) => {
                let stored = &mut self.nodes[node.index()];
                stored.rule = Some(slot);
                if stored.value != value {
                    stored.value = value;
                    self.pending.mark(node);
                }
                node
            }
            None => {
                let node = self.push_node(key, value, Some(slot));
                debug_assert_eq!(node, from, "node ids are allocated densely");
                node
            }
        };
        if through_reference {
            self.objects[object.index()].through_reference.push(node);
        }
        tracing::trace!(attribute = ?key, inputs = deps.len(), "rule declared");
        Ok(Attr::new(key, node))
    }

    fn resolve_paths(
        &mut self,
        owner: ObjectId,
        target: Name,
        deps: &[AttrPath<'_>],
    ) -> Result<Resolution, Error> {
        let referent = self.objects[owner.index()].reference;
        let mut paths: SmallVec<[ResolvedPath; 4]> = SmallVec::new();
        let mut resolved: SmallVec<[Option<NodeId>; 4]> = SmallVec::new();
        for dep in deps {
            let name = self.intern(dep.name());
            let path = ResolvedPath {
                selector: dep.selector(),
                name,
            };
            if paths.contains(&path) {
                continue;
            }
            let node = match dep.selector() {
                Selector::Own if name == target => {
                    let key = AttrKey::new(owner, target);
                    return Err(Error::Cycle(CycleError { from: key, to: key }));
                }
                Selector::Own => Some(self.find_or_unknown(owner, name, dep.name())?),
                Selector::Referent => match referent {
                    Some(referent) => Some(self.find_or_unknown(referent, name, dep.name())?),
                    None => None,
                },
            };
            paths.push(path);
            resolved.push(node);
        }
        Ok((paths, resolved))
    }

    /// Points `object` at `referent`, or at nothing.
    ///
    /// Every rule of `object` with referent paths is rewired to the new
    /// referent's attributes and rerun by an immediate [`flush`](Self::flush),
    /// whose report is returned. Assigning the current referent again does
    /// nothing.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownObject`] for foreign objects.
    /// - [`Error::UnknownAttribute`] if the new referent lacks an attribute
    ///   one of the rules reads.
    /// - [`Error::Cycle`] if the rewired edges would close a cycle.
    ///
    /// The graph is unchanged on these errors. Errors from the flush itself
    /// are those of [`flush`](Self::flush).
    pub fn set_reference(
        &mut self,
        object: ObjectId,
        referent: Option<ObjectId>,
    ) -> Result<FlushReport, Error> {
        self.object(object)?;
        if let Some(referent) = referent {
            self.object(referent)?;
        }
        if self.objects[object.index()].reference == referent {
            return Ok(FlushReport::default());
        }

        let rules = self.objects[object.index()].through_reference.clone();
        let mut plan: Vec<(NodeId, SmallVec<[Option<NodeId>; 4]>)> = Vec::with_capacity(rules.len());
        for &node in &rules {
            let Some(slot) = self.nodes[node.index()].rule.as_ref() else {
                continue;
            };
            let mut resolved = slot.resolved.clone();
            for (path, target) in slot.paths.iter().zip(resolved.iter_mut()) {
                if path.selector != Selector::Referent {
                    continue;
                }
                *target = match referent {
                    Some(referent) => Some(self.find_or_unknown(
                        referent,
                        path.name,
                        self.name_str(path.name),
                    )?),
                    None => None,
                };
            }
            plan.push((node, resolved));
        }

        for (applied, (node, resolved)) in plan.iter().enumerate() {
            let result = self.deps.replace_dependencies(
                *node,
                resolved.iter().flatten().copied(),
                self.cycle_handling,
            );
            if let Err(e) = result {
                for (done, _) in &plan[..applied] {
                    let previous = self.nodes[done.index()]
                        .rule
                        .as_ref()
                        .map(|slot| slot.resolved.clone())
                        .unwrap_or_default();
                    let _ = self.deps.replace_dependencies(
                        *done,
                        previous.into_iter().flatten(),
                        CycleHandling::Allow,
                    );
                }
                let key = self.nodes[node.index()].key;
                return Err(self.cycle_error(e, key));
            }
        }

        self.objects[object.index()].reference = referent;
        for (node, resolved) in plan {
            if let Some(slot) = self.nodes[node.index()].rule.as_mut() {
                slot.resolved = resolved;
            }
            self.stale.insert(node);
            self.pending.mark(node);
        }
        tracing::debug!(
            object = ?object,
            referent = ?referent,
            rules = rules.len(),
            "reference reassigned"
        );
        self.flush()
    }

    // --- Propagation ---

    /// Propagates every pending change to a fixed point.
    ///
    /// The written attributes and everything downstream of them are visited
    /// once each, in topological order. A rule runs only if one of its inputs
    /// changed during this flush or it is stale, so simultaneous upstream
    /// changes coalesce into a single run. A recomputed value equal to the
    /// old one stops propagation along that path.
    ///
    /// # Errors
    ///
    /// - [`Error::Rule`] if a rule fails. Values already updated stay
    ///   updated and the failing attribute keeps its previous value. It and
    ///   every unvisited attribute still owed a recompute are retried by the
    ///   next flush.
    /// - [`Error::Cycle`] if propagation meets a cycle admitted by
    ///   [`CycleHandling::Allow`], or does not finish within one step per
    ///   attribute. The attributes left unordered stay pending.
    pub fn flush(&mut self) -> Result<FlushReport, Error> {
        let mut report = FlushReport::default();
        if self.pending.is_empty() {
            return Ok(report);
        }

        let stale = core::mem::take(&mut self.stale);
        let mut changed: HashSet<NodeId> = self
            .pending
            .iter()
            .filter(|node| !stale.contains(node))
            .collect();
        let roots = self.pending.len();

        let nodes = &mut self.nodes;
        let names = &self.names;
        let deps = &self.deps;
        let pending = &mut self.pending;
        let stale_out = &mut self.stale;

        let mut drain = drain_affected_sorted(pending, deps);
        let limit = nodes.len();
        let mut steps = 0_usize;

        while let Some(node) = drain.next() {
            steps += 1;
            if steps > limit {
                let mut remaining: Vec<NodeId> = drain.remaining_keys().collect();
                remaining.push(node);
                requeue(&remaining, nodes, deps, &stale, &changed, pending, stale_out);
                tracing::warn!(steps, "flush did not converge");
                return Err(unordered_cycle(&remaining, node, nodes, deps));
            }

            let stored = &nodes[node.index()];
            let needs_run = stored.rule.is_some()
                && (stale.contains(&node)
                    || deps.dependencies(node).iter().any(|dep| changed.contains(dep)));

            if needs_run {
                let key = stored.key;
                let result = match stored.rule.as_ref() {
                    Some(slot) => evaluate(
                        nodes,
                        names,
                        key.object(),
                        &slot.paths,
                        &slot.resolved,
                        &slot.func,
                    ),
                    None => continue,
                };
                report.count_recompute();
                match result {
                    Ok(value) => {
                        let differs = nodes[node.index()].value != value;
                        tracing::trace!(attribute = ?key, changed = differs, "recomputed");
                        if differs {
                            nodes[node.index()].value = value;
                            changed.insert(node);
                        }
                    }
                    Err(source) => {
                        tracing::warn!(attribute = ?key, error = %source, "rule failed");
                        stale_out.insert(node);
                        pending.mark(node);
                        let remaining: Vec<NodeId> = drain.remaining_keys().collect();
                        requeue(&remaining, nodes, deps, &stale, &changed, pending, stale_out);
                        return Err(Error::Rule {
                            attribute: key,
                            source,
                        });
                    }
                }
            }

            if changed.contains(&node) {
                report.push_changed(nodes[node.index()].key);
            }
        }

        if drain.is_stalled() {
            let remaining: Vec<NodeId> = drain.remaining_keys().collect();
            requeue(&remaining, nodes, deps, &stale, &changed, pending, stale_out);
            if let Some(&first) = remaining.iter().min() {
                tracing::warn!(remaining = remaining.len(), "flush stalled on a cycle");
                return Err(unordered_cycle(&remaining, first, nodes, deps));
            }
        }

        tracing::debug!(
            roots,
            changed = report.changed().len(),
            recomputed = report.recomputed(),
            "flush complete"
        );
        Ok(report)
    }

    // --- Internals ---

    fn object(&self, object: ObjectId) -> Result<&Object, Error> {
        self.objects
            .get(object.index())
            .ok_or(Error::UnknownObject(object))
    }

    fn intern(&mut self, name: &str) -> Name {
        match self.names.lookup(name) {
            Some(id) => Name::new(id),
            None => Name::new(self.names.intern(name.to_string())),
        }
    }

    fn next_node(&self) -> NodeId {
        NodeId::new(u32::try_from(self.nodes.len()).expect("too many attributes"))
    }

    fn push_node(&mut self, key: AttrKey, value: ErasedValue, rule: Option<RuleSlot>) -> NodeId {
        let node = self.next_node();
        self.nodes.push(Node { key, value, rule });
        let attributes = &mut self.objects[key.object().index()].attributes;
        let at = attributes
            .binary_search_by_key(&key.name(), |&(n, _)| n)
            .unwrap_or_else(|at| at);
        attributes.insert(at, (key.name(), node));
        node
    }

    fn find_or_unknown(&self, object: ObjectId, name: Name, text: &str) -> Result<NodeId, Error> {
        self.objects[object.index()]
            .find(name)
            .ok_or_else(|| Error::UnknownAttribute {
                object,
                name: text.to_string(),
            })
    }

    fn node_by_name(&self, object: ObjectId, name: &str) -> Result<NodeId, Error> {
        let found = self.object(object)?;
        self.names
            .lookup(name)
            .and_then(|id| found.find(Name::new(id)))
            .ok_or_else(|| Error::UnknownAttribute {
                object,
                name: name.to_string(),
            })
    }

    fn node_of_key(&self, key: AttrKey) -> Option<NodeId> {
        self.objects.get(key.object().index())?.find(key.name())
    }

    fn handle_node(&self, key: AttrKey, node: NodeId) -> Result<NodeId, Error> {
        match self.nodes.get(node.index()) {
            Some(stored) if stored.key == key => Ok(node),
            _ => Err(self.unknown_attribute(key)),
        }
    }

    fn unknown_attribute(&self, key: AttrKey) -> Error {
        Error::UnknownAttribute {
            object: key.object(),
            name: self.name_str(key.name()).to_string(),
        }
    }

    fn cycle_error(&self, error: CycleError<NodeId>, from: AttrKey) -> Error {
        // The node being declared may not exist yet; it is always `from`.
        Error::Cycle(error.map(|node| match self.nodes.get(node.index()) {
            Some(stored) => stored.key,
            None => from,
        }))
    }
}

fn evaluate(
    nodes: &[Node],
    names: &Interner<String>,
    owner: ObjectId,
    paths: &[ResolvedPath],
    resolved: &[Option<NodeId>],
    func: &RuleFn,
) -> Result<ErasedValue, RuleError> {
    let values = resolved
        .iter()
        .map(|r| r.map(|node| &nodes[node.index()].value))
        .collect();
    func(&RuleInputs::new(owner, names, paths, values))
}

/// A cycle edge among `remaining`, the attributes a flush could not order.
///
/// Picks the smallest attribute that depends on another remaining one. A
/// stalled drain always has such an edge; a remainder without one reports a
/// self edge on `fallback`.
fn unordered_cycle(
    remaining: &[NodeId],
    fallback: NodeId,
    nodes: &[Node],
    deps: &DepGraph<NodeId>,
) -> Error {
    let mut sorted = remaining.to_vec();
    sorted.sort_unstable();
    let edge = sorted.iter().find_map(|&from| {
        deps.dependencies(from)
            .iter()
            .copied()
            .filter(|to| sorted.binary_search(to).is_ok())
            .min()
            .map(|to| (from, to))
    });
    let (from, to) = edge.unwrap_or((fallback, fallback));
    Error::Cycle(CycleError {
        from: nodes[from.index()].key,
        to: nodes[to.index()].key,
    })
}

/// Schedules unvisited attributes of an interrupted flush for the next one.
///
/// Written sources go back to pending as changes. Computed attributes that
/// were owed a run become stale so they rerun even though their inputs are
/// no longer pending.
fn requeue(
    remaining: &[NodeId],
    nodes: &[Node],
    deps: &DepGraph<NodeId>,
    stale: &HashSet<NodeId>,
    changed: &HashSet<NodeId>,
    pending: &mut PendingSet<NodeId>,
    stale_out: &mut HashSet<NodeId>,
) {
    for &node in remaining {
        if changed.contains(&node) {
            pending.mark(node);
        } else if nodes[node.index()].rule.is_some()
            && (stale.contains(&node)
                || deps.dependencies(node).iter().any(|dep| changed.contains(dep)))
        {
            stale_out.insert(node);
            pending.mark(node);
        }
    }
}
