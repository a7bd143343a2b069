// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The process context.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use hashbrown::{HashMap, HashSet};
use trellis_attr::{AttrGraph, AttrValue, ErasedValue, Error, ObjectId};

use crate::endpoint::{Endpoint, SyncReport};
use crate::error::StateError;
use crate::server::{Server, ServerEntry, ServerId, StopError};

/// State shared by everything running in one process.
///
/// Create one at startup, pass it to whatever needs it, and call
/// [`shutdown`](Self::shutdown) on exit. It holds:
///
/// - a typed cache for expensive shared values,
/// - the servers started by the process, so they can all be stopped,
/// - published endpoints, each a group of objects whose published
///   attributes are kept equal by [`flush`](Self::flush).
///
/// ```rust
/// use trellis_state::Context;
///
/// let mut context = Context::new();
/// context.cache_insert("dataset", vec![1_u32, 2, 3]);
/// assert_eq!(context.cache_get::<Vec<u32>>("dataset").map(Vec::len), Some(3));
/// assert_eq!(context.to_string(), "state(servers=[])");
/// context.shutdown().unwrap();
/// ```
pub struct Context {
    cache: HashMap<String, ErasedValue>,
    servers: Vec<ServerEntry>,
    next_server: u64,
    endpoints: BTreeMap<String, Endpoint>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("cache", &self.cache.len())
            .field("servers", &self.servers.len())
            .field("endpoints", &self.endpoints.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.servers.is_empty() {
            return f.write_str("state(servers=[])");
        }
        f.write_str("state(servers=[\n  ")?;
        for (i, entry) in self.servers.iter().enumerate() {
            if i > 0 {
                f.write_str(",\n  ")?;
            }
            write!(f, "{entry}")?;
        }
        f.write_str("\n])")
    }
}

impl Context {
    /// An empty context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            servers: Vec::new(),
            next_server: 0,
            endpoints: BTreeMap::new(),
        }
    }

    // --- Cache ---

    /// Stores `value` under `key`, returning the previous value.
    pub fn cache_insert<T: AttrValue>(
        &mut self,
        key: impl Into<String>,
        value: T,
    ) -> Option<ErasedValue> {
        self.cache.insert(key.into(), ErasedValue::new(value))
    }

    /// The cached value under `key` if it is a `T`.
    #[must_use]
    pub fn cache_get<T: AttrValue>(&self, key: &str) -> Option<&T> {
        self.cache.get(key)?.downcast_ref()
    }

    /// Removes and returns the value under `key`.
    pub fn cache_remove(&mut self, key: &str) -> Option<ErasedValue> {
        self.cache.remove(key)
    }

    /// Empties the cache.
    pub fn cache_clear(&mut self) {
        self.cache.clear();
    }

    /// Number of cached values.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    // --- Servers ---

    /// Tracks a running server serving `label`.
    pub fn register_server(
        &mut self,
        server: impl Server + 'static,
        label: impl Into<String>,
    ) -> ServerId {
        let id = ServerId::new(self.next_server);
        self.next_server += 1;
        let entry = ServerEntry {
            id,
            server: Box::new(server),
            label: label.into(),
        };
        tracing::debug!(server = %entry.endpoint(), "server registered");
        self.servers.push(entry);
        id
    }

    /// Stops tracking a server without stopping it.
    pub fn unregister_server(&mut self, id: ServerId) -> Option<Box<dyn Server>> {
        let at = self.servers.iter().position(|entry| entry.id == id)?;
        Some(self.servers.remove(at).server)
    }

    /// Number of tracked servers.
    #[must_use]
    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    /// Stops every tracked server and forgets them all.
    ///
    /// A server that was already stopped is not an error. Every server gets a
    /// stop attempt even if an earlier one fails.
    ///
    /// # Errors
    ///
    /// [`StateError::ServerStop`] for the first server that failed to stop.
    pub fn kill_all_servers(&mut self) -> Result<(), StateError> {
        let mut first_failure = None;
        for mut entry in self.servers.drain(..) {
            match entry.server.stop() {
                Ok(()) => tracing::debug!(server = %entry.endpoint(), "server stopped"),
                Err(StopError::AlreadyStopped) => {
                    tracing::trace!(server = %entry.endpoint(), "server already stopped");
                }
                Err(StopError::Failed(message)) => {
                    tracing::warn!(server = %entry.endpoint(), %message, "server failed to stop");
                    if first_failure.is_none() {
                        first_failure = Some(StateError::ServerStop {
                            server: entry.endpoint(),
                            message,
                        });
                    }
                }
            }
        }
        first_failure.map_or(Ok(()), Err)
    }

    // --- Endpoints ---

    /// Publishes `object`'s attributes under `endpoint`.
    ///
    /// `attributes` of `None` publishes every attribute the object has now.
    /// The first publisher fixes the attribute set of an endpoint; later
    /// publishers must name the same set, in any order. Publishing the same
    /// object twice is a no-op.
    ///
    /// # Errors
    ///
    /// - [`StateError::EndpointMismatch`] if the attribute set differs from
    ///   the endpoint's.
    /// - [`StateError::Graph`] with [`Error::UnknownObject`] or
    ///   [`Error::UnknownAttribute`] if `object` lacks a named attribute.
    pub fn publish(
        &mut self,
        endpoint: &str,
        graph: &AttrGraph,
        object: ObjectId,
        attributes: Option<&[&str]>,
    ) -> Result<(), StateError> {
        if graph.object_label(object).is_none() {
            return Err(Error::UnknownObject(object).into());
        }
        let mut names: Vec<String> = match attributes {
            Some(names) => {
                for &name in names {
                    if graph.lookup(object, name).is_none() {
                        return Err(Error::UnknownAttribute {
                            object,
                            name: name.to_string(),
                        }
                        .into());
                    }
                }
                names.iter().map(|name| (*name).to_string()).collect()
            }
            None => graph
                .attributes(object)
                .map(|key| graph.name_str(key.name()).to_string())
                .collect(),
        };
        names.sort_unstable();
        names.dedup();

        match self.endpoints.get_mut(endpoint) {
            Some(existing) => {
                if existing.attributes != names {
                    return Err(StateError::EndpointMismatch {
                        endpoint: endpoint.to_string(),
                    });
                }
                if !existing.objects.contains(&object) {
                    existing.objects.push(object);
                }
            }
            None => {
                self.endpoints.insert(
                    endpoint.to_string(),
                    Endpoint {
                        objects: alloc::vec![object],
                        attributes: names,
                    },
                );
            }
        }
        tracing::debug!(endpoint, object = ?object, "object published");
        Ok(())
    }

    /// The objects published under `endpoint`, in publish order.
    #[must_use]
    pub fn published(&self, endpoint: &str) -> Option<&[ObjectId]> {
        self.endpoints.get(endpoint).map(|e| e.objects.as_slice())
    }

    /// The attribute names published under `endpoint`, sorted.
    #[must_use]
    pub fn published_attributes(&self, endpoint: &str) -> Option<&[String]> {
        self.endpoints.get(endpoint).map(|e| e.attributes.as_slice())
    }

    /// Flushes `graph` and keeps every endpoint's objects in sync.
    ///
    /// When a published attribute changes, its new value is copied onto the
    /// same attribute of every other object of the endpoint, and the graph is
    /// flushed again, until nothing more changes. If several objects of one
    /// endpoint changed the same attribute at once, the earliest published
    /// wins. A value copied onto an object is never copied back from it
    /// during the same call, and computed attributes are never overwritten.
    ///
    /// # Errors
    ///
    /// - [`StateError::Graph`] for errors of [`AttrGraph::flush`] and for
    ///   copies between attributes of different types.
    /// - [`StateError::SyncDidNotSettle`] if computed attributes keep
    ///   changing published ones.
    pub fn flush(&mut self, graph: &mut AttrGraph) -> Result<SyncReport, StateError> {
        let mut report = SyncReport::default();
        let mut written = HashSet::new();
        let limit = self
            .endpoints
            .values()
            .map(|e| e.objects.len() * e.attributes.len())
            .sum::<usize>()
            + 1;

        let mut flushed = graph.flush()?;
        loop {
            report.absorb(&flushed);
            let mut copies = Vec::new();
            for endpoint in self.endpoints.values() {
                endpoint.plan_copies(graph, &flushed, &written, &mut copies);
            }
            if copies.is_empty() {
                break;
            }
            let rounds = report.next_round();
            if rounds > limit {
                tracing::warn!(rounds, "endpoint sync did not settle");
                return Err(StateError::SyncDidNotSettle { rounds });
            }
            for (target, value) in copies {
                if graph.set_erased(target, value)? {
                    written.insert(target);
                    report.count_copy();
                }
            }
            flushed = graph.flush()?;
        }
        tracing::debug!(
            changed = report.changed().len(),
            copied = report.copied(),
            rounds = report.rounds(),
            "context flush complete"
        );
        Ok(report)
    }

    /// Tears the context down: stops every server, then drops the cache and
    /// all endpoints.
    ///
    /// # Errors
    ///
    /// As [`kill_all_servers`](Self::kill_all_servers). The context is
    /// consumed either way.
    pub fn shutdown(mut self) -> Result<(), StateError> {
        let result = self.kill_all_servers();
        self.cache.clear();
        self.endpoints.clear();
        tracing::debug!("context shut down");
        result
    }
}
