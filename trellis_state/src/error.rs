// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use alloc::string::String;
use core::fmt;

/// Errors returned by [`Context`](crate::Context) operations.
#[derive(Debug)]
pub enum StateError {
    /// An endpoint was published again with a different attribute set.
    EndpointMismatch {
        /// The endpoint name.
        endpoint: String,
    },
    /// A server failed to stop for a reason other than already being
    /// stopped.
    ServerStop {
        /// The server's `address:port`.
        server: String,
        /// What the server reported.
        message: String,
    },
    /// Keeping endpoint objects in sync did not settle.
    SyncDidNotSettle {
        /// Rounds of copying performed before giving up.
        rounds: usize,
    },
    /// An attribute graph operation failed.
    Graph(trellis_attr::Error),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndpointMismatch { endpoint } => write!(
                f,
                "attributes published on endpoint `{endpoint}` must match across publishers"
            ),
            Self::ServerStop { server, message } => {
                write!(f, "server {server} failed to stop: {message}")
            }
            Self::SyncDidNotSettle { rounds } => {
                write!(f, "endpoint sync did not settle after {rounds} rounds")
            }
            Self::Graph(error) => fmt::Display::fmt(error, f),
        }
    }
}

impl core::error::Error for StateError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Graph(error) => Some(error),
            _ => None,
        }
    }
}

impl From<trellis_attr::Error> for StateError {
    fn from(error: trellis_attr::Error) -> Self {
        Self::Graph(error)
    }
}
