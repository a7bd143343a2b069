// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Running servers, as far as the process context is concerned.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

/// A server the process started and must stop on shutdown.
///
/// Serving itself happens elsewhere; the context only needs to describe and
/// stop it.
pub trait Server: Send {
    /// The bound address, or `None` for the default host.
    fn address(&self) -> Option<&str>;

    /// The bound port.
    fn port(&self) -> u16;

    /// Stops the server.
    ///
    /// # Errors
    ///
    /// [`StopError::AlreadyStopped`] if it was stopped before, which the
    /// context tolerates, or [`StopError::Failed`].
    fn stop(&mut self) -> Result<(), StopError>;
}

/// Why [`Server::stop`] failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StopError {
    /// The server was not running.
    AlreadyStopped,
    /// Stopping failed.
    Failed(String),
}

impl fmt::Display for StopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyStopped => f.write_str("server already stopped"),
            Self::Failed(message) => f.write_str(message),
        }
    }
}

impl core::error::Error for StopError {}

/// Handle to a registered server.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServerId(u64);

impl ServerId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

pub(crate) struct ServerEntry {
    pub(crate) id: ServerId,
    pub(crate) server: Box<dyn Server>,
    /// What the server serves, for display.
    pub(crate) label: String,
}

impl ServerEntry {
    /// `address:port`, with `localhost` standing in for no address.
    pub(crate) fn endpoint(&self) -> String {
        alloc::format!(
            "{}:{}",
            self.server.address().unwrap_or("localhost"),
            self.server.port()
        )
    }
}

impl fmt::Display for ServerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.endpoint(), self.label)
    }
}
