//! Event system for coordinator consumers.
//!
//! This module provides:
//! - [`ZoneListener`] and [`ListenerRegistry`] for zone-change notifications
//! - [`EventEmitter`] trait for connection status reporting
//! - [`ConnectionState`] / [`CoordinatorEvent`] status types

mod emitter;
mod listeners;

pub use emitter::{EventEmitter, LoggingEventEmitter, NoopEventEmitter};
pub use listeners::{ListenerId, ListenerRegistry, ZoneListener};

use serde::Serialize;

/// Connection lifecycle of the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionState {
    /// Not connected; either stopped or waiting out a backoff.
    #[default]
    Idle,
    /// Fetching a session token.
    Authenticating,
    /// Opening the WebSocket.
    Connecting,
    /// Session open and serving frames.
    Connected,
}

/// Status events reported by the coordinator.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CoordinatorEvent {
    /// Connection state changed.
    StateChanged {
        /// The new state.
        state: ConnectionState,
    },
    /// A connection cycle failed and the coordinator is backing off.
    CycleFailed {
        /// Machine-readable error code.
        code: &'static str,
        /// Human-readable description.
        message: String,
        /// Pause before the next attempt (seconds).
        #[serde(rename = "retryInSecs")]
        retry_in_secs: u64,
    },
}
