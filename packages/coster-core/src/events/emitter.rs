//! Event emitter abstraction for decoupling the coordinator from consumers.
//!
//! The coordinator depends on the [`EventEmitter`] trait rather than a
//! concrete channel, so the bridge, tests, or a host integration can each
//! decide where status events go.

use super::CoordinatorEvent;

/// Trait for emitting coordinator status events without knowledge of transport.
pub trait EventEmitter: Send + Sync {
    /// Emits a connection status event.
    fn emit_connection(&self, event: CoordinatorEvent);
}

/// No-op emitter for embedded use or testing.
pub struct NoopEventEmitter;

impl EventEmitter for NoopEventEmitter {
    fn emit_connection(&self, _event: CoordinatorEvent) {}
}

/// Logging emitter for debugging and development.
///
/// Logs all events at debug level.
pub struct LoggingEventEmitter;

impl EventEmitter for LoggingEventEmitter {
    fn emit_connection(&self, event: CoordinatorEvent) {
        tracing::debug!(?event, "coordinator_event");
    }
}
