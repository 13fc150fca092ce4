//! Coster Core - client library for Coster EW-50E air-conditioning controllers.
//!
//! The controller exposes its HVAC zones over an XML-over-WebSocket protocol
//! behind a token printed on its root page. This crate keeps one session to
//! the controller alive, mirrors every zone's attributes in memory, and sends
//! zone commands.
//!
//! # Architecture
//!
//! - [`codec`]: XML documents in and out (`getRequest`, `setRequest`, responses, notifications)
//! - [`device`]: Token retrieval and the WebSocket transport
//! - [`state`]: Connection settings and the zone table
//! - [`services`]: The [`Coordinator`] maintenance loop
//! - [`climate`]: Typed climate view over raw zone attributes
//! - [`events`]: Connection status events and zone listeners
//! - [`error`]: Centralized error types
//!
//! # Abstraction Traits
//!
//! - [`TaskSpawner`](runtime::TaskSpawner): Spawning the maintenance task
//! - [`EventEmitter`](events::EventEmitter): Emitting connection status
//! - [`TokenProvider`](device::TokenProvider): Obtaining the session token
//! - [`ZoneListener`](events::ZoneListener): Reacting to zone table updates

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod climate;
pub mod codec;
pub mod device;
pub mod error;
pub mod events;
pub mod protocol_constants;
pub mod runtime;
pub mod services;
pub mod state;

// Re-export commonly used types at the crate root
pub use climate::{ClimateZone, Drive, FanSpeed, HvacMode, SwingMode, ZoneCommand};
pub use codec::{decode, encode_poll_all, encode_set, DecodedMessage, MessageKind, ZoneAttributes};
pub use device::{HttpTokenProvider, TokenProvider};
pub use error::{
    AuthError, CosterError, CosterResult, ErrorCode, ProtocolError, TransportError,
};
pub use events::{
    ConnectionState, CoordinatorEvent, EventEmitter, ListenerId, LoggingEventEmitter,
    NoopEventEmitter, ZoneListener,
};
pub use runtime::{TaskSpawner, TokioSpawner};
pub use services::Coordinator;
pub use state::{CoordinatorConfig, ZoneTable};
