//! Controller access: session token and WebSocket transport.
//!
//! # Module Structure
//!
//! - `auth` - Token extraction from the controller root page
//! - `session` - WebSocket opening (insecure TLS) and the outbound send handle

pub mod auth;
pub mod session;

pub use auth::{extract_token, HttpTokenProvider, TokenProvider};
pub use session::{open_websocket, SessionHandle, WsStream};
