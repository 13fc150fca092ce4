//! Centralized error types for the Coster core library.
//!
//! Each concern owns a `thiserror` enum and a `Result` alias:
//! - [`AuthError`]: token could not be obtained
//! - [`TransportError`]: WebSocket connect/send/receive failures
//! - [`ProtocolError`]: malformed or unparseable XML documents
//!
//! [`CosterError`] wraps all of them for application-level code.

use thiserror::Error;

/// Trait for error types that provide machine-readable error codes.
///
/// Implement this trait to provide consistent error codes across different
/// error conversion paths.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    fn code(&self) -> &'static str;
}

// ─────────────────────────────────────────────────────────────────────────────
// Authentication
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised while obtaining a session token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The HTTP request for the root page failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The controller answered with a non-success status.
    #[error("HTTP error {0}")]
    HttpStatus(u16),

    /// The root page did not contain a `token=` value.
    #[error("no token found in controller page")]
    TokenNotFound,
}

/// Convenient Result alias for authentication.
pub type AuthResult<T> = Result<T, AuthError>;

impl ErrorCode for AuthError {
    fn code(&self) -> &'static str {
        match self {
            Self::Http(_) => "http_request_failed",
            Self::HttpStatus(_) => "http_error_status",
            Self::TokenNotFound => "token_not_found",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transport
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised by the WebSocket session.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Opening the WebSocket failed.
    #[error("WebSocket connect failed: {0}")]
    Connect(#[source] tokio_tungstenite::tungstenite::Error),

    /// The TLS connector could not be built.
    #[error("TLS setup failed: {0}")]
    Tls(#[from] native_tls::Error),

    /// Writing a frame failed.
    #[error("WebSocket send failed: {0}")]
    Send(#[source] tokio_tungstenite::tungstenite::Error),

    /// Reading a frame failed.
    #[error("WebSocket receive failed: {0}")]
    Receive(#[source] tokio_tungstenite::tungstenite::Error),

    /// No pong arrived within one heartbeat interval.
    #[error("heartbeat timed out after {0}s")]
    HeartbeatTimeout(u64),

    /// The session is no longer open.
    #[error("session closed")]
    Closed,
}

/// Convenient Result alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

impl ErrorCode for TransportError {
    fn code(&self) -> &'static str {
        match self {
            Self::Connect(_) => "ws_connect_failed",
            Self::Tls(_) => "tls_setup_failed",
            Self::Send(_) => "ws_send_failed",
            Self::Receive(_) => "ws_receive_failed",
            Self::HeartbeatTimeout(_) => "heartbeat_timeout",
            Self::Closed => "session_closed",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Protocol
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised while decoding a controller document.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The XML reader rejected the document.
    #[error("malformed XML at byte {position}: {message}")]
    Malformed {
        /// Byte offset reported by the reader.
        position: u64,
        /// Reader error description.
        message: String,
    },

    /// A name, attribute or text node was not valid UTF-8.
    #[error("document is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The document contained no element at all.
    #[error("document has no root element")]
    NoRootElement,

    /// Character data appeared outside the root element.
    #[error("unexpected text outside root element")]
    UnexpectedText,

    /// The document ended while elements were still open.
    #[error("document ended with {0} unclosed element(s)")]
    UnclosedElement(usize),
}

/// Convenient Result alias for codec operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

impl ErrorCode for ProtocolError {
    fn code(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => "xml_malformed",
            Self::InvalidUtf8(_) => "xml_invalid_utf8",
            Self::NoRootElement => "xml_no_root",
            Self::UnexpectedText => "xml_unexpected_text",
            Self::UnclosedElement(_) => "xml_unclosed_element",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Application-wide
// ─────────────────────────────────────────────────────────────────────────────

/// Application-wide error type for the Coster bridge.
#[derive(Debug, Error)]
pub enum CosterError {
    /// Token could not be obtained.
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// WebSocket session failed.
    #[error("Transport failed: {0}")]
    Transport(#[from] TransportError),

    /// A document could not be decoded.
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ErrorCode for CosterError {
    fn code(&self) -> &'static str {
        match self {
            Self::Auth(e) => e.code(),
            Self::Transport(e) => e.code(),
            Self::Protocol(e) => e.code(),
            Self::Configuration(_) => "configuration_error",
        }
    }
}

/// Convenient Result alias for application-wide operations.
pub type CosterResult<T> = Result<T, CosterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_not_found_returns_correct_code() {
        let err = AuthError::TokenNotFound;
        assert_eq!(err.code(), "token_not_found");
    }

    #[test]
    fn wrapped_error_keeps_inner_code() {
        let err: CosterError = ProtocolError::NoRootElement.into();
        assert_eq!(err.code(), "xml_no_root");

        let err: CosterError = TransportError::HeartbeatTimeout(30).into();
        assert_eq!(err.code(), "heartbeat_timeout");
        assert_eq!(
            err.to_string(),
            "Transport failed: heartbeat timed out after 30s"
        );
    }

    #[test]
    fn configuration_error_code() {
        let err = CosterError::Configuration("host is empty".into());
        assert_eq!(err.code(), "configuration_error");
    }
}
