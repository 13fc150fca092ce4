//! WebSocket transport to the controller.

use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async_tls_with_config, Connector, MaybeTlsStream, WebSocketStream};

use crate::error::{TransportError, TransportResult};

/// WebSocket stream type used for controller sessions.
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens a WebSocket to `url`.
///
/// For `wss://` URLs the certificate and host name are not verified, since
/// the controller presents a self-signed certificate.
///
/// # Errors
/// Returns `TransportError` if TLS setup or the handshake fails.
pub async fn open_websocket(url: &str, use_tls: bool) -> TransportResult<WsStream> {
    let connector = if use_tls {
        let tls = native_tls::TlsConnector::builder()
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true)
            .build()?;
        Some(Connector::NativeTls(tls))
    } else {
        None
    };

    let (stream, response) = connect_async_tls_with_config(url, None, false, connector)
        .await
        .map_err(TransportError::Connect)?;

    log::debug!("[Session] Handshake completed: {}", response.status());
    Ok(stream)
}

/// Cloneable handle for queueing outbound documents on the live session.
///
/// The connection task owns the socket; this handle only feeds its queue.
#[derive(Clone)]
pub struct SessionHandle {
    outbound: mpsc::Sender<String>,
}

impl SessionHandle {
    /// Creates a handle and the receiving end the connection task drains.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (outbound, rx) = mpsc::channel(capacity);
        (Self { outbound }, rx)
    }

    /// Returns true while the connection task is still draining the queue.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.outbound.is_closed()
    }

    /// Queues a document for sending.
    ///
    /// # Errors
    /// Returns `TransportError::Closed` if the session has ended.
    pub async fn send(&self, document: String) -> TransportResult<()> {
        self.outbound
            .send(document)
            .await
            .map_err(|_| TransportError::Closed)
    }
}
