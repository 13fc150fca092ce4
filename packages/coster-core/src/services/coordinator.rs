//! Connection coordinator.
//!
//! Responsibilities:
//! - Keeping one authenticated WebSocket session to the controller alive
//! - Priming and refreshing the zone table (poll on connect, poll after commands)
//! - Applying `getResponse` snapshots and `notifyRequest` patches
//! - Notifying zone listeners once per applied message
//!
//! # Connection lifecycle
//!
//! `Idle -> Authenticating -> Connecting -> Connected -> Idle`, repeated until
//! [`Coordinator::stop`]. Failures never escape the maintenance loop; they
//! are logged and followed by a fixed pause:
//!
//! | Outcome                                    | Pause |
//! |--------------------------------------------|-------|
//! | Session ended (close or error)             | 5s    |
//! | Other cycle error (incl. unreachable host) | 10s   |
//! | Root page without token, or HTTP error     | 30s   |

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use parking_lot::RwLock;
use tokio::time::{interval_at, timeout, Instant};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::climate::{ClimateZone, ZoneCommand};
use crate::codec::{decode, encode_poll_all, encode_set, ZoneAttributes};
use crate::device::{open_websocket, HttpTokenProvider, SessionHandle, TokenProvider, WsStream};
use crate::error::{AuthError, CosterError, CosterResult, ErrorCode, TransportError};
use crate::events::{
    ConnectionState, CoordinatorEvent, EventEmitter, ListenerId, ListenerRegistry,
    LoggingEventEmitter, ZoneListener,
};
use crate::protocol_constants::{
    AUTH_FAILURE_BACKOFF_SECS, CYCLE_ERROR_BACKOFF_SECS, DISCONNECT_BACKOFF_SECS,
    OUTBOUND_CHANNEL_CAPACITY, POST_COMMAND_POLL_DELAY_MS, SESSION_CLOSE_TIMEOUT_SECS,
};
use crate::runtime::{TaskSpawner, TokioSpawner};
use crate::state::{CoordinatorConfig, ZoneTable};

/// Why a served session ended.
#[derive(Debug)]
enum SessionEnd {
    /// `stop()` was called.
    Stopped,
    /// The controller closed the socket (close code, if any).
    ClosedByPeer(Option<u16>),
    /// Send, receive or heartbeat failure.
    Failed(TransportError),
}

/// Owns the controller connection and the zone table.
///
/// Share it as `Arc<Coordinator>`; the maintenance task holds its own clone
/// while running.
pub struct Coordinator {
    config: CoordinatorConfig,
    tokens: Arc<dyn TokenProvider>,
    emitter: Arc<dyn EventEmitter>,
    spawner: TokioSpawner,
    zones: ZoneTable,
    listeners: ListenerRegistry,
    /// Outbound handle of the live session, `None` while disconnected.
    session: RwLock<Option<SessionHandle>>,
    state: RwLock<ConnectionState>,
    running: AtomicBool,
    /// Replaced on each `start()` after a `stop()`.
    cancel: RwLock<CancellationToken>,
}

impl Coordinator {
    /// Creates a coordinator with explicit collaborators.
    pub fn new(
        config: CoordinatorConfig,
        tokens: Arc<dyn TokenProvider>,
        emitter: Arc<dyn EventEmitter>,
        spawner: TokioSpawner,
    ) -> Self {
        Self {
            config,
            tokens,
            emitter,
            spawner,
            zones: ZoneTable::new(),
            listeners: ListenerRegistry::new(),
            session: RwLock::new(None),
            state: RwLock::new(ConnectionState::Idle),
            running: AtomicBool::new(false),
            cancel: RwLock::new(CancellationToken::new()),
        }
    }

    /// Creates a coordinator that authenticates over HTTPS, logs status
    /// events, and runs on the current Tokio runtime.
    ///
    /// # Errors
    /// Returns `CosterError::Configuration` for invalid settings, or
    /// `CosterError::Auth` if the HTTP client cannot be built.
    ///
    /// # Panics
    /// Panics if called outside of a Tokio runtime context.
    pub fn from_config(config: CoordinatorConfig) -> CosterResult<Arc<Self>> {
        config.validate().map_err(CosterError::Configuration)?;
        let tokens = Arc::new(HttpTokenProvider::new(&config)?);
        Ok(Arc::new(Self::new(
            config,
            tokens,
            Arc::new(LoggingEventEmitter),
            TokioSpawner::current(),
        )))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Consumer surface
    // ─────────────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Copy of the whole zone table.
    #[must_use]
    pub fn data(&self) -> HashMap<String, ZoneAttributes> {
        self.zones.snapshot()
    }

    /// Copy of one zone's attributes.
    #[must_use]
    pub fn zone(&self, zone_id: &str) -> Option<ZoneAttributes> {
        self.zones.get(zone_id)
    }

    /// Climate view of one zone, if the zone is known.
    #[must_use]
    pub fn climate(&self, zone_id: &str) -> Option<ClimateZone> {
        self.zones
            .get(zone_id)
            .map(|attributes| ClimateZone::new(zone_id, attributes))
    }

    /// Attaches a listener. Only a weak reference is kept.
    pub fn add_listener(&self, listener: &Arc<dyn ZoneListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    /// Detaches a listener. Returns `false` if it was not attached.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        *self.state.read()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// True while a session is open and accepting outbound documents.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.session.read().as_ref().is_some_and(SessionHandle::is_open)
    }

    /// Sends a command to one zone, then re-polls after a short delay.
    ///
    /// Commands issued while disconnected are dropped, not queued, and no
    /// error is raised. Returns `true` if the command was handed to the
    /// live session.
    pub async fn set_zone(&self, zone_id: &str, updates: &ZoneAttributes) -> bool {
        if updates.is_empty() {
            log::debug!("[Coordinator] Ignoring empty command for zone {}", zone_id);
            return false;
        }

        if !self.send_if_connected(encode_set(zone_id, updates)).await {
            log::info!(
                "[Coordinator] Not connected, dropping command for zone {}",
                zone_id
            );
            return false;
        }
        log::info!("[Coordinator] Command sent to zone {}: {:?}", zone_id, updates);

        tokio::time::sleep(Duration::from_millis(POST_COMMAND_POLL_DELAY_MS)).await;
        if !self.send_if_connected(self.poll_document()).await {
            log::debug!("[Coordinator] Session ended before follow-up poll");
        }
        true
    }

    /// Typed variant of [`set_zone`](Self::set_zone).
    pub async fn apply_command(&self, zone_id: &str, command: &ZoneCommand) -> bool {
        self.set_zone(zone_id, command.attributes()).await
    }

    /// Starts the maintenance task. No-op if already running.
    pub fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            log::debug!("[Coordinator] start() called while running");
            return;
        }

        let cancel = {
            let mut guard = self.cancel.write();
            if guard.is_cancelled() {
                *guard = CancellationToken::new();
            }
            guard.clone()
        };

        log::info!("[Coordinator] Starting for {}", self.config.host);
        let this = Arc::clone(self);
        self.spawner.spawn(async move {
            this.maintain(cancel).await;
        });
    }

    /// Stops the maintenance task and closes the live session. Idempotent.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        log::info!("[Coordinator] Stopping");
        self.cancel.read().cancel();
        self.session.write().take();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Maintenance loop
    // ─────────────────────────────────────────────────────────────────────────

    async fn maintain(self: Arc<Self>, cancel: CancellationToken) {
        while !cancel.is_cancelled() {
            let error = match self.run_cycle(&cancel).await {
                Ok(()) => continue,
                Err(e) => e,
            };
            if cancel.is_cancelled() {
                break;
            }

            let pause_secs = backoff_secs(&error);
            if pause_secs == AUTH_FAILURE_BACKOFF_SECS {
                log::warn!(
                    "[Coordinator] Authentication failed: {} (retrying in {}s)",
                    error,
                    pause_secs
                );
            } else {
                log::error!(
                    "[Coordinator] Connection cycle failed: {} (retrying in {}s)",
                    error,
                    pause_secs
                );
            }
            self.report_failure(&error, pause_secs);

            self.set_state(ConnectionState::Idle);
            if !sleep_or_cancel(&cancel, Duration::from_secs(pause_secs)).await {
                break;
            }
        }

        // A restarted coordinator owns the session and state from here on.
        if !self.is_running() {
            self.session.write().take();
            self.set_state(ConnectionState::Idle);
        }
        log::info!("[Coordinator] Maintenance loop exited");
    }

    /// One authenticate / connect / serve / disconnect cycle.
    ///
    /// Returns `Ok` after a served session (including its disconnect pause)
    /// or when stopped mid-cycle.
    async fn run_cycle(&self, cancel: &CancellationToken) -> CosterResult<()> {
        self.set_state(ConnectionState::Authenticating);
        let token = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            token = self.tokens.fetch_token() => token?,
        };
        log::info!("[Coordinator] Obtained token ({} chars)", token.len());

        self.set_state(ConnectionState::Connecting);
        let url = self.config.ws_url(&token);
        let ws = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            ws = open_websocket(&url, self.config.use_tls) => ws?,
        };
        log::info!("[Coordinator] Connected to {}", self.config.host);

        let end = self.serve(ws, cancel).await;
        if self.end_session(end, cancel) {
            sleep_or_cancel(cancel, Duration::from_secs(DISCONNECT_BACKOFF_SECS)).await;
        }
        Ok(())
    }

    /// Clears the slot of a finished session and returns `true` if the
    /// disconnect pause applies.
    ///
    /// Once stopped, the slot and state are left alone: `stop()` already
    /// cleared them and a restarted run may own them by now.
    fn end_session(&self, end: SessionEnd, cancel: &CancellationToken) -> bool {
        match end {
            SessionEnd::Stopped => return false,
            SessionEnd::ClosedByPeer(code) => {
                log::warn!("[Coordinator] Session closed by controller (code {:?})", code);
            }
            SessionEnd::Failed(e) => {
                log::warn!("[Coordinator] Session failed: {}", e);
            }
        }
        if cancel.is_cancelled() {
            return false;
        }

        self.session.write().take();
        self.set_state(ConnectionState::Idle);
        true
    }

    /// Drives one open session until it ends.
    ///
    /// This task is the only reader and writer of the socket; `set_zone`
    /// reaches it through the session handle's queue.
    async fn serve(&self, ws: WsStream, cancel: &CancellationToken) -> SessionEnd {
        let (mut sink, mut stream) = ws.split();
        let (handle, mut outbound) = SessionHandle::channel(OUTBOUND_CHANNEL_CAPACITY);
        *self.session.write() = Some(handle);
        self.set_state(ConnectionState::Connected);

        if let Err(e) = sink.send(Message::Text(self.poll_document().into())).await {
            return SessionEnd::Failed(TransportError::Send(e));
        }

        let heartbeat = Duration::from_secs(self.config.heartbeat_secs);
        let mut ticker = interval_at(Instant::now() + heartbeat, heartbeat);
        let mut awaiting_pong = false;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    let close = async {
                        let _ = sink.send(Message::Close(None)).await;
                        let _ = sink.close().await;
                    };
                    let limit = Duration::from_secs(SESSION_CLOSE_TIMEOUT_SECS);
                    if timeout(limit, close).await.is_err() {
                        log::debug!("[Coordinator] Close handshake timed out");
                    }
                    return SessionEnd::Stopped;
                }
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => self.handle_frame(text.as_str()),
                    Some(Ok(Message::Pong(_))) => awaiting_pong = false,
                    Some(Ok(Message::Close(frame))) => {
                        return SessionEnd::ClosedByPeer(frame.map(|f| u16::from(f.code)));
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return SessionEnd::Failed(TransportError::Receive(e)),
                    None => return SessionEnd::ClosedByPeer(None),
                },
                Some(document) = outbound.recv() => {
                    if let Err(e) = sink.send(Message::Text(document.into())).await {
                        return SessionEnd::Failed(TransportError::Send(e));
                    }
                }
                _ = ticker.tick() => {
                    if awaiting_pong {
                        return SessionEnd::Failed(TransportError::HeartbeatTimeout(
                            self.config.heartbeat_secs,
                        ));
                    }
                    awaiting_pong = true;
                    if let Err(e) = sink.send(Message::Ping(Vec::new().into())).await {
                        return SessionEnd::Failed(TransportError::Send(e));
                    }
                }
            }
        }
    }

    /// Decodes one text frame, applies it, and notifies listeners once.
    ///
    /// Malformed frames are logged and dropped; the session continues.
    fn handle_frame(&self, text: &str) {
        let message = match decode(text) {
            Ok(message) => message,
            Err(e) => {
                log::warn!("[Coordinator] Dropping malformed frame: {}", e);
                return;
            }
        };

        if message.is_ignorable() {
            log::trace!("[Coordinator] Ignoring {:?} frame", message.kind);
            return;
        }

        let kind = message.kind;
        let applied = self.zones.apply_message(message);
        log::debug!("[Coordinator] {:?} applied to {} zone(s)", kind, applied);
        if applied > 0 {
            self.listeners.notify();
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn poll_document(&self) -> String {
        encode_poll_all(&self.config.zone_ids)
    }

    /// Queues `document` on the live session, if any.
    ///
    /// The session is checked right before sending; if it disappears in
    /// between, the send is skipped.
    async fn send_if_connected(&self, document: String) -> bool {
        let handle = self.session.read().clone();
        match handle {
            Some(handle) => handle.send(document).await.is_ok(),
            None => false,
        }
    }

    fn set_state(&self, new_state: ConnectionState) {
        let changed = {
            let mut state = self.state.write();
            let changed = *state != new_state;
            *state = new_state;
            changed
        };
        if changed {
            log::debug!("[Coordinator] State -> {:?}", new_state);
            self.emitter
                .emit_connection(CoordinatorEvent::StateChanged { state: new_state });
        }
    }

    fn report_failure<E: ErrorCode + std::fmt::Display>(&self, error: &E, retry_in_secs: u64) {
        self.emitter.emit_connection(CoordinatorEvent::CycleFailed {
            code: error.code(),
            message: error.to_string(),
            retry_in_secs,
        });
    }
}

/// Pause before retrying after a failed cycle.
///
/// Only a controller that answered without a usable token gets the long
/// pause; an unreachable controller is an ordinary cycle error.
fn backoff_secs(error: &CosterError) -> u64 {
    match error {
        CosterError::Auth(AuthError::TokenNotFound | AuthError::HttpStatus(_)) => {
            AUTH_FAILURE_BACKOFF_SECS
        }
        _ => CYCLE_ERROR_BACKOFF_SECS,
    }
}

/// Sleeps for `duration`. Returns `false` if cancelled first.
async fn sleep_or_cancel(cancel: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}
