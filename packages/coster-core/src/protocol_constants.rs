//! Fixed protocol constants that should NOT be changed.
//!
//! These values are dictated by the EW-50E controller firmware and by the
//! retry policy of the bridge. Changing them alters how the bridge behaves
//! against a real device.

// ─────────────────────────────────────────────────────────────────────────────
// Zones
// ─────────────────────────────────────────────────────────────────────────────

/// Number of zones (M-NET groups) addressed by one controller.
pub const ZONE_COUNT: u8 = 17;

/// Attributes requested for every zone in a full poll, in wire order.
pub const TRACKED_ATTRIBUTES: [&str; 7] = [
    "Drive",
    "Mode",
    "SetTemp",
    "InletTemp",
    "FanSpeed",
    "AirDirection",
    "ErrorSign",
];

/// Wildcard value asking the controller to report an attribute.
pub const WILDCARD_VALUE: &str = "*";

// ─────────────────────────────────────────────────────────────────────────────
// XML dialect
// ─────────────────────────────────────────────────────────────────────────────

/// Root element of every document.
pub const ROOT_ELEMENT: &str = "Packet";

/// Element carrying the message kind.
pub const COMMAND_ELEMENT: &str = "Command";

/// Container element for zone records.
pub const DATABASE_ELEMENT: &str = "DatabaseManager";

/// Element describing one zone.
pub const ZONE_ELEMENT: &str = "Mnet";

/// Attribute holding the zone identifier on a zone element.
pub const ZONE_ID_ATTRIBUTE: &str = "Group";

// ─────────────────────────────────────────────────────────────────────────────
// Timing
// ─────────────────────────────────────────────────────────────────────────────

/// Timeout for the token-fetching HTTP request (seconds).
pub const AUTH_TIMEOUT_SECS: u64 = 10;

/// WebSocket ping interval; a missing pong by the next tick closes the session (seconds).
pub const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Delay between a zone command and the follow-up full poll (milliseconds).
///
/// Push notifications for the changed attribute can lag the acknowledgment.
pub const POST_COMMAND_POLL_DELAY_MS: u64 = 1000;

/// Pause after a session ends, before handing back to the maintenance loop (seconds).
pub const DISCONNECT_BACKOFF_SECS: u64 = 5;

/// Pause after an unexpected error in a connection cycle (seconds).
pub const CYCLE_ERROR_BACKOFF_SECS: u64 = 10;

/// Pause after the controller rejected the token request (seconds).
pub const AUTH_FAILURE_BACKOFF_SECS: u64 = 30;

/// Upper bound for sending the close frame when a session is stopped (seconds).
pub const SESSION_CLOSE_TIMEOUT_SECS: u64 = 2;

// ─────────────────────────────────────────────────────────────────────────────
// Channels
// ─────────────────────────────────────────────────────────────────────────────

/// Capacity of the outbound frame queue of a live session.
pub const OUTBOUND_CHANNEL_CAPACITY: usize = 32;
