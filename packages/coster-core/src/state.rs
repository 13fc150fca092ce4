//! Core configuration and runtime state.
//!
//! - [`CoordinatorConfig`]: where the controller lives and how to reach it
//! - [`ZoneTable`]: in-memory attribute table for every known zone

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::codec::{DecodedMessage, MessageKind, ZoneAttributes};
use crate::protocol_constants::{AUTH_TIMEOUT_SECS, HEARTBEAT_INTERVAL_SECS, ZONE_COUNT};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for one controller connection.
///
/// All fields except `host` have sensible defaults.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Controller host name or IP, optionally with `:port`.
    pub host: String,

    /// Use `https`/`wss` (certificate not verified). `false` selects `http`/`ws`.
    pub use_tls: bool,

    /// Path of the WebSocket endpoint; the token is appended as a query parameter.
    pub ws_path: String,

    /// Zones polled on connect and after every command.
    pub zone_ids: Vec<String>,

    /// WebSocket ping interval (seconds).
    pub heartbeat_secs: u64,

    /// Timeout for the token request (seconds).
    pub auth_timeout_secs: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            use_tls: true,
            ws_path: "/".to_string(),
            zone_ids: default_zone_ids(),
            heartbeat_secs: HEARTBEAT_INTERVAL_SECS,
            auth_timeout_secs: AUTH_TIMEOUT_SECS,
        }
    }
}

impl CoordinatorConfig {
    /// Creates a config for `host` with default settings.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("host must not be empty".to_string());
        }
        if self.host.contains("://") {
            return Err("host must not include a scheme".to_string());
        }
        if !self.ws_path.starts_with('/') {
            return Err("ws_path must start with '/'".to_string());
        }
        if self.zone_ids.is_empty() {
            return Err("zone_ids must list at least one zone".to_string());
        }
        if self.heartbeat_secs == 0 {
            return Err("heartbeat_secs must be >= 1".to_string());
        }
        if self.auth_timeout_secs == 0 {
            return Err("auth_timeout_secs must be >= 1".to_string());
        }
        Ok(())
    }

    /// URL of the controller root page, which embeds the session token.
    #[must_use]
    pub fn root_url(&self) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        format!("{}://{}/", scheme, self.host)
    }

    /// WebSocket URL carrying `token` as a query parameter.
    #[must_use]
    pub fn ws_url(&self, token: &str) -> String {
        let scheme = if self.use_tls { "wss" } else { "ws" };
        let separator = if self.ws_path.contains('?') { '&' } else { '?' };
        format!(
            "{}://{}{}{}token={}",
            scheme, self.host, self.ws_path, separator, token
        )
    }
}

/// Zone identifiers "1" through "17".
#[must_use]
pub fn default_zone_ids() -> Vec<String> {
    (1..=ZONE_COUNT).map(|n| n.to_string()).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Zone State
// ─────────────────────────────────────────────────────────────────────────────

/// Per-zone attribute table.
///
/// Only the coordinator's connection task writes; readers take short read
/// locks and receive clones.
#[derive(Debug, Default)]
pub struct ZoneTable {
    zones: RwLock<HashMap<String, ZoneAttributes>>,
}

impl ZoneTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces a zone's attribute mapping, creating the zone if needed.
    pub fn apply_snapshot(&self, zone_id: &str, attributes: ZoneAttributes) {
        self.zones.write().insert(zone_id.to_string(), attributes);
    }

    /// Merges attributes into a known zone.
    ///
    /// Returns `false` and leaves the table untouched if the zone is unknown;
    /// only a snapshot can create a zone.
    pub fn apply_patch(&self, zone_id: &str, attributes: ZoneAttributes) -> bool {
        match self.zones.write().get_mut(zone_id) {
            Some(existing) => {
                existing.extend(attributes);
                true
            }
            None => false,
        }
    }

    /// Applies every record of a decoded message.
    ///
    /// Returns the number of zones that were written.
    pub fn apply_message(&self, message: DecodedMessage) -> usize {
        let mut applied = 0;
        for record in message.zones {
            match message.kind {
                MessageKind::GetResponse => {
                    self.apply_snapshot(&record.zone_id, record.attributes);
                    applied += 1;
                }
                MessageKind::NotifyRequest => {
                    if self.apply_patch(&record.zone_id, record.attributes) {
                        applied += 1;
                    } else {
                        log::debug!(
                            "[ZoneTable] Ignoring patch for unknown zone {}",
                            record.zone_id
                        );
                    }
                }
                MessageKind::Other => {}
            }
        }
        applied
    }

    /// Returns a copy of one zone's attributes.
    #[must_use]
    pub fn get(&self, zone_id: &str) -> Option<ZoneAttributes> {
        self.zones.read().get(zone_id).cloned()
    }

    /// Returns a copy of the whole table.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, ZoneAttributes> {
        self.zones.read().clone()
    }

    /// Returns the number of known zones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.read().len()
    }

    /// Returns true if no zone is known yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.read().is_empty()
    }
}
