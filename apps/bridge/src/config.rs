//! Bridge configuration.
//!
//! Supports loading from YAML files with environment variable overrides.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use coster_core::CoordinatorConfig;
use serde::Deserialize;

/// Bridge configuration loaded from YAML with environment overrides.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Controller host, optionally with `:port`.
    /// Override: `COSTER_HOST`
    pub host: String,

    /// Use `https`/`wss`. Disable only for local test controllers.
    /// Override: `COSTER_USE_TLS`
    pub use_tls: bool,

    /// WebSocket path on the controller.
    /// Override: `COSTER_WS_PATH`
    pub ws_path: String,

    /// Zones to poll. Defaults to all 17.
    pub zone_ids: Option<Vec<String>>,

    /// Seconds between WebSocket pings.
    pub heartbeat_secs: u64,

    /// Display names for log output, keyed by zone id.
    pub zone_names: BTreeMap<String, String>,

    /// Command sent once, after the first successful connection.
    pub startup_command: Option<StartupCommand>,
}

/// One raw zone command, e.g. `{ zone: "3", attributes: { Drive: "ON" } }`.
#[derive(Debug, Clone, Deserialize)]
pub struct StartupCommand {
    pub zone: String,
    pub attributes: BTreeMap<String, String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        let core = CoordinatorConfig::default();
        Self {
            host: core.host,
            use_tls: core.use_tls,
            ws_path: core.ws_path,
            zone_ids: None,
            heartbeat_secs: core.heartbeat_secs,
            zone_names: BTreeMap::new(),
            startup_command: None,
        }
    }
}

impl BridgeConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("COSTER_HOST") {
            if !val.is_empty() {
                self.host = val;
            }
        }

        if let Ok(val) = std::env::var("COSTER_USE_TLS") {
            if let Ok(use_tls) = val.parse() {
                self.use_tls = use_tls;
            }
        }

        if let Ok(val) = std::env::var("COSTER_WS_PATH") {
            if !val.is_empty() {
                self.ws_path = val;
            }
        }
    }

    /// Display label for a zone: its configured name, or `zone <id>`.
    pub fn zone_label(&self, zone_id: &str) -> String {
        match self.zone_names.get(zone_id) {
            Some(name) => format!("{} ({})", name, zone_id),
            None => format!("zone {}", zone_id),
        }
    }

    /// Converts to coster-core's coordinator settings.
    pub fn to_core_config(&self) -> CoordinatorConfig {
        let mut core = CoordinatorConfig::new(self.host.clone());
        core.use_tls = self.use_tls;
        core.ws_path = self.ws_path.clone();
        core.heartbeat_secs = self.heartbeat_secs;
        if let Some(ref zone_ids) = self.zone_ids {
            core.zone_ids = zone_ids.clone();
        }
        core
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn yaml_file_fills_missing_fields_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "host: 192.168.1.50\nzone_names:\n  \"1\": Lobby\n  \"4\": Server room"
        )
        .expect("write config");

        let config = BridgeConfig::load(Some(file.path())).expect("load config");
        assert!(config.use_tls);
        assert_eq!(config.ws_path, "/");
        assert_eq!(config.zone_label("4"), "Server room (4)");
        assert_eq!(config.zone_label("9"), "zone 9");

        let core = config.to_core_config();
        assert_eq!(core.host, "192.168.1.50");
        assert_eq!(core.zone_ids.len(), 17);
        assert!(core.validate().is_ok());
    }

    #[test]
    fn explicit_zone_list_replaces_default() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "host: controller.local\nuse_tls: false\nzone_ids: [\"2\", \"3\"]\nheartbeat_secs: 15"
        )
        .expect("write config");

        let core = BridgeConfig::load(Some(file.path()))
            .expect("load config")
            .to_core_config();
        assert!(!core.use_tls);
        assert_eq!(core.zone_ids, vec!["2".to_string(), "3".to_string()]);
        assert_eq!(core.heartbeat_secs, 15);
        assert_eq!(core.root_url(), "http://controller.local/");
    }

    #[test]
    fn startup_command_is_parsed() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "host: h\nstartup_command:\n  zone: \"3\"\n  attributes:\n    Drive: \"ON\"\n    SetTemp: \"22\""
        )
        .expect("write config");

        let config = BridgeConfig::load(Some(file.path())).expect("load config");
        let command = config.startup_command.expect("startup command present");
        assert_eq!(command.zone, "3");
        assert_eq!(command.attributes.get("Drive").map(String::as_str), Some("ON"));
        assert_eq!(command.attributes.len(), 2);
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("missing.yaml");
        assert!(BridgeConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "host: [unterminated").expect("write config");
        assert!(BridgeConfig::load(Some(file.path())).is_err());
    }
}
