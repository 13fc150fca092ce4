//! Climate view over raw zone attributes.
//!
//! Maps the controller vocabulary (`Drive`, `Mode`, `FanSpeed`, ...) onto a
//! small capability set (current/target temperature, HVAC mode, fan mode,
//! swing mode) that any presentation layer can consume, and builds the
//! attribute updates for commands in the other direction.

use serde::Serialize;

use crate::codec::ZoneAttributes;

/// Zone power state (`Drive`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Drive {
    On,
    Off,
}

impl Drive {
    #[must_use]
    pub fn from_device_str(s: &str) -> Option<Self> {
        match s {
            "ON" => Some(Self::On),
            "OFF" => Some(Self::Off),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_device_str(&self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }
}

/// HVAC mode as presented to consumers. `Off` is derived from `Drive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacMode {
    Off,
    Heat,
    Cool,
    FanOnly,
    Auto,
    Dry,
}

/// Every mode a zone can be switched to.
pub const HVAC_MODES: [HvacMode; 6] = [
    HvacMode::Off,
    HvacMode::Heat,
    HvacMode::Cool,
    HvacMode::FanOnly,
    HvacMode::Auto,
    HvacMode::Dry,
];

impl HvacMode {
    /// Maps a device `Mode` value. `Off` is never produced here.
    #[must_use]
    pub fn from_device_mode(s: &str) -> Option<Self> {
        match s {
            "HEAT" => Some(Self::Heat),
            "COOL" => Some(Self::Cool),
            "FAN" => Some(Self::FanOnly),
            "AUTO" => Some(Self::Auto),
            "DRY" => Some(Self::Dry),
            _ => None,
        }
    }

    /// Device `Mode` value, or `None` for `Off` (which is a `Drive` state).
    #[must_use]
    pub fn as_device_mode(&self) -> Option<&'static str> {
        match self {
            Self::Off => None,
            Self::Heat => Some("HEAT"),
            Self::Cool => Some("COOL"),
            Self::FanOnly => Some("FAN"),
            Self::Auto => Some("AUTO"),
            Self::Dry => Some("DRY"),
        }
    }
}

/// Fan speed (`FanSpeed`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FanSpeed {
    Low,
    Mid1,
    Mid2,
    Mid3,
    High,
    Auto,
}

/// Every fan speed the controller accepts.
pub const FAN_SPEEDS: [FanSpeed; 6] = [
    FanSpeed::Low,
    FanSpeed::Mid1,
    FanSpeed::Mid2,
    FanSpeed::Mid3,
    FanSpeed::High,
    FanSpeed::Auto,
];

impl FanSpeed {
    #[must_use]
    pub fn from_device_str(s: &str) -> Option<Self> {
        match s {
            "LOW" => Some(Self::Low),
            "MID1" => Some(Self::Mid1),
            "MID2" => Some(Self::Mid2),
            "MID3" => Some(Self::Mid3),
            "HIGH" => Some(Self::High),
            "AUTO" => Some(Self::Auto),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_device_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Mid1 => "MID1",
            Self::Mid2 => "MID2",
            Self::Mid3 => "MID3",
            Self::High => "HIGH",
            Self::Auto => "AUTO",
        }
    }
}

/// Louver swing, derived from `AirDirection`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SwingMode {
    On,
    Off,
}

/// `AirDirection` value meaning "swing off". Any other value means swing on.
const AIR_DIRECTION_FIXED: &str = "HORIZONTAL";

/// `AirDirection` value written when swing is turned on.
const AIR_DIRECTION_SWING: &str = "SWING";

impl SwingMode {
    #[must_use]
    pub fn from_air_direction(s: &str) -> Self {
        if s == AIR_DIRECTION_FIXED {
            Self::Off
        } else {
            Self::On
        }
    }

    #[must_use]
    pub fn as_air_direction(&self) -> &'static str {
        match self {
            Self::On => AIR_DIRECTION_SWING,
            Self::Off => AIR_DIRECTION_FIXED,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Read side
// ─────────────────────────────────────────────────────────────────────────────

/// Read-only climate view of one zone.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateZone {
    zone_id: String,
    attributes: ZoneAttributes,
}

impl ClimateZone {
    /// Wraps a copy of a zone's attributes.
    pub fn new(zone_id: impl Into<String>, attributes: ZoneAttributes) -> Self {
        Self {
            zone_id: zone_id.into(),
            attributes,
        }
    }

    #[must_use]
    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    /// Raw attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn drive(&self) -> Option<Drive> {
        self.attribute("Drive").and_then(Drive::from_device_str)
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        self.drive() == Some(Drive::On)
    }

    /// `Off` when the zone is switched off, otherwise the mapped `Mode`.
    #[must_use]
    pub fn hvac_mode(&self) -> Option<HvacMode> {
        if self.drive() == Some(Drive::Off) {
            return Some(HvacMode::Off);
        }
        self.attribute("Mode").and_then(HvacMode::from_device_mode)
    }

    #[must_use]
    pub fn fan_mode(&self) -> Option<FanSpeed> {
        self.attribute("FanSpeed").and_then(FanSpeed::from_device_str)
    }

    #[must_use]
    pub fn swing_mode(&self) -> Option<SwingMode> {
        self.attribute("AirDirection").map(SwingMode::from_air_direction)
    }

    /// Setpoint in degrees Celsius.
    #[must_use]
    pub fn target_temperature(&self) -> Option<f64> {
        self.temperature("SetTemp")
    }

    /// Return-air temperature in degrees Celsius.
    #[must_use]
    pub fn current_temperature(&self) -> Option<f64> {
        self.temperature("InletTemp")
    }

    /// True when the unit reports an error code.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.attribute("ErrorSign")
            .is_some_and(|v| !v.is_empty() && v != "OFF")
    }

    fn temperature(&self, name: &str) -> Option<f64> {
        self.attribute(name)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|t| t.is_finite())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Write side
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for the attribute updates of one zone command.
///
/// # Example
/// ```ignore
/// let cmd = ZoneCommand::new()
///     .hvac_mode(HvacMode::Cool)
///     .target_temperature(22.5);
/// coordinator.set_zone("3", cmd.attributes()).await;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneCommand {
    attributes: ZoneAttributes,
}

impl ZoneCommand {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn turn_on(self) -> Self {
        self.set("Drive", Drive::On.as_device_str())
    }

    #[must_use]
    pub fn turn_off(self) -> Self {
        self.set("Drive", Drive::Off.as_device_str())
    }

    /// `Off` switches the zone off; any other mode switches it on in that mode.
    #[must_use]
    pub fn hvac_mode(self, mode: HvacMode) -> Self {
        match mode.as_device_mode() {
            None => self.turn_off(),
            Some(device_mode) => self.turn_on().set("Mode", device_mode),
        }
    }

    #[must_use]
    pub fn fan_speed(self, speed: FanSpeed) -> Self {
        self.set("FanSpeed", speed.as_device_str())
    }

    #[must_use]
    pub fn swing(self, swing: SwingMode) -> Self {
        self.set("AirDirection", swing.as_air_direction())
    }

    /// Setpoint, truncated to whole degrees.
    #[must_use]
    pub fn target_temperature(self, celsius: f64) -> Self {
        let whole = celsius.trunc() as i64;
        self.set("SetTemp", whole.to_string())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    #[must_use]
    pub fn attributes(&self) -> &ZoneAttributes {
        &self.attributes
    }

    #[must_use]
    pub fn into_attributes(self) -> ZoneAttributes {
        self.attributes
    }

    fn set(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(pairs: &[(&str, &str)]) -> ClimateZone {
        ClimateZone::new(
            "1",
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn cooling_zone_reads_mode_and_temperatures() {
        let z = zone(&[
            ("Drive", "ON"),
            ("Mode", "COOL"),
            ("SetTemp", "24"),
            ("InletTemp", "26"),
        ]);
        assert_eq!(z.hvac_mode(), Some(HvacMode::Cool));
        assert_eq!(z.target_temperature(), Some(24.0));
        assert_eq!(z.current_temperature(), Some(26.0));
        assert!(z.is_on());
    }

    #[test]
    fn drive_off_overrides_mode() {
        let z = zone(&[("Drive", "OFF"), ("Mode", "HEAT")]);
        assert_eq!(z.hvac_mode(), Some(HvacMode::Off));
        assert!(!z.is_on());
    }

    #[test]
    fn every_device_mode_is_mapped() {
        for (raw, mode) in [
            ("HEAT", HvacMode::Heat),
            ("COOL", HvacMode::Cool),
            ("FAN", HvacMode::FanOnly),
            ("AUTO", HvacMode::Auto),
            ("DRY", HvacMode::Dry),
        ] {
            let z = zone(&[("Drive", "ON"), ("Mode", raw)]);
            assert_eq!(z.hvac_mode(), Some(mode));
        }
        assert_eq!(zone(&[("Drive", "ON"), ("Mode", "BLAST")]).hvac_mode(), None);
    }

    #[test]
    fn every_mode_survives_command_then_read() {
        for mode in HVAC_MODES {
            let attributes = ZoneCommand::new().hvac_mode(mode).into_attributes();
            let z = ClimateZone::new("1", attributes);
            assert_eq!(z.hvac_mode(), Some(mode), "mode {:?}", mode);
            assert_eq!(z.is_on(), mode != HvacMode::Off);
        }
    }

    #[test]
    fn fan_speeds_round_trip_through_device_strings() {
        for speed in FAN_SPEEDS {
            assert_eq!(FanSpeed::from_device_str(speed.as_device_str()), Some(speed));
        }
        assert_eq!(zone(&[("FanSpeed", "MID3")]).fan_mode(), Some(FanSpeed::Mid3));
    }

    #[test]
    fn swing_is_off_only_for_horizontal() {
        assert_eq!(
            zone(&[("AirDirection", "HORIZONTAL")]).swing_mode(),
            Some(SwingMode::Off)
        );
        assert_eq!(
            zone(&[("AirDirection", "VERTICAL")]).swing_mode(),
            Some(SwingMode::On)
        );
        assert_eq!(zone(&[]).swing_mode(), None);
    }

    #[test]
    fn error_sign_detection() {
        assert!(!zone(&[("ErrorSign", "OFF")]).has_error());
        assert!(!zone(&[]).has_error());
        assert!(zone(&[("ErrorSign", "E6")]).has_error());
    }

    #[test]
    fn unparseable_temperature_is_none() {
        assert_eq!(zone(&[("SetTemp", "--")]).target_temperature(), None);
        assert_eq!(zone(&[("InletTemp", "19.5")]).current_temperature(), Some(19.5));
    }

    #[test]
    fn command_off_only_touches_drive() {
        let cmd = ZoneCommand::new().hvac_mode(HvacMode::Off);
        assert_eq!(cmd.attributes().len(), 1);
        assert_eq!(cmd.attributes().get("Drive").map(String::as_str), Some("OFF"));
    }

    #[test]
    fn command_mode_turns_zone_on() {
        let cmd = ZoneCommand::new().hvac_mode(HvacMode::FanOnly);
        let attrs = cmd.into_attributes();
        assert_eq!(attrs.get("Drive").map(String::as_str), Some("ON"));
        assert_eq!(attrs.get("Mode").map(String::as_str), Some("FAN"));
    }

    #[test]
    fn command_truncates_setpoint() {
        let cmd = ZoneCommand::new().target_temperature(22.9);
        assert_eq!(cmd.attributes().get("SetTemp").map(String::as_str), Some("22"));
    }

    #[test]
    fn command_combines_attributes() {
        let cmd = ZoneCommand::new()
            .fan_speed(FanSpeed::High)
            .swing(SwingMode::Off);
        assert_eq!(cmd.attributes().get("FanSpeed").map(String::as_str), Some("HIGH"));
        assert_eq!(
            cmd.attributes().get("AirDirection").map(String::as_str),
            Some("HORIZONTAL")
        );
        assert!(!cmd.is_empty());
        assert!(ZoneCommand::new().is_empty());
    }
}
