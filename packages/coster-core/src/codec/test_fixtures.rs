//! Shared test fixtures for controller documents.
//!
//! These constants are used by multiple test modules to avoid duplication.

/// Poll answer for two zones.
pub const GET_RESPONSE_TWO_ZONES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Packet>
  <Command>getResponse</Command>
  <DatabaseManager>
    <Mnet Group="1" Drive="ON" Mode="COOL" SetTemp="24" InletTemp="26" FanSpeed="MID2" AirDirection="HORIZONTAL" ErrorSign="OFF"/>
    <Mnet Group="2" Drive="OFF" Mode="HEAT" SetTemp="21" InletTemp="19.5" FanSpeed="AUTO" AirDirection="SWING" ErrorSign="OFF"/>
  </DatabaseManager>
</Packet>"#;

/// Push notification changing the setpoint of zone 1.
pub const NOTIFY_ZONE_1_SETPOINT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Packet>
  <Command>notifyRequest</Command>
  <DatabaseManager>
    <Mnet Group="1" SetTemp="22"/>
  </DatabaseManager>
</Packet>"#;

/// Push notification for a zone that was never polled.
pub const NOTIFY_UNKNOWN_ZONE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Packet>
  <Command>notifyRequest</Command>
  <DatabaseManager>
    <Mnet Group="42" Drive="ON"/>
  </DatabaseManager>
</Packet>"#;

/// Document with a command the bridge does not handle.
pub const SET_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Packet>
  <Command>setResponse</Command>
  <DatabaseManager>
    <Mnet Group="1" Drive="ON"/>
  </DatabaseManager>
</Packet>"#;

/// Truncated document.
pub const TRUNCATED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Packet>
  <Command>getResponse</Command>
  <DatabaseManager>
    <Mnet Group="1" Drive="ON"/>"#;
