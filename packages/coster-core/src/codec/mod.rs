//! Controller XML dialect.
//!
//! Stateless translation between zone data and the `Packet` documents the
//! EW-50E exchanges over its WebSocket.
//!
//! # Module Structure
//!
//! - `encode` - Outbound `getRequest` / `setRequest` builders
//! - `decode` - Inbound document parsing into [`DecodedMessage`]

mod decode;
mod encode;

#[cfg(test)]
pub(crate) mod test_fixtures;

use std::collections::BTreeMap;

pub use decode::{decode, parse_document};
pub use encode::{encode_poll_all, encode_set};

/// Attribute name -> value for one zone (e.g. `"SetTemp" -> "22"`).
pub type ZoneAttributes = BTreeMap<String, String>;

/// Message kinds distinguished by the `Command` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Full answer to a poll; zones are replaced.
    GetResponse,
    /// Unsolicited partial push; attributes are merged into known zones.
    NotifyRequest,
    /// Any other or missing command. Ignored by the coordinator.
    Other,
}

impl MessageKind {
    /// Maps the `Command` text to a message kind.
    #[must_use]
    pub fn from_command(command: Option<&str>) -> Self {
        match command {
            Some("getResponse") => Self::GetResponse,
            Some("notifyRequest") => Self::NotifyRequest,
            _ => Self::Other,
        }
    }
}

/// One `Mnet` element: a zone identifier and the attributes it carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneRecord {
    /// Value of the `Group` attribute, kept opaque.
    pub zone_id: String,
    /// Every other attribute of the element.
    pub attributes: ZoneAttributes,
}

/// A parsed document, before message-kind filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Trimmed text of the `Command` element, if present.
    pub command: Option<String>,
    /// All zone elements in document order.
    pub zones: Vec<ZoneRecord>,
}

/// Result of decoding an inbound frame.
///
/// `zones` is always empty when `kind` is [`MessageKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMessage {
    /// Message kind derived from the `Command` element.
    pub kind: MessageKind,
    /// Zone records to apply.
    pub zones: Vec<ZoneRecord>,
}

impl DecodedMessage {
    /// Returns true if the coordinator has nothing to apply.
    #[must_use]
    pub fn is_ignorable(&self) -> bool {
        self.kind == MessageKind::Other || self.zones.is_empty()
    }
}
