//! Inbound document parsing.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{ProtocolError, ProtocolResult};
use crate::protocol_constants::{COMMAND_ELEMENT, ZONE_ELEMENT, ZONE_ID_ATTRIBUTE};

use super::{DecodedMessage, Document, MessageKind, ZoneAttributes, ZoneRecord};

/// Decodes an inbound frame into the records the coordinator should apply.
///
/// Unknown or missing commands yield [`MessageKind::Other`] with no zones.
///
/// # Errors
/// Returns `ProtocolError` if the document is not well-formed XML.
pub fn decode(xml: &str) -> ProtocolResult<DecodedMessage> {
    let document = parse_document(xml)?;
    let kind = MessageKind::from_command(document.command.as_deref());
    let zones = match kind {
        MessageKind::Other => Vec::new(),
        _ => document.zones,
    };
    Ok(DecodedMessage { kind, zones })
}

/// Parses any controller document, whatever its command.
///
/// Zone elements without a `Group` attribute are skipped. Zone identifiers
/// are not validated.
///
/// # Errors
/// Returns `ProtocolError` if the document is not well-formed XML.
pub fn parse_document(xml: &str) -> ProtocolResult<Document> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut document = Document::default();
    let mut depth: usize = 0;
    let mut seen_root = false;
    let mut in_command = false;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(ProtocolError::Malformed {
                    position: reader.error_position() as u64,
                    message: e.to_string(),
                })
            }
        };

        match event {
            Event::Start(ref e) => {
                depth += 1;
                seen_root = true;
                match e.name().as_ref() {
                    name if name == COMMAND_ELEMENT.as_bytes() => in_command = true,
                    name if name == ZONE_ELEMENT.as_bytes() => {
                        if let Some(record) = zone_record(e, reader.buffer_position() as u64)? {
                            document.zones.push(record);
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(ref e) => {
                seen_root = true;
                if e.name().as_ref() == ZONE_ELEMENT.as_bytes() {
                    if let Some(record) = zone_record(e, reader.buffer_position() as u64)? {
                        document.zones.push(record);
                    }
                }
            }
            Event::End(ref e) => {
                depth = depth.saturating_sub(1);
                if e.name().as_ref() == COMMAND_ELEMENT.as_bytes() {
                    in_command = false;
                }
            }
            Event::Text(ref t) => {
                let text = std::str::from_utf8(t)?;
                if depth == 0 {
                    if !text.trim().is_empty() {
                        return Err(ProtocolError::UnexpectedText);
                    }
                } else if in_command {
                    document
                        .command
                        .get_or_insert_with(String::new)
                        .push_str(text.trim());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(ProtocolError::NoRootElement);
    }
    if depth > 0 {
        return Err(ProtocolError::UnclosedElement(depth));
    }

    Ok(document)
}

/// Extracts a zone record from an `Mnet` element.
fn zone_record(element: &BytesStart<'_>, position: u64) -> ProtocolResult<Option<ZoneRecord>> {
    let mut zone_id = None;
    let mut attributes = ZoneAttributes::new();

    for attr in element.attributes() {
        let attr = attr.map_err(|e| ProtocolError::Malformed {
            position,
            message: e.to_string(),
        })?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let raw = std::str::from_utf8(&attr.value)?;
        let value = html_escape::decode_html_entities(raw).into_owned();

        if key == ZONE_ID_ATTRIBUTE {
            zone_id = Some(value);
        } else {
            attributes.insert(key.to_string(), value);
        }
    }

    match zone_id {
        Some(zone_id) => Ok(Some(ZoneRecord {
            zone_id,
            attributes,
        })),
        None => {
            log::debug!("[Codec] Skipping {} element without {}", ZONE_ELEMENT, ZONE_ID_ATTRIBUTE);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_fixtures::{
        GET_RESPONSE_TWO_ZONES, NOTIFY_UNKNOWN_ZONE, NOTIFY_ZONE_1_SETPOINT, SET_RESPONSE,
        TRUNCATED,
    };
    use super::*;
    use crate::codec::encode_set;

    #[test]
    fn get_response_yields_every_zone() {
        let msg = decode(GET_RESPONSE_TWO_ZONES).expect("valid document");
        assert_eq!(msg.kind, MessageKind::GetResponse);
        assert_eq!(msg.zones.len(), 2);

        let first = &msg.zones[0];
        assert_eq!(first.zone_id, "1");
        assert_eq!(first.attributes.get("Drive").map(String::as_str), Some("ON"));
        assert_eq!(first.attributes.get("SetTemp").map(String::as_str), Some("24"));
        assert!(!first.attributes.contains_key("Group"));

        assert_eq!(msg.zones[1].zone_id, "2");
        assert_eq!(
            msg.zones[1].attributes.get("InletTemp").map(String::as_str),
            Some("19.5")
        );
    }

    #[test]
    fn notify_request_carries_partial_attributes() {
        let msg = decode(NOTIFY_ZONE_1_SETPOINT).expect("valid document");
        assert_eq!(msg.kind, MessageKind::NotifyRequest);
        assert_eq!(msg.zones.len(), 1);
        assert_eq!(msg.zones[0].attributes.len(), 1);
        assert_eq!(
            msg.zones[0].attributes.get("SetTemp").map(String::as_str),
            Some("22")
        );
    }

    #[test]
    fn unknown_zone_ids_are_accepted() {
        let msg = decode(NOTIFY_UNKNOWN_ZONE).expect("valid document");
        assert_eq!(msg.zones[0].zone_id, "42");
    }

    #[test]
    fn other_commands_yield_no_zones() {
        let msg = decode(SET_RESPONSE).expect("valid document");
        assert_eq!(msg.kind, MessageKind::Other);
        assert!(msg.zones.is_empty());
        assert!(msg.is_ignorable());
    }

    #[test]
    fn missing_command_yields_no_zones() {
        let msg = decode(r#"<Packet><DatabaseManager><Mnet Group="1" Drive="ON"/></DatabaseManager></Packet>"#)
            .expect("valid document");
        assert_eq!(msg.kind, MessageKind::Other);
        assert!(msg.zones.is_empty());
    }

    #[test]
    fn set_request_round_trips_through_parse_document() {
        let mut updates = ZoneAttributes::new();
        updates.insert("SetTemp".into(), "22".into());
        let doc = parse_document(&encode_set("3", &updates)).expect("valid document");

        assert_eq!(doc.command.as_deref(), Some("setRequest"));
        assert_eq!(doc.zones.len(), 1);
        assert_eq!(doc.zones[0].zone_id, "3");
        assert_eq!(
            doc.zones[0].attributes.get("SetTemp").map(String::as_str),
            Some("22")
        );
    }

    #[test]
    fn element_without_group_is_skipped() {
        let msg = decode(
            r#"<Packet><Command>getResponse</Command><DatabaseManager><Mnet Drive="ON"/><Mnet Group="5" Drive="OFF"/></DatabaseManager></Packet>"#,
        )
        .expect("valid document");
        assert_eq!(msg.zones.len(), 1);
        assert_eq!(msg.zones[0].zone_id, "5");
    }

    #[test]
    fn escaped_attribute_values_are_decoded() {
        let msg = decode(
            r#"<Packet><Command>notifyRequest</Command><DatabaseManager><Mnet Group="1" ErrorSign="A&amp;B"/></DatabaseManager></Packet>"#,
        )
        .expect("valid document");
        assert_eq!(
            msg.zones[0].attributes.get("ErrorSign").map(String::as_str),
            Some("A&B")
        );
    }

    #[test]
    fn truncated_document_is_rejected() {
        let err = decode(TRUNCATED).expect_err("truncated document must fail");
        assert!(matches!(err, ProtocolError::UnclosedElement(_) | ProtocolError::Malformed { .. }));
    }

    #[test]
    fn mismatched_end_tag_is_rejected() {
        let err = decode("<Packet><Command>getResponse</Packet>").expect_err("must fail");
        assert!(matches!(err, ProtocolError::Malformed { .. }));
    }

    #[test]
    fn plain_text_is_rejected() {
        let err = decode("not xml at all").expect_err("must fail");
        assert!(matches!(err, ProtocolError::UnexpectedText));
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = decode("").expect_err("must fail");
        assert!(matches!(err, ProtocolError::NoRootElement));
    }
}
