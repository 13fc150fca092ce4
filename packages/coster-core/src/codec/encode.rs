//! Outbound document builders.

use crate::protocol_constants::{
    COMMAND_ELEMENT, DATABASE_ELEMENT, ROOT_ELEMENT, TRACKED_ATTRIBUTES, WILDCARD_VALUE,
    ZONE_ELEMENT, ZONE_ID_ATTRIBUTE,
};

use super::ZoneAttributes;

/// Builds a `getRequest` asking for every tracked attribute of each zone.
///
/// Zones appear in the order given.
pub fn encode_poll_all<I, S>(zone_ids: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut body = String::new();
    for zone_id in zone_ids {
        let attrs = TRACKED_ATTRIBUTES
            .iter()
            .map(|name| (*name, WILDCARD_VALUE.to_string()));
        push_zone_element(&mut body, zone_id.as_ref(), attrs);
    }
    wrap_packet("getRequest", &body)
}

/// Builds a `setRequest` carrying `updates` for exactly one zone.
///
/// Numeric values are written as whole numbers: the controller rejects
/// setpoints with a decimal point, so `"22.7"` goes out as `"22"`.
pub fn encode_set(zone_id: &str, updates: &ZoneAttributes) -> String {
    let mut body = String::new();
    let attrs = updates
        .iter()
        .filter(|(name, _)| name.as_str() != ZONE_ID_ATTRIBUTE)
        .map(|(name, value)| (name.as_str(), render_value(value)));
    push_zone_element(&mut body, zone_id, attrs);
    wrap_packet("setRequest", &body)
}

/// Renders an attribute value, truncating fractional numbers.
fn render_value(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.contains('.') {
        if let Ok(number) = trimmed.parse::<f64>() {
            if number.is_finite() {
                return format!("{}", number.trunc() as i64);
            }
        }
    }
    trimmed.to_string()
}

fn push_zone_element<'a>(
    body: &mut String,
    zone_id: &str,
    attrs: impl Iterator<Item = (&'a str, String)>,
) {
    body.push_str(&format!(
        r#"<{ZONE_ELEMENT} {ZONE_ID_ATTRIBUTE}="{}""#,
        html_escape::encode_double_quoted_attribute(zone_id)
    ));
    for (name, value) in attrs {
        body.push_str(&format!(
            r#" {name}="{}""#,
            html_escape::encode_double_quoted_attribute(&value)
        ));
    }
    body.push_str("/>");
}

/// Wraps zone elements in the `Packet` envelope.
///
/// Single line with no whitespace before the root element.
fn wrap_packet(command: &str, zones: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><{ROOT_ELEMENT}><{COMMAND_ELEMENT}>{command}</{COMMAND_ELEMENT}><{DATABASE_ELEMENT}>{zones}</{DATABASE_ELEMENT}></{ROOT_ELEMENT}>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_all_lists_every_zone_with_wildcards() {
        let ids: Vec<String> = (1..=17).map(|n| n.to_string()).collect();
        let doc = encode_poll_all(&ids);

        assert!(doc.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?><Packet>"#));
        assert!(doc.contains("<Command>getRequest</Command>"));
        assert_eq!(doc.matches("<Mnet ").count(), 17);
        assert!(doc.contains(
            r#"<Mnet Group="1" Drive="*" Mode="*" SetTemp="*" InletTemp="*" FanSpeed="*" AirDirection="*" ErrorSign="*"/>"#
        ));
        assert!(doc.contains(r#"<Mnet Group="17" "#));
    }

    #[test]
    fn poll_all_preserves_zone_order() {
        let doc = encode_poll_all(["3", "1"]);
        let first = doc.find(r#"Group="3""#).expect("zone 3 present");
        let second = doc.find(r#"Group="1""#).expect("zone 1 present");
        assert!(first < second);
    }

    #[test]
    fn set_carries_literal_attributes_for_one_zone() {
        let mut updates = ZoneAttributes::new();
        updates.insert("Drive".into(), "ON".into());
        updates.insert("Mode".into(), "COOL".into());
        let doc = encode_set("4", &updates);

        assert!(doc.contains("<Command>setRequest</Command>"));
        assert_eq!(doc.matches("<Mnet ").count(), 1);
        assert!(doc.contains(r#"<Mnet Group="4" Drive="ON" Mode="COOL"/>"#));
    }

    #[test]
    fn set_truncates_fractional_setpoints() {
        let mut updates = ZoneAttributes::new();
        updates.insert("SetTemp".into(), "22.7".into());
        let doc = encode_set("2", &updates);
        assert!(doc.contains(r#"SetTemp="22""#));
        assert!(!doc.contains("22.7"));
    }

    #[test]
    fn set_ignores_group_in_updates() {
        let mut updates = ZoneAttributes::new();
        updates.insert("Group".into(), "9".into());
        updates.insert("Drive".into(), "OFF".into());
        let doc = encode_set("2", &updates);
        assert!(doc.contains(r#"<Mnet Group="2" Drive="OFF"/>"#));
    }

    #[test]
    fn attribute_values_are_escaped() {
        let mut updates = ZoneAttributes::new();
        updates.insert("Mode".into(), r#"a"b<c"#.into());
        let doc = encode_set("1", &updates);
        assert!(!doc.contains(r#"a"b<c"#));
        assert!(doc.contains("&quot;"));
    }

    #[test]
    fn render_value_keeps_non_numeric_and_integers() {
        assert_eq!(render_value("HEAT"), "HEAT");
        assert_eq!(render_value("24"), "24");
        assert_eq!(render_value("19.99"), "19");
        assert_eq!(render_value("-3.5"), "-3");
        assert_eq!(render_value("1.2.3"), "1.2.3");
    }
}
