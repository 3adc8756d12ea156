//! Input shapes for a raw proxy-log record.
//!
//! These mirror the loosely structured mapping a log decoder produces: every
//! leaf field is optional and arrives as whatever the log held (headers as a
//! raw blob, status as either a string or a number). Normalization happens
//! in [`crate::transaction`], not here.

use serde::Deserialize;
use serde_json::Value;

/// One decoded log entry. Leaf fields may all be absent; the `request` and
/// `response` sections are optional here only so that malformed entries
/// deserialize — their presence is enforced at transaction construction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub host: Option<String>,
    /// Resolved IP at capture time. Logs disagree on the key spelling.
    #[serde(default, alias = "ipAddress")]
    pub ip_address: Option<String>,
    /// Opaque capture timestamp, carried verbatim.
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub request: Option<RawRequest>,
    #[serde(default)]
    pub response: Option<RawResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRequest {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// Raw header blob, `Name: value` lines.
    #[serde(default)]
    pub headers: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawResponse {
    #[serde(default)]
    pub version: Option<String>,
    /// Status as the log encoded it: a number, a digit string, or absent.
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub headers: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_with_all_leaves_missing() {
        let record: RawRecord =
            serde_json::from_value(json!({"request": {}, "response": {}})).unwrap();
        assert!(record.host.is_none());
        assert!(record.request.unwrap().method.is_none());
        assert!(record.response.unwrap().status.is_none());
    }

    #[test]
    fn accepts_both_ip_address_spellings() {
        let snake: RawRecord = serde_json::from_value(json!({"ip_address": "10.0.0.1"})).unwrap();
        let camel: RawRecord = serde_json::from_value(json!({"ipAddress": "10.0.0.1"})).unwrap();
        assert_eq!(snake.ip_address.as_deref(), Some("10.0.0.1"));
        assert_eq!(camel.ip_address.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn status_keeps_string_and_number_encodings() {
        let record: RawRecord =
            serde_json::from_value(json!({"response": {"status": "200"}})).unwrap();
        assert_eq!(record.response.unwrap().status, Some(json!("200")));

        let record: RawRecord =
            serde_json::from_value(json!({"response": {"status": 404}})).unwrap();
        assert_eq!(record.response.unwrap().status, Some(json!(404)));
    }
}
