use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Persisted record of one sampled connection.
///
/// Serialized as
/// `{"timestamp", "remoteAddr", "localAddr", "payload", "truncated", "redacted"}`
/// with the (possibly redacted) captured bytes base64 encoded in `payload`.
/// Missing fields read back as their zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MirrorLogEntry {
    pub timestamp: String,
    pub remote_addr: String,
    pub local_addr: String,
    pub payload: String,
    pub truncated: bool,
    pub redacted: bool,
}

impl MirrorLogEntry {
    /// Builds an entry stamped with the current UTC time.
    pub fn new(
        remote_addr: impl Into<String>,
        local_addr: impl Into<String>,
        payload: &[u8],
        truncated: bool,
        redacted: bool,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            remote_addr: remote_addr.into(),
            local_addr: local_addr.into(),
            payload: STANDARD.encode(payload),
            truncated,
            redacted,
        }
    }

    pub fn decode_payload(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.payload.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_field_names() {
        let entry = MirrorLogEntry::new("10.0.0.7:51234", "127.0.0.1:8080", b"GET /\r\n", false, true);
        let value: serde_json::Value = serde_json::to_value(&entry).unwrap();
        let obj = value.as_object().unwrap();
        let mut keys: Vec<_> = obj.keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["localAddr", "payload", "redacted", "remoteAddr", "timestamp", "truncated"]
        );
        assert_eq!(obj["payload"], "R0VUIC8NCg==");
        assert_eq!(obj["remoteAddr"], "10.0.0.7:51234");
        assert_eq!(obj["redacted"], true);
    }

    #[test]
    fn test_timestamp_is_rfc3339() {
        let entry = MirrorLogEntry::new("a", "b", b"x", false, false);
        assert!(chrono::DateTime::parse_from_rfc3339(&entry.timestamp).is_ok());
    }

    #[test]
    fn test_binary_payload_survives_encoding() {
        let payload: Vec<u8> = (0..=255u8).chain([0, 0, 0]).collect();
        let entry = MirrorLogEntry::new("a", "b", &payload, false, false);
        let json = serde_json::to_string(&entry).unwrap();
        let back: MirrorLogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.decode_payload().unwrap(), payload);
    }

    #[test]
    fn test_missing_fields_default() {
        let entry: MirrorLogEntry = serde_json::from_str(r#"{"payload":"aGk="}"#).unwrap();
        assert_eq!(entry.decode_payload().unwrap(), b"hi");
        assert!(!entry.truncated);
        assert!(entry.remote_addr.is_empty());
    }

    #[test]
    fn test_bad_base64_is_reported() {
        let entry = MirrorLogEntry {
            payload: "not base64!".into(),
            ..Default::default()
        };
        assert!(entry.decode_payload().is_err());
    }
}
