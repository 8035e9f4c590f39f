use serde::{Deserialize, Serialize};

use crate::vendor::PageFraming;

/// Tunables for a discovery session
///
/// Every field has a default, so a partial JSON document is enough to
/// override a single value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
#[serde(default)]
pub struct SessionConfig {
    /// Mime filter attached to the NDEF discovery filter
    pub ndef_mime_filter: String,

    /// First page read from a MIFARE Ultralight tag when looking for the vendor id
    pub vendor_page_offset: u8,
    /// Bytes of framing before the vendor id in the page read
    pub vendor_prefix_len: u32,
    /// Bytes of framing after the vendor id in the page read
    pub vendor_suffix_len: u32,

    /// `type` annotation for messages that arrived by peer-to-peer push
    pub push_type_annotation: String,

    /// Reported tags buffered for listeners before sends start blocking
    pub event_queue_capacity: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ndef_mime_filter: "*/*".to_string(),
            vendor_page_offset: 144,
            vendor_prefix_len: 5,
            vendor_suffix_len: 3,
            push_type_annotation: "NDEF Push Protocol".to_string(),
            event_queue_capacity: 1000,
        }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn page_framing(&self) -> PageFraming {
        PageFraming {
            prefix_len: self.vendor_prefix_len as usize,
            suffix_len: self.vendor_suffix_len as usize,
        }
    }
}

#[uniffi::export]
fn session_config_default() -> SessionConfig {
    SessionConfig::default()
}

#[uniffi::export]
fn session_config_from_json(json: String) -> Option<SessionConfig> {
    SessionConfig::from_json(&json)
        .inspect_err(|error| tracing::warn!("ignoring invalid session config: {error}"))
        .ok()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SessionConfig::from_json(r#"{ "vendor_page_offset": 4 }"#).unwrap();

        assert_eq!(config.vendor_page_offset, 4);
        assert_eq!(config.vendor_prefix_len, 5);
        assert_eq!(config.ndef_mime_filter, "*/*");
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(SessionConfig::from_json("{ nope").is_err());
        assert!(session_config_from_json("[]".to_string()).is_none());
    }

    #[test]
    fn framing_comes_from_config() {
        let framing = SessionConfig::default().page_framing();
        assert_eq!(framing.prefix_len, 5);
        assert_eq!(framing.suffix_len, 3);
    }
}
