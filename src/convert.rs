//! Structured values reported to the application for each discovered tag

use nfcman_ndef::{NdefMessage, NdefRecord};
use serde::Serialize;
use tracing::{debug, warn};

use crate::tag::{NdefTagInfo, Tag};

/// One record as the application sees it, all byte fields as plain arrays
#[derive(Debug, Clone, PartialEq, Eq, Serialize, uniffi::Record)]
pub struct RecordPayload {
    pub tnf: u8,
    #[serde(rename = "type")]
    pub type_: Vec<u8>,
    pub id: Vec<u8>,
    pub payload: Vec<u8>,
}

impl From<&NdefRecord> for RecordPayload {
    fn from(record: &NdefRecord) -> Self {
        Self {
            tnf: record.tnf.as_u8(),
            type_: record.type_.clone(),
            id: record.id.clone().unwrap_or_default(),
            payload: record.payload.clone(),
        }
    }
}

/// Everything reported for one discovery event
///
/// Serializes to the map the application consumes, absent fields are left out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct TagPayload {
    /// Tag serial number as lowercase hex
    pub id: String,
    pub tech_types: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ndef_message: Option<Vec<RecordPayload>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_writable: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_make_read_only: Option<bool>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sigfox_id: Option<String>,
}

impl TagPayload {
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

fn message_to_structured(message: &NdefMessage) -> Vec<RecordPayload> {
    message.records.iter().map(RecordPayload::from).collect()
}

pub fn tag_to_structured(tag: &Tag) -> TagPayload {
    TagPayload {
        id: nfcman_util::hex_id(&tag.id),
        tech_types: tag.tech_list.iter().map(|tech| tech.name()).collect(),
        ..Default::default()
    }
}

/// Tag identity plus whatever NDEF data the event carried
///
/// Without an NDEF view the first push message stands in for the stored
/// message and is annotated with `push_annotation`. A message that fails to
/// decode is left out, the rest of the value is still reported.
pub fn ndef_info_to_structured(
    tag: &Tag,
    info: Option<&NdefTagInfo>,
    push_messages: Option<&[Vec<u8>]>,
    push_annotation: &str,
) -> TagPayload {
    let mut payload = tag_to_structured(tag);

    if let Some(info) = info {
        payload.max_size = Some(info.max_size);
        payload.is_writable = Some(info.is_writable);
        payload.can_make_read_only = Some(info.can_make_read_only);
        payload.type_ = info.ndef_type.clone();

        payload.ndef_message = match info.decoded_message() {
            Some(Ok(message)) => Some(message_to_structured(&message)),
            Some(Err(error)) => {
                warn!("unable to decode cached message: {error}");
                None
            }
            None => None,
        };

        return payload;
    }

    let Some(push_messages) = push_messages else {
        return payload;
    };

    if push_messages.len() > 1 {
        debug!(
            "expected one push message, found {}, ignoring the rest",
            push_messages.len()
        );
    }

    if let Some(first) = push_messages.first() {
        match nfcman_ndef::decode_message(first) {
            Ok(message) => payload.ndef_message = Some(message_to_structured(&message)),
            Err(error) => warn!("unable to decode push message: {error}"),
        }

        payload.type_ = Some(push_annotation.to_string());
    }

    payload
}

#[uniffi::export]
fn tag_payload_json(payload: TagPayload) -> String {
    serde_json::to_string(&payload)
        .inspect_err(|error| warn!("unable to serialize tag payload: {error}"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use nfcman_ndef::{Tnf, encode_message};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::tag::TagTechnology;

    fn tag() -> Tag {
        Tag::new(
            vec![0x04, 0xA2, 0x1F],
            vec![TagTechnology::NfcA, TagTechnology::Ndef],
        )
    }

    fn uri_message_bytes() -> Vec<u8> {
        let record = NdefRecord::new(Tnf::WellKnown, "U", b"\x04a.io".to_vec());
        encode_message(&NdefMessage::single(record)).unwrap()
    }

    fn info(cached_message: Option<Vec<u8>>) -> NdefTagInfo {
        NdefTagInfo {
            cached_message,
            max_size: 137,
            is_writable: true,
            can_make_read_only: true,
            ndef_type: Some("org.nfcforum.ndef.type2".to_string()),
        }
    }

    #[test]
    fn tag_reports_hex_id_and_tech_names() {
        let json = tag_to_structured(&tag()).to_json().unwrap();

        assert_eq!(
            json,
            json!({
                "id": "04a21f",
                "techTypes": ["android.nfc.tech.NfcA", "android.nfc.tech.Ndef"],
            })
        );
    }

    #[test]
    fn ndef_tag_reports_capabilities_and_message() {
        let payload = ndef_info_to_structured(&tag(), Some(&info(Some(uri_message_bytes()))), None, "push");
        let json = payload.to_json().unwrap();

        assert_eq!(
            json,
            json!({
                "id": "04a21f",
                "techTypes": ["android.nfc.tech.NfcA", "android.nfc.tech.Ndef"],
                "ndefMessage": [{ "tnf": 1, "type": [0x55], "id": [], "payload": [4, 97, 46, 105, 111] }],
                "maxSize": 137,
                "isWritable": true,
                "canMakeReadOnly": true,
                "type": "org.nfcforum.ndef.type2",
            })
        );
    }

    #[test]
    fn unreadable_message_keeps_metadata() {
        let payload = ndef_info_to_structured(&tag(), Some(&info(Some(vec![0xD1, 0x01]))), None, "push");

        assert_eq!(payload.ndef_message, None);
        assert_eq!(payload.max_size, Some(137));
        assert_eq!(payload.is_writable, Some(true));
    }

    #[test]
    fn first_push_message_is_annotated() {
        let other = encode_message(&NdefMessage::single(NdefRecord::unknown(vec![9]))).unwrap();
        let messages = vec![uri_message_bytes(), other];

        let payload = ndef_info_to_structured(&tag(), None, Some(messages.as_slice()), "NDEF Push Protocol");

        assert_eq!(payload.type_.as_deref(), Some("NDEF Push Protocol"));
        let records = payload.ndef_message.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].type_, b"U");
        assert_eq!(payload.max_size, None);
    }

    #[test]
    fn no_ndef_and_no_push_is_just_the_tag() {
        let payload = ndef_info_to_structured(&tag(), None, Some(&[][..]), "push");
        assert_eq!(payload, tag_to_structured(&tag()));
    }
}
