//! Turns one discovery event into the value reported for it

use tracing::{debug, warn};

use crate::{
    config::SessionConfig,
    convert::{TagPayload, ndef_info_to_structured, tag_to_structured},
    tag::{NdefTagInfo, Tag, TagTechnology},
    transport::TagTransport,
    vendor::{VendorIdDecoder, read_vendor_id},
};

const ACTION_NDEF_DISCOVERED: &str = "android.nfc.action.NDEF_DISCOVERED";
const ACTION_TECH_DISCOVERED: &str = "android.nfc.action.TECH_DISCOVERED";
const ACTION_TAG_DISCOVERED: &str = "android.nfc.action.TAG_DISCOVERED";

#[derive(Debug, Clone, PartialEq, Eq, Hash, uniffi::Enum)]
pub enum EventKind {
    NdefDiscovered,
    TechDiscovered,
    TagDiscovered,
    Unrecognized(String),
}

impl EventKind {
    pub fn from_action(action: &str) -> Self {
        match action {
            ACTION_NDEF_DISCOVERED => Self::NdefDiscovered,
            ACTION_TECH_DISCOVERED => Self::TechDiscovered,
            ACTION_TAG_DISCOVERED => Self::TagDiscovered,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn action(&self) -> &str {
        match self {
            Self::NdefDiscovered => ACTION_NDEF_DISCOVERED,
            Self::TechDiscovered => ACTION_TECH_DISCOVERED,
            Self::TagDiscovered => ACTION_TAG_DISCOVERED,
            Self::Unrecognized(action) => action,
        }
    }
}

#[uniffi::export]
fn event_kind_from_action(action: String) -> EventKind {
    EventKind::from_action(&action)
}

/// A raw discovery event as delivered by the platform
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct DiscoveryEvent {
    pub kind: EventKind,
    pub tag: Tag,
    pub ndef: Option<NdefTagInfo>,
    /// Raw messages pushed by a peer device alongside the event
    pub push_messages: Option<Vec<Vec<u8>>>,
}

impl DiscoveryEvent {
    pub fn new(kind: EventKind, tag: Tag) -> Self {
        Self {
            kind,
            tag,
            ndef: None,
            push_messages: None,
        }
    }

    pub fn with_ndef(mut self, ndef: NdefTagInfo) -> Self {
        self.ndef = Some(ndef);
        self
    }

    pub fn with_push_messages(mut self, push_messages: Vec<Vec<u8>>) -> Self {
        self.push_messages = Some(push_messages);
        self
    }

    fn ndef_structured(&self, config: &SessionConfig) -> TagPayload {
        ndef_info_to_structured(
            &self.tag,
            self.ndef.as_ref(),
            self.push_messages.as_deref(),
            &config.push_type_annotation,
        )
    }
}

/// Build the structured value for `event`, `None` when there is nothing to report
///
/// Vendor reads go through `transport`, a failed read leaves out the vendor
/// id and keeps the rest of the value.
pub fn classify(
    event: &DiscoveryEvent,
    transport: &dyn TagTransport,
    decoder: &dyn VendorIdDecoder,
    config: &SessionConfig,
) -> Option<TagPayload> {
    debug!("classifying {}", event.kind.action());

    let payload = match &event.kind {
        EventKind::NdefDiscovered => event.ndef_structured(config),
        EventKind::TechDiscovered => {
            let mut payload = event.ndef_structured(config);

            if event.tag.supports(&TagTechnology::MifareUltralight) {
                match read_vendor_id(transport, decoder, config.vendor_page_offset) {
                    Ok(id) => payload.sigfox_id = Some(id),
                    Err(error) => warn!("unable to read vendor id: {error}"),
                }
            }

            payload
        }
        EventKind::TagDiscovered => tag_to_structured(&event.tag),
        EventKind::Unrecognized(action) => {
            debug!("nothing to report for {action}");
            return None;
        }
    };

    Some(payload)
}
