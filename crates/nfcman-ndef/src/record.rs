use crate::{
    payload::{self, TextPayload},
    tnf::Tnf,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, uniffi::Record)]
pub struct NdefRecord {
    pub tnf: Tnf,
    pub type_: Vec<u8>,
    pub id: Option<Vec<u8>>,
    pub payload: Vec<u8>,
}

impl NdefRecord {
    pub fn new(tnf: Tnf, type_: impl Into<Vec<u8>>, payload: Vec<u8>) -> Self {
        Self {
            tnf,
            type_: type_.into(),
            id: None,
            payload,
        }
    }

    pub fn with_id(mut self, id: impl Into<Vec<u8>>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Record carrying opaque bytes, no type and no id
    pub fn unknown(payload: Vec<u8>) -> Self {
        Self::new(Tnf::Unknown, Vec::new(), payload)
    }

    fn is_well_known(&self, type_: &[u8]) -> bool {
        self.tnf == Tnf::WellKnown && self.type_ == type_
    }

    /// Text content of a well-known `T` record
    pub fn text(&self) -> Option<TextPayload> {
        if !self.is_well_known(b"T") {
            return None;
        }

        payload::parse_text(&self.payload)
    }

    /// Expanded URI of a well-known `U` record
    pub fn uri(&self) -> Option<String> {
        if !self.is_well_known(b"U") {
            return None;
        }

        payload::parse_uri(&self.payload)
    }
}

// only used for uniffi
mod ffi {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, uniffi::Object)]
    pub struct NdefRecordReader {
        record: NdefRecord,
    }

    #[uniffi::export]
    impl NdefRecordReader {
        #[uniffi::constructor]
        pub fn new(record: NdefRecord) -> Self {
            Self { record }
        }

        pub fn type_(&self) -> Option<String> {
            String::from_utf8(self.record.type_.clone()).ok()
        }

        pub fn id(&self) -> Option<String> {
            let id = self.record.id.as_ref()?;
            String::from_utf8(id.clone()).ok()
        }

        pub fn text(&self) -> Option<TextPayload> {
            self.record.text()
        }

        pub fn uri(&self) -> Option<String> {
            self.record.uri()
        }
    }
}
