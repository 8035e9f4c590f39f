use crate::{DecodeError, EncodeError, NdefMessage, NdefRecord};

#[uniffi::export]
pub fn decode_ndef_message(data: Vec<u8>) -> Result<NdefMessage, DecodeError> {
    crate::decode_message(&data)
}

#[uniffi::export]
pub fn encode_ndef_message(message: NdefMessage) -> Result<Vec<u8>, EncodeError> {
    crate::encode_message(&message)
}

#[uniffi::export]
pub fn string_from_record(record: NdefRecord) -> Option<String> {
    if let Some(text) = record.text() {
        return Some(text.text);
    }

    if let Some(uri) = record.uri() {
        return Some(uri);
    }

    String::from_utf8(record.payload).ok()
}
