use winnow::error::{ContextError, ErrMode};

uniffi::setup_scaffolding!();

pub mod encoder;
pub mod ffi;
pub mod header;
pub mod message;
pub mod parser;
pub mod payload;
pub mod record;
pub mod tnf;

pub use encoder::{
    EncodeError, EncodeOptions, encode_message, encode_message_with, encode_record,
    validate_message,
};
pub use message::{NdefMessage, NdefMessageError};
pub use record::NdefRecord;
pub use tnf::Tnf;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, uniffi::Error)]
pub enum DecodeError {
    #[error("ran out of bytes before the last record ended")]
    Truncated,

    #[error("reserved type name format {0}")]
    InvalidTnf(u8),

    #[error("invalid chunk sequence: {0}")]
    InvalidChunk(String),

    #[error("unable to parse record: {0}")]
    Malformed(String),
}

impl From<ErrMode<ContextError>> for DecodeError {
    fn from(error: ErrMode<ContextError>) -> Self {
        match error {
            ErrMode::Incomplete(_) => DecodeError::Truncated,
            error => DecodeError::Malformed(error.to_string()),
        }
    }
}

/// Decode a complete NDEF message, stopping after the record flagged as last
pub fn decode_message(bytes: &[u8]) -> Result<NdefMessage, DecodeError> {
    let mut stream = parser::stream::new(bytes);
    parser::parse_ndef_message(&mut stream)
}
