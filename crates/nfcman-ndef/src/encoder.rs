use crate::{header::NdefHeader, message::NdefMessage, record::NdefRecord, tnf::Tnf};

/// Knobs for record serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Record)]
pub struct EncodeOptions {
    /// Use the 1-byte payload length whenever the payload fits in it
    pub short_records: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            short_records: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, uniffi::Error)]
pub enum EncodeError {
    #[error("{field} is {length} bytes, a record holds at most {max}")]
    FieldTooLong { field: String, length: u64, max: u64 },

    #[error("a message needs at least one record")]
    NoRecords,

    #[error("record {index} is unchanged, chunked records are never written")]
    UnchangedRecord { index: u32 },
}

pub type Error = EncodeError;
type Result<T, E = Error> = std::result::Result<T, E>;

/// Encode one record as a complete single-record message
pub fn encode_record(record: &NdefRecord) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_record(record, 0, true, EncodeOptions::default(), &mut out)?;
    Ok(out)
}

pub fn encode_message(message: &NdefMessage) -> Result<Vec<u8>> {
    encode_message_with(message, EncodeOptions::default())
}

pub fn encode_message_with(message: &NdefMessage, options: EncodeOptions) -> Result<Vec<u8>> {
    if message.is_empty() {
        return Err(EncodeError::NoRecords);
    }

    let mut out = Vec::new();
    let last = message.records.len() - 1;

    for (index, record) in message.records.iter().enumerate() {
        write_record(record, index, index == last, options, &mut out)?;
    }

    Ok(out)
}

/// Check that `message` can be written without encoding it
pub fn validate_message(message: &NdefMessage) -> Result<()> {
    if message.is_empty() {
        return Err(EncodeError::NoRecords);
    }

    for (index, record) in message.records.iter().enumerate() {
        check_record(record, index)?;
    }

    Ok(())
}

fn check_record(record: &NdefRecord, index: usize) -> Result<()> {
    if record.tnf == Tnf::Unchanged {
        return Err(EncodeError::UnchangedRecord {
            index: u32::try_from(index).unwrap_or(u32::MAX),
        });
    }

    Ok(())
}

fn write_record(
    record: &NdefRecord,
    index: usize,
    message_end: bool,
    options: EncodeOptions,
    out: &mut Vec<u8>,
) -> Result<()> {
    check_record(record, index)?;

    let type_length = u8::try_from(record.type_.len())
        .map_err(|_| too_long("type", record.type_.len(), u8::MAX as u64))?;

    let id_length = record
        .id
        .as_ref()
        .map(|id| u8::try_from(id.len()).map_err(|_| too_long("id", id.len(), u8::MAX as u64)))
        .transpose()?;

    let payload_length = u32::try_from(record.payload.len())
        .map_err(|_| too_long("payload", record.payload.len(), u32::MAX as u64))?;

    let short_record = options.short_records && payload_length <= u8::MAX as u32;

    let header = NdefHeader {
        message_begin: index == 0,
        message_end,
        chunked: false,
        short_record,
        has_id_length: id_length.is_some(),
        type_name_format: record.tnf,
        type_length,
        payload_length,
        id_length,
    };

    out.push(header.header_byte());
    out.push(type_length);

    if short_record {
        out.push(payload_length as u8);
    } else {
        out.extend_from_slice(&payload_length.to_be_bytes());
    }

    if let Some(id_length) = id_length {
        out.push(id_length);
    }

    out.extend_from_slice(&record.type_);
    if let Some(id) = &record.id {
        out.extend_from_slice(id);
    }
    out.extend_from_slice(&record.payload);

    Ok(())
}

fn too_long(field: &str, length: usize, max: u64) -> EncodeError {
    EncodeError::FieldTooLong {
        field: field.to_string(),
        length: length as u64,
        max,
    }
}
