pub mod stream;

use stream::{Stream, StreamExt as _};
use tracing::debug;
use winnow::{
    ModalResult, Parser,
    binary::{
        Endianness,
        bits::{bits, bool as take_bool, take as take_bits},
    },
    error::{ContextError, ErrMode},
    token::{any, take},
};

use crate::{
    DecodeError, header::NdefHeader, message::NdefMessage, record::NdefRecord, tnf::Tnf,
};

/// Parse records until one carrying the message end flag has been consumed
///
/// Chunked records are folded back into a single record whose payload is
/// the concatenation of every chunk
pub fn parse_ndef_message(input: &mut Stream<'_>) -> Result<NdefMessage, DecodeError> {
    let mut records = Vec::new();
    let mut open_chunk: Option<NdefRecord> = None;

    loop {
        let header = parse_header(input)?;
        let record = parse_record_body(input, &header)?;

        open_chunk = match (open_chunk.take(), record.tnf) {
            (None, Tnf::Unchanged) => {
                return Err(DecodeError::InvalidChunk(
                    "unchanged record outside of a chunk".to_string(),
                ));
            }

            (None, _) if header.chunked => Some(record),

            (None, _) => {
                records.push(record);
                None
            }

            (Some(mut chunk), Tnf::Unchanged) => {
                chunk.payload.extend_from_slice(&record.payload);

                if header.chunked {
                    Some(chunk)
                } else {
                    records.push(chunk);
                    None
                }
            }

            (Some(_), tnf) => {
                return Err(DecodeError::InvalidChunk(format!(
                    "chunk continuation must be unchanged, found {tnf:?}"
                )));
            }
        };

        if header.message_end {
            if open_chunk.is_some() {
                return Err(DecodeError::InvalidChunk(
                    "message ended in the middle of a chunk".to_string(),
                ));
            }

            break;
        }
    }

    if !input.is_empty() {
        debug!("ignoring {} bytes after the last record", input.len());
    }

    Ok(NdefMessage { records })
}

pub fn parse_header(input: &mut Stream<'_>) -> Result<NdefHeader, DecodeError> {
    let (message_begin, message_end, chunked, short_record, has_id_length, type_name_format) =
        parse_header_byte(input)?;

    let type_name_format = Tnf::try_from(type_name_format).map_err(DecodeError::InvalidTnf)?;

    let type_length = parse_length_byte(input)?;
    let payload_length = parse_payload_length(input, short_record)?;

    let id_length = if has_id_length {
        Some(parse_length_byte(input)?)
    } else {
        None
    };

    Ok(NdefHeader {
        message_begin,
        message_end,
        chunked,
        short_record,
        has_id_length,
        type_name_format,
        type_length,
        payload_length,
        id_length,
    })
}

/// Type, id and payload, read in that order after the header
pub fn parse_record_body(
    input: &mut Stream<'_>,
    header: &NdefHeader,
) -> Result<NdefRecord, DecodeError> {
    let type_ = parse_bytes(input, header.type_length as usize)?;

    let id = match header.id_length {
        Some(id_length) => Some(parse_bytes(input, id_length as usize)?),
        None => None,
    };

    let payload = parse_bytes(input, header.payload_length as usize)?;

    Ok(NdefRecord {
        tnf: header.type_name_format,
        type_,
        id,
        payload,
    })
}

// private
fn parse_header_byte(input: &mut Stream<'_>) -> ModalResult<(bool, bool, bool, bool, bool, u8)> {
    bits::<_, _, ErrMode<ContextError>, _, _>((
        take_bool,
        take_bool,
        take_bool,
        take_bool,
        take_bool,
        take_bits(3_u8),
    ))
    .parse_next(input)
}

fn parse_length_byte(input: &mut Stream<'_>) -> ModalResult<u8> {
    any.parse_next(input)
}

fn parse_payload_length(input: &mut Stream<'_>, short_record: bool) -> ModalResult<u32> {
    if short_record {
        any.map(|x: u8| x as u32).parse_next(input)
    } else {
        winnow::binary::u32(Endianness::Big).parse_next(input)
    }
}

fn parse_bytes(input: &mut Stream<'_>, length: usize) -> ModalResult<Vec<u8>> {
    if length == 0 {
        return Ok(Vec::new());
    }

    take(length).map(|s: &[u8]| s.to_vec()).parse_next(input)
}
