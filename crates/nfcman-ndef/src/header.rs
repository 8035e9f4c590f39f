use bitflags::bitflags;

use crate::tnf::Tnf;

bitflags! {
    /// Flag bits of the first byte of every record, the low 3 bits hold the TNF
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HeaderFlags: u8 {
        const MESSAGE_BEGIN = 0b1000_0000;
        const MESSAGE_END = 0b0100_0000;
        const CHUNKED = 0b0010_0000;
        const SHORT_RECORD = 0b0001_0000;
        const HAS_ID_LENGTH = 0b0000_1000;
    }
}

pub const TNF_MASK: u8 = 0b0000_0111;

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct NdefHeader {
    pub message_begin: bool,
    pub message_end: bool,
    pub chunked: bool,
    pub short_record: bool,
    pub has_id_length: bool,
    pub type_name_format: Tnf,
    pub type_length: u8,
    pub payload_length: u32,
    pub id_length: Option<u8>,
}

impl NdefHeader {
    pub fn flags(&self) -> HeaderFlags {
        let mut flags = HeaderFlags::empty();
        flags.set(HeaderFlags::MESSAGE_BEGIN, self.message_begin);
        flags.set(HeaderFlags::MESSAGE_END, self.message_end);
        flags.set(HeaderFlags::CHUNKED, self.chunked);
        flags.set(HeaderFlags::SHORT_RECORD, self.short_record);
        flags.set(HeaderFlags::HAS_ID_LENGTH, self.has_id_length);
        flags
    }

    /// The first byte of the record as it goes on the wire
    pub fn header_byte(&self) -> u8 {
        self.flags().bits() | (self.type_name_format.as_u8() & TNF_MASK)
    }
}
