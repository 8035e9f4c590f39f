//! Identifiers embedded in vendor memory pages

use std::fmt::Debug;

use crate::{
    tag::TagTechnology,
    transport::{TagTransport, TechConnection, TransportError},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VendorIdError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("page read returned {actual} bytes, framing needs more than {needed}")]
    TooShort { actual: usize, needed: usize },
}

/// Turns the raw bytes of a vendor page read into an identifier
pub trait VendorIdDecoder: Send + Sync + Debug {
    fn decode(&self, pages: &[u8]) -> Result<String, VendorIdError>;
}

/// Fixed-length framing around the identifier, no length field on the tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageFraming {
    pub prefix_len: usize,
    pub suffix_len: usize,
}

impl VendorIdDecoder for PageFraming {
    fn decode(&self, pages: &[u8]) -> Result<String, VendorIdError> {
        let needed = self.prefix_len + self.suffix_len;
        if pages.len() <= needed {
            return Err(VendorIdError::TooShort {
                actual: pages.len(),
                needed,
            });
        }

        let id = &pages[self.prefix_len..pages.len() - self.suffix_len];
        Ok(String::from_utf8_lossy(id).to_string())
    }
}

/// Connect to the Ultralight view, read the id pages and decode them
///
/// The connection is closed whether or not the read succeeds
pub fn read_vendor_id(
    transport: &dyn TagTransport,
    decoder: &dyn VendorIdDecoder,
    page_offset: u8,
) -> Result<String, VendorIdError> {
    let connection = TechConnection::open(transport, TagTechnology::MifareUltralight)?;
    let pages = connection.read_pages(page_offset)?;

    decoder.decode(&pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;

    const FRAMING: PageFraming = PageFraming {
        prefix_len: 5,
        suffix_len: 3,
    };

    #[test]
    fn framing_trims_prefix_and_suffix() {
        assert_eq!(FRAMING.decode(b"\x03\x0b\xd1\x01\x07ABCDEFGH\xfe\x00\x00").unwrap(), "ABCDEFGH");
    }

    #[test]
    fn framing_rejects_short_reads() {
        assert_eq!(
            FRAMING.decode(b"12345678"),
            Err(VendorIdError::TooShort {
                actual: 8,
                needed: 8
            })
        );
    }

    #[test]
    fn read_closes_after_failure() {
        let transport = ScriptedTransport::default();
        let result = read_vendor_id(&transport, &FRAMING, 144);

        assert!(matches!(result, Err(VendorIdError::Transport(_))));
        assert_eq!(
            transport.calls(),
            vec!["connect MifareUltralight", "read 144", "close MifareUltralight"]
        );
    }

    #[test]
    fn read_decodes_pages() {
        let transport = ScriptedTransport::with_pages(b"#####1A2B3C4D5E6F***");
        let id = read_vendor_id(&transport, &FRAMING, 144).unwrap();

        assert_eq!(id, "1A2B3C4D5E6F");
    }
}
