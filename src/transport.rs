use std::fmt::Debug;

use tracing::debug;

use crate::tag::TagTechnology;

/// Radio I/O for the tag of a single discovery event, implemented by the platform
#[uniffi::export(with_foreign)]
pub trait TagTransport: Send + Sync + Debug + 'static {
    fn connect(&self, tech: TagTechnology) -> Result<(), TransportError>;

    fn close(&self, tech: TagTechnology) -> Result<(), TransportError>;

    /// Read the 4 pages starting at `page_offset` from a MIFARE Ultralight tag
    fn read_pages(&self, page_offset: u8) -> Result<Vec<u8>, TransportError>;

    /// Write an encoded NDEF message over an open `Ndef` connection
    fn write_ndef_message(&self, message: Vec<u8>) -> Result<(), TransportError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, uniffi::Error)]
pub enum TransportError {
    #[error("io error: {0}")]
    Io(String),

    #[error("tag was lost")]
    TagLost,

    #[error("technology {0} is not available on this tag")]
    Unsupported(String),
}

/// An open connection to one technology of a tag, closed on drop
#[derive(Debug)]
pub struct TechConnection<'a> {
    transport: &'a dyn TagTransport,
    tech: TagTechnology,
}

impl<'a> TechConnection<'a> {
    pub fn open(transport: &'a dyn TagTransport, tech: TagTechnology) -> Result<Self, TransportError> {
        transport.connect(tech.clone())?;
        debug!("connected to {tech}");

        Ok(Self { transport, tech })
    }

    pub fn read_pages(&self, page_offset: u8) -> Result<Vec<u8>, TransportError> {
        self.transport.read_pages(page_offset)
    }

    pub fn write_ndef_message(&self, message: Vec<u8>) -> Result<(), TransportError> {
        self.transport.write_ndef_message(message)
    }
}

impl Drop for TechConnection<'_> {
    fn drop(&mut self) {
        if let Err(error) = self.transport.close(self.tech.clone()) {
            debug!("unable to close {}: {error}", self.tech);
        }
    }
}
