//! Fakes for the platform collaborators

use parking_lot::Mutex;

use crate::{
    session::{DiscoveryFilter, DispatchError, ForegroundDispatch, NfcAdapter},
    tag::TagTechnology,
    transport::{TagTransport, TransportError},
};

fn short_name(tech: &TagTechnology) -> String {
    tech.name().trim_start_matches("android.nfc.tech.").to_string()
}

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    pub connect_error: Option<TransportError>,
    pub pages: Option<Vec<u8>>,
    pub write_error: Option<TransportError>,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn with_pages(pages: &[u8]) -> Self {
        Self {
            pages: Some(pages.to_vec()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

impl TagTransport for ScriptedTransport {
    fn connect(&self, tech: TagTechnology) -> Result<(), TransportError> {
        self.record(format!("connect {}", short_name(&tech)));

        match &self.connect_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn close(&self, tech: TagTechnology) -> Result<(), TransportError> {
        self.record(format!("close {}", short_name(&tech)));
        Ok(())
    }

    fn read_pages(&self, page_offset: u8) -> Result<Vec<u8>, TransportError> {
        self.record(format!("read {page_offset}"));

        self.pages
            .clone()
            .ok_or_else(|| TransportError::Io("page read failed".to_string()))
    }

    fn write_ndef_message(&self, message: Vec<u8>) -> Result<(), TransportError> {
        self.record(format!("write {} bytes", message.len()));

        match &self.write_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingDispatch {
    pub fail: bool,
    pub calls: Mutex<Vec<String>>,
}

impl RecordingDispatch {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl ForegroundDispatch for RecordingDispatch {
    fn enable(
        &self,
        filters: Vec<DiscoveryFilter>,
        tech_lists: Vec<Vec<TagTechnology>>,
    ) -> Result<(), DispatchError> {
        self.calls.lock().push(format!(
            "enable {} filters {} tech lists",
            filters.len(),
            tech_lists.len()
        ));

        if self.fail {
            return Err(DispatchError::IllegalState("activity is finishing".to_string()));
        }

        Ok(())
    }

    fn disable(&self) -> Result<(), DispatchError> {
        self.calls.lock().push("disable".to_string());

        if self.fail {
            return Err(DispatchError::IllegalState("activity is finishing".to_string()));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedAdapter {
    pub available: bool,
    pub supported: bool,
    pub enabled: bool,
}

impl Default for FixedAdapter {
    fn default() -> Self {
        Self {
            available: true,
            supported: true,
            enabled: true,
        }
    }
}

impl NfcAdapter for FixedAdapter {
    fn is_available(&self) -> bool {
        self.available
    }

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
