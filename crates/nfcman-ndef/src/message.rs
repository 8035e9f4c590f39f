use crate::record::NdefRecord;

/// An ordered, non-empty sequence of records
#[derive(Debug, Clone, PartialEq, Eq, Hash, uniffi::Record)]
pub struct NdefMessage {
    pub records: Vec<NdefRecord>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error, uniffi::Error)]
pub enum NdefMessageError {
    #[error("a message needs at least one record")]
    NoRecords,
}

pub type Error = NdefMessageError;
type Result<T, E = Error> = std::result::Result<T, E>;

impl NdefMessage {
    pub fn try_new(records: Vec<NdefRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(NdefMessageError::NoRecords);
        }

        Ok(Self { records })
    }

    pub fn single(record: NdefRecord) -> Self {
        Self {
            records: vec![record],
        }
    }

    pub fn first(&self) -> Option<&NdefRecord> {
        self.records.first()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
