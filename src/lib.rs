pub mod classifier;
pub mod config;
pub mod convert;
pub mod ffi;
pub mod logging;
pub mod session;
pub mod tag;
pub mod transport;
pub mod vendor;
pub mod write;

#[cfg(test)]
mod testing;

pub use nfcman_ndef::{DecodeError, NdefMessage, NdefRecord, Tnf};

uniffi::setup_scaffolding!();
