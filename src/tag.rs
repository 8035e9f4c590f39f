//! Transport-independent view of a discovered tag

use std::fmt;

use nfcman_ndef::{DecodeError, NdefMessage};

/// A technology a physical tag advertises
#[derive(Debug, Clone, PartialEq, Eq, Hash, uniffi::Enum)]
pub enum TagTechnology {
    NfcA,
    NfcB,
    NfcF,
    NfcV,
    IsoDep,
    Ndef,
    NdefFormatable,
    MifareClassic,
    MifareUltralight,
    /// Reported by the platform but not known here, the raw name is kept
    Unrecognized(String),
}

const TECH_PREFIX: &str = "android.nfc.tech.";

impl TagTechnology {
    pub fn from_name(name: &str) -> Self {
        let short = name.strip_prefix(TECH_PREFIX).unwrap_or(name);

        match short {
            "NfcA" => Self::NfcA,
            "NfcB" => Self::NfcB,
            "NfcF" => Self::NfcF,
            "NfcV" => Self::NfcV,
            "IsoDep" => Self::IsoDep,
            "Ndef" => Self::Ndef,
            "NdefFormatable" => Self::NdefFormatable,
            "MifareClassic" => Self::MifareClassic,
            "MifareUltralight" => Self::MifareUltralight,
            _ => Self::Unrecognized(name.to_string()),
        }
    }

    /// Fully qualified platform name
    pub fn name(&self) -> String {
        let short = match self {
            Self::NfcA => "NfcA",
            Self::NfcB => "NfcB",
            Self::NfcF => "NfcF",
            Self::NfcV => "NfcV",
            Self::IsoDep => "IsoDep",
            Self::Ndef => "Ndef",
            Self::NdefFormatable => "NdefFormatable",
            Self::MifareClassic => "MifareClassic",
            Self::MifareUltralight => "MifareUltralight",
            Self::Unrecognized(name) => return name.clone(),
        };

        format!("{TECH_PREFIX}{short}")
    }
}

impl fmt::Display for TagTechnology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Identity of a discovered tag, built fresh for every discovery event
#[derive(Debug, Clone, PartialEq, Eq, Hash, uniffi::Record)]
pub struct Tag {
    /// Serial number, may be empty
    pub id: Vec<u8>,
    pub tech_list: Vec<TagTechnology>,
}

impl Tag {
    pub fn new(id: Vec<u8>, tech_list: Vec<TagTechnology>) -> Self {
        Self { id, tech_list }
    }

    pub fn supports(&self, tech: &TagTechnology) -> bool {
        self.tech_list.contains(tech)
    }
}

/// The NDEF view of a tag as the platform reported it at discovery time
#[derive(Debug, Clone, PartialEq, Eq, Hash, uniffi::Record)]
pub struct NdefTagInfo {
    /// Encoded message present on the tag, absent for an empty tag
    pub cached_message: Option<Vec<u8>>,
    pub max_size: u32,
    pub is_writable: bool,
    pub can_make_read_only: bool,
    /// Platform NDEF type name, e.g. `org.nfcforum.ndef.type2`
    pub ndef_type: Option<String>,
}

impl NdefTagInfo {
    pub fn decoded_message(&self) -> Option<Result<NdefMessage, DecodeError>> {
        self.cached_message
            .as_deref()
            .map(nfcman_ndef::decode_message)
    }
}
