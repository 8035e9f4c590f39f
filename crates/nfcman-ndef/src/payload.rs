#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct TextPayload {
    pub format: TextPayloadFormat,
    pub language: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum TextPayloadFormat {
    Utf8,
    Utf16,
}

const UTF16_FLAG: u8 = 0b1000_0000;
const LANGUAGE_LENGTH_MASK: u8 = 0b0011_1111;

/// URI prefix codes as defined in NFC Forum RTD URI specification
pub const URI_PREFIXES: &[&str] = &[
    "",                           // 0x00 - no prepending
    "http://www.",                // 0x01
    "https://www.",               // 0x02
    "http://",                    // 0x03
    "https://",                   // 0x04
    "tel:",                       // 0x05
    "mailto:",                    // 0x06
    "ftp://anonymous:anonymous@", // 0x07
    "ftp://ftp.",                 // 0x08
    "ftps://",                    // 0x09
    "sftp://",                    // 0x0A
    "smb://",                     // 0x0B
    "nfs://",                     // 0x0C
    "ftp://",                     // 0x0D
    "dav://",                     // 0x0E
    "news:",                      // 0x0F
    "telnet://",                  // 0x10
    "imap:",                      // 0x11
    "rtsp://",                    // 0x12
    "urn:",                       // 0x13
    "pop:",                       // 0x14
    "sip:",                       // 0x15
    "sips:",                      // 0x16
    "tftp:",                      // 0x17
    "btspp://",                   // 0x18
    "btl2cap://",                 // 0x19
    "btgoep://",                  // 0x1A
    "tcpobex://",                 // 0x1B
    "irdaobex://",                // 0x1C
    "file://",                    // 0x1D
    "urn:epc:id:",                // 0x1E
    "urn:epc:tag:",               // 0x1F
    "urn:epc:pat:",               // 0x20
    "urn:epc:raw:",               // 0x21
    "urn:epc:",                   // 0x22
    "urn:nfc:",                   // 0x23
];

/// Decode an RTD Text payload: status byte, language code, then the text
pub fn parse_text(payload: &[u8]) -> Option<TextPayload> {
    let (&status, rest) = payload.split_first()?;
    let is_utf16 = status & UTF16_FLAG != 0;
    let language_length = (status & LANGUAGE_LENGTH_MASK) as usize;

    if rest.len() < language_length {
        return None;
    }

    let (language, text) = rest.split_at(language_length);

    let text = if is_utf16 {
        String::from_utf16_lossy(
            &text
                .chunks_exact(2)
                .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
                .collect::<Vec<u16>>(),
        )
    } else {
        String::from_utf8_lossy(text).to_string()
    };

    Some(TextPayload {
        format: if is_utf16 {
            TextPayloadFormat::Utf16
        } else {
            TextPayloadFormat::Utf8
        },
        language: String::from_utf8_lossy(language).to_string(),
        text,
    })
}

/// Decode an RTD URI payload, expanding the abbreviation byte
pub fn parse_uri(payload: &[u8]) -> Option<String> {
    let (&code, rest) = payload.split_first()?;
    let prefix = URI_PREFIXES.get(code as usize)?;
    let rest = std::str::from_utf8(rest).ok()?;

    Some(format!("{prefix}{rest}"))
}
