pub mod result_ext;

/// Lowercase hex, the form tag ids are reported in
pub fn hex_id(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_id_is_lowercase_hex() {
        assert_eq!(hex_id(&[0x04, 0xA1, 0xFF]), "04a1ff");
        assert_eq!(hex_id(&[]), "");
    }
}
