/// Decode bytes as UTF-8, replacing invalid sequences with U+FFFD.
pub fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_utf8_unchanged() {
        assert_eq!(decode_lossy("Température 200°C".as_bytes()), "Température 200°C");
    }

    #[test]
    fn invalid_bytes_replaced() {
        assert_eq!(decode_lossy(&[b'a', 0xFF, b'b']), "a\u{FFFD}b");
    }
}
