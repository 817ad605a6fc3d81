//! Hex-encoded input detection
//!
//! Containers exported through an OPC UA client arrive as ASCII hex text
//! instead of raw bytes. Such input is converted back to binary before
//! decoding.

use std::borrow::Cow;

/// Convert `input` from hex text to bytes if it is hex text.
///
/// Trailing ASCII whitespace is trimmed before the even-length check, so a
/// hex file saved with a final newline still converts. This is looser than a
/// plain even-prefix check, which would see the newline as a non-hex byte.
/// The input counts as hex if every byte of its even-length prefix is a hex
/// digit; a dangling odd digit is dropped. Anything else is returned
/// unchanged.
pub fn decode_if_hex(input: &[u8]) -> Cow<'_, [u8]> {
    let end = input
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    let text = &input[..end];
    let prefix = &text[..text.len() / 2 * 2];

    if prefix.is_empty() || !prefix.iter().all(u8::is_ascii_hexdigit) {
        return Cow::Borrowed(input);
    }

    match hex::decode(prefix) {
        Ok(bytes) => Cow::Owned(bytes),
        Err(e) => {
            log::debug!("Input looked like hex but did not decode: {}", e);
            Cow::Borrowed(input)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_text_converted() {
        let converted = decode_if_hex(b"0400c800ff");
        assert_eq!(converted.as_ref(), &[0x04, 0x00, 0xC8, 0x00, 0xFF]);
        assert!(matches!(converted, Cow::Owned(_)));
    }

    #[test]
    fn test_mixed_case_and_trailing_newline() {
        assert_eq!(decode_if_hex(b"aBcD\r\n").as_ref(), &[0xAB, 0xCD]);
    }

    #[test]
    fn test_odd_trailing_digit_dropped() {
        assert_eq!(decode_if_hex(b"01020").as_ref(), &[0x01, 0x02]);
    }

    #[test]
    fn test_binary_left_alone() {
        let binary = [0x04u8, 0x00, 0xC8, 0x00, 0x01];
        let result = decode_if_hex(&binary);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result.as_ref(), &binary);
    }

    #[test]
    fn test_empty_input() {
        assert!(decode_if_hex(&[]).is_empty());
    }
}
