//! Uppercase hex conversion for test fixtures.

const DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Renders bytes as an uppercase hex string with no separators.
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(char::from(DIGITS[usize::from(b >> 4)]));
        out.push(char::from(DIGITS[usize::from(b & 0x0F)]));
    }
    out
}

/// Parses a hex string (either case, even length, no separators).
///
/// Panics on malformed input; fixtures are literals.
pub fn decode(hex: &str) -> Vec<u8> {
    assert!(hex.len() % 2 == 0, "odd-length hex fixture: {hex}");
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .unwrap_or_else(|e| panic!("bad hex fixture {hex}: {e}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_uppercase() {
        assert_eq!(encode(&[0x00, 0xAB, 0x0F, 0xF0]), "00AB0FF0");
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn decode_accepts_either_case() {
        assert_eq!(decode("c0C2c3"), vec![0xC0, 0xC2, 0xC3]);
    }
}
