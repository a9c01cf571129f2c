//! Integer encoding for hash inputs.

/// Encodes `value` as its minimal big-endian two's-complement bytes.
///
/// The result is never empty and keeps exactly one sign byte where needed:
/// `0 -> [00]`, `128 -> [00 80]`, `-1 -> [ff]`, `-129 -> [ff 7f]`.
pub fn minimal_be_bytes(value: i128) -> Vec<u8> {
    let bytes = value.to_be_bytes();

    let mut start = 0;
    while start + 1 < bytes.len() {
        let lead = bytes[start];
        let next_negative = bytes[start + 1] & 0x80 != 0;
        let redundant = (lead == 0x00 && !next_negative) || (lead == 0xFF && next_negative);
        if !redundant {
            break;
        }
        start += 1;
    }

    bytes[start..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_small_values() {
        assert_eq!(minimal_be_bytes(0), vec![0x00]);
        assert_eq!(minimal_be_bytes(1), vec![0x01]);
        assert_eq!(minimal_be_bytes(127), vec![0x7F]);
        assert_eq!(minimal_be_bytes(128), vec![0x00, 0x80]);
        assert_eq!(minimal_be_bytes(256), vec![0x01, 0x00]);
    }

    #[test]
    fn test_negative_values() {
        assert_eq!(minimal_be_bytes(-1), vec![0xFF]);
        assert_eq!(minimal_be_bytes(-128), vec![0x80]);
        assert_eq!(minimal_be_bytes(-129), vec![0xFF, 0x7F]);
    }

    #[test]
    fn test_unsigned_max_keeps_sign_byte() {
        let encoded = minimal_be_bytes(u64::MAX as i128);
        assert_eq!(encoded.len(), 9);
        assert_eq!(encoded[0], 0x00);
        assert!(encoded[1..].iter().all(|&b| b == 0xFF));
    }

    proptest! {
        #[test]
        fn decodes_back_to_value(value in any::<i64>()) {
            let encoded = minimal_be_bytes(value as i128);
            prop_assert!(!encoded.is_empty() && encoded.len() <= 8);

            // Sign-extend back into an i64.
            let fill = if encoded[0] & 0x80 != 0 { 0xFF } else { 0x00 };
            let mut buf = [fill; 8];
            buf[8 - encoded.len()..].copy_from_slice(&encoded);
            prop_assert_eq!(i64::from_be_bytes(buf), value);
        }
    }
}
