//! Fixed-width little-endian length fields.
//!
//! The item header stores the tag count and tag block size as 8-byte
//! unsigned little-endian integers. Callers guarantee the range they decode
//! lies inside the buffer.

use crate::errors::{ItemError, Result};

/// Width of the tag count and tag block size fields.
pub const LENGTH_FIELD_SIZE: usize = 8;

/// Decode an unsigned little-endian integer of any width.
///
/// Bytes beyond the eighth must be zero for the value to be exact; wider
/// inputs saturate at `u64::MAX` rather than wrapping.
pub fn decode_length(bytes: &[u8]) -> u64 {
    bytes.iter().rev().fold(0u64, |acc, &byte| {
        acc.checked_mul(256).and_then(|v| v.checked_add(u64::from(byte))).unwrap_or(u64::MAX)
    })
}

/// Encode `value` as a little-endian integer zero-padded to `width` bytes.
pub fn encode_length(value: u64, width: usize) -> Result<Vec<u8>> {
    let le = value.to_le_bytes();
    let significant = le.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    if significant > width {
        return Err(ItemError::LengthOverflow { value, width });
    }

    let mut out = vec![0u8; width];
    let copy = width.min(le.len());
    out[..copy].copy_from_slice(&le[..copy]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    #[test]
    fn decodes_little_endian() {
        assert_eq!(decode_length(&hex!("0100000000000000")), 1);
        assert_eq!(decode_length(&hex!("0001000000000000")), 256);
        assert_eq!(decode_length(&hex!("efbeadde00000000")), 0xdead_beef);
        assert_eq!(decode_length(&[]), 0);
    }

    #[test]
    fn matches_std_for_full_width() {
        let value = 0x0123_4567_89ab_cdefu64;
        assert_eq!(decode_length(&value.to_le_bytes()), value);
    }

    #[test]
    fn encode_pads_to_width() {
        assert_eq!(encode_length(5, 8).unwrap(), hex!("0500000000000000"));
        assert_eq!(encode_length(0, 2).unwrap(), hex!("0000"));
        assert_eq!(encode_length(0xffff, 2).unwrap(), hex!("ffff"));
        assert_eq!(encode_length(7, 10).unwrap(), hex!("07000000000000000000"));
    }

    #[test]
    fn encode_rejects_values_wider_than_field() {
        let result = encode_length(0x1_0000, 2);
        assert_eq!(result, Err(ItemError::LengthOverflow { value: 0x1_0000, width: 2 }));
    }

    #[test]
    fn oversized_input_saturates() {
        assert_eq!(decode_length(&[0xff; 9]), u64::MAX);
    }
}
