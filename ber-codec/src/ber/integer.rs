//! Minimal-width big-endian integer fields
//!
//! INTEGER content, the REAL exponent, and the REAL mantissa all use the same
//! layout: a big-endian integer with no redundant leading octet. The width is
//! expressed as the shift of the most significant octet to write
//! (0 for one octet, 8 for two, ... 56 for eight).

use ber_core::constants::{ALL_BITS_SET_LONG, BITS_PER_BYTE, BITS_PER_LONG, START_SHIFT_8BIT};
use ber_core::{BerError, BerResult};

/// Shift of the most significant octet needed to write `value`
///
/// Starting from the top octet, octets equal to the sign extension are
/// skipped. For a signed field one octet is added back when the remaining top
/// octet's high bit would flip the sign (e.g. `128` needs `00 80`).
pub fn minimal_start_shift(value: i64, signed: bool) -> u32 {
    if (-128..=127).contains(&value) && (signed || value >= 0) {
        return 0;
    }

    let leading = if value < 0 { 0xFF } else { 0x00 };

    let mut shift = START_SHIFT_8BIT;
    let mut current_byte = (value >> shift) & 0xFF;
    while current_byte == leading && shift > 0 {
        shift -= BITS_PER_BYTE;
        current_byte = (value >> shift) & 0xFF;
    }

    if signed && shift < START_SHIFT_8BIT && ((value > 0) == (current_byte & 0x80 != 0)) {
        shift += BITS_PER_BYTE;
    }

    shift
}

/// Number of octets written for a start shift
pub fn length_from_shift(shift: u32) -> usize {
    (shift / BITS_PER_BYTE) as usize + 1
}

/// Write `value` big-endian, starting with the octet at `shift`
pub fn write_shifted(out: &mut Vec<u8>, value: i64, shift: u32) {
    let mut shift = shift as i64;
    while shift >= 0 {
        out.push((value >> shift) as u8);
        shift -= BITS_PER_BYTE as i64;
    }
}

/// Minimal two's-complement encoding of a signed integer
pub fn encode_signed(value: i64) -> Vec<u8> {
    let shift = minimal_start_shift(value, true);
    let mut out = Vec::with_capacity(length_from_shift(shift));
    write_shifted(&mut out, value, shift);
    out
}

/// Fold big-endian octets into a 64-bit accumulator
///
/// When `signed` is set the leading octet's high bit is extended across the
/// accumulator. Before each further octet is shifted in, the top nine bits
/// must still be pure sign extension, so the result never silently overflows.
///
/// # Error Handling
/// Returns `InvalidData` for an empty field or a value that does not fit.
pub fn read_integer(bytes: &[u8], signed: bool) -> BerResult<i64> {
    let (&most_significant, rest) = bytes
        .split_first()
        .ok_or_else(|| BerError::InvalidData("Unexpected zero length for integer".to_string()))?;

    // One bit short of a full octet so the sign bit is never overwritten.
    let most_significant_shift = BITS_PER_LONG - BITS_PER_BYTE - 1;
    let discard_bits_mask = ALL_BITS_SET_LONG << most_significant_shift;

    let (mut result, leading) = if signed && most_significant & 0x80 != 0 {
        (
            (ALL_BITS_SET_LONG << BITS_PER_BYTE) | most_significant as i64,
            discard_bits_mask,
        )
    } else {
        (most_significant as i64, 0)
    };

    for &byte in rest {
        if result & discard_bits_mask != leading {
            return Err(BerError::InvalidData(format!(
                "Integer of {} bytes exceeds the 64-bit range",
                bytes.len()
            )));
        }
        result = (result << BITS_PER_BYTE) | byte as i64;
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_minimal_encoding() {
        assert_eq!(encode_signed(0), vec![0x00]);
        assert_eq!(encode_signed(127), vec![0x7F]);
        assert_eq!(encode_signed(128), vec![0x00, 0x80]);
        assert_eq!(encode_signed(256), vec![0x01, 0x00]);
        assert_eq!(encode_signed(-1), vec![0xFF]);
        assert_eq!(encode_signed(-128), vec![0x80]);
        assert_eq!(encode_signed(-129), vec![0xFF, 0x7F]);
        assert_eq!(encode_signed(-200), vec![0xFF, 0x38]);
        assert_eq!(
            encode_signed(i64::MAX),
            vec![0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
        assert_eq!(
            encode_signed(i64::MIN),
            vec![0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_unsigned_width() {
        assert_eq!(minimal_start_shift(0x80, false), 0);
        assert_eq!(minimal_start_shift(0x80, true), 8);
        assert_eq!(minimal_start_shift(0x1_0000, false), 16);
    }

    #[test]
    fn test_read_sign_extension() {
        assert_eq!(read_integer(&[0xFF, 0x7F], true).unwrap(), -129);
        assert_eq!(read_integer(&[0xFF, 0x7F], false).unwrap(), 0xFF7F);
        assert_eq!(read_integer(&[0x80], true).unwrap(), -128);
        assert_eq!(read_integer(&[0x00, 0x80], true).unwrap(), 128);
    }

    #[test]
    fn test_read_rejects_empty_and_overflow() {
        assert!(read_integer(&[], true).is_err());
        let nine = [0x01, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(read_integer(&nine, true).is_err());
        let unsigned_top_bit = [0x80, 0, 0, 0, 0, 0, 0, 0];
        assert!(read_integer(&unsigned_top_bit, false).is_err());
    }

    #[test]
    fn test_boundary_round_trip() {
        let values = [
            0,
            1,
            -1,
            127,
            -127,
            128,
            -128,
            129,
            -129,
            256,
            -256,
            i64::MAX,
            i64::MIN,
        ];
        for value in values {
            let encoded = encode_signed(value);
            assert_eq!(read_integer(&encoded, true).unwrap(), value, "value {}", value);
        }
    }

    #[test]
    fn test_random_round_trip() {
        let mut rng = StdRng::seed_from_u64(0x0BE2);
        for _ in 0..2000 {
            let value: i64 = rng.r#gen::<i64>() >> rng.gen_range(0u32..64);
            let encoded = encode_signed(value);
            assert_eq!(read_integer(&encoded, true).unwrap(), value);
            assert_eq!(encoded.len(), length_from_shift(minimal_start_shift(value, true)));
        }
    }
}
