//! REAL content codec (X.690 §8.5, binary encoding, base 2)
//!
//! Maps an IEEE-754 double onto the BER binary REAL layout and back, bit for
//! bit compatible with the EmBER+ reference implementation:
//!
//! ```text
//! first octet:  1 S 0 0 0 0 L L   S = sign, LL = exponent field length
//! exponent:     1-3 octets (or a length octet plus that many), two's complement
//! mantissa:     remaining octets, unsigned, trailing zero bits stripped
//! ```
//!
//! The exponent carried on the wire is the unbiased IEEE exponent and the
//! mantissa is the 53-bit significand with its implicit leading one restored;
//! the decoder renormalizes the mantissa so that leading one lands back on
//! bit 52 before masking it out.
//!
//! Special values are a single octet: `0x40` +∞, `0x41` −∞, `0x42` NaN and
//! `0x43` zero. Empty content also decodes to zero.

use crate::ber::integer::{length_from_shift, minimal_start_shift, read_integer, write_shifted};
use ber_core::constants::{
    BITS_PER_BYTE, DOUBLE_ASSUMED_LEADING_ONE, DOUBLE_EXPONENT_BIAS, DOUBLE_EXPONENT_MASK,
    DOUBLE_MANTISSA_BITS, DOUBLE_MANTISSA_MASK, DOUBLE_SIGN_MASK, DOUBLE_SPECIAL_EXPONENT,
    DOUBLE_SUBNORMAL_EXPONENT,
};
use ber_core::{BerError, BerResult};

pub const PLUS_INFINITY: u8 = 0x40;
pub const MINUS_INFINITY: u8 = 0x41;
pub const NOT_A_NUMBER: u8 = 0x42;
/// Zero as written by the EmBER+ reference; X.690 §8.5.9 reserves this octet
/// for minus zero, but peers expect it for any zero.
pub const ZERO: u8 = 0x43;

/// Bit 8 of the first octet: binary encoding
const BINARY_ENCODING: u8 = 0x80;
/// Bit 7 of the first octet: negative value
const SIGN_BIT: u8 = 0x40;
/// Bits 6-3 of the first octet: base and scaling factor, zero for base 2
const BASE_AND_SCALE_BITS: u8 = 0x3C;
/// Bits 2-1 of the first octet: exponent field length
const EXPONENT_FORMAT_BITS: u8 = 0x03;
/// Exponent format selecting an explicit exponent length octet
const EXPLICIT_EXPONENT_LENGTH: u8 = 0x03;

/// Encode a double into REAL content octets
///
/// Infinities, NaN and both signed zeros become a single special octet.
/// Everything else becomes a first octet, a minimal exponent field and a
/// mantissa with trailing zero octets and bits removed.
pub fn encode_real(value: f64) -> Vec<u8> {
    if value.is_infinite() {
        return vec![if value > 0.0 { PLUS_INFINITY } else { MINUS_INFINITY }];
    }
    if value.is_nan() {
        return vec![NOT_A_NUMBER];
    }
    if value == 0.0 {
        return vec![ZERO];
    }

    let bits = value.to_bits() as i64;

    let mut first_contents_octet = BINARY_ENCODING;
    if bits & DOUBLE_SIGN_MASK != 0 {
        first_contents_octet |= SIGN_BIT;
    }

    let biased_exponent = (bits & DOUBLE_EXPONENT_MASK) >> DOUBLE_MANTISSA_BITS;
    let (exponent, mut mantissa) = if biased_exponent == 0 {
        // Subnormal: no implicit leading one, scale by the highest set bit.
        let mantissa = bits & DOUBLE_MANTISSA_MASK;
        let highest_bit = 63 - mantissa.leading_zeros() as i64;
        log::warn!(
            "Encoding subnormal REAL {:e}; exponent {} is outside the decodable range",
            value,
            highest_bit + DOUBLE_SUBNORMAL_EXPONENT
        );
        (highest_bit + DOUBLE_SUBNORMAL_EXPONENT, mantissa)
    } else {
        (
            biased_exponent - DOUBLE_EXPONENT_BIAS,
            (bits & DOUBLE_MANTISSA_MASK) | DOUBLE_ASSUMED_LEADING_ONE,
        )
    };

    let exponent_shift = minimal_start_shift(exponent, true);
    let exponent_length = length_from_shift(exponent_shift);
    // An exponent within ±1074 always fits in two octets.
    first_contents_octet |= (exponent_length - 1) as u8;

    // CER denormalization (X.690 §11.3.1): not required, but saves space.
    while mantissa & 0xFF == 0 {
        mantissa >>= BITS_PER_BYTE;
    }
    mantissa >>= mantissa.trailing_zeros();

    // The mantissa is unsigned on the wire, but the reference decoder reads it
    // with a signed width, so keep a leading 00 octet when the top bit is set.
    let mantissa_shift = minimal_start_shift(mantissa, true);

    let mut out = Vec::with_capacity(1 + exponent_length + length_from_shift(mantissa_shift));
    out.push(first_contents_octet);
    write_shifted(&mut out, exponent, exponent_shift);
    write_shifted(&mut out, mantissa, mantissa_shift);
    out
}

/// Decode REAL content octets into a double
///
/// # Error Handling
/// Returns `InvalidData` for decimal or non-base-2 encodings, an empty
/// mantissa, an exponent outside the double range, a zero mantissa, or a
/// mantissa wider than 53 significant bits.
pub fn decode_real(content: &[u8]) -> BerResult<f64> {
    let Some((&first_contents_octet, mut rest)) = content.split_first() else {
        // X.690 §8.5.2: zero is encoded with no content octets.
        return Ok(0.0);
    };

    match first_contents_octet {
        PLUS_INFINITY => return Ok(f64::INFINITY),
        MINUS_INFINITY => return Ok(f64::NEG_INFINITY),
        NOT_A_NUMBER => return Ok(f64::NAN),
        ZERO => return Ok(0.0),
        _ => {}
    }

    if first_contents_octet & BINARY_ENCODING == 0 {
        return Err(BerError::InvalidData(format!(
            "Unsupported REAL encoding 0x{:02X}: only binary encoding is supported",
            first_contents_octet
        )));
    }
    if first_contents_octet & BASE_AND_SCALE_BITS != 0 {
        return Err(BerError::InvalidData(format!(
            "Unsupported REAL encoding 0x{:02X}: only base 2 without scaling is supported",
            first_contents_octet
        )));
    }

    let sign_bits = if first_contents_octet & SIGN_BIT != 0 {
        DOUBLE_SIGN_MASK
    } else {
        0
    };

    let exponent_length = match first_contents_octet & EXPONENT_FORMAT_BITS {
        EXPLICIT_EXPONENT_LENGTH => {
            let (&length, tail) = rest.split_first().ok_or_else(|| {
                BerError::InvalidData("Missing exponent length octet in REAL".to_string())
            })?;
            rest = tail;
            if length == 0 {
                return Err(BerError::InvalidData(
                    "Zero length exponent in REAL".to_string(),
                ));
            }
            length as usize
        }
        format => format as usize + 1,
    };

    // X.690 §8.5.7.5
    if rest.len() <= exponent_length {
        return Err(BerError::InvalidData(format!(
            "Incorrect length for REAL: {} content octets with a {} octet exponent",
            content.len(),
            exponent_length
        )));
    }
    let (exponent_bytes, mantissa_bytes) = rest.split_at(exponent_length);

    let exponent = read_integer(exponent_bytes, true)?;
    let mantissa = read_integer(mantissa_bytes, false)?;

    if exponent == DOUBLE_SPECIAL_EXPONENT {
        return Ok(if mantissa != 0 {
            f64::NAN
        } else if sign_bits != 0 {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    if exponent <= -DOUBLE_EXPONENT_BIAS || exponent > DOUBLE_EXPONENT_BIAS {
        return Err(BerError::InvalidData(format!(
            "The exponent {} of the REAL exceeds the expected range",
            exponent
        )));
    }
    if mantissa == 0 {
        return Err(BerError::InvalidData("The mantissa of the REAL is zero".to_string()));
    }

    let mantissa = normalize_mantissa(mantissa)?;
    let exponent_bits = (exponent + DOUBLE_EXPONENT_BIAS) << DOUBLE_MANTISSA_BITS;

    Ok(f64::from_bits((sign_bits | exponent_bits | mantissa) as u64))
}

/// Move the leading one of a nonzero mantissa to bit 52 and drop it
///
/// A double stores only the 52 bits after its first binary digit; the 53rd
/// is implied. Narrow mantissas are shifted up until that digit sits on
/// bit 52. Wider ones may only be shifted down across zero bits.
fn normalize_mantissa(mut mantissa: i64) -> BerResult<i64> {
    let significant_bits = DOUBLE_MANTISSA_BITS + 1;

    while mantissa >> significant_bits != 0 {
        if mantissa & 1 != 0 {
            return Err(BerError::InvalidData(
                "The mantissa of the REAL exceeds double precision".to_string(),
            ));
        }
        mantissa >>= 1;
    }

    while mantissa & (DOUBLE_EXPONENT_MASK >> BITS_PER_BYTE) == 0 {
        mantissa <<= BITS_PER_BYTE;
    }
    while mantissa & DOUBLE_EXPONENT_MASK == 0 {
        mantissa <<= 1;
    }

    Ok(mantissa & DOUBLE_MANTISSA_MASK)
}
