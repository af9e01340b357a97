//! Bit-layout constants for the integer and REAL codecs
//!
//! The double-precision values follow IEEE-754 binary64: 1 sign bit,
//! 11 exponent bits, 52 stored mantissa bits, exponent bias 1023.

/// Bits in one content octet
pub const BITS_PER_BYTE: u32 = 8;

/// Payload bits in one base-128 octet (tag numbers and OID subidentifiers)
pub const BITS_PER_ENCODED_BYTE: u32 = 7;

/// Bytes in a 64-bit accumulator
pub const BYTES_PER_LONG: u32 = 8;

/// Bits in a 64-bit accumulator
pub const BITS_PER_LONG: u32 = BYTES_PER_LONG * BITS_PER_BYTE;

/// Shift that selects the most significant byte of a 64-bit accumulator
pub const START_SHIFT_8BIT: u32 = BITS_PER_LONG - BITS_PER_BYTE;

/// Every bit set in a signed 64-bit accumulator
pub const ALL_BITS_SET_LONG: i64 = -1;

/// IEEE-754 double sign bit
pub const DOUBLE_SIGN_MASK: i64 = i64::MIN;

/// Stored (explicit) mantissa bits of a double
pub const DOUBLE_MANTISSA_BITS: u32 = 52;

/// Mask of the 11 exponent bits of a double
pub const DOUBLE_EXPONENT_MASK: i64 = (ALL_BITS_SET_LONG << DOUBLE_MANTISSA_BITS) & !DOUBLE_SIGN_MASK;

/// Mask of the 52 stored mantissa bits of a double
pub const DOUBLE_MANTISSA_MASK: i64 = !(ALL_BITS_SET_LONG << DOUBLE_MANTISSA_BITS);

/// Exponent bias of a double
pub const DOUBLE_EXPONENT_BIAS: i64 = 1023;

/// Unbiased exponent reserved for infinities and NaN
pub const DOUBLE_SPECIAL_EXPONENT: i64 = DOUBLE_EXPONENT_BIAS + 1;

/// Implicit leading one of a normal double's significand
pub const DOUBLE_ASSUMED_LEADING_ONE: i64 = 1 << DOUBLE_MANTISSA_BITS;

/// Unbiased exponent of the lowest mantissa bit of a subnormal double
pub const DOUBLE_SUBNORMAL_EXPONENT: i64 = 1 - DOUBLE_EXPONENT_BIAS - DOUBLE_MANTISSA_BITS as i64;
