//! BER header types (identifier, length) and the header state machine

use ber_core::constants::{BITS_PER_BYTE, BITS_PER_ENCODED_BYTE};
use ber_core::{BerError, BerResult};
use serde::{Deserialize, Serialize};

/// Identifier octet bit selecting a constructed encoding
pub const CONSTRUCTED_BIT: u8 = 0x20;

/// Low five identifier bits, all set when the high-tag-number form follows
pub const HIGH_TAG_MARKER: u8 = 0x1F;

/// Largest tag number that fits in the identifier octet itself
pub const MAX_SHORT_TAG: u32 = 30;

/// Length octet announcing indefinite length
pub const INDEFINITE_LENGTH: u8 = 0x80;

/// End-of-contents marker closing an indefinite-length construct
pub const EOC_MARKER: [u8; 2] = [0x00, 0x00];

/// BER Tag Class
///
/// ASN.1 defines four tag classes:
/// - **Universal**: Standard ASN.1 types (INTEGER, OCTET STRING, etc.)
/// - **Application**: Application-specific types
/// - **Context-specific**: Context-dependent types (used in SEQUENCE/SET)
/// - **Private**: Private/implementation-specific types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagClass {
    /// Universal class (00)
    Universal = 0,
    /// Application class (01)
    Application = 1,
    /// Context-specific class (10)
    ContextSpecific = 2,
    /// Private class (11)
    Private = 3,
}

impl TagClass {
    /// Get tag class from bits 8-7 of an identifier octet
    pub fn from_bits(octet: u8) -> Self {
        match (octet >> 6) & 0x03 {
            0 => TagClass::Universal,
            1 => TagClass::Application,
            2 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        }
    }

    /// Convert tag class to identifier octet bits
    pub fn to_bits(self) -> u8 {
        (self as u8) << 6
    }

    /// Human readable name
    pub fn name(self) -> &'static str {
        match self {
            TagClass::Universal => "Universal",
            TagClass::Application => "Application",
            TagClass::ContextSpecific => "Context",
            TagClass::Private => "Private",
        }
    }
}

/// BER Identifier
///
/// The identifier octets of a TLV unit:
/// - **Class**: Universal, Application, Context-specific, or Private
/// - **Constructed/Primitive**: Whether the content is a sequence of TLVs
/// - **Tag Number**: 0-30 in the first octet, or the high-tag-number form
///
/// Short form (tag number 0-30):
/// ```text
/// Bits: 8 7 6 5 4 3 2 1
///       C C P T T T T T
/// ```
///
/// High-tag-number form (tag number > 30):
/// ```text
/// First octet:     C C P 1 1 1 1 1
/// Following octets: 1 T T T T T T T  ... 0 T T T T T T T
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identifier {
    class: TagClass,
    constructed: bool,
    number: u32,
}

impl Identifier {
    /// Create a new identifier
    pub fn new(class: TagClass, constructed: bool, number: u32) -> Self {
        Self {
            class,
            constructed,
            number,
        }
    }

    /// Create a Universal class identifier
    pub fn universal(constructed: bool, number: u32) -> Self {
        Self::new(TagClass::Universal, constructed, number)
    }

    /// Create a Context-specific class identifier
    pub fn context_specific(constructed: bool, number: u32) -> Self {
        Self::new(TagClass::ContextSpecific, constructed, number)
    }

    /// Get tag class
    pub fn class(&self) -> TagClass {
        self.class
    }

    /// Check if the identifier is constructed
    pub fn is_constructed(&self) -> bool {
        self.constructed
    }

    /// Get tag number
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Encode identifier to bytes
    ///
    /// # Returns
    /// One octet for tag numbers up to 30. Larger numbers get the `0x1F`
    /// marker followed by the base-128 tag number.
    pub fn encode(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(1);

        let class_bits = self.class.to_bits();
        let constructed_bit = if self.constructed { CONSTRUCTED_BIT } else { 0x00 };

        if self.number <= MAX_SHORT_TAG {
            result.push(class_bits | constructed_bit | self.number as u8);
            return result;
        }

        result.push(class_bits | constructed_bit | HIGH_TAG_MARKER);
        encode_base128(self.number as u64, &mut result);
        result
    }
}

/// Append `value` as a base-128 chain, continuation bit set on all but the last octet
pub fn encode_base128(value: u64, out: &mut Vec<u8>) {
    let mut groups = 1;
    let mut temp = value >> BITS_PER_ENCODED_BYTE;
    while temp > 0 {
        groups += 1;
        temp >>= BITS_PER_ENCODED_BYTE;
    }

    for i in (0..groups).rev() {
        let octet = ((value >> (i * BITS_PER_ENCODED_BYTE)) & 0x7F) as u8;
        if i > 0 {
            out.push(octet | 0x80);
        } else {
            out.push(octet);
        }
    }
}

/// BER Length
///
/// - **Definite**: short form for 0-127 (one octet), long form above that
///   (`0x80 | n` followed by `n` big-endian length octets)
/// - **Indefinite**: the single octet `0x80`; content ends with `00 00`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Length {
    /// Content length known up front
    Definite(usize),
    /// Content terminated by an end-of-contents marker
    Indefinite,
}

impl Length {
    /// Get the definite length value, if any
    pub fn value(&self) -> Option<usize> {
        match self {
            Length::Definite(l) => Some(*l),
            Length::Indefinite => None,
        }
    }

    /// Encode length to bytes, always in the shortest definite form
    ///
    /// # Returns
    /// - Definite 0-127: the length itself in one octet
    /// - Definite above 127: `0x80 | n` and then `n` big-endian octets
    /// - Indefinite: the single octet `0x80`
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            Length::Indefinite => vec![INDEFINITE_LENGTH],
            Length::Definite(length) if length < 128 => vec![length as u8],
            Length::Definite(length) => {
                let num_bytes = (usize::BITS - length.leading_zeros()).div_ceil(BITS_PER_BYTE);

                let mut result = Vec::with_capacity(1 + num_bytes as usize);
                result.push(0x80 | num_bytes as u8);
                for i in (0..num_bytes).rev() {
                    result.push((length >> (i * BITS_PER_BYTE)) as u8);
                }
                result
            }
        }
    }
}

/// Framing of a constructed element's content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LengthForm {
    /// Explicit length octets
    #[default]
    Definite,
    /// `0x80` length octet and an end-of-contents marker
    Indefinite,
}

/// A decoded TLV header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub identifier: Identifier,
    pub length: Length,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderState {
    Identifier,
    TagNumber,
    LengthStart,
    LengthOctets { remaining: usize },
}

/// Incremental header decoder
///
/// Octets are pushed one at a time; the decoder walks
/// identifier -> (high tag number) -> length -> (long form octets) and
/// yields the [`Header`] once the last length octet arrives. The same
/// state machine serves the blocking reader and the async stream.
#[derive(Debug, Clone)]
pub struct HeaderDecoder {
    state: HeaderState,
    class: TagClass,
    constructed: bool,
    number: u32,
    length: usize,
    octets: Vec<u8>,
}

impl HeaderDecoder {
    /// Create a decoder waiting for the first identifier octet
    pub fn new() -> Self {
        Self {
            state: HeaderState::Identifier,
            class: TagClass::Universal,
            constructed: false,
            number: 0,
            length: 0,
            octets: Vec::with_capacity(4),
        }
    }

    /// Header octets consumed so far
    pub fn octets(&self) -> &[u8] {
        &self.octets
    }

    /// Consume the decoder, returning the header octets
    pub fn into_octets(self) -> Vec<u8> {
        self.octets
    }

    /// Which field the decoder is waiting on, for truncation messages
    pub fn stage(&self) -> &'static str {
        match self.state {
            HeaderState::Identifier => "identifier octet",
            HeaderState::TagNumber => "high tag number",
            HeaderState::LengthStart => "length octet",
            HeaderState::LengthOctets { .. } => "long form length",
        }
    }

    /// Feed one octet
    ///
    /// # Arguments
    /// * `octet` - The next header octet read from the source
    ///
    /// # Returns
    /// `Ok(Some(header))` when the header is complete, `Ok(None)` when more
    /// octets are needed. The octet is kept in [`HeaderDecoder::octets`]
    /// either way.
    ///
    /// # Why Octet at a Time?
    /// A caller reading from a socket never consumes an octet past the
    /// header, and can stop and resume between any two octets.
    ///
    /// # Error Handling
    /// Returns `InvalidData` for tag numbers or lengths that overflow, the
    /// reserved `0xFF` length octet, and indefinite length on a primitive.
    pub fn push(&mut self, octet: u8) -> BerResult<Option<Header>> {
        self.octets.push(octet);

        match self.state {
            HeaderState::Identifier => {
                self.class = TagClass::from_bits(octet);
                self.constructed = octet & CONSTRUCTED_BIT != 0;
                let tag_bits = octet & HIGH_TAG_MARKER;
                if tag_bits == HIGH_TAG_MARKER {
                    self.state = HeaderState::TagNumber;
                } else {
                    self.number = tag_bits as u32;
                    self.state = HeaderState::LengthStart;
                }
                Ok(None)
            }
            HeaderState::TagNumber => {
                if self.number > (u32::MAX >> BITS_PER_ENCODED_BYTE) {
                    return Err(BerError::InvalidData(
                        "Tag number too large or invalid encoding".to_string(),
                    ));
                }
                self.number = (self.number << BITS_PER_ENCODED_BYTE) | (octet & 0x7F) as u32;
                if octet & 0x80 == 0 {
                    self.state = HeaderState::LengthStart;
                }
                Ok(None)
            }
            HeaderState::LengthStart => {
                if octet & 0x80 == 0 {
                    return Ok(Some(self.finish(Length::Definite(octet as usize))));
                }

                let num_bytes = (octet & 0x7F) as usize;
                if num_bytes == 0 {
                    if !self.constructed {
                        return Err(BerError::InvalidData(
                            "Indefinite length on a primitive element".to_string(),
                        ));
                    }
                    return Ok(Some(self.finish(Length::Indefinite)));
                }
                if num_bytes == 0x7F {
                    return Err(BerError::InvalidData(
                        "Reserved length octet 0xFF".to_string(),
                    ));
                }
                if num_bytes > std::mem::size_of::<usize>() {
                    return Err(BerError::InvalidData(format!(
                        "Length encoding too large: {} bytes (max {})",
                        num_bytes,
                        std::mem::size_of::<usize>()
                    )));
                }

                self.state = HeaderState::LengthOctets { remaining: num_bytes };
                Ok(None)
            }
            HeaderState::LengthOctets { remaining } => {
                if self.length > (usize::MAX >> BITS_PER_BYTE) {
                    return Err(BerError::InvalidData("Length value overflows".to_string()));
                }
                self.length = (self.length << BITS_PER_BYTE) | octet as usize;
                if remaining == 1 {
                    return Ok(Some(self.finish(Length::Definite(self.length))));
                }
                self.state = HeaderState::LengthOctets {
                    remaining: remaining - 1,
                };
                Ok(None)
            }
        }
    }

    fn finish(&self, length: Length) -> Header {
        Header {
            identifier: Identifier::new(self.class, self.constructed, self.number),
            length,
        }
    }
}

impl Default for HeaderDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_header(data: &[u8]) -> BerResult<Option<Header>> {
        let mut decoder = HeaderDecoder::new();
        for &octet in data {
            if let Some(header) = decoder.push(octet)? {
                return Ok(Some(header));
            }
        }
        Ok(None)
    }

    #[test]
    fn test_identifier_short_form() {
        let identifier = Identifier::universal(false, 2);
        assert_eq!(identifier.encode(), vec![0x02]);
    }

    #[test]
    fn test_identifier_constructed() {
        let identifier = Identifier::new(TagClass::Application, true, 0);
        assert_eq!(identifier.encode(), vec![0x60]);
    }

    #[test]
    fn test_identifier_high_tag_number() {
        let identifier = Identifier::context_specific(false, 31);
        assert_eq!(identifier.encode(), vec![0x9F, 0x1F]);

        let identifier = Identifier::new(TagClass::Private, true, 201);
        assert_eq!(identifier.encode(), vec![0xFF, 0x81, 0x49]);

        let header = decode_header(&[0xFF, 0x81, 0x49, 0x00]).unwrap().unwrap();
        assert_eq!(header.identifier, identifier);
        assert_eq!(header.length, Length::Definite(0));
    }

    #[test]
    fn test_length_short() {
        assert_eq!(Length::Definite(0).encode(), vec![0x00]);
        assert_eq!(Length::Definite(127).encode(), vec![0x7F]);
    }

    #[test]
    fn test_length_long() {
        assert_eq!(Length::Definite(128).encode(), vec![0x81, 0x80]);
        assert_eq!(Length::Definite(1000).encode(), vec![0x82, 0x03, 0xE8]);
        assert_eq!(Length::Indefinite.encode(), vec![0x80]);
    }

    #[test]
    fn test_header_decode_long_length() {
        let header = decode_header(&[0x04, 0x82, 0x03, 0xE8]).unwrap().unwrap();
        assert_eq!(header.identifier.number(), 4);
        assert_eq!(header.length, Length::Definite(1000));
    }

    #[test]
    fn test_header_incomplete() {
        assert!(decode_header(&[0x1F, 0xFF]).unwrap().is_none());
        assert!(decode_header(&[0x04, 0x82, 0x02]).unwrap().is_none());
    }

    #[test]
    fn test_header_rejects_malformed_lengths() {
        assert!(matches!(decode_header(&[0x04, 0x80]), Err(BerError::InvalidData(_))));
        assert!(matches!(decode_header(&[0x30, 0xFF]), Err(BerError::InvalidData(_))));
        assert!(matches!(decode_header(&[0x04, 0x89]), Err(BerError::InvalidData(_))));
    }

    #[test]
    fn test_header_rejects_oversized_tag() {
        let data = [0x1F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F];
        assert!(matches!(decode_header(&data), Err(BerError::InvalidData(_))));
    }
}
