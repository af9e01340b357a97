//! BER encoder
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use ber_codec::ber::BerEncoder;
//!
//! let mut encoder = BerEncoder::new();
//! encoder.encode_integer(12345);
//! encoder.encode_real(1.5);
//! let bytes = encoder.into_bytes();
//! ```

use crate::ber::integer::encode_signed;
use crate::ber::real::encode_real;
use crate::ber::tags;
use crate::ber::types::{encode_base128, Identifier, Length, LengthForm, EOC_MARKER};
use crate::element::Element;
use ber_core::{ObjectIdentifier, Value};
use bytes::{BufMut, Bytes, BytesMut};

/// Canonical content octet for TRUE
pub const BOOLEAN_TRUE: u8 = 0xFF;
/// Content octet for FALSE
pub const BOOLEAN_FALSE: u8 = 0x00;

/// BER encoder
///
/// Accumulates TLV triplets in a `BytesMut` buffer. Every value is written in
/// its minimal form: short-form lengths up to 127, minimal two's-complement
/// integers and stripped REAL mantissas.
pub struct BerEncoder {
    buffer: BytesMut,
}

impl BerEncoder {
    /// Create a new BER encoder
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
        }
    }

    /// Create a new BER encoder with initial capacity
    ///
    /// # Arguments
    /// * `capacity` - Initial buffer capacity in bytes
    ///
    /// # Why Pre-allocate?
    /// When the size of the output is known (for example when re-encoding
    /// an element whose raw bytes are cached), one allocation covers the
    /// whole encoding.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Encode a TLV (Tag-Length-Value) triplet with a definite length
    ///
    /// # Arguments
    /// * `identifier` - Class, constructed bit and tag number
    /// * `content` - Content octets, already encoded
    ///
    /// # Encoding Process
    /// 1. Encode the identifier (high-tag-number form above 30)
    /// 2. Encode the length in its shortest definite form
    /// 3. Append the content octets
    ///
    /// # Why This Method?
    /// Every typed `encode_*` method and [`BerEncoder::encode_element`] end
    /// here, so framing rules live in one place.
    pub fn encode_tlv(&mut self, identifier: &Identifier, content: &[u8]) {
        self.buffer.put_slice(&identifier.encode());
        self.buffer.put_slice(&Length::Definite(content.len()).encode());
        self.buffer.put_slice(content);
    }

    /// Start an indefinite-length constructed element
    ///
    /// Follow with the encoded children and [`BerEncoder::end_indefinite`].
    pub fn begin_indefinite(&mut self, identifier: &Identifier) {
        self.buffer.put_slice(&identifier.encode());
        self.buffer.put_slice(&Length::Indefinite.encode());
    }

    /// Write the end-of-contents marker
    pub fn end_indefinite(&mut self) {
        self.buffer.put_slice(&EOC_MARKER);
    }

    /// Encode a BOOLEAN (`0xFF` for true)
    pub fn encode_boolean(&mut self, value: bool) {
        self.encode_tlv(&Identifier::universal(false, tags::BOOLEAN), &encode_boolean_content(value));
    }

    /// Encode an INTEGER in minimal two's complement
    ///
    /// # Arguments
    /// * `value` - The value to encode; 1 to 8 content octets are written
    ///
    /// Redundant leading `0x00`/`0xFF` octets are dropped, so 127 encodes as
    /// `02 01 7F` and 128 as `02 02 00 80`.
    pub fn encode_integer(&mut self, value: i64) {
        self.encode_tlv(&Identifier::universal(false, tags::INTEGER), &encode_signed(value));
    }

    /// Encode an ENUMERATED
    pub fn encode_enumerated(&mut self, value: i64) {
        self.encode_tlv(&Identifier::universal(false, tags::ENUMERATED), &encode_signed(value));
    }

    /// Encode an OCTET STRING
    pub fn encode_octet_string(&mut self, value: &[u8]) {
        self.encode_tlv(&Identifier::universal(false, tags::OCTET_STRING), value);
    }

    /// Encode a NULL
    pub fn encode_null(&mut self) {
        self.encode_tlv(&Identifier::universal(false, tags::NULL), &[]);
    }

    /// Encode an OBJECT IDENTIFIER
    pub fn encode_object_identifier(&mut self, oid: &ObjectIdentifier) {
        self.encode_tlv(
            &Identifier::universal(false, tags::OBJECT_IDENTIFIER),
            &encode_oid_content(oid),
        );
    }

    /// Encode a REAL
    pub fn encode_real(&mut self, value: f64) {
        self.encode_tlv(&Identifier::universal(false, tags::REAL), &encode_real(value));
    }

    /// Encode a SEQUENCE around already encoded elements
    pub fn encode_sequence(&mut self, elements: &[u8]) {
        self.encode_tlv(&Identifier::universal(true, tags::SEQUENCE), elements);
    }

    /// Encode a context-specific TLV around already encoded content
    ///
    /// # Arguments
    /// * `tag_number` - Context-specific tag number
    /// * `value` - Content octets; for a constructed tag, the encoded inner
    ///   elements
    /// * `constructed` - Whether to set the constructed bit
    pub fn encode_context_specific(&mut self, tag_number: u32, value: &[u8], constructed: bool) {
        self.encode_tlv(&Identifier::context_specific(constructed, tag_number), value);
    }

    /// Encode an element tree
    ///
    /// # Arguments
    /// * `element` - Root of the tree to encode
    ///
    /// # Encoding Process
    /// - Primitive: content comes from the element's value
    /// - Constructed, definite: children are encoded into a scratch encoder
    ///   first so the length is known
    /// - Constructed, indefinite: `0x80` length, children, then `00 00`
    pub fn encode_element(&mut self, element: &Element) {
        let identifier = element.identifier();

        let Ok(children) = element.children() else {
            self.encode_tlv(&identifier, &primitive_content(element.value()));
            return;
        };

        match element.length_form() {
            LengthForm::Indefinite => {
                self.begin_indefinite(&identifier);
                for child in children {
                    self.encode_element(child);
                }
                self.end_indefinite();
            }
            LengthForm::Definite => {
                let mut content = BerEncoder::new();
                for child in children {
                    content.encode_element(child);
                }
                self.encode_tlv(&identifier, content.as_bytes());
            }
        }
    }

    /// Get the encoded bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer.to_vec()
    }

    /// Freeze the encoded bytes into a shareable buffer
    pub fn freeze(self) -> Bytes {
        self.buffer.freeze()
    }

    /// Get a reference to the encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Number of encoded bytes
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if nothing has been encoded
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the encoder buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for BerEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// BOOLEAN content octets
pub fn encode_boolean_content(value: bool) -> [u8; 1] {
    [if value { BOOLEAN_TRUE } else { BOOLEAN_FALSE }]
}

/// OBJECT IDENTIFIER content octets
///
/// The first two arcs are folded into `40 * arc1 + arc2`; that and every
/// later arc is written as a base-128 chain.
pub fn encode_oid_content(oid: &ObjectIdentifier) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(oid.len() + 2);
    encode_base128(oid.first_subidentifier(), &mut bytes);
    for &arc in &oid.arcs()[2..] {
        encode_base128(arc, &mut bytes);
    }
    bytes
}

/// Content octets for a primitive value
pub fn primitive_content(value: &Value) -> Vec<u8> {
    match value {
        Value::None => Vec::new(),
        Value::Boolean(v) => encode_boolean_content(*v).to_vec(),
        Value::Integer(v) => encode_signed(*v),
        Value::Bytes(v) => v.clone(),
        Value::Float(v) => encode_real(*v),
        Value::Oid(v) => encode_oid_content(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn integer_bytes(value: i64) -> Vec<u8> {
        let mut encoder = BerEncoder::new();
        encoder.encode_integer(value);
        encoder.into_bytes()
    }

    #[test]
    fn test_encode_integer_binary() {
        assert_eq!(integer_bytes(0), vec![0x02, 0x01, 0x00]);
        assert_eq!(integer_bytes(127), vec![0x02, 0x01, 0x7F]);
        assert_eq!(integer_bytes(128), vec![0x02, 0x02, 0x00, 0x80]);
        assert_eq!(integer_bytes(256), vec![0x02, 0x02, 0x01, 0x00]);
        assert_eq!(integer_bytes(-128), vec![0x02, 0x01, 0x80]);
        assert_eq!(integer_bytes(-129), vec![0x02, 0x02, 0xFF, 0x7F]);
        assert_eq!(
            integer_bytes(i64::MAX),
            vec![0x02, 0x08, 0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
        assert_eq!(
            integer_bytes(i64::MIN),
            vec![0x02, 0x08, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_encode_octet_string_binary() {
        let mut encoder = BerEncoder::new();
        encoder.encode_octet_string(&[0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF]);
        assert_eq!(
            encoder.as_bytes(),
            &[0x04, 0x08, 0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF]
        );
    }

    #[test]
    fn test_encode_boolean() {
        let mut encoder = BerEncoder::new();
        encoder.encode_boolean(true);
        encoder.encode_boolean(false);
        assert_eq!(encoder.as_bytes(), &[0x01, 0x01, 0xFF, 0x01, 0x01, 0x00]);
    }

    #[test]
    fn test_encode_object_identifier() {
        let mut encoder = BerEncoder::new();
        let oid = ObjectIdentifier::new(vec![1, 2, 840, 113549]).unwrap();
        encoder.encode_object_identifier(&oid);
        assert_eq!(
            encoder.as_bytes(),
            &[0x06, 0x06, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D]
        );
    }

    #[test]
    fn test_encode_oid_large_second_arc() {
        let oid = ObjectIdentifier::new(vec![2, 981]).unwrap();
        // 40 * 2 + 981 = 1061 = 0b1000_0100101
        assert_eq!(encode_oid_content(&oid), vec![0x88, 0x25]);
    }

    #[test]
    fn test_encode_sequence() {
        let mut element_encoder = BerEncoder::new();
        element_encoder.encode_integer(123);
        let mut encoder = BerEncoder::new();
        encoder.encode_sequence(element_encoder.as_bytes());
        assert_eq!(encoder.as_bytes(), &[0x30, 0x03, 0x02, 0x01, 0x7B]);
    }

    #[test]
    fn test_encode_long_content() {
        let mut encoder = BerEncoder::new();
        encoder.encode_octet_string(&[0xAA; 200]);
        let bytes = encoder.freeze();
        assert_eq!(&bytes[..3], &[0x04, 0x81, 0xC8]);
        assert_eq!(bytes.len(), 203);
    }

    #[test]
    fn test_encode_real_tlv() {
        let mut encoder = BerEncoder::new();
        encoder.encode_real(f64::NEG_INFINITY);
        assert_eq!(encoder.as_bytes(), &[0x09, 0x01, 0x41]);
    }

    #[test]
    fn test_encode_context_specific_reuse() {
        let mut encoder = BerEncoder::with_capacity(16);
        assert!(encoder.is_empty());

        encoder.encode_context_specific(1, &[0x02, 0x01, 0x05], true);
        assert_eq!(encoder.as_bytes(), &[0xA1, 0x03, 0x02, 0x01, 0x05]);
        assert_eq!(encoder.len(), 5);

        encoder.clear();
        assert!(encoder.is_empty());
        encoder.encode_context_specific(0, &[0x7F], false);
        encoder.encode_context_specific(31, &[], false);
        assert_eq!(encoder.into_bytes(), vec![0x80, 0x01, 0x7F, 0x9F, 0x1F, 0x00]);
    }
}
