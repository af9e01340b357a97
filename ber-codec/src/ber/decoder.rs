//! BER decoder
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use ber_codec::ber::BerDecoder;
//!
//! let data = [0x02, 0x02, 0x30, 0x39, 0x09, 0x03, 0x80, 0x00, 0x03];
//! let mut decoder = BerDecoder::new(&data);
//! let integer = decoder.decode_integer()?;
//! let real = decoder.decode_real()?;
//! # Ok::<(), ber_core::BerError>(())
//! ```

use crate::ber::integer::read_integer;
use crate::ber::real::decode_real;
use crate::ber::tags;
use crate::ber::types::{Identifier, TagClass};
use crate::config::DecoderConfig;
use crate::element::Element;
use crate::reader::ElementReader;
use ber_core::constants::BITS_PER_ENCODED_BYTE;
use ber_core::{BerError, BerResult, ObjectIdentifier, Value, ValueKind};

/// BER decoder over a byte slice
///
/// Decodes whole elements one after another and keeps track of the position
/// in the buffer, so several values can be taken from the same buffer.
pub struct BerDecoder<'a> {
    buffer: &'a [u8],
    reader: ElementReader<&'a [u8]>,
}

impl<'a> BerDecoder<'a> {
    /// Create a new BER decoder
    pub fn new(buffer: &'a [u8]) -> Self {
        Self::with_config(buffer, DecoderConfig::default())
    }

    /// Create a new BER decoder with explicit limits
    ///
    /// # Arguments
    /// * `buffer` - Encoded elements, back to back
    /// * `config` - Nesting depth and content length limits
    pub fn with_config(buffer: &'a [u8], config: DecoderConfig) -> Self {
        Self {
            buffer,
            reader: ElementReader::with_config(buffer, config),
        }
    }

    /// Get current position in buffer
    pub fn position(&self) -> usize {
        self.buffer.len() - self.reader.get_ref().len()
    }

    /// Get remaining bytes
    pub fn remaining(&self) -> usize {
        self.reader.get_ref().len()
    }

    /// Check if there is more data to decode
    pub fn has_remaining(&self) -> bool {
        !self.reader.get_ref().is_empty()
    }

    /// Decode the next element
    ///
    /// # Returns
    /// The element tree, with its raw bytes cached. The position advances
    /// past the element.
    ///
    /// # Error Handling
    /// - `EndOfInput` when the buffer is exhausted
    /// - `UnexpectedEof` when the element is cut short
    /// - `InvalidData` for malformed headers or content, or exceeded limits
    pub fn decode_element(&mut self) -> BerResult<Element> {
        self.reader.read_element()
    }

    /// Skip the next element, returning the number of bytes skipped
    pub fn skip_element(&mut self) -> BerResult<usize> {
        let start = self.position();
        self.decode_element()?;
        Ok(self.position() - start)
    }

    fn decode_universal(&mut self, number: u32) -> BerResult<Element> {
        let element = self.decode_element()?;
        if element.class() != TagClass::Universal || element.is_constructed() || element.tag() != number {
            return Err(BerError::InvalidData(format!(
                "Expected {} tag, got {:?}",
                tags::universal_tag_name(number).unwrap_or("universal"),
                element.identifier()
            )));
        }
        Ok(element)
    }

    /// Decode a BOOLEAN
    pub fn decode_boolean(&mut self) -> BerResult<bool> {
        self.decode_universal(tags::BOOLEAN)?.as_bool()
    }

    /// Decode an INTEGER
    ///
    /// # Error Handling
    /// Returns `InvalidData` when the next element is not a primitive
    /// universal INTEGER, or its content is empty or longer than 8 octets.
    pub fn decode_integer(&mut self) -> BerResult<i64> {
        self.decode_universal(tags::INTEGER)?.as_integer()
    }

    /// Decode an OCTET STRING
    pub fn decode_octet_string(&mut self) -> BerResult<Vec<u8>> {
        Ok(self.decode_universal(tags::OCTET_STRING)?.as_bytes()?.to_vec())
    }

    /// Decode an OBJECT IDENTIFIER
    pub fn decode_object_identifier(&mut self) -> BerResult<ObjectIdentifier> {
        Ok(self.decode_universal(tags::OBJECT_IDENTIFIER)?.as_oid()?.clone())
    }

    /// Decode a REAL
    ///
    /// # Returns
    /// The value, with `0x43` and empty content both giving `+0.0` and the
    /// special octets `0x40`, `0x41`, `0x42` giving infinities and NaN.
    pub fn decode_real(&mut self) -> BerResult<f64> {
        self.decode_universal(tags::REAL)?.as_float()
    }
}

/// Interpret primitive content octets according to the identifier
///
/// # Arguments
/// * `identifier` - Identifier of the primitive element
/// * `content` - Content octets, exactly as long as the header declared
///
/// # Returns
/// The value kind given by [`tags::universal_value_kind`] for universal
/// tags. Non-universal classes always keep their content as opaque bytes.
///
/// # Error Handling
/// Returns `InvalidData` when the content does not fit the tag: NULL or
/// end-of-contents with content octets, a BOOLEAN that is not one octet, an
/// empty or oversized INTEGER, a malformed REAL or OID.
pub fn decode_primitive_value(identifier: &Identifier, content: &[u8]) -> BerResult<Value> {
    if identifier.class() != TagClass::Universal {
        return Ok(Value::Bytes(content.to_vec()));
    }

    let value = match tags::universal_value_kind(identifier.number()) {
        ValueKind::None => {
            if !content.is_empty() {
                return Err(BerError::InvalidData(format!(
                    "{} with {} content bytes (expected 0)",
                    tags::universal_tag_name(identifier.number()).unwrap_or("NULL"),
                    content.len()
                )));
            }
            Value::None
        }
        ValueKind::Boolean => Value::Boolean(decode_boolean_content(content)?),
        ValueKind::Integer => Value::Integer(decode_integer_content(content)?),
        ValueKind::Float => Value::Float(decode_real(content)?),
        ValueKind::Oid => Value::Oid(decode_oid_content(content)?),
        ValueKind::Bytes => Value::Bytes(content.to_vec()),
    };
    Ok(value)
}

/// BOOLEAN content: one octet, nonzero is true
pub fn decode_boolean_content(content: &[u8]) -> BerResult<bool> {
    match content {
        [octet] => Ok(*octet != 0),
        _ => Err(BerError::InvalidData(format!(
            "Invalid boolean length: {} bytes (expected 1)",
            content.len()
        ))),
    }
}

/// INTEGER content: big-endian two's complement, 1 to 8 octets
pub fn decode_integer_content(content: &[u8]) -> BerResult<i64> {
    if content.is_empty() {
        return Err(BerError::InvalidData("Empty integer encoding".to_string()));
    }
    read_integer(content, true)
}

/// OBJECT IDENTIFIER content: a chain of base-128 subidentifiers
pub fn decode_oid_content(content: &[u8]) -> BerResult<ObjectIdentifier> {
    if content.is_empty() {
        return Err(BerError::InvalidData("Empty object identifier encoding".to_string()));
    }

    let mut subidentifiers = Vec::new();
    let mut component = 0u64;
    let mut has_more = false;

    for &byte in content {
        if component > (u64::MAX >> BITS_PER_ENCODED_BYTE) {
            return Err(BerError::InvalidData("OID component overflow".to_string()));
        }
        component = (component << BITS_PER_ENCODED_BYTE) | (byte & 0x7F) as u64;
        has_more = byte & 0x80 != 0;
        if !has_more {
            subidentifiers.push(component);
            component = 0;
        }
    }

    if has_more {
        return Err(BerError::InvalidData(
            "Object identifier ends inside a subidentifier".to_string(),
        ));
    }

    ObjectIdentifier::from_subidentifiers(&subidentifiers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ber::encoder::{encode_oid_content, BerEncoder};

    #[test]
    fn test_decode_integer() {
        let mut encoder = BerEncoder::new();
        encoder.encode_integer(12345);
        let encoded = encoder.into_bytes();

        let mut decoder = BerDecoder::new(&encoded);
        assert_eq!(decoder.decode_integer().unwrap(), 12345);
        assert!(!decoder.has_remaining());
    }

    #[test]
    fn test_decode_integer_boundaries() {
        let values = [0, 1, -1, 127, -127, 128, -128, 129, -129, 256, -256, i64::MAX, i64::MIN];
        for value in values {
            let mut encoder = BerEncoder::new();
            encoder.encode_integer(value);
            let encoded = encoder.into_bytes();
            assert_eq!(BerDecoder::new(&encoded).decode_integer().unwrap(), value);
        }
    }

    #[test]
    fn test_decode_octet_string() {
        let mut encoder = BerEncoder::new();
        encoder.encode_octet_string(b"Hello");
        let encoded = encoder.into_bytes();

        let mut decoder = BerDecoder::new(&encoded);
        assert_eq!(decoder.decode_octet_string().unwrap(), b"Hello");
    }

    #[test]
    fn test_encode_decode_oid() {
        let cases = ["0.1", "2.981", "2.3", "0.4", "0.4.5.1888", "0.10.5.1888.234.324234"];
        for text in cases {
            let oid: ObjectIdentifier = text.parse().unwrap();
            let parsed = decode_oid_content(&encode_oid_content(&oid)).unwrap();
            assert_eq!(parsed.to_string(), text);
        }
    }

    #[test]
    fn test_decode_object_identifier() {
        let mut encoder = BerEncoder::new();
        encoder.encode_object_identifier(&ObjectIdentifier::new(vec![1, 2, 840, 113549]).unwrap());
        let encoded = encoder.into_bytes();

        let mut decoder = BerDecoder::new(&encoded);
        assert_eq!(decoder.decode_object_identifier().unwrap().arcs(), &[1, 2, 840, 113549]);
    }

    #[test]
    fn test_decode_oid_rejects_malformed() {
        assert!(decode_oid_content(&[]).is_err());
        assert!(decode_oid_content(&[0x2A, 0x86]).is_err());
        let overflow = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F];
        assert!(decode_oid_content(&overflow).is_err());
    }

    #[test]
    fn test_decode_boolean() {
        let mut decoder = BerDecoder::new(&[0x01, 0x01, 0x01, 0x01, 0x01, 0x00]);
        assert!(decoder.decode_boolean().unwrap());
        assert!(!decoder.decode_boolean().unwrap());
        assert!(BerDecoder::new(&[0x01, 0x02, 0xFF, 0xFF]).decode_boolean().is_err());
    }

    #[test]
    fn test_decode_zero_length_integer() {
        assert!(matches!(
            BerDecoder::new(&[0x02, 0x00]).decode_integer(),
            Err(BerError::InvalidData(_))
        ));
    }

    #[test]
    fn test_decode_real() {
        let mut decoder = BerDecoder::new(&[0x09, 0x03, 0x80, 0x00, 0x03, 0x09, 0x01, 0x42]);
        assert_eq!(decoder.decode_real().unwrap(), 1.5);
        assert!(decoder.decode_real().unwrap().is_nan());
    }

    #[test]
    fn test_null_with_content_is_rejected() {
        let null = Identifier::universal(false, tags::NULL);
        assert!(matches!(
            decode_primitive_value(&null, &[0x05]),
            Err(BerError::InvalidData(_))
        ));
        assert_eq!(decode_primitive_value(&null, &[]).unwrap(), Value::None);

        let eoc = Identifier::universal(false, tags::EOC);
        assert!(matches!(
            decode_primitive_value(&eoc, &[0x01, 0x07]),
            Err(BerError::InvalidData(_))
        ));

        assert!(matches!(
            BerDecoder::new(&[0x05, 0x01, 0x05]).decode_element(),
            Err(BerError::InvalidData(_))
        ));
    }

    #[test]
    fn test_non_universal_content_is_opaque() {
        let tagged = Identifier::context_specific(false, tags::NULL);
        assert_eq!(
            decode_primitive_value(&tagged, &[0x05]).unwrap(),
            Value::Bytes(vec![0x05])
        );
    }

    #[test]
    fn test_decode_wrong_tag() {
        let mut decoder = BerDecoder::new(&[0x04, 0x01, 0x00]);
        assert!(matches!(decoder.decode_integer(), Err(BerError::InvalidData(_))));
    }

    #[test]
    fn test_position_tracking() {
        let data = [0x05, 0x00, 0x02, 0x01, 0x07];
        let mut decoder = BerDecoder::new(&data);
        assert_eq!(decoder.skip_element().unwrap(), 2);
        assert_eq!(decoder.position(), 2);
        assert_eq!(decoder.remaining(), 3);
        assert_eq!(decoder.decode_integer().unwrap(), 7);
        assert!(decoder.decode_element().unwrap_err().is_end_of_input());
    }
}
