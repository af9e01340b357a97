//! Element tree model
//!
//! An [`Element`] is one TLV unit. Primitive elements carry a typed
//! [`Value`]; constructed elements own an ordered list of child elements.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use ber_codec::Element;
//!
//! let mut sequence = Element::sequence("a sequence");
//! sequence.append_child(Element::integer(42, "answer"))?;
//! sequence.append_child(Element::string("Terra Incognita", "name"))?;
//! let bytes = sequence.encode();
//! # Ok::<(), ber_core::BerError>(())
//! ```

use crate::ber::decoder::decode_primitive_value;
use crate::ber::encoder::{primitive_content, BerEncoder};
use crate::ber::tags;
use crate::ber::types::{Identifier, LengthForm, TagClass};
use ber_core::{BerError, BerResult, ObjectIdentifier, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One node of a BER tree
///
/// Invariants:
/// - a constructed element has no value (`Value::None`)
/// - a primitive element has no children
///
/// Equality compares class, constructed flag, tag, value and children. The
/// label, the raw-bytes cache and the length form do not take part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    class: TagClass,
    constructed: bool,
    tag: u32,
    value: Value,
    children: Vec<Element>,
    length_form: LengthForm,
    #[serde(default, with = "serde_bytes", skip_serializing_if = "Option::is_none")]
    raw_bytes: Option<Vec<u8>>,
    label: String,
}

impl Element {
    /// Create an element from a value and its metadata
    ///
    /// # Arguments
    /// * `class` - Tag class
    /// * `constructed` - Whether the element holds children instead of a value
    /// * `tag` - Tag number
    /// * `value` - Primitive value (`Value::None` for constructed elements)
    /// * `label` - Free-form name used by the tree dump
    ///
    /// # Errors
    ///
    /// Returns `InvalidData` if `constructed` is set and `value` is not
    /// `Value::None`, and `TypeMismatch` if a universal primitive tag is given
    /// a value of another kind than [`tags::universal_value_kind`] (for
    /// example an INTEGER holding a boolean). Such pairs would encode to
    /// octets that decode to something else or not at all.
    pub fn new(
        class: TagClass,
        constructed: bool,
        tag: u32,
        value: Value,
        label: impl Into<String>,
    ) -> BerResult<Self> {
        check_value(class, constructed, tag, &value)?;

        Ok(Self {
            class,
            constructed,
            tag,
            value,
            children: Vec::new(),
            length_form: LengthForm::Definite,
            raw_bytes: None,
            label: label.into(),
        })
    }

    /// Create a primitive element
    ///
    /// # Errors
    ///
    /// Same value checks as [`Element::new`].
    pub fn primitive(
        class: TagClass,
        tag: u32,
        value: impl Into<Value>,
        label: impl Into<String>,
    ) -> BerResult<Self> {
        Self::new(class, false, tag, value.into(), label)
    }

    /// Primitive element whose value is known to match its tag
    fn typed(class: TagClass, tag: u32, value: Value, label: impl Into<String>) -> Self {
        debug_assert!(check_value(class, false, tag, &value).is_ok());
        Self {
            class,
            constructed: false,
            tag,
            value,
            children: Vec::new(),
            length_form: LengthForm::Definite,
            raw_bytes: None,
            label: label.into(),
        }
    }

    /// Create a constructed element with no children
    pub fn constructed(class: TagClass, tag: u32, label: impl Into<String>) -> Self {
        Self {
            class,
            constructed: true,
            tag,
            value: Value::None,
            children: Vec::new(),
            length_form: LengthForm::Definite,
            raw_bytes: None,
            label: label.into(),
        }
    }

    /// Universal BOOLEAN
    pub fn boolean(value: bool, label: impl Into<String>) -> Self {
        Self::typed(TagClass::Universal, tags::BOOLEAN, Value::Boolean(value), label)
    }

    /// Universal INTEGER
    pub fn integer(value: i64, label: impl Into<String>) -> Self {
        Self::typed(TagClass::Universal, tags::INTEGER, Value::Integer(value), label)
    }

    /// Universal ENUMERATED
    pub fn enumerated(value: i64, label: impl Into<String>) -> Self {
        Self::typed(TagClass::Universal, tags::ENUMERATED, Value::Integer(value), label)
    }

    /// Universal OCTET STRING from raw bytes
    pub fn octet_string(value: impl Into<Vec<u8>>, label: impl Into<String>) -> Self {
        Self::typed(TagClass::Universal, tags::OCTET_STRING, Value::Bytes(value.into()), label)
    }

    /// Universal OCTET STRING from text
    pub fn string(value: &str, label: impl Into<String>) -> Self {
        Self::typed(TagClass::Universal, tags::OCTET_STRING, Value::from(value), label)
    }

    /// Universal REAL
    pub fn real(value: f64, label: impl Into<String>) -> Self {
        Self::typed(TagClass::Universal, tags::REAL, Value::Float(value), label)
    }

    /// Universal NULL
    pub fn null(label: impl Into<String>) -> Self {
        Self::typed(TagClass::Universal, tags::NULL, Value::None, label)
    }

    /// Universal OBJECT IDENTIFIER
    pub fn oid(value: ObjectIdentifier, label: impl Into<String>) -> Self {
        Self::typed(TagClass::Universal, tags::OBJECT_IDENTIFIER, Value::Oid(value), label)
    }

    /// Universal SEQUENCE with no children
    pub fn sequence(label: impl Into<String>) -> Self {
        Self::constructed(TagClass::Universal, tags::SEQUENCE, label)
    }

    /// Universal SET with no children
    pub fn set(label: impl Into<String>) -> Self {
        Self::constructed(TagClass::Universal, tags::SET, label)
    }

    /// Build a primitive element from decoded content octets
    ///
    /// The value is interpreted from the tag; see
    /// [`decode_primitive_value`].
    pub fn from_primitive_content(identifier: Identifier, content: &[u8]) -> BerResult<Self> {
        let value = decode_primitive_value(&identifier, content)?;
        Ok(Self::typed(identifier.class(), identifier.number(), value, ""))
    }

    /// Build a constructed element from decoded children
    pub fn from_children(identifier: Identifier, length_form: LengthForm, children: Vec<Element>) -> Self {
        let mut element = Self::constructed(identifier.class(), identifier.number(), "");
        element.length_form = length_form;
        element.children = children;
        element
    }

    /// Use indefinite or definite framing when this element is encoded
    ///
    /// Only constructed elements can use indefinite length; the form is
    /// ignored for primitives.
    pub fn with_length_form(mut self, length_form: LengthForm) -> Self {
        self.length_form = length_form;
        self
    }

    /// Get tag class
    pub fn class(&self) -> TagClass {
        self.class
    }

    /// Check if the element is constructed
    pub fn is_constructed(&self) -> bool {
        self.constructed
    }

    /// Get tag number
    pub fn tag(&self) -> u32 {
        self.tag
    }

    /// Identifier octets of this element
    pub fn identifier(&self) -> Identifier {
        Identifier::new(self.class, self.constructed, self.tag)
    }

    /// Get the value (always `Value::None` for constructed elements)
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Get the framing used when encoding
    pub fn length_form(&self) -> LengthForm {
        if self.constructed {
            self.length_form
        } else {
            LengthForm::Definite
        }
    }

    /// Get the label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Set the label
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Bytes this element was last decoded from or encoded to
    pub fn raw_bytes(&self) -> Option<&[u8]> {
        self.raw_bytes.as_deref()
    }

    /// Replace the raw-bytes cache
    pub fn set_raw_bytes(&mut self, raw_bytes: Vec<u8>) {
        self.raw_bytes = Some(raw_bytes);
    }

    /// Append a child to a constructed element
    ///
    /// # Errors
    ///
    /// Returns `NotConstructed` if this element is primitive.
    pub fn append_child(&mut self, child: Element) -> BerResult<()> {
        if !self.constructed {
            return Err(BerError::NotConstructed);
        }
        self.children.push(child);
        Ok(())
    }

    /// Children of a constructed element
    ///
    /// # Errors
    ///
    /// Returns `NotConstructed` if this element is primitive.
    pub fn children(&self) -> BerResult<&[Element]> {
        if !self.constructed {
            return Err(BerError::NotConstructed);
        }
        Ok(&self.children)
    }

    /// Get the boolean value
    pub fn as_bool(&self) -> BerResult<bool> {
        self.value.as_bool()
    }

    /// Get the integer value
    pub fn as_integer(&self) -> BerResult<i64> {
        self.value.as_integer()
    }

    /// Get the raw byte value
    pub fn as_bytes(&self) -> BerResult<&[u8]> {
        self.value.as_bytes()
    }

    /// Get the byte value as UTF-8 text
    pub fn as_str(&self) -> BerResult<&str> {
        self.value.as_str()
    }

    /// Get the float value
    pub fn as_float(&self) -> BerResult<f64> {
        self.value.as_float()
    }

    /// Get the object identifier value
    pub fn as_oid(&self) -> BerResult<&ObjectIdentifier> {
        self.value.as_oid()
    }

    /// Serialize this element and its children
    pub fn encode(&self) -> Vec<u8> {
        let mut encoder = BerEncoder::new();
        encoder.encode_element(self);
        encoder.into_bytes()
    }

    /// Serialize and keep the result in the raw-bytes cache
    pub fn encode_and_cache(&mut self) -> &[u8] {
        let bytes = self.encode();
        self.raw_bytes.insert(bytes)
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let tag_name = match self.class {
            TagClass::Universal => tags::universal_tag_name(self.tag)
                .map(str::to_string)
                .unwrap_or_else(|| self.tag.to_string()),
            _ => self.tag.to_string(),
        };
        let kind = if self.constructed { "Constructed" } else { "Primitive" };

        write!(
            f,
            "{:indent$}{}({}, {}, {})",
            "",
            self.label,
            self.class.name(),
            kind,
            tag_name,
            indent = depth * 2
        )?;

        if self.constructed {
            writeln!(f, " Children={}", self.children.len())?;
            for child in &self.children {
                child.fmt_tree(f, depth + 1)?;
            }
            Ok(())
        } else {
            writeln!(f, " Len={} {}", primitive_content(&self.value).len(), self.value)
        }
    }
}

/// Reject value and identifier pairs that cannot survive an encode/decode
fn check_value(class: TagClass, constructed: bool, tag: u32, value: &Value) -> BerResult<()> {
    if constructed {
        if !value.is_none() {
            return Err(BerError::InvalidData(format!(
                "Constructed element cannot carry a {} value",
                value.kind().name()
            )));
        }
        return Ok(());
    }

    // Non-universal tags are application defined and may hold any value.
    if class == TagClass::Universal {
        let expected = tags::universal_value_kind(tag);
        if value.kind() != expected {
            return Err(BerError::TypeMismatch {
                expected: expected.name(),
                found: value.kind().name(),
            });
        }
    }
    Ok(())
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class
            && self.constructed == other.constructed
            && self.tag == other.tag
            && self.value == other.value
            && self.children == other.children
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BerDecoder;

    #[test]
    fn test_boolean_round_trip() {
        let element = Element::boolean(true, "first Packet, True");
        assert!(element.as_bool().unwrap());

        let decoded = BerDecoder::new(&element.encode()).decode_element().unwrap();
        assert!(decoded.as_bool().unwrap());
    }

    #[test]
    fn test_integer_round_trip() {
        let element = Element::integer(10, "Integer, 10");
        let decoded = BerDecoder::new(&element.encode()).decode_element().unwrap();
        assert_eq!(decoded.as_integer().unwrap(), 10);
    }

    #[test]
    fn test_string_round_trip() {
        let element = Element::string("Hic sunt dracones", "String");
        let decoded = BerDecoder::new(&element.encode()).decode_element().unwrap();
        assert_eq!(decoded.as_str().unwrap(), "Hic sunt dracones");
    }

    #[test]
    fn test_sequence_and_append_child() {
        let values = ["HIC SVNT LEONES", "Iñtërnâtiônàlizætiøn", "Terra Incognita"];

        let mut sequence = Element::sequence("a sequence");
        for value in values {
            sequence.append_child(Element::string(value, "String")).unwrap();
        }
        assert_eq!(sequence.children().unwrap().len(), values.len());

        let decoded = BerDecoder::new(&sequence.encode()).decode_element().unwrap();
        assert!(decoded.is_constructed());
        let children = decoded.children().unwrap();
        assert_eq!(children.len(), values.len());
        for (child, value) in children.iter().zip(values) {
            assert_eq!(child.as_str().unwrap(), value);
        }
        assert_eq!(decoded, sequence);
    }

    #[test]
    fn test_append_child_to_primitive() {
        let mut element = Element::integer(1, "");
        assert!(matches!(
            element.append_child(Element::null("")),
            Err(BerError::NotConstructed)
        ));
        assert!(matches!(element.children(), Err(BerError::NotConstructed)));
    }

    #[test]
    fn test_new_rejects_constructed_value() {
        assert!(Element::new(TagClass::Universal, true, 16, Value::Integer(1), "").is_err());
        let element = Element::new(TagClass::Application, false, 3, Value::Integer(1), "").unwrap();
        assert_eq!(element.encode(), vec![0x43, 0x01, 0x01]);
    }

    #[test]
    fn test_value_must_match_universal_tag() {
        let cases: [(u32, Value); 8] = [
            (tags::INTEGER, Value::None),
            (tags::BOOLEAN, Value::Integer(300)),
            (tags::ENUMERATED, Value::Boolean(true)),
            (tags::REAL, Value::Integer(1)),
            (tags::OBJECT_IDENTIFIER, Value::Bytes(vec![0x2A])),
            (tags::NULL, Value::Integer(5)),
            (tags::EOC, Value::Bytes(vec![0x00])),
            (tags::OCTET_STRING, Value::Float(0.5)),
        ];
        for (tag, value) in cases {
            let result = Element::new(TagClass::Universal, false, tag, value.clone(), "");
            assert!(
                matches!(result, Err(BerError::TypeMismatch { .. })),
                "tag {} with {:?} was accepted",
                tag,
                value
            );
            assert!(Element::primitive(TagClass::Universal, tag, value, "").is_err());
        }
    }

    #[test]
    fn test_primitive_round_trips_when_accepted() {
        let elements = [
            Element::primitive(TagClass::Universal, tags::ENUMERATED, 3i64, "").unwrap(),
            Element::primitive(TagClass::Universal, tags::UTF8_STRING, "ok", "").unwrap(),
            Element::primitive(TagClass::Universal, tags::NULL, Value::None, "").unwrap(),
            Element::primitive(TagClass::ContextSpecific, 0, Value::Bytes(vec![0x01]), "").unwrap(),
        ];
        for element in elements {
            let decoded = BerDecoder::new(&element.encode()).decode_element().unwrap();
            assert_eq!(decoded, element);
        }
    }

    #[test]
    fn test_accessor_mismatch() {
        let element = Element::real(1.5, "");
        assert_eq!(element.as_float().unwrap(), 1.5);
        assert!(matches!(element.as_integer(), Err(BerError::TypeMismatch { .. })));
        assert!(matches!(Element::sequence("").as_str(), Err(BerError::TypeMismatch { .. })));
    }

    #[test]
    fn test_indefinite_encoding() {
        let mut sequence = Element::sequence("").with_length_form(LengthForm::Indefinite);
        sequence.append_child(Element::integer(1, "")).unwrap();
        sequence.append_child(Element::integer(2, "")).unwrap();
        assert_eq!(
            sequence.encode(),
            vec![0x30, 0x80, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02, 0x00, 0x00]
        );
    }

    #[test]
    fn test_encode_and_cache() {
        let mut element = Element::null("");
        assert!(element.raw_bytes().is_none());
        assert_eq!(element.encode_and_cache(), &[0x05, 0x00]);
        assert_eq!(element.raw_bytes(), Some(&[0x05, 0x00][..]));
    }

    #[test]
    fn test_display_tree() {
        let mut sequence = Element::sequence("seq");
        sequence.append_child(Element::integer(7, "n")).unwrap();
        let dump = sequence.to_string();
        assert_eq!(
            dump,
            "seq(Universal, Constructed, Sequence and Sequence of) Children=1\n  n(Universal, Primitive, Integer) Len=1 7\n"
        );
    }
}
