//! Value carried by a primitive element

use crate::error::{BerError, BerResult};
use crate::oid::ObjectIdentifier;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed content of a primitive element
///
/// Byte strings double as text: there is no separate string variant, and
/// [`Value::as_str`] is a UTF-8 view over the same bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// No value (NULL, end-of-contents, or a constructed element)
    None,
    /// Boolean value
    Boolean(bool),
    /// Signed 64-bit integer (INTEGER, ENUMERATED)
    Integer(i64),
    /// Raw bytes (OCTET STRING, character strings, unrecognized tags)
    Bytes(#[serde(with = "serde_bytes")] Vec<u8>),
    /// Double precision float (REAL)
    Float(f64),
    /// Object identifier
    Oid(ObjectIdentifier),
}

/// Kind of a [`Value`], used in accessor error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    None,
    Boolean,
    Integer,
    Bytes,
    Float,
    Oid,
}

impl ValueKind {
    /// Human readable name
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::None => "none",
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Bytes => "bytes",
            ValueKind::Float => "float",
            ValueKind::Oid => "object identifier",
        }
    }
}

impl Value {
    /// Kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::None => ValueKind::None,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Integer(_) => ValueKind::Integer,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Float(_) => ValueKind::Float,
            Value::Oid(_) => ValueKind::Oid,
        }
    }

    /// Check if no value is set
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    fn mismatch(&self, expected: ValueKind) -> BerError {
        BerError::TypeMismatch {
            expected: expected.name(),
            found: self.kind().name(),
        }
    }

    /// Get the boolean value
    pub fn as_bool(&self) -> BerResult<bool> {
        match self {
            Value::Boolean(v) => Ok(*v),
            _ => Err(self.mismatch(ValueKind::Boolean)),
        }
    }

    /// Get the integer value
    pub fn as_integer(&self) -> BerResult<i64> {
        match self {
            Value::Integer(v) => Ok(*v),
            _ => Err(self.mismatch(ValueKind::Integer)),
        }
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> BerResult<&[u8]> {
        match self {
            Value::Bytes(v) => Ok(v),
            _ => Err(self.mismatch(ValueKind::Bytes)),
        }
    }

    /// Get the bytes as UTF-8 text
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` for non-byte values and `InvalidData` if the
    /// bytes are not valid UTF-8.
    pub fn as_str(&self) -> BerResult<&str> {
        let bytes = self.as_bytes()?;
        std::str::from_utf8(bytes)
            .map_err(|e| BerError::InvalidData(format!("String value is not UTF-8: {}", e)))
    }

    /// Get the float value
    pub fn as_float(&self) -> BerResult<f64> {
        match self {
            Value::Float(v) => Ok(*v),
            _ => Err(self.mismatch(ValueKind::Float)),
        }
    }

    /// Get the object identifier
    pub fn as_oid(&self) -> BerResult<&ObjectIdentifier> {
        match self {
            Value::Oid(v) => Ok(v),
            _ => Err(self.mismatch(ValueKind::Oid)),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Bytes(v.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Bytes(v.into_bytes())
    }
}

impl From<ObjectIdentifier> for Value {
    fn from(v: ObjectIdentifier) -> Self {
        Value::Oid(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "NONE"),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Oid(v) => write!(f, "{}", v),
            Value::Bytes(v) => match std::str::from_utf8(v) {
                Ok(s) => write!(f, "{:?}", s),
                Err(_) => {
                    for byte in v {
                        write!(f, "{:02X}", byte)?;
                    }
                    Ok(())
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessor_mismatch() {
        let value = Value::Integer(5);
        assert_eq!(value.as_integer().unwrap(), 5);
        match value.as_bool() {
            Err(BerError::TypeMismatch { expected, found }) => {
                assert_eq!(expected, "boolean");
                assert_eq!(found, "integer");
            }
            other => panic!("expected type mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_bytes_as_text() {
        let value = Value::from("Terra Incognita");
        assert_eq!(value.as_str().unwrap(), "Terra Incognita");

        let value = Value::Bytes(vec![0xFF, 0xFE]);
        assert!(matches!(value.as_str(), Err(BerError::InvalidData(_))));
        assert_eq!(value.to_string(), "FFFE");
    }
}
