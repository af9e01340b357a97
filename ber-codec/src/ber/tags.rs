//! Universal class tag numbers (X.680 §8.4)

use ber_core::ValueKind;

pub const EOC: u32 = 0;
pub const BOOLEAN: u32 = 1;
pub const INTEGER: u32 = 2;
pub const BIT_STRING: u32 = 3;
pub const OCTET_STRING: u32 = 4;
pub const NULL: u32 = 5;
pub const OBJECT_IDENTIFIER: u32 = 6;
pub const OBJECT_DESCRIPTOR: u32 = 7;
pub const EXTERNAL: u32 = 8;
pub const REAL: u32 = 9;
pub const ENUMERATED: u32 = 10;
pub const EMBEDDED_PDV: u32 = 11;
pub const UTF8_STRING: u32 = 12;
pub const RELATIVE_OID: u32 = 13;
pub const SEQUENCE: u32 = 16;
pub const SET: u32 = 17;
pub const NUMERIC_STRING: u32 = 18;
pub const PRINTABLE_STRING: u32 = 19;
pub const T61_STRING: u32 = 20;
pub const VIDEOTEX_STRING: u32 = 21;
pub const IA5_STRING: u32 = 22;
pub const UTC_TIME: u32 = 23;
pub const GENERALIZED_TIME: u32 = 24;
pub const GRAPHIC_STRING: u32 = 25;
pub const VISIBLE_STRING: u32 = 26;
pub const GENERAL_STRING: u32 = 27;
pub const UNIVERSAL_STRING: u32 = 28;
pub const CHARACTER_STRING: u32 = 29;
pub const BMP_STRING: u32 = 30;

/// Name of a universal tag, if it is one this codec knows
pub fn universal_tag_name(number: u32) -> Option<&'static str> {
    let name = match number {
        EOC => "EOC (End-of-Content)",
        BOOLEAN => "Boolean",
        INTEGER => "Integer",
        BIT_STRING => "Bit String",
        OCTET_STRING => "Octet String",
        NULL => "NULL",
        OBJECT_IDENTIFIER => "Object Identifier",
        OBJECT_DESCRIPTOR => "Object Descriptor",
        EXTERNAL => "External",
        REAL => "Real",
        ENUMERATED => "Enumerated",
        EMBEDDED_PDV => "Embedded PDV",
        UTF8_STRING => "UTF8 String",
        RELATIVE_OID => "Relative-OID",
        SEQUENCE => "Sequence and Sequence of",
        SET => "Set and Set OF",
        NUMERIC_STRING => "Numeric String",
        PRINTABLE_STRING => "Printable String",
        T61_STRING => "T61 String",
        VIDEOTEX_STRING => "Videotex String",
        IA5_STRING => "IA5 String",
        UTC_TIME => "UTC Time",
        GENERALIZED_TIME => "Generalized Time",
        GRAPHIC_STRING => "Graphic String",
        VISIBLE_STRING => "Visible String",
        GENERAL_STRING => "General String",
        UNIVERSAL_STRING => "Universal String",
        CHARACTER_STRING => "Character String",
        BMP_STRING => "BMP String",
        _ => return None,
    };
    Some(name)
}

/// Kind of value a universal primitive element with this tag carries
///
/// This is the table both sides of the codec agree on: the decoder produces
/// exactly this kind from content octets, and an element only encodes
/// losslessly when its value has this kind. Tags without a typed reading
/// carry their content as bytes.
pub fn universal_value_kind(number: u32) -> ValueKind {
    match number {
        EOC | NULL => ValueKind::None,
        BOOLEAN => ValueKind::Boolean,
        INTEGER | ENUMERATED => ValueKind::Integer,
        REAL => ValueKind::Float,
        OBJECT_IDENTIFIER => ValueKind::Oid,
        _ => ValueKind::Bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_universal_value_kind() {
        assert_eq!(universal_value_kind(NULL), ValueKind::None);
        assert_eq!(universal_value_kind(ENUMERATED), ValueKind::Integer);
        assert_eq!(universal_value_kind(OBJECT_IDENTIFIER), ValueKind::Oid);
        assert_eq!(universal_value_kind(UTF8_STRING), ValueKind::Bytes);
        assert_eq!(universal_value_kind(200), ValueKind::Bytes);
    }

    #[test]
    fn test_universal_tag_name() {
        assert_eq!(universal_tag_name(REAL), Some("Real"));
        assert_eq!(universal_tag_name(14), None);
    }
}
