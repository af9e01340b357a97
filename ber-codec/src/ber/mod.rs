//! BER (Basic Encoding Rules, X.690) encoder and decoder
//!
//! # BER Encoding Overview
//!
//! Each value is encoded as a TLV (Tag-Length-Value) triplet:
//!
//! ```text
//! [Identifier] [Length] [Content]
//! ```
//!
//! ## Identifier Encoding
//!
//! ```text
//! Bits: 8 7 6 5 4 3 2 1
//!       C C P T T T T T
//! ```
//! Where:
//! - CC = Class (00=Universal, 01=Application, 10=Context, 11=Private)
//! - P = Primitive (0) or Constructed (1)
//! - TTTTT = Tag number (0-30), or 11111 followed by base-128 tag octets
//!
//! ## Length Encoding
//!
//! - **Short form** (1 byte): lengths 0-127
//! - **Long form**: `0x80 | n` followed by `n` big-endian length octets
//! - **Indefinite form**: `0x80`, constructed only; the content ends with the
//!   two-octet end-of-contents marker `00 00`
//!
//! ## Content Encoding
//!
//! - **INTEGER / ENUMERATED**: minimal big-endian two's complement
//! - **REAL**: binary encoding, base 2, scale 0 (see [`real`])
//! - **OBJECT IDENTIFIER**: base-128 subidentifiers, first two arcs folded
//! - **Constructed types**: concatenated child TLVs

pub mod decoder;
pub mod encoder;
pub mod integer;
pub mod real;
pub mod tags;
pub mod types;

pub use decoder::{decode_primitive_value, BerDecoder};
pub use encoder::BerEncoder;
pub use real::{decode_real, encode_real};
pub use types::{Header, HeaderDecoder, Identifier, Length, LengthForm, TagClass};
