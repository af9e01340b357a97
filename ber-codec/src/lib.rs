//! BER (X.690) tag-length-value codec
//!
//! This crate provides the element tree, the BER encoder and decoder, the
//! binary REAL codec, and a blocking reader that pulls whole elements from
//! any byte stream.

pub mod ber;
pub mod config;
pub mod element;
pub mod reader;

pub use ber::{BerDecoder, BerEncoder, Identifier, Length, LengthForm, TagClass};
pub use ber_core::{BerError, BerResult, ObjectIdentifier, Value, ValueKind};
pub use config::DecoderConfig;
pub use element::Element;
pub use reader::ElementReader;
