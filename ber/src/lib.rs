//! ber - Rust implementation of the BER (X.690) encoding rules
//!
//! This library encodes and decodes BER tag-length-value elements, including
//! the binary REAL encoding used by EmBER+ peers.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `ber-core`: Error handling, the value type, object identifiers and
//!   bit-layout constants
//! - `ber-codec`: Identifier and length codec, primitive and REAL codecs, the
//!   element tree and the blocking reader
//! - `ber-stream`: Async element reader and stream over tokio I/O
//!
//! # Usage
//!
//! ```no_run
//! use ber::{decode, encode, Element};
//!
//! let mut sequence = Element::sequence("reading");
//! sequence.append_child(Element::integer(7, "channel"))?;
//! sequence.append_child(Element::real(-12.5, "level"))?;
//!
//! let bytes = encode(&sequence);
//! let decoded = decode(&bytes)?;
//! println!("{}", decoded);
//! # Ok::<(), ber::BerError>(())
//! ```

use std::io::Read;

// Re-export core types
pub use ber_core::{BerError, BerResult, ObjectIdentifier, Value, ValueKind};

// Re-export codec API
pub use ber_codec::{
    BerDecoder, BerEncoder, DecoderConfig, Element, ElementReader, Identifier, Length, LengthForm, TagClass,
};
pub use ber_codec::ber::tags;

// Re-export async stream API
pub mod stream {
    pub use ber_stream::*;
}

/// Serialize an element tree
pub fn encode(element: &Element) -> Vec<u8> {
    element.encode()
}

/// Decode a buffer holding exactly one element
///
/// # Errors
///
/// Returns `EndOfInput` for an empty buffer, `UnexpectedEof` for a truncated
/// element, and `InvalidData` if bytes remain after the element.
pub fn decode(bytes: &[u8]) -> BerResult<Element> {
    let mut decoder = BerDecoder::new(bytes);
    let element = decoder.decode_element()?;
    if decoder.has_remaining() {
        return Err(BerError::InvalidData(format!(
            "{} trailing bytes after element",
            decoder.remaining()
        )));
    }
    Ok(element)
}

/// Read the next element from a byte stream
///
/// The stream is left positioned right after the element, so calling this
/// in a loop until [`BerError::EndOfInput`] drains a stream of elements.
pub fn read_one<R: Read>(reader: &mut R) -> BerResult<Element> {
    ElementReader::new(reader).read_element()
}
