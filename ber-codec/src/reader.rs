//! Blocking element reader
//!
//! Reads one complete element per call from any [`std::io::Read`] source and
//! leaves the source positioned right after it, so repeated calls drain a
//! stream of concatenated elements.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use ber_codec::ElementReader;
//!
//! let mut reader = ElementReader::new(std::io::stdin().lock());
//! loop {
//!     match reader.read_element() {
//!         Ok(element) => println!("{}", element),
//!         Err(e) if e.is_end_of_input() => break,
//!         Err(e) => return Err(e),
//!     }
//! }
//! # Ok::<(), ber_core::BerError>(())
//! ```

use crate::ber::types::{Header, HeaderDecoder, Length, LengthForm, EOC_MARKER};
use crate::config::DecoderConfig;
use crate::element::Element;
use ber_core::{BerError, BerResult};
use std::io::{ErrorKind, Read};

/// Reads BER elements from a byte source
///
/// Per element the reader walks identifier -> length -> content. Primitive
/// content is read in one piece. Definite-length constructed content is read
/// in one piece and split into children. Indefinite-length constructed
/// content is read child by child until the `00 00` end-of-contents marker.
///
/// End of input before the first identifier octet is reported as
/// [`BerError::EndOfInput`]; end of input anywhere later is
/// [`BerError::UnexpectedEof`].
pub struct ElementReader<R> {
    inner: R,
    config: DecoderConfig,
}

impl<R: Read> ElementReader<R> {
    /// Create a reader with default limits
    pub fn new(inner: R) -> Self {
        Self::with_config(inner, DecoderConfig::default())
    }

    /// Create a reader with explicit limits
    pub fn with_config(inner: R, config: DecoderConfig) -> Self {
        Self { inner, config }
    }

    /// Get the decoder limits
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Get a reference to the underlying source
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Consume the reader, returning the underlying source
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read exactly one top-level element
    pub fn read_element(&mut self) -> BerResult<Element> {
        match self.read_first_octet()? {
            Some(first) => self.read_element_from(first, 0),
            None => Err(BerError::EndOfInput),
        }
    }

    fn read_first_octet(&mut self) -> BerResult<Option<u8>> {
        let mut octet = [0u8; 1];
        loop {
            match self.inner.read(&mut octet) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(octet[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(BerError::Io(e)),
            }
        }
    }

    fn read_octet(&mut self, context: &str) -> BerResult<u8> {
        let mut octet = [0u8; 1];
        self.inner
            .read_exact(&mut octet)
            .map_err(|e| BerError::from_read(e, context))?;
        Ok(octet[0])
    }

    fn read_header(&mut self, first: u8) -> BerResult<(Header, Vec<u8>)> {
        let mut decoder = HeaderDecoder::new();
        let mut octet = first;
        loop {
            if let Some(header) = decoder.push(octet)? {
                return Ok((header, decoder.into_octets()));
            }
            octet = self.read_octet(decoder.stage())?;
        }
    }

    fn read_content(&mut self, length: usize) -> BerResult<Vec<u8>> {
        // Grow with the data actually received instead of trusting the header.
        let mut content = Vec::new();
        (&mut self.inner)
            .take(length as u64)
            .read_to_end(&mut content)?;

        if content.len() < length {
            return Err(BerError::UnexpectedEof(format!(
                "content: expected {} bytes, got {}",
                length,
                content.len()
            )));
        }
        Ok(content)
    }

    fn read_element_from(&mut self, first: u8, depth: usize) -> BerResult<Element> {
        self.config.check_depth(depth)?;

        let (header, mut raw) = self.read_header(first)?;
        log::trace!("BER header {:?} at depth {}", header, depth);

        let identifier = header.identifier;
        let mut element = match header.length {
            Length::Definite(length) => {
                self.config.check_content_length(length)?;
                let content = self.read_content(length)?;
                raw.extend_from_slice(&content);

                if identifier.is_constructed() {
                    let children = decode_children(&content, &self.config, depth + 1)?;
                    Element::from_children(identifier, LengthForm::Definite, children)
                } else {
                    Element::from_primitive_content(identifier, &content)?
                }
            }
            Length::Indefinite => {
                let mut children = Vec::new();
                loop {
                    let first = self.read_octet("end-of-contents marker")?;
                    // Universal primitive tag 0 is reserved for the marker.
                    if first == EOC_MARKER[0] {
                        if self.read_octet("end-of-contents marker")? != EOC_MARKER[1] {
                            return Err(BerError::InvalidData(
                                "End-of-contents marker with nonzero length".to_string(),
                            ));
                        }
                        break;
                    }

                    let child = self.read_element_from(first, depth + 1)?;
                    if let Some(bytes) = child.raw_bytes() {
                        raw.extend_from_slice(bytes);
                    }
                    children.push(child);
                }
                raw.extend_from_slice(&EOC_MARKER);
                Element::from_children(identifier, LengthForm::Indefinite, children)
            }
        };

        element.set_raw_bytes(raw);
        Ok(element)
    }
}

/// Split fully received constructed content into child elements
///
/// The content was already read in full, so a child that runs past its end
/// is malformed rather than truncated and is reported as `InvalidData`.
pub fn decode_children(content: &[u8], config: &DecoderConfig, depth: usize) -> BerResult<Vec<Element>> {
    let mut reader = ElementReader::with_config(content, *config);
    let mut children = Vec::new();

    while let Some(first) = reader.read_first_octet()? {
        let child = reader.read_element_from(first, depth).map_err(|e| match e {
            BerError::UnexpectedEof(context) => BerError::InvalidData(format!(
                "Child element overruns its parent's content ({})",
                context
            )),
            other => other,
        })?;
        children.push(child);
    }

    Ok(children)
}
