//! Async element reader

use ber_codec::ber::types::{HeaderDecoder, Identifier, Length, LengthForm, EOC_MARKER};
use ber_codec::reader::decode_children;
use ber_codec::{DecoderConfig, Element};
use ber_core::{BerError, BerResult};
use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Most buffer space reserved ahead of the data for one content read
const READ_CHUNK: usize = 8 * 1024;

/// An indefinite-length element whose end-of-contents marker has not
/// arrived yet
struct OpenElement {
    identifier: Identifier,
    children: Vec<Element>,
    raw: Vec<u8>,
}

impl OpenElement {
    fn push(&mut self, child: Element) {
        if let Some(bytes) = child.raw_bytes() {
            self.raw.extend_from_slice(bytes);
        }
        self.children.push(child);
    }

    fn close(mut self) -> Element {
        self.raw.extend_from_slice(&EOC_MARKER);
        let mut element = Element::from_children(self.identifier, LengthForm::Indefinite, self.children);
        element.set_raw_bytes(self.raw);
        element
    }
}

/// A definite-length header whose content is still arriving
struct PendingContent {
    identifier: Identifier,
    raw: Vec<u8>,
    length: usize,
}

/// Reads BER elements from an async byte source
///
/// Follows the same rules as [`ber_codec::ElementReader`]: a clean end of
/// input before an element starts is `EndOfInput`, a cut-short element is
/// `UnexpectedEof`, and the source is left right after the element.
///
/// # Cancel Safety
///
/// Every partial read lives in the reader, not in the returned future: the
/// stack of open indefinite-length elements, the header being decoded, the
/// content received so far (in a `BytesMut`) and a half-read end-of-contents
/// marker. Each suspension point is a single cancel safe `read` or
/// `read_buf`. Dropping a [`AsyncElementReader::read_element`] future (for
/// example on a timeout) therefore loses nothing, and the next call resumes
/// the same element.
pub struct AsyncElementReader<R> {
    inner: R,
    config: DecoderConfig,
    open: Vec<OpenElement>,
    header: HeaderDecoder,
    pending: Option<PendingContent>,
    content: BytesMut,
    eoc_started: bool,
}

impl<R: AsyncRead + Unpin + Send> AsyncElementReader<R> {
    /// Create a reader with default limits
    pub fn new(inner: R) -> Self {
        Self::with_config(inner, DecoderConfig::default())
    }

    /// Create a reader with explicit limits
    pub fn with_config(inner: R, config: DecoderConfig) -> Self {
        Self {
            inner,
            config,
            open: Vec::new(),
            header: HeaderDecoder::new(),
            pending: None,
            content: BytesMut::new(),
            eoc_started: false,
        }
    }

    /// Get the decoder limits
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Get a reference to the underlying source
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Get a mutable reference to the underlying source
    ///
    /// Reading from it while [`AsyncElementReader::is_mid_element`] is true
    /// desynchronizes the reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the reader, returning the underlying source
    ///
    /// Octets of an unfinished element buffered in the reader are dropped.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Whether octets of an unfinished element are buffered
    pub fn is_mid_element(&self) -> bool {
        !self.open.is_empty()
            || !self.header.octets().is_empty()
            || self.pending.is_some()
            || self.eoc_started
    }

    /// Read exactly one top-level element
    ///
    /// # Returns
    /// The element, with its raw bytes cached. `Err(BerError::EndOfInput)`
    /// when the source ends between elements.
    ///
    /// # Error Handling
    /// On any error the unfinished element is discarded, so the next call
    /// starts with the source's next octet. Cancellation is not an error:
    /// see the cancel safety notes on [`AsyncElementReader`].
    pub async fn read_element(&mut self) -> BerResult<Element> {
        let result = self.advance().await;
        if result.is_err() {
            self.reset();
        }
        result
    }

    fn reset(&mut self) {
        self.open.clear();
        self.header = HeaderDecoder::new();
        self.pending = None;
        self.content.clear();
        self.eoc_started = false;
    }

    async fn advance(&mut self) -> BerResult<Element> {
        loop {
            if let Some(length) = self.pending.as_ref().map(|pending| pending.length) {
                self.fill_content(length).await?;
                if let Some(pending) = self.pending.take() {
                    let element = self.complete_definite(pending)?;
                    if let Some(element) = self.attach(element) {
                        return Ok(element);
                    }
                }
                continue;
            }

            if self.eoc_started {
                let octet = self.read_octet("end-of-contents marker").await?;
                self.eoc_started = false;
                if octet != EOC_MARKER[1] {
                    return Err(BerError::InvalidData(
                        "End-of-contents marker with nonzero length".to_string(),
                    ));
                }
                if let Some(open) = self.open.pop() {
                    if let Some(element) = self.attach(open.close()) {
                        return Ok(element);
                    }
                }
                continue;
            }

            let between_elements = self.header.octets().is_empty();
            let Some(octet) = self.read_byte().await? else {
                if between_elements && self.open.is_empty() {
                    return Err(BerError::EndOfInput);
                }
                let context = if between_elements {
                    "end-of-contents marker"
                } else {
                    self.header.stage()
                };
                return Err(BerError::UnexpectedEof(context.to_string()));
            };

            if between_elements {
                // Universal primitive tag 0 is reserved for the marker.
                if !self.open.is_empty() && octet == EOC_MARKER[0] {
                    self.eoc_started = true;
                    continue;
                }
                self.config.check_depth(self.open.len())?;
            }

            if let Some(header) = self.header.push(octet)? {
                let raw = std::mem::take(&mut self.header).into_octets();
                log::trace!("BER header {:?} at depth {}", header, self.open.len());

                match header.length {
                    Length::Definite(length) => {
                        self.config.check_content_length(length)?;
                        self.pending = Some(PendingContent {
                            identifier: header.identifier,
                            raw,
                            length,
                        });
                    }
                    Length::Indefinite => self.open.push(OpenElement {
                        identifier: header.identifier,
                        children: Vec::new(),
                        raw,
                    }),
                }
            }
        }
    }

    async fn read_byte(&mut self) -> BerResult<Option<u8>> {
        let mut octet = [0u8; 1];
        match self.inner.read(&mut octet).await? {
            0 => Ok(None),
            _ => Ok(Some(octet[0])),
        }
    }

    async fn read_octet(&mut self, context: &str) -> BerResult<u8> {
        self.read_byte()
            .await?
            .ok_or_else(|| BerError::UnexpectedEof(context.to_string()))
    }

    /// Receive content until `length` bytes are buffered
    async fn fill_content(&mut self, length: usize) -> BerResult<()> {
        while self.content.len() < length {
            let wanted = length - self.content.len();
            self.content.reserve(wanted.min(READ_CHUNK));
            let read = (&mut self.inner)
                .take(wanted as u64)
                .read_buf(&mut self.content)
                .await?;
            if read == 0 {
                return Err(BerError::UnexpectedEof(format!(
                    "content: expected {} bytes, got {}",
                    length,
                    self.content.len()
                )));
            }
        }
        Ok(())
    }

    fn complete_definite(&mut self, pending: PendingContent) -> BerResult<Element> {
        let content = self.content.split();
        let mut raw = pending.raw;
        raw.extend_from_slice(&content);

        let mut element = if pending.identifier.is_constructed() {
            let children = decode_children(&content, &self.config, self.open.len() + 1)?;
            Element::from_children(pending.identifier, LengthForm::Definite, children)
        } else {
            Element::from_primitive_content(pending.identifier, &content)?
        };
        element.set_raw_bytes(raw);
        Ok(element)
    }

    /// Hand a finished element to its open parent, or return it if it is
    /// the top-level element
    fn attach(&mut self, element: Element) -> Option<Element> {
        match self.open.last_mut() {
            Some(parent) => {
                parent.push(element);
                None
            }
            None => Some(element),
        }
    }
}
