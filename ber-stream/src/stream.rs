//! Element stream trait and tokio implementation

use crate::reader::AsyncElementReader;
use async_trait::async_trait;
use ber_codec::{DecoderConfig, Element};
use ber_core::{BerError, BerResult};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

/// Exchanges whole BER elements with a peer
#[async_trait]
pub trait ElementStream: Send {
    /// Read the next element
    ///
    /// # Returns
    ///
    /// `Err(BerError::EndOfInput)` once the peer closed the stream between
    /// elements
    async fn read_element(&mut self) -> BerResult<Element>;

    /// Encode an element and write it out
    async fn write_element(&mut self, element: &Element) -> BerResult<()>;
}

/// BER element stream over any tokio byte stream
///
/// # Usage Example
///
/// ```rust,no_run
/// use ber_codec::Element;
/// use ber_stream::{BerStream, ElementStream};
/// use tokio::net::TcpStream;
///
/// # async fn run() -> ber_core::BerResult<()> {
/// let socket = TcpStream::connect("127.0.0.1:9000").await?;
/// let mut stream = BerStream::new(socket);
/// stream.write_element(&Element::integer(42, "answer")).await?;
/// let reply = stream.read_element().await?;
/// # Ok(())
/// # }
/// ```
pub struct BerStream<S> {
    reader: AsyncElementReader<S>,
    timeout: Option<Duration>,
}

impl<S: AsyncRead + AsyncWrite + Unpin + Send> BerStream<S> {
    /// Wrap a byte stream with default decoder limits and no read timeout
    pub fn new(inner: S) -> Self {
        Self::with_config(inner, DecoderConfig::default())
    }

    /// Wrap a byte stream with explicit decoder limits
    pub fn with_config(inner: S, config: DecoderConfig) -> Self {
        Self {
            reader: AsyncElementReader::with_config(inner, config),
            timeout: None,
        }
    }

    /// Set the read timeout
    ///
    /// `None` means reads wait forever. A read that times out keeps the
    /// octets it already received, and the next read finishes that element.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// Get the read timeout
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Get a reference to the underlying stream
    pub fn get_ref(&self) -> &S {
        self.reader.get_ref()
    }

    /// Consume the wrapper, returning the underlying stream
    pub fn into_inner(self) -> S {
        self.reader.into_inner()
    }
}

#[async_trait]
impl<S: AsyncRead + AsyncWrite + Unpin + Send> ElementStream for BerStream<S> {
    async fn read_element(&mut self) -> BerResult<Element> {
        match self.timeout {
            Some(duration) => tokio::time::timeout(duration, self.reader.read_element())
                .await
                .map_err(|_| {
                    BerError::Io(std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        "Timed out waiting for element",
                    ))
                })?,
            None => self.reader.read_element().await,
        }
    }

    async fn write_element(&mut self, element: &Element) -> BerResult<()> {
        let bytes = element.encode();
        log::debug!("Writing BER element ({} bytes)", bytes.len());

        let inner = self.reader.get_mut();
        inner.write_all(&bytes).await?;
        inner.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn test_write_element() {
        let mut sequence = Element::sequence("seq");
        sequence.append_child(Element::integer(123, "int")).unwrap();
        let mock = Builder::new().write(&[0x30, 0x03, 0x02, 0x01, 0x7B]).build();

        let mut stream = BerStream::new(mock);
        stream.write_element(&sequence).await.unwrap();
    }

    #[tokio::test]
    async fn test_request_response() {
        let request = Element::oid("1.2.840.113549".parse().unwrap(), "request");
        let response = Element::real(0.5, "response");
        let mock = Builder::new()
            .write(&request.encode())
            .read(&response.encode())
            .build();

        let mut stream = BerStream::new(mock);
        stream.write_element(&request).await.unwrap();
        let reply = stream.read_element().await.unwrap();
        assert_eq!(reply.as_float().unwrap(), 0.5);
        assert!(stream.read_element().await.unwrap_err().is_end_of_input());
    }

    #[tokio::test]
    async fn test_read_timeout() {
        let (client, _server) = tokio::io::duplex(64);
        let mut stream = BerStream::new(client);
        stream.set_timeout(Some(Duration::from_millis(10)));

        let result = stream.read_element().await;
        assert!(matches!(result, Err(BerError::Io(e)) if e.kind() == std::io::ErrorKind::TimedOut));
    }

    #[tokio::test]
    async fn test_timeout_keeps_partial_element() {
        let (client, mut server) = tokio::io::duplex(64);
        let mut stream = BerStream::new(client);
        stream.set_timeout(Some(Duration::from_millis(20)));

        server.write_all(&[0x04, 0x02, 0x05]).await.unwrap();
        let result = stream.read_element().await;
        assert!(matches!(result, Err(BerError::Io(e)) if e.kind() == std::io::ErrorKind::TimedOut));

        server.write_all(&[0x00, 0x02, 0x01, 0x07]).await.unwrap();
        let octets = stream.read_element().await.unwrap();
        assert_eq!(octets.as_bytes().unwrap(), &[0x05, 0x00]);
        assert_eq!(stream.read_element().await.unwrap().as_integer().unwrap(), 7);
    }
}
