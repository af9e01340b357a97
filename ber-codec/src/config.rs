//! Decoder limits

use ber_core::{BerError, BerResult};

/// Limits applied while decoding untrusted input
///
/// # Default Settings
/// - Max depth: 64 nested constructed elements
/// - Max content length: `i32::MAX` bytes per element
///
/// # Usage Example
///
/// ```rust
/// use ber_codec::DecoderConfig;
///
/// let config = DecoderConfig::new()
///     .with_max_depth(16)
///     .with_max_content_length(64 * 1024);
/// assert_eq!(config.max_depth(), 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    max_depth: usize,
    max_content_length: usize,
}

impl DecoderConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 64;
    pub const DEFAULT_MAX_CONTENT_LENGTH: usize = i32::MAX as usize;

    /// Create a config with default limits
    pub fn new() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_content_length: Self::DEFAULT_MAX_CONTENT_LENGTH,
        }
    }

    /// Limit how deeply constructed elements may nest
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Limit the declared content length of a single element
    pub fn with_max_content_length(mut self, max_content_length: usize) -> Self {
        self.max_content_length = max_content_length;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn max_content_length(&self) -> usize {
        self.max_content_length
    }

    /// Reject an element nested deeper than allowed
    pub fn check_depth(&self, depth: usize) -> BerResult<()> {
        if depth > self.max_depth {
            log::debug!("Rejecting element at depth {} (limit {})", depth, self.max_depth);
            return Err(BerError::DepthLimitExceeded(self.max_depth));
        }
        Ok(())
    }

    /// Reject a declared content length above the limit
    pub fn check_content_length(&self, length: usize) -> BerResult<()> {
        if length > self.max_content_length {
            log::debug!(
                "Rejecting element with content length {} (limit {})",
                length,
                self.max_content_length
            );
            return Err(BerError::LengthLimitExceeded {
                length,
                limit: self.max_content_length,
            });
        }
        Ok(())
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::new()
    }
}
