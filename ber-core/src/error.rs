use thiserror::Error;

/// Main error type for BER encoding and decoding
///
/// End-of-input is split into two kinds so a caller can loop "read until
/// clean end" without mistaking a truncated element for the end of a stream:
/// - [`BerError::EndOfInput`]: nothing was consumed for the element being started
/// - [`BerError::UnexpectedEof`]: the element was started but could not be completed
#[derive(Error, Debug)]
pub enum BerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("End of input")]
    EndOfInput,

    #[error("Unexpected end of input: {0}")]
    UnexpectedEof(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Value type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Element is not constructed")]
    NotConstructed,

    #[error("Nesting depth exceeds limit of {0}")]
    DepthLimitExceeded(usize),

    #[error("Content length {length} exceeds limit of {limit}")]
    LengthLimitExceeded { length: usize, limit: usize },
}

impl BerError {
    /// Whether this error marks a clean end of input
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, BerError::EndOfInput)
    }

    /// Whether this error marks an element cut short by the end of input
    pub fn is_truncated(&self) -> bool {
        matches!(self, BerError::UnexpectedEof(_))
    }

    /// Map an I/O error from a read that was already inside an element.
    ///
    /// `std::io::ErrorKind::UnexpectedEof` becomes [`BerError::UnexpectedEof`];
    /// everything else stays an I/O error.
    pub fn from_read(err: std::io::Error, context: &str) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            BerError::UnexpectedEof(context.to_string())
        } else {
            BerError::Io(err)
        }
    }
}

/// Result type alias for BER operations
pub type BerResult<T> = Result<T, BerError>;
