//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding attribute values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The value has no wire encoding.
    #[error("unsupported value type: {type_name}")]
    UnsupportedType {
        /// Name of the unsupported type.
        type_name: String,
    },

    /// NaN and infinities cannot be written as decimal strings.
    #[error("non-finite numbers cannot be encoded")]
    NonFiniteNumber,

    /// A date could not be formatted or parsed.
    #[error("invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// A marshaller rejected its input.
    #[error("marshalling failed: {message}")]
    MarshallingFailed {
        /// Description of the marshalling error.
        message: String,
    },

    /// An attribute value carried a different type tag than expected.
    #[error("unexpected attribute type: expected {expected}, got {actual}")]
    UnexpectedAttributeType {
        /// The expected type tag.
        expected: &'static str,
        /// The actual type tag.
        actual: &'static str,
    },
}

impl CodecError {
    /// Create an unsupported type error.
    pub fn unsupported_type(type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
        }
    }

    /// Create an invalid date error.
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Create a marshalling failed error.
    pub fn marshalling_failed(message: impl Into<String>) -> Self {
        Self::MarshallingFailed {
            message: message.into(),
        }
    }
}
