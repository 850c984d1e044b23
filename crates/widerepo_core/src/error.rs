//! Error types for WideRepo core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while planning or executing a repository query.
///
/// Planning errors (`UnsupportedType`, `UnsupportedOperation`,
/// `PermissionDenied`) are raised before any store round-trip and depend
/// only on the accumulated criteria and the entity's key metadata.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Attribute-value codec error.
    #[error("codec error: {0}")]
    Codec(#[from] widerepo_codec::CodecError),

    /// Store client error, passed through unchanged.
    #[error("store error: {0}")]
    Store(#[from] widerepo_store::StoreError),

    /// A value has no wire encoding and no marshaller is registered.
    #[error("unsupported type for property {property}: {type_name}")]
    UnsupportedType {
        /// Property being compiled.
        property: String,
        /// Runtime type of the offending value.
        type_name: String,
    },

    /// The request cannot be expressed against the store.
    #[error("unsupported operation: {message}")]
    UnsupportedOperation {
        /// Description of what was requested.
        message: String,
    },

    /// A scan is required but the call site has not opted in.
    #[error("scanning is not enabled for {method}: {remedy}")]
    PermissionDenied {
        /// Method that required the scan.
        method: String,
        /// How to opt in.
        remedy: String,
    },

    /// A single-result query found nothing.
    #[error("no result found for {method}")]
    NotFound {
        /// Method that was executed.
        method: String,
    },

    /// A single-result query found more than one result.
    #[error("expected a unique result for {method}, found {count}")]
    NonUniqueResult {
        /// Method that was executed.
        method: String,
        /// Number of results found.
        count: usize,
    },

    /// An item could not be mapped to or from an entity.
    #[error("invalid mapping: {message}")]
    InvalidMapping {
        /// Description of the mapping problem.
        message: String,
    },

    /// Query arguments do not fit the method's predicate.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the argument problem.
        message: String,
    },
}

impl CoreError {
    /// Creates an unsupported type error.
    pub fn unsupported_type(property: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            property: property.into(),
            type_name: type_name.into(),
        }
    }

    /// Creates an unsupported operation error.
    pub fn unsupported_operation(message: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            message: message.into(),
        }
    }

    /// Creates a permission denied error.
    pub fn permission_denied(method: impl Into<String>, remedy: impl Into<String>) -> Self {
        Self::PermissionDenied {
            method: method.into(),
            remedy: remedy.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(method: impl Into<String>) -> Self {
        Self::NotFound {
            method: method.into(),
        }
    }

    /// Creates a non-unique result error.
    pub fn non_unique(method: impl Into<String>, count: usize) -> Self {
        Self::NonUniqueResult {
            method: method.into(),
            count,
        }
    }

    /// Creates an invalid mapping error.
    pub fn invalid_mapping(message: impl Into<String>) -> Self {
        Self::InvalidMapping {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Whether the error was raised while planning, before any store call.
    #[must_use]
    pub fn is_planning_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedType { .. }
                | Self::UnsupportedOperation { .. }
                | Self::PermissionDenied { .. }
                | Self::InvalidArgument { .. }
        )
    }
}
