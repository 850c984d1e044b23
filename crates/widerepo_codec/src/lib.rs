//! # WideRepo Codec
//!
//! Attribute-value encoding for WideRepo.
//!
//! This crate defines the two value worlds the query engine moves between:
//! - [`Value`]: typed property values as application code sees them
//! - [`AttributeValue`]: tagged wire values (`S`, `N`, `SS`) the store compares
//!
//! ## Encoding Rules
//!
//! - Strings are carried as-is
//! - Numbers become their decimal string form
//! - Booleans become the numeric strings `"1"` and `"0"`
//! - Dates are normalized to UTC, `yyyy-MM-ddTHH:mm:ss.SSSZ`
//! - Everything else needs a per-property [`Marshaller`]
//!
//! ## Usage
//!
//! ```
//! use widerepo_codec::{to_attribute_value, AttributeValue, Value};
//!
//! let wire = to_attribute_value(&Value::Bool(true)).unwrap();
//! assert_eq!(wire, AttributeValue::N("1".to_string()));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod attribute;
mod condition;
mod date;
mod error;
mod marshaller;
mod value;

pub use attribute::{to_attribute_value, AttributeValue, Item};
pub use condition::{Arity, ComparisonOperator, Condition};
pub use date::{format_iso_utc, from_epoch_millis, parse_iso_utc, to_epoch_millis};
pub use error::{CodecError, CodecResult};
pub use marshaller::{EpochMillisMarshaller, IsoDateMarshaller, Marshaller};
pub use value::Value;
