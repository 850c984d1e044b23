//! Wire-level attribute values.

use crate::date::format_iso_utc;
use crate::error::{CodecError, CodecResult};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A stored item: attribute name to attribute value.
pub type Item = BTreeMap<String, AttributeValue>;

/// A tagged wire value understood by the store.
///
/// Serializes in the store's JSON shape, e.g. `{"S":"alice"}` or `{"N":"42"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttributeValue {
    /// String.
    #[serde(rename = "S")]
    S(String),
    /// Number, carried as its decimal string form.
    #[serde(rename = "N")]
    N(String),
    /// String set.
    #[serde(rename = "SS")]
    Ss(Vec<String>),
}

impl AttributeValue {
    /// Builds a numeric attribute from any displayable number.
    pub fn number(n: impl fmt::Display) -> Self {
        AttributeValue::N(n.to_string())
    }

    /// Returns the wire type tag.
    #[must_use]
    pub fn type_tag(&self) -> &'static str {
        match self {
            AttributeValue::S(_) => "S",
            AttributeValue::N(_) => "N",
            AttributeValue::Ss(_) => "SS",
        }
    }

    /// Get the string payload, if this is a string attribute.
    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttributeValue::S(s) => Some(s),
            _ => None,
        }
    }

    /// Get the decimal payload, if this is a numeric attribute.
    pub fn as_n(&self) -> Option<&str> {
        match self {
            AttributeValue::N(n) => Some(n),
            _ => None,
        }
    }

    /// Get the members, if this is a string set attribute.
    pub fn as_ss(&self) -> Option<&[String]> {
        match self {
            AttributeValue::Ss(items) => Some(items),
            _ => None,
        }
    }

    /// Reads a string attribute.
    pub fn to_text(&self) -> CodecResult<String> {
        self.as_s()
            .map(str::to_string)
            .ok_or(self.mismatch("S"))
    }

    /// Reads a numeric attribute as an integer.
    pub fn to_i64(&self) -> CodecResult<i64> {
        let raw = self.as_n().ok_or(self.mismatch("N"))?;
        raw.parse()
            .map_err(|_| CodecError::unsupported_type(format!("non-integer number {raw}")))
    }

    /// Reads a numeric attribute as a float.
    pub fn to_f64(&self) -> CodecResult<f64> {
        let raw = self.as_n().ok_or(self.mismatch("N"))?;
        raw.parse()
            .map_err(|_| CodecError::unsupported_type(format!("malformed number {raw}")))
    }

    /// Reads a boolean stored as the numeric strings `"1"` / `"0"`.
    pub fn to_bool(&self) -> CodecResult<bool> {
        match self.as_n() {
            Some("1") => Ok(true),
            Some("0") => Ok(false),
            Some(other) => Err(CodecError::unsupported_type(format!(
                "boolean encoded as {other}"
            ))),
            None => Err(self.mismatch("N")),
        }
    }

    fn mismatch(&self, expected: &'static str) -> CodecError {
        CodecError::UnexpectedAttributeType {
            expected,
            actual: self.type_tag(),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::S(s) => write!(f, "S:{s:?}"),
            AttributeValue::N(n) => write!(f, "N:{n}"),
            AttributeValue::Ss(items) => write!(f, "SS:{items:?}"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::S(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::S(s)
    }
}

/// Encodes a value using the primitive encoding rules.
///
/// - strings are carried as-is
/// - numbers become their decimal string form
/// - booleans become the numeric strings `"1"` and `"0"`
/// - dates are normalized to UTC and formatted as `yyyy-MM-ddTHH:mm:ss.SSSZ`
/// - string sets become `SS`
///
/// Nulls, lists, bytes and maps have no primitive encoding.
pub fn to_attribute_value(value: &Value) -> CodecResult<AttributeValue> {
    match value {
        Value::Text(s) => Ok(AttributeValue::S(s.clone())),
        Value::Integer(n) => Ok(AttributeValue::number(n)),
        Value::Float(n) if n.is_finite() => Ok(AttributeValue::number(n)),
        Value::Float(_) => Err(CodecError::NonFiniteNumber),
        Value::Bool(b) => Ok(AttributeValue::N(if *b { "1" } else { "0" }.to_string())),
        Value::Date(d) => Ok(AttributeValue::S(format_iso_utc(*d)?)),
        Value::StringSet(items) => Ok(AttributeValue::Ss(items.iter().cloned().collect())),
        other => Err(CodecError::unsupported_type(other.type_name())),
    }
}
