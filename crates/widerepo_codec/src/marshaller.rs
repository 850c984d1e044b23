//! Per-property value marshallers.

use crate::date::{format_iso_utc, from_epoch_millis, parse_iso_utc, to_epoch_millis};
use crate::error::{CodecError, CodecResult};
use crate::value::Value;
use std::fmt;

/// Converts a property value to and from its stored string form.
///
/// A marshaller registered for a property replaces the primitive encoding
/// rules for that property. Its output is always stored as a string (`S`)
/// attribute.
pub trait Marshaller: fmt::Debug + Send + Sync {
    /// Converts a value into its stored form.
    fn marshall(&self, value: &Value) -> CodecResult<String>;

    /// Converts a stored string back into a value.
    fn unmarshall(&self, raw: &str) -> CodecResult<Value>;
}

/// Stores dates as `yyyy-MM-ddTHH:mm:ss.SSSZ` in UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct IsoDateMarshaller;

impl Marshaller for IsoDateMarshaller {
    fn marshall(&self, value: &Value) -> CodecResult<String> {
        match value {
            Value::Date(d) => format_iso_utc(*d),
            other => Err(CodecError::marshalling_failed(format!(
                "expected date, got {}",
                other.type_name()
            ))),
        }
    }

    fn unmarshall(&self, raw: &str) -> CodecResult<Value> {
        parse_iso_utc(raw).map(Value::Date)
    }
}

/// Stores dates as milliseconds since the Unix epoch.
#[derive(Debug, Default, Clone, Copy)]
pub struct EpochMillisMarshaller;

impl Marshaller for EpochMillisMarshaller {
    fn marshall(&self, value: &Value) -> CodecResult<String> {
        match value {
            Value::Date(d) => Ok(to_epoch_millis(*d).to_string()),
            other => Err(CodecError::marshalling_failed(format!(
                "expected date, got {}",
                other.type_name()
            ))),
        }
    }

    fn unmarshall(&self, raw: &str) -> CodecResult<Value> {
        let millis: i64 = raw
            .parse()
            .map_err(|_| CodecError::marshalling_failed(format!("not epoch millis: {raw}")))?;
        from_epoch_millis(millis).map(Value::Date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn iso_marshaller_normalizes() {
        let value = Value::Date(datetime!(2022-10-10 10:10:10.010 -07:00));
        let raw = IsoDateMarshaller.marshall(&value).unwrap();
        assert_eq!(raw, "2022-10-10T17:10:10.010Z");
        assert_eq!(IsoDateMarshaller.unmarshall(&raw).unwrap(), value);
    }

    #[test]
    fn epoch_marshaller() {
        let value = Value::Date(datetime!(1970-01-01 00:00:01.500 UTC));
        assert_eq!(EpochMillisMarshaller.marshall(&value).unwrap(), "1500");
        assert_eq!(EpochMillisMarshaller.unmarshall("1500").unwrap(), value);
    }

    #[test]
    fn marshallers_reject_other_types() {
        assert!(matches!(
            IsoDateMarshaller.marshall(&Value::Integer(1)),
            Err(CodecError::MarshallingFailed { .. })
        ));
        assert!(matches!(
            EpochMillisMarshaller.unmarshall("soon"),
            Err(CodecError::MarshallingFailed { .. })
        ));
    }
}
