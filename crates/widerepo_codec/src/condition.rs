//! Wire-level comparison conditions.

use crate::attribute::AttributeValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operators understood by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonOperator {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than or equal.
    Le,
    /// Less than.
    Lt,
    /// Greater than or equal.
    Ge,
    /// Greater than.
    Gt,
    /// String prefix match.
    BeginsWith,
    /// Inclusive range, two values.
    Between,
    /// Membership in a list of values.
    In,
    /// Attribute is absent.
    Null,
    /// Attribute is present.
    NotNull,
    /// Substring or set membership.
    Contains,
    /// Negated substring or set membership.
    NotContains,
}

/// How many values an operator takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// No values.
    None,
    /// Exactly one value.
    One,
    /// Exactly two values.
    Two,
    /// One or more values.
    Many,
}

impl ComparisonOperator {
    /// Returns the number of values this operator takes.
    #[must_use]
    pub const fn arity(self) -> Arity {
        match self {
            Self::Null | Self::NotNull => Arity::None,
            Self::Between => Arity::Two,
            Self::In => Arity::Many,
            _ => Arity::One,
        }
    }

    /// Whether the arity accepts `count` values.
    #[must_use]
    pub const fn accepts(self, count: usize) -> bool {
        match self.arity() {
            Arity::None => count == 0,
            Arity::One => count == 1,
            Arity::Two => count == 2,
            Arity::Many => count >= 1,
        }
    }

    /// Whether the store accepts this operator in a range key condition.
    #[must_use]
    pub const fn is_key_operator(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Le | Self::Lt | Self::Ge | Self::Gt | Self::BeginsWith | Self::Between
        )
    }

    /// The operator's wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "EQ",
            Self::Ne => "NE",
            Self::Le => "LE",
            Self::Lt => "LT",
            Self::Ge => "GE",
            Self::Gt => "GT",
            Self::BeginsWith => "BEGINS_WITH",
            Self::Between => "BETWEEN",
            Self::In => "IN",
            Self::Null => "NULL",
            Self::NotNull => "NOT_NULL",
            Self::Contains => "CONTAINS",
            Self::NotContains => "NOT_CONTAINS",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled comparison against one attribute.
///
/// Values are kept in caller order; for `BETWEEN` the first value is the
/// lower bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    /// Attribute the condition applies to (after name overrides).
    pub attribute_name: String,
    /// Comparison operator.
    pub operator: ComparisonOperator,
    /// Operand values.
    pub values: Vec<AttributeValue>,
}

impl Condition {
    /// Creates a condition.
    pub fn new(
        attribute_name: impl Into<String>,
        operator: ComparisonOperator,
        values: Vec<AttributeValue>,
    ) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            operator,
            values,
        }
    }

    /// Creates an equality condition.
    pub fn eq(attribute_name: impl Into<String>, value: AttributeValue) -> Self {
        Self::new(attribute_name, ComparisonOperator::Eq, vec![value])
    }

    /// Returns true for `EQ` conditions.
    #[must_use]
    pub fn is_equality(&self) -> bool {
        self.operator == ComparisonOperator::Eq
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.attribute_name, self.operator)?;
        for (i, value) in self.values.iter().enumerate() {
            f.write_str(if i == 0 { " " } else { ", " })?;
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity() {
        assert!(ComparisonOperator::Null.accepts(0));
        assert!(!ComparisonOperator::Null.accepts(1));
        assert!(ComparisonOperator::Between.accepts(2));
        assert!(!ComparisonOperator::Between.accepts(3));
        assert!(ComparisonOperator::In.accepts(5));
        assert!(!ComparisonOperator::In.accepts(0));
        assert!(ComparisonOperator::Gt.accepts(1));
    }

    #[test]
    fn key_operators() {
        assert!(ComparisonOperator::BeginsWith.is_key_operator());
        assert!(ComparisonOperator::Between.is_key_operator());
        assert!(!ComparisonOperator::Ne.is_key_operator());
        assert!(!ComparisonOperator::In.is_key_operator());
        assert!(!ComparisonOperator::Contains.is_key_operator());
    }

    #[test]
    fn display() {
        let condition = Condition::new(
            "score",
            ComparisonOperator::Between,
            vec![AttributeValue::N("1".into()), AttributeValue::N("9".into())],
        );
        assert_eq!(condition.to_string(), "score BETWEEN N:1, N:9");
        assert_eq!(
            Condition::new("deleted", ComparisonOperator::Null, vec![]).to_string(),
            "deleted NULL"
        );
    }

    #[test]
    fn operator_json_names() {
        let json = serde_json::to_string(&ComparisonOperator::BeginsWith).unwrap();
        assert_eq!(json, "\"BEGINS_WITH\"");
    }
}
