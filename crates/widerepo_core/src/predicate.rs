//! Predicate trees.
//!
//! A [`PredicateTree`] is what a derived query method name parses into: a
//! disjunction of conjunctions of property [`Part`]s. Only single-branch
//! trees can be served by the store, since conditions are always ANDed.

use crate::criteria::Criteria;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use widerepo_codec::{ComparisonOperator, Value};

/// Comparison expressed by one predicate part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartKind {
    /// `property = ?`
    SimpleProperty,
    /// `property <> ?`
    NegatingSimpleProperty,
    /// `property > ?`
    GreaterThan,
    /// `property >= ?`
    GreaterThanEqual,
    /// `property < ?`
    LessThan,
    /// `property <= ?`
    LessThanEqual,
    /// `property < ?` on dates.
    Before,
    /// `property > ?` on dates.
    After,
    /// `property BETWEEN ? AND ?`
    Between,
    /// `property IN ?`
    In,
    /// `property NOT IN ?`
    NotIn,
    /// `property IS NULL`
    IsNull,
    /// `property IS NOT NULL`
    IsNotNull,
    /// `property LIKE '?%'`
    StartingWith,
    /// `property LIKE '%?'`
    EndingWith,
    /// `property` contains `?` (substring or set member).
    Containing,
    /// `property` does not contain `?`.
    NotContaining,
    /// `property LIKE ?`
    Like,
    /// `property NOT LIKE ?`
    NotLike,
    /// `property ~ ?`
    Regex,
    /// `property = true`
    True,
    /// `property = false`
    False,
    /// `property` exists.
    Exists,
}

impl PartKind {
    /// Number of method arguments the part consumes.
    #[must_use]
    pub const fn argument_count(self) -> usize {
        match self {
            Self::Between => 2,
            Self::IsNull | Self::IsNotNull | Self::True | Self::False | Self::Exists => 0,
            _ => 1,
        }
    }

    /// Whether the store can evaluate this kind of part.
    #[must_use]
    pub const fn is_supported(self) -> bool {
        !matches!(
            self,
            Self::EndingWith | Self::Like | Self::NotLike | Self::Regex | Self::NotIn | Self::Exists
        )
    }
}

/// One property comparison within a conjunction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Part {
    /// Property compared.
    pub property: String,
    /// Comparison kind.
    pub kind: PartKind,
    /// Case-insensitive comparison requested.
    #[serde(default)]
    pub ignore_case: bool,
}

impl Part {
    /// Creates a case-sensitive part.
    pub fn new(property: impl Into<String>, kind: PartKind) -> Self {
        Self {
            property: property.into(),
            kind,
            ignore_case: false,
        }
    }

    /// Shorthand for a [`PartKind::SimpleProperty`] part.
    pub fn eq(property: impl Into<String>) -> Self {
        Self::new(property, PartKind::SimpleProperty)
    }

    /// Requests case-insensitive comparison.
    #[must_use]
    pub fn ignoring_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    fn check_supported(&self) -> CoreResult<()> {
        if self.ignore_case {
            return Err(CoreError::unsupported_operation(format!(
                "case-insensitive comparison on {}",
                self.property
            )));
        }
        if !self.kind.is_supported() {
            return Err(CoreError::unsupported_operation(format!(
                "{:?} on {}",
                self.kind, self.property
            )));
        }
        Ok(())
    }

    fn apply(&self, criteria: &mut Criteria<'_>, args: Vec<Value>) -> CoreResult<()> {
        use ComparisonOperator as Op;

        let property = self.property.as_str();
        match self.kind {
            PartKind::SimpleProperty => match single(args) {
                Value::Null => criteria.with_condition(property, Op::Null, vec![])?,
                value => criteria.with_equals(property, value)?,
            },
            PartKind::NegatingSimpleProperty => match single(args) {
                Value::Null => criteria.with_condition(property, Op::NotNull, vec![])?,
                value => criteria.with_condition(property, Op::Ne, vec![value])?,
            },
            PartKind::True => criteria.with_equals(property, Value::Bool(true))?,
            PartKind::False => criteria.with_equals(property, Value::Bool(false))?,
            kind => {
                let operator = match kind {
                    PartKind::GreaterThan | PartKind::After => Op::Gt,
                    PartKind::GreaterThanEqual => Op::Ge,
                    PartKind::LessThan | PartKind::Before => Op::Lt,
                    PartKind::LessThanEqual => Op::Le,
                    PartKind::Between => Op::Between,
                    PartKind::In => Op::In,
                    PartKind::IsNull => Op::Null,
                    PartKind::IsNotNull => Op::NotNull,
                    PartKind::StartingWith => Op::BeginsWith,
                    PartKind::Containing => Op::Contains,
                    PartKind::NotContaining => Op::NotContains,
                    other => {
                        return Err(CoreError::unsupported_operation(format!(
                            "{other:?} on {property}"
                        )))
                    }
                };
                criteria.with_condition(property, operator, args)?
            }
        };
        Ok(())
    }
}

fn single(mut args: Vec<Value>) -> Value {
    args.pop().unwrap_or(Value::Null)
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.property, self.kind)?;
        if self.ignore_case {
            f.write_str(" (ignore case)")?;
        }
        Ok(())
    }
}

/// A disjunction (OR) of conjunctions (AND) of parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredicateTree {
    branches: Vec<Vec<Part>>,
}

impl PredicateTree {
    /// A tree matching everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// A tree with one conjunction.
    pub fn and(parts: impl IntoIterator<Item = Part>) -> Self {
        Self {
            branches: vec![parts.into_iter().collect()],
        }
    }

    /// Adds another OR branch.
    #[must_use]
    pub fn or(mut self, parts: impl IntoIterator<Item = Part>) -> Self {
        self.branches.push(parts.into_iter().collect());
        self
    }

    /// The OR branches.
    pub fn branches(&self) -> &[Vec<Part>] {
        &self.branches
    }

    /// Parts of the first branch, in argument order.
    pub fn parts(&self) -> &[Part] {
        self.branches.first().map_or(&[], Vec::as_slice)
    }

    /// Number of arguments a single-branch tree consumes.
    pub fn argument_count(&self) -> usize {
        self.parts().iter().map(|p| p.kind.argument_count()).sum()
    }

    /// Walks the tree into `criteria`, consuming `args` positionally.
    ///
    /// # Errors
    ///
    /// `UnsupportedOperation` for OR trees, case-insensitive parts and
    /// parts the store cannot evaluate; `InvalidArgument` when the number
    /// of arguments does not match the parts.
    pub fn apply(&self, criteria: &mut Criteria<'_>, args: &[Value]) -> CoreResult<()> {
        if self.branches.len() > 1 {
            return Err(CoreError::unsupported_operation(
                "OR predicates cannot be expressed as key conditions",
            ));
        }
        let parts = self.parts();
        for part in parts {
            part.check_supported()?;
        }
        let expected = self.argument_count();
        if args.len() != expected {
            return Err(CoreError::invalid_argument(format!(
                "expected {expected} argument(s), got {}",
                args.len()
            )));
        }

        let mut args = args.iter();
        for part in parts {
            let consumed = args.by_ref().take(part.kind.argument_count()).cloned().collect();
            part.apply(criteria, consumed)?;
        }
        Ok(())
    }
}
