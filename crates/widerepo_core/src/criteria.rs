//! Criteria accumulation.
//!
//! A [`Criteria`] is built once per request while walking a predicate,
//! handed to the [`crate::Planner`] and discarded. It only ever grows:
//! equality values and conditions are appended, never removed.

use crate::compiler::ConditionCompiler;
use crate::error::CoreResult;
use crate::metadata::EntityMetadata;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use widerepo_codec::{ComparisonOperator, Condition, Value};

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending sort key order.
    #[default]
    Ascending,
    /// Descending sort key order.
    Descending,
}

impl Direction {
    /// Whether this is [`Direction::Ascending`].
    #[must_use]
    pub const fn is_ascending(self) -> bool {
        matches!(self, Self::Ascending)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        })
    }
}

/// A requested sort order on one property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sort {
    /// Property to sort by.
    pub property: String,
    /// Sort direction.
    #[serde(default)]
    pub direction: Direction,
}

impl Sort {
    /// Creates a sort order.
    pub fn new(property: impl Into<String>, direction: Direction) -> Self {
        Self {
            property: property.into(),
            direction,
        }
    }

    /// Ascending order on `property`.
    pub fn asc(property: impl Into<String>) -> Self {
        Self::new(property, Direction::Ascending)
    }

    /// Descending order on `property`.
    pub fn desc(property: impl Into<String>) -> Self {
        Self::new(property, Direction::Descending)
    }
}

/// Conditions accumulated for one request.
pub struct Criteria<'m> {
    metadata: &'m dyn EntityMetadata,
    compiler: ConditionCompiler<'m>,
    has_sort_key: bool,
    partition_value: Option<Value>,
    equality_values: BTreeMap<String, Value>,
    conditions: BTreeMap<String, Vec<Condition>>,
    sorts: Vec<Sort>,
}

impl<'m> Criteria<'m> {
    /// Creates empty criteria for the entity described by `metadata`.
    pub fn new(metadata: &'m dyn EntityMetadata) -> Self {
        Self {
            metadata,
            compiler: ConditionCompiler::new(metadata),
            has_sort_key: metadata.has_sort_key(),
            partition_value: None,
            equality_values: BTreeMap::new(),
            conditions: BTreeMap::new(),
            sorts: Vec::new(),
        }
    }

    /// Records `property = value`.
    ///
    /// Equality on the composite identifier is recorded as equality on each
    /// non-null key component.
    pub fn with_equals(&mut self, property: &str, value: Value) -> CoreResult<&mut Self> {
        let metadata = self.metadata;
        if metadata.is_composite_identifier_property(property) {
            let (partition, sort) = metadata.decompose_composite_id(&value)?;
            if !partition.is_null() {
                self.with_equals(metadata.partition_key_property(), partition)?;
            }
            if let Some(sort_property) = metadata.sort_key_property() {
                if !sort.is_null() {
                    self.with_equals(sort_property, sort)?;
                }
            }
            return Ok(self);
        }

        let conditions =
            self.compiler
                .compile(property, ComparisonOperator::Eq, std::slice::from_ref(&value))?;
        if metadata.is_partition_key(property) {
            self.partition_value = Some(value.clone());
        }
        self.equality_values.insert(property.to_string(), value);
        self.push(conditions);
        Ok(self)
    }

    /// Records `property <operator> values`.
    ///
    /// A single-valued `EQ` is recorded as an equality; every other operator
    /// only adds conditions.
    pub fn with_condition(
        &mut self,
        property: &str,
        operator: ComparisonOperator,
        mut values: Vec<Value>,
    ) -> CoreResult<&mut Self> {
        if operator == ComparisonOperator::Eq && values.len() == 1 {
            if let Some(value) = values.pop() {
                return self.with_equals(property, value);
            }
        }
        let conditions = self.compiler.compile(property, operator, &values)?;
        self.push(conditions);
        Ok(self)
    }

    /// Requests a sort order.
    ///
    /// A later sort on the same property replaces the earlier direction.
    /// Sorts on different properties are all kept and reported by the
    /// planner.
    pub fn with_sort(&mut self, sort: Sort) -> &mut Self {
        match self.sorts.iter_mut().find(|s| s.property == sort.property) {
            Some(existing) => existing.direction = sort.direction,
            None => self.sorts.push(sort),
        }
        self
    }

    fn push(&mut self, conditions: Vec<Condition>) {
        for condition in conditions {
            self.conditions
                .entry(condition.attribute_name.clone())
                .or_default()
                .push(condition);
        }
    }

    /// Metadata of the entity being queried.
    pub fn metadata(&self) -> &'m dyn EntityMetadata {
        self.metadata
    }

    /// Whether the entity has a sort key.
    pub fn has_sort_key(&self) -> bool {
        self.has_sort_key
    }

    /// Value of the partition key equality, if any.
    pub fn partition_value(&self) -> Option<&Value> {
        self.partition_value.as_ref()
    }

    /// Equality values by property name.
    pub fn equality_values(&self) -> &BTreeMap<String, Value> {
        &self.equality_values
    }

    /// Conditions by attribute name.
    pub fn conditions(&self) -> &BTreeMap<String, Vec<Condition>> {
        &self.conditions
    }

    /// All conditions, ordered by attribute name.
    pub fn all_conditions(&self) -> Vec<Condition> {
        self.conditions.values().flatten().cloned().collect()
    }

    /// Requested sort orders, in request order.
    pub fn sorts(&self) -> &[Sort] {
        &self.sorts
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.sorts.is_empty()
    }
}

impl fmt::Debug for Criteria<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Criteria")
            .field("table", &self.metadata.table_name())
            .field("has_sort_key", &self.has_sort_key)
            .field("partition_value", &self.partition_value)
            .field("equality_values", &self.equality_values)
            .field("conditions", &self.conditions)
            .field("sorts", &self.sorts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::StaticEntityMetadata;
    use widerepo_codec::AttributeValue;

    fn playlists() -> StaticEntityMetadata {
        StaticEntityMetadata::new("playlists", "user")
            .with_sort_key("name")
            .with_attribute_name("user", "user_id")
            .with_composite_id("id")
    }

    #[test]
    fn equality_on_partition_key() {
        let meta = playlists();
        let mut criteria = Criteria::new(&meta);
        criteria.with_equals("user", Value::from("alice")).unwrap();

        assert_eq!(criteria.partition_value(), Some(&Value::from("alice")));
        assert_eq!(criteria.equality_values().len(), 1);
        assert_eq!(
            criteria.conditions()["user_id"],
            vec![Condition::eq("user_id", AttributeValue::from("alice"))]
        );
    }

    #[test]
    fn comparisons_do_not_record_equality() {
        let meta = playlists();
        let mut criteria = Criteria::new(&meta);
        criteria
            .with_condition("name", ComparisonOperator::Ne, vec![Value::from("mix1")])
            .unwrap()
            .with_condition("plays", ComparisonOperator::Gt, vec![Value::Integer(3)])
            .unwrap();

        assert!(criteria.partition_value().is_none());
        assert!(criteria.equality_values().is_empty());
        assert_eq!(criteria.conditions().len(), 2);
    }

    #[test]
    fn single_valued_eq_condition_is_an_equality() {
        let meta = playlists();
        let mut criteria = Criteria::new(&meta);
        criteria
            .with_condition("user", ComparisonOperator::Eq, vec![Value::from("alice")])
            .unwrap();
        assert!(criteria.partition_value().is_some());
        assert!(criteria.equality_values().contains_key("user"));
    }

    #[test]
    fn several_conditions_per_attribute() {
        let meta = playlists();
        let mut criteria = Criteria::new(&meta);
        criteria
            .with_condition("plays", ComparisonOperator::Gt, vec![Value::Integer(3)])
            .unwrap()
            .with_condition("plays", ComparisonOperator::Lt, vec![Value::Integer(9)])
            .unwrap();
        assert_eq!(criteria.conditions()["plays"].len(), 2);
        assert_eq!(criteria.all_conditions().len(), 2);
    }

    #[test]
    fn composite_equality_matches_separate_equalities() {
        let meta = playlists();

        let mut composite = Criteria::new(&meta);
        composite
            .with_equals(
                "id",
                Value::map([("user", Value::from("alice")), ("name", Value::from("mix"))]),
            )
            .unwrap();

        let mut separate = Criteria::new(&meta);
        separate
            .with_equals("user", Value::from("alice"))
            .unwrap()
            .with_equals("name", Value::from("mix"))
            .unwrap();

        assert_eq!(composite.partition_value(), separate.partition_value());
        assert_eq!(composite.equality_values(), separate.equality_values());
        assert_eq!(composite.conditions(), separate.conditions());
    }

    #[test]
    fn composite_null_component_is_omitted() {
        let meta = playlists();
        let mut criteria = Criteria::new(&meta);
        criteria
            .with_equals("id", Value::map([("user", Value::from("alice"))]))
            .unwrap();
        assert_eq!(criteria.equality_values().len(), 1);
        assert!(!criteria.conditions().contains_key("name"));
    }

    #[test]
    fn later_sort_on_the_same_property_wins() {
        let meta = playlists();
        let mut criteria = Criteria::new(&meta);
        criteria
            .with_sort(Sort::asc("name"))
            .with_sort(Sort::desc("name"));
        assert_eq!(criteria.sorts(), &[Sort::desc("name")]);

        criteria.with_sort(Sort::asc("created")).with_sort(Sort::asc("name"));
        assert_eq!(criteria.sorts(), &[Sort::asc("name"), Sort::asc("created")]);
    }

    #[test]
    fn failed_compilation_records_nothing() {
        let meta = playlists();
        let mut criteria = Criteria::new(&meta);
        assert!(criteria
            .with_equals("user", Value::Bytes(vec![0]))
            .is_err());
        assert!(criteria.partition_value().is_none());
        assert!(criteria.is_empty());
    }
}
