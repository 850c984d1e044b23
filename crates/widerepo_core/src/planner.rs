//! Query/scan planning.
//!
//! Plans are chosen in a fixed order:
//!
//! 1. **Lookup**: the only conditions are equalities on exactly the primary
//!    key properties (partition key, plus sort key for range-aware
//!    entities).
//! 2. **Range query**: the partition key has an equality and at most one
//!    other attribute carries a condition. That attribute must be the sort
//!    key or an index sort key, and its single condition must use a key
//!    operator (`EQ`, `LT`, `LE`, `GT`, `GE`, `BEGINS_WITH`, `BETWEEN`).
//! 3. Otherwise the request is **unplannable**, and only a scan can serve
//!    it. Scans must be opted into explicitly.
//!
//! Planning never touches the store and depends only on the criteria and
//! the entity's key metadata, so it is deterministic.

use crate::criteria::{Criteria, Direction, Sort};
use crate::error::{CoreError, CoreResult};
use crate::metadata::EntityMetadata;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info};
use widerepo_codec::{AttributeValue, Condition};
use widerepo_store::{CountRequest, ItemKey, KeyAttribute, QueryRequest, ScanRequest};

/// How to opt into scans, reported in permission errors.
pub const SCAN_REMEDY: &str =
    "set ScanPolicy::scan_enabled on the repository or QueryMethod::enable_scan on the method";

/// How to opt into scan counts, reported in permission errors.
pub const SCAN_COUNT_REMEDY: &str =
    "set ScanPolicy::scan_count_enabled on the repository or QueryMethod::enable_scan_count on the method";

/// A resolved access path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Plan {
    /// Single-item fetch by primary key.
    Lookup {
        /// Table to read.
        table_name: String,
        /// Primary key.
        key: ItemKey,
    },
    /// Partition equality plus an optional sort key condition.
    RangeQuery(QueryRequest),
    /// Full-table scan with filters.
    Scan(ScanRequest),
    /// No key-based access path exists.
    Unplannable,
}

impl Plan {
    /// Short name of the plan kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Plan::Lookup { .. } => "lookup",
            Plan::RangeQuery(_) => "range_query",
            Plan::Scan(_) => "scan",
            Plan::Unplannable => "unplannable",
        }
    }

    /// Whether the plan reads the whole table.
    #[must_use]
    pub fn is_scan(&self) -> bool {
        matches!(self, Plan::Scan(_))
    }

    /// The count request counting what this plan reads.
    ///
    /// Lookups are counted by fetching the item, so they have none.
    #[must_use]
    pub fn count_request(&self) -> Option<CountRequest> {
        match self {
            Plan::RangeQuery(request) => Some(CountRequest::Query(request.clone())),
            Plan::Scan(request) => Some(CountRequest::Scan(request.clone())),
            Plan::Lookup { .. } | Plan::Unplannable => None,
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Lookup { table_name, key } => {
                write!(f, "LOOKUP {table_name} ")?;
                write_key(f, &key.partition)?;
                if let Some(sort) = &key.sort {
                    f.write_str(" AND ")?;
                    write_key(f, sort)?;
                }
                Ok(())
            }
            Plan::RangeQuery(request) => {
                write!(f, "QUERY {}", request.table_name)?;
                if let Some(index) = &request.index_name {
                    write!(f, " INDEX {index}")?;
                }
                f.write_str(" WHERE ")?;
                write_key(f, &request.partition)?;
                if let Some(range) = &request.range_condition {
                    write!(f, " AND {range}")?;
                }
                write_filters(f, &request.filter_conditions)?;
                f.write_str(if request.scan_forward { " ASC" } else { " DESC" })
            }
            Plan::Scan(request) => {
                write!(f, "SCAN {}", request.table_name)?;
                write_filters(f, &request.filter_conditions)
            }
            Plan::Unplannable => f.write_str("UNPLANNABLE"),
        }
    }
}

fn write_key(f: &mut fmt::Formatter<'_>, key: &KeyAttribute) -> fmt::Result {
    write!(f, "{} EQ {}", key.name, key.value)
}

fn write_filters(f: &mut fmt::Formatter<'_>, filters: &[Condition]) -> fmt::Result {
    for (i, filter) in filters.iter().enumerate() {
        f.write_str(if i == 0 { " FILTER " } else { " AND " })?;
        write!(f, "{filter}")?;
    }
    Ok(())
}

/// Chooses the access path for a [`Criteria`].
pub struct Planner<'m> {
    metadata: &'m dyn EntityMetadata,
    table_name: String,
    page_size: Option<usize>,
}

impl<'m> Planner<'m> {
    /// Creates a planner reading from the physical table `table_name`.
    pub fn new(metadata: &'m dyn EntityMetadata, table_name: impl Into<String>) -> Self {
        Self {
            metadata,
            table_name: table_name.into(),
            page_size: None,
        }
    }

    /// Sets the page size stamped on query and scan requests.
    #[must_use]
    pub fn with_page_size(mut self, page_size: Option<usize>) -> Self {
        self.page_size = page_size;
        self
    }

    /// Physical table the planner targets.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Plans `criteria`, returning [`Plan::Unplannable`] when no key-based
    /// path exists.
    ///
    /// # Errors
    ///
    /// `UnsupportedOperation` for sorts on two properties, sorts on entities
    /// without a sort key, sorts on non-key properties, and sorts that do
    /// not match the range condition of an otherwise plannable range query.
    pub fn plan(&self, criteria: &Criteria<'_>) -> CoreResult<Plan> {
        let sort = self.validate_sort(criteria)?;

        if let Some(key) = self.lookup_key(criteria) {
            debug!(table = %self.table_name, "planned lookup");
            return Ok(Plan::Lookup {
                table_name: self.table_name.clone(),
                key,
            });
        }

        if let Some(request) = self.range_query(criteria, sort)? {
            debug!(
                table = %self.table_name,
                index = request.index_name.as_deref().unwrap_or("-"),
                ranged = request.range_condition.is_some(),
                "planned range query"
            );
            return Ok(Plan::RangeQuery(request));
        }

        debug!(table = %self.table_name, "no key-based plan");
        Ok(Plan::Unplannable)
    }

    /// Plans `criteria`, falling back to a scan when permitted.
    ///
    /// # Errors
    ///
    /// `UnsupportedOperation` when a scan is required for a sorted request,
    /// whatever the permission; otherwise `PermissionDenied` when a scan is
    /// required but `scan_enabled` is false. Both are raised before any
    /// store call.
    pub fn resolve(
        &self,
        criteria: &Criteria<'_>,
        method: &str,
        scan_enabled: bool,
    ) -> CoreResult<Plan> {
        self.resolve_with(criteria, method, scan_enabled, SCAN_REMEDY)
    }

    /// Plans `criteria` for a count, falling back to a scan count when
    /// `scan_count_enabled`.
    pub fn resolve_count(
        &self,
        criteria: &Criteria<'_>,
        method: &str,
        scan_count_enabled: bool,
    ) -> CoreResult<Plan> {
        self.resolve_with(criteria, method, scan_count_enabled, SCAN_COUNT_REMEDY)
    }

    fn resolve_with(
        &self,
        criteria: &Criteria<'_>,
        method: &str,
        permitted: bool,
        remedy: &str,
    ) -> CoreResult<Plan> {
        match self.plan(criteria)? {
            Plan::Unplannable => {
                if let Some(sort) = criteria.sorts().first() {
                    return Err(CoreError::unsupported_operation(format!(
                        "{method} needs a scan, and scans cannot be sorted by {}",
                        sort.property
                    )));
                }
                if !permitted {
                    return Err(CoreError::permission_denied(method, remedy));
                }
                let filter_conditions = criteria.all_conditions();
                info!(
                    method,
                    table = %self.table_name,
                    filters = filter_conditions.len(),
                    "falling back to scan"
                );
                Ok(Plan::Scan(ScanRequest {
                    table_name: self.table_name.clone(),
                    filter_conditions,
                    page_size: self.page_size,
                }))
            }
            plan => Ok(plan),
        }
    }

    fn validate_sort<'c>(&self, criteria: &'c Criteria<'_>) -> CoreResult<Option<&'c Sort>> {
        let sorts = criteria.sorts();
        let Some(first) = sorts.first() else {
            return Ok(None);
        };
        if let Some(other) = sorts.iter().find(|s| s.property != first.property) {
            return Err(CoreError::unsupported_operation(format!(
                "cannot sort by both {} and {}",
                first.property, other.property
            )));
        }
        if !criteria.has_sort_key() {
            return Err(CoreError::unsupported_operation(format!(
                "cannot sort by {}: {} has no sort key",
                first.property,
                self.metadata.table_name()
            )));
        }
        if !self.metadata.is_sort_key(&first.property)
            && !self.metadata.is_index_sort_key(&first.property)
        {
            return Err(CoreError::unsupported_operation(format!(
                "cannot sort by {}: only the sort key or an index sort key can order results",
                first.property
            )));
        }
        Ok(Some(first))
    }

    fn lookup_key(&self, criteria: &Criteria<'_>) -> Option<ItemKey> {
        let metadata = self.metadata;
        let partition_property = metadata.partition_key_property();
        let sort_property = metadata.sort_key_property();

        let expected: BTreeSet<&str> = std::iter::once(partition_property)
            .chain(sort_property)
            .collect();
        let actual: BTreeSet<&str> = criteria
            .equality_values()
            .keys()
            .map(String::as_str)
            .collect();
        if actual != expected {
            return None;
        }

        let partition_attribute = metadata.attribute_name(partition_property);
        let sort_attribute = sort_property.map(|p| metadata.attribute_name(p));

        let mut partition = None;
        let mut sort = None;
        for (attribute, conditions) in criteria.conditions() {
            let value = single_equality(conditions)?;
            let key = KeyAttribute::new(attribute.clone(), value);
            if *attribute == partition_attribute {
                partition = Some(key);
            } else if Some(attribute) == sort_attribute.as_ref() {
                sort = Some(key);
            } else {
                return None;
            }
        }

        if sort_attribute.is_some() && sort.is_none() {
            return None;
        }
        Some(ItemKey {
            partition: partition?,
            sort,
        })
    }

    fn range_query(
        &self,
        criteria: &Criteria<'_>,
        sort: Option<&Sort>,
    ) -> CoreResult<Option<QueryRequest>> {
        let Some((partition, range)) = self.range_shape(criteria) else {
            return Ok(None);
        };

        let range_property = match (&range, sort) {
            (Some((property, condition)), Some(sort)) if sort.property != *property => {
                return Err(CoreError::unsupported_operation(format!(
                    "cannot sort by {}: the range condition is on {}",
                    sort.property, condition.attribute_name
                )));
            }
            (Some((property, _)), _) => Some(property.clone()),
            (None, Some(sort)) => Some(sort.property.clone()),
            (None, None) => None,
        };

        let metadata = self.metadata;
        let index_name = match range_property.as_deref() {
            Some(property) if !metadata.is_sort_key(property) => {
                match metadata.index_names_for(property).first() {
                    Some(index) => Some(index.to_string()),
                    None => return Ok(None),
                }
            }
            _ => None,
        };

        Ok(Some(QueryRequest {
            table_name: self.table_name.clone(),
            index_name,
            partition,
            range_condition: range.map(|(_, condition)| condition.clone()),
            filter_conditions: Vec::new(),
            scan_forward: sort.map_or(true, |s| s.direction == Direction::Ascending),
            page_size: self.page_size,
        }))
    }

    /// Partition key plus the optional range condition with the property it
    /// binds, when the conditions have a range query's shape.
    fn range_shape<'c>(
        &self,
        criteria: &'c Criteria<'_>,
    ) -> Option<(KeyAttribute, Option<(String, &'c Condition)>)> {
        let metadata = self.metadata;
        criteria.partition_value()?;

        let partition_attribute = metadata.attribute_name(metadata.partition_key_property());
        let partition_value = single_equality(criteria.conditions().get(&partition_attribute)?)?;

        let mut others = criteria
            .conditions()
            .iter()
            .filter(|(attribute, _)| **attribute != partition_attribute);
        let range = match (others.next(), others.next()) {
            (None, _) => None,
            (Some((attribute, conditions)), None) => {
                let [condition] = conditions.as_slice() else {
                    return None;
                };
                if !condition.operator.is_key_operator() {
                    return None;
                }
                Some((self.range_property(attribute)?, condition))
            }
            (Some(_), Some(_)) => return None,
        };

        let equalities = criteria.equality_values();
        if equalities.len() > 2
            || !equalities.keys().all(|property| {
                metadata.is_partition_key(property)
                    || metadata.is_sort_key(property)
                    || metadata.is_index_sort_key(property)
            })
        {
            return None;
        }

        Some((KeyAttribute::new(partition_attribute, partition_value), range))
    }

    /// Maps a range attribute back to the sort key or index sort key
    /// property stored under it.
    fn range_property(&self, attribute: &str) -> Option<String> {
        let metadata = self.metadata;
        metadata
            .sort_key_property()
            .into_iter()
            .chain(metadata.secondary_index_sort_key_properties())
            .find(|property| metadata.attribute_name(property) == attribute)
            .map(str::to_string)
    }
}

impl fmt::Debug for Planner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Planner")
            .field("table_name", &self.table_name)
            .field("page_size", &self.page_size)
            .finish()
    }
}

fn single_equality(conditions: &[Condition]) -> Option<AttributeValue> {
    match conditions {
        [condition] if condition.is_equality() && condition.values.len() == 1 => {
            condition.values.first().cloned()
        }
        _ => None,
    }
}
