//! Store client trait and request types.

use crate::error::StoreResult;
use serde::Serialize;
use widerepo_codec::{AttributeValue, Condition, Item};

/// One key attribute with its value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct KeyAttribute {
    /// Attribute name.
    pub name: String,
    /// Attribute value.
    pub value: AttributeValue,
}

impl KeyAttribute {
    /// Creates a key attribute.
    pub fn new(name: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Primary key of a single item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ItemKey {
    /// Partition key attribute.
    pub partition: KeyAttribute,
    /// Sort key attribute, for tables that have one.
    pub sort: Option<KeyAttribute>,
}

impl ItemKey {
    /// Creates a key for a hash-only table.
    pub fn partition(name: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            partition: KeyAttribute::new(name, value),
            sort: None,
        }
    }

    /// Adds a sort key component.
    #[must_use]
    pub fn with_sort(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.sort = Some(KeyAttribute::new(name, value));
        self
    }

    /// Extracts the key attributes from a full item.
    ///
    /// Returns `None` if the item lacks one of the named attributes.
    pub fn from_item(item: &Item, partition_key: &str, sort_key: Option<&str>) -> Option<Self> {
        let partition = KeyAttribute::new(partition_key, item.get(partition_key)?.clone());
        let sort = match sort_key {
            Some(name) => Some(KeyAttribute::new(name, item.get(name)?.clone())),
            None => None,
        };
        Some(Self { partition, sort })
    }

    /// Whether `item` carries exactly this key.
    pub fn matches(&self, item: &Item) -> bool {
        item.get(&self.partition.name) == Some(&self.partition.value)
            && self
                .sort
                .as_ref()
                .map_or(true, |sort| item.get(&sort.name) == Some(&sort.value))
    }
}

/// A targeted range query: partition equality plus an optional key condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest {
    /// Table to query.
    pub table_name: String,
    /// Secondary index to query instead of the table's own sort key.
    pub index_name: Option<String>,
    /// Partition key equality.
    pub partition: KeyAttribute,
    /// Condition on the (index) sort key.
    pub range_condition: Option<Condition>,
    /// Conditions applied to matching items after the key lookup.
    pub filter_conditions: Vec<Condition>,
    /// Ascending sort key order when true.
    pub scan_forward: bool,
    /// Items evaluated per round-trip; the store default when `None`.
    pub page_size: Option<usize>,
}

/// A full-table scan with filters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanRequest {
    /// Table to scan.
    pub table_name: String,
    /// Conditions every returned item satisfies.
    pub filter_conditions: Vec<Condition>,
    /// Items evaluated per round-trip; the store default when `None`.
    pub page_size: Option<usize>,
}

/// A count request shaped like a query or a scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CountRequest {
    /// Count the items a query would return.
    Query(QueryRequest),
    /// Count the items a scan would return.
    Scan(ScanRequest),
}

impl CountRequest {
    /// Table the count runs against.
    pub fn table_name(&self) -> &str {
        match self {
            CountRequest::Query(q) => &q.table_name,
            CountRequest::Scan(s) => &s.table_name,
        }
    }
}

/// Opaque marker for resuming a truncated response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationToken(Item);

impl ContinuationToken {
    /// Wraps the last evaluated key of a response.
    pub fn new(last_evaluated_key: Item) -> Self {
        Self(last_evaluated_key)
    }

    /// The last key the store evaluated.
    pub fn last_evaluated_key(&self) -> &Item {
        &self.0
    }
}

/// One round-trip's worth of items.
#[derive(Debug, Clone, Default)]
pub struct ItemPage {
    /// Items in this page; may be empty even when more pages follow.
    pub items: Vec<Item>,
    /// Present when the response was truncated.
    pub continuation: Option<ContinuationToken>,
}

/// One round-trip's worth of a count.
#[derive(Debug, Clone, Default)]
pub struct CountPage {
    /// Items counted in this round-trip.
    pub count: u64,
    /// Present when the count was truncated.
    pub continuation: Option<ContinuationToken>,
}

/// Client for a partitioned wide-column store.
///
/// Implementations perform one network round-trip per call. Query and scan
/// results come back a page at a time; [`crate::PaginatedItems`] stitches
/// pages into a lazy, forward-only sequence. Clients own retry, timeout and
/// cancellation policy.
pub trait StoreClient: Send + Sync {
    /// Fetches a single item by primary key.
    fn get_item(&self, table: &str, key: &ItemKey) -> StoreResult<Option<Item>>;

    /// Fetches one page of a range query.
    fn query_page(
        &self,
        request: &QueryRequest,
        start: Option<&ContinuationToken>,
    ) -> StoreResult<ItemPage>;

    /// Fetches one page of a scan.
    fn scan_page(
        &self,
        request: &ScanRequest,
        start: Option<&ContinuationToken>,
    ) -> StoreResult<ItemPage>;

    /// Counts one page of a query or scan.
    ///
    /// The count may be partial; callers must keep following the
    /// continuation token until none is returned.
    fn count_page(
        &self,
        request: &CountRequest,
        start: Option<&ContinuationToken>,
    ) -> StoreResult<CountPage>;

    /// Inserts or replaces an item.
    fn put_item(&self, table: &str, item: Item) -> StoreResult<()>;

    /// Deletes an item by primary key. Deleting a missing item is not an error.
    fn delete_item(&self, table: &str, key: &ItemKey) -> StoreResult<()>;

    /// Inserts or replaces several items.
    fn batch_put(&self, table: &str, items: Vec<Item>) -> StoreResult<()>;

    /// Deletes several items by primary key.
    fn batch_delete(&self, table: &str, keys: Vec<ItemKey>) -> StoreResult<()>;
}
