//! In-memory store client for testing.

use crate::client::{
    ContinuationToken, CountPage, CountRequest, ItemKey, ItemPage, QueryRequest, ScanRequest,
    StoreClient,
};
use crate::error::{StoreError, StoreResult};
use crate::eval::{compare_attributes, matches, matches_all};
use crate::stats::{StatsSnapshot, StoreStats};
use parking_lot::{Mutex, RwLock};
use std::cmp::Ordering;
use std::collections::HashMap;
use widerepo_codec::{Condition, Item};

/// Paging behavior of an [`InMemoryStore`].
#[derive(Debug, Clone)]
pub struct MemoryStoreConfig {
    /// Items evaluated per query or scan round-trip when the request does
    /// not name a page size.
    pub page_size: usize,
    /// Items evaluated per count round-trip.
    pub count_page_size: usize,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            count_page_size: 1000,
        }
    }
}

impl MemoryStoreConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default page size.
    #[must_use]
    pub const fn page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    /// Sets the count page size.
    #[must_use]
    pub const fn count_page_size(mut self, size: usize) -> Self {
        self.count_page_size = size;
        self
    }
}

/// A local secondary index: same partition key, alternate sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalIndex {
    /// Index name.
    pub name: String,
    /// Sort key attribute of the index.
    pub sort_key: String,
}

/// Key schema of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    /// Table name.
    pub name: String,
    /// Partition key attribute.
    pub partition_key: String,
    /// Sort key attribute, if the table has one.
    pub sort_key: Option<String>,
    /// Secondary indexes.
    pub indexes: Vec<LocalIndex>,
}

impl TableDefinition {
    /// Creates a hash-only table definition.
    pub fn new(name: impl Into<String>, partition_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partition_key: partition_key.into(),
            sort_key: None,
            indexes: Vec::new(),
        }
    }

    /// Adds a sort key.
    #[must_use]
    pub fn with_sort_key(mut self, sort_key: impl Into<String>) -> Self {
        self.sort_key = Some(sort_key.into());
        self
    }

    /// Adds a secondary index.
    #[must_use]
    pub fn with_index(mut self, name: impl Into<String>, sort_key: impl Into<String>) -> Self {
        self.indexes.push(LocalIndex {
            name: name.into(),
            sort_key: sort_key.into(),
        });
        self
    }

    fn key_of(&self, item: &Item) -> Option<ItemKey> {
        ItemKey::from_item(item, &self.partition_key, self.sort_key.as_deref())
    }
}

/// A call received by an [`InMemoryStore`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// `get_item`.
    GetItem {
        /// Table name.
        table: String,
    },
    /// `query_page`.
    QueryPage {
        /// Table name.
        table: String,
        /// Index queried, if any.
        index: Option<String>,
    },
    /// `scan_page`.
    ScanPage {
        /// Table name.
        table: String,
    },
    /// `count_page`.
    CountPage {
        /// Table name.
        table: String,
    },
    /// `put_item`.
    PutItem {
        /// Table name.
        table: String,
    },
    /// `delete_item`.
    DeleteItem {
        /// Table name.
        table: String,
    },
    /// `batch_put`.
    BatchPut {
        /// Table name.
        table: String,
        /// Number of items.
        items: usize,
    },
    /// `batch_delete`.
    BatchDelete {
        /// Table name.
        table: String,
        /// Number of keys.
        keys: usize,
    },
}

#[derive(Debug)]
struct Table {
    definition: TableDefinition,
    items: Vec<Item>,
}

impl Table {
    fn upsert(&mut self, item: Item) -> StoreResult<()> {
        let key = self.definition.key_of(&item).ok_or_else(|| {
            StoreError::invalid_request("item is missing one of its key attributes")
        })?;
        match self.items.iter_mut().find(|existing| key.matches(existing)) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
        Ok(())
    }

    fn remove(&mut self, key: &ItemKey) {
        self.items.retain(|item| !key.matches(item));
    }

    fn query_candidates(&self, request: &QueryRequest) -> StoreResult<(Vec<&Item>, Vec<String>)> {
        let def = &self.definition;
        if request.partition.name != def.partition_key {
            return Err(StoreError::invalid_request(format!(
                "query must target partition key {}, got {}",
                def.partition_key, request.partition.name
            )));
        }

        let sort_key = match &request.index_name {
            Some(index) => Some(
                def.indexes
                    .iter()
                    .find(|i| &i.name == index)
                    .map(|i| i.sort_key.clone())
                    .ok_or_else(|| StoreError::invalid_request(format!("unknown index {index}")))?,
            ),
            None => def.sort_key.clone(),
        };

        if let Some(range) = &request.range_condition {
            check_range_condition(range, sort_key.as_deref())?;
        }

        let mut candidates: Vec<&Item> = self
            .items
            .iter()
            .filter(|item| item.get(&def.partition_key) == Some(&request.partition.value))
            .filter(|item| sort_key.as_ref().map_or(true, |sk| item.contains_key(sk)))
            .filter(|item| {
                request
                    .range_condition
                    .as_ref()
                    .map_or(true, |range| matches(item, range))
            })
            .collect();

        if let Some(sk) = &sort_key {
            candidates.sort_by(|a, b| {
                let primary = match (a.get(sk), b.get(sk)) {
                    (Some(x), Some(y)) => compare_attributes(x, y).unwrap_or(Ordering::Equal),
                    _ => Ordering::Equal,
                };
                primary.then_with(|| {
                    let ka = def.sort_key.as_ref().and_then(|k| a.get(k));
                    let kb = def.sort_key.as_ref().and_then(|k| b.get(k));
                    ka.cmp(&kb)
                })
            });
        }
        if !request.scan_forward {
            candidates.reverse();
        }

        let mut token_attributes = vec![def.partition_key.clone()];
        token_attributes.extend(def.sort_key.clone());
        if let Some(sk) = sort_key {
            if !token_attributes.contains(&sk) {
                token_attributes.push(sk);
            }
        }
        Ok((candidates, token_attributes))
    }

    fn scan_candidates(&self) -> (Vec<&Item>, Vec<String>) {
        let def = &self.definition;
        let mut token_attributes = vec![def.partition_key.clone()];
        token_attributes.extend(def.sort_key.clone());
        (self.items.iter().collect(), token_attributes)
    }
}

fn check_range_condition(range: &Condition, sort_key: Option<&str>) -> StoreResult<()> {
    if Some(range.attribute_name.as_str()) != sort_key {
        return Err(StoreError::invalid_request(format!(
            "range condition on {} does not target the sort key",
            range.attribute_name
        )));
    }
    if !range.operator.is_key_operator() {
        return Err(StoreError::invalid_request(format!(
            "{} is not allowed in a key condition",
            range.operator
        )));
    }
    Ok(())
}

/// Projects an item down to the attributes that identify its position.
fn position_key(item: &Item, attributes: &[String]) -> Item {
    attributes
        .iter()
        .filter_map(|name| item.get(name).map(|v| (name.clone(), v.clone())))
        .collect()
}

/// Returns the window `[start, end)` of candidates a round-trip evaluates.
fn window(
    candidates: &[&Item],
    attributes: &[String],
    start: Option<&ContinuationToken>,
    size: usize,
) -> StoreResult<(usize, usize)> {
    let from = match start {
        None => 0,
        Some(token) => {
            candidates
                .iter()
                .position(|item| &position_key(item, attributes) == token.last_evaluated_key())
                .ok_or(StoreError::InvalidContinuation)?
                + 1
        }
    };
    let to = from.saturating_add(size.max(1)).min(candidates.len());
    Ok((from, to))
}

fn continuation_after(
    candidates: &[&Item],
    attributes: &[String],
    to: usize,
) -> Option<ContinuationToken> {
    if to < candidates.len() && to > 0 {
        Some(ContinuationToken::new(position_key(candidates[to - 1], attributes)))
    } else {
        None
    }
}

/// An in-memory store client.
///
/// Suitable for unit and integration tests. Query, scan and count results
/// are truncated according to [`MemoryStoreConfig`] so that pagination and
/// continuation tokens behave like a remote store. Every call is recorded
/// in order; see [`InMemoryStore::calls`].
///
/// # Example
///
/// ```rust
/// use widerepo_codec::{AttributeValue, Item};
/// use widerepo_store::{InMemoryStore, ItemKey, StoreClient, TableDefinition};
///
/// let store = InMemoryStore::new();
/// store.create_table(TableDefinition::new("users", "id")).unwrap();
///
/// let mut item = Item::new();
/// item.insert("id".into(), AttributeValue::from("u1"));
/// store.put_item("users", item).unwrap();
///
/// let key = ItemKey::partition("id", AttributeValue::from("u1"));
/// assert!(store.get_item("users", &key).unwrap().is_some());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    config: MemoryStoreConfig,
    tables: RwLock<HashMap<String, Table>>,
    calls: Mutex<Vec<StoreCall>>,
    stats: StoreStats,
    pending_failure: Mutex<Option<String>>,
}

impl InMemoryStore {
    /// Creates an empty store with default paging.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with the given paging.
    #[must_use]
    pub fn with_config(config: MemoryStoreConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Creates a table.
    ///
    /// # Errors
    ///
    /// Returns an error if a table with the same name exists.
    pub fn create_table(&self, definition: TableDefinition) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if tables.contains_key(&definition.name) {
            return Err(StoreError::invalid_request(format!(
                "table {} already exists",
                definition.name
            )));
        }
        tables.insert(
            definition.name.clone(),
            Table {
                definition,
                items: Vec::new(),
            },
        );
        Ok(())
    }

    /// Number of items stored in a table.
    pub fn item_count(&self, table: &str) -> StoreResult<usize> {
        let tables = self.tables.read();
        tables
            .get(table)
            .map(|t| t.items.len())
            .ok_or_else(|| StoreError::table_not_found(table))
    }

    /// Returns every call received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    /// Forgets recorded calls and resets statistics.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
        self.stats.reset();
    }

    /// Round-trip counters.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Makes the next call fail with [`StoreError::Unavailable`].
    pub fn fail_next_call(&self, message: impl Into<String>) {
        *self.pending_failure.lock() = Some(message.into());
    }

    fn record(&self, call: StoreCall) -> StoreResult<()> {
        self.calls.lock().push(call);
        match self.pending_failure.lock().take() {
            Some(message) => Err(StoreError::unavailable(message)),
            None => Ok(()),
        }
    }

    fn with_table<R>(&self, table: &str, f: impl FnOnce(&Table) -> StoreResult<R>) -> StoreResult<R> {
        let tables = self.tables.read();
        let t = tables
            .get(table)
            .ok_or_else(|| StoreError::table_not_found(table))?;
        f(t)
    }

    fn with_table_mut<R>(
        &self,
        table: &str,
        f: impl FnOnce(&mut Table) -> StoreResult<R>,
    ) -> StoreResult<R> {
        let mut tables = self.tables.write();
        let t = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::table_not_found(table))?;
        f(t)
    }

    fn page_of(
        candidates: &[&Item],
        attributes: &[String],
        filters: &[Condition],
        start: Option<&ContinuationToken>,
        size: usize,
    ) -> StoreResult<ItemPage> {
        let (from, to) = window(candidates, attributes, start, size)?;
        let items = candidates[from..to]
            .iter()
            .filter(|item| matches_all(item, filters))
            .map(|item| (*item).clone())
            .collect();
        Ok(ItemPage {
            items,
            continuation: continuation_after(candidates, attributes, to),
        })
    }
}

impl StoreClient for InMemoryStore {
    fn get_item(&self, table: &str, key: &ItemKey) -> StoreResult<Option<Item>> {
        self.record(StoreCall::GetItem {
            table: table.to_string(),
        })?;
        self.stats.record_get_item();
        self.with_table(table, |t| {
            Ok(t.items.iter().find(|item| key.matches(item)).cloned())
        })
    }

    fn query_page(
        &self,
        request: &QueryRequest,
        start: Option<&ContinuationToken>,
    ) -> StoreResult<ItemPage> {
        self.record(StoreCall::QueryPage {
            table: request.table_name.clone(),
            index: request.index_name.clone(),
        })?;
        let size = request.page_size.unwrap_or(self.config.page_size);
        let page = self.with_table(&request.table_name, |t| {
            let (candidates, attributes) = t.query_candidates(request)?;
            Self::page_of(
                &candidates,
                &attributes,
                &request.filter_conditions,
                start,
                size,
            )
        })?;
        self.stats.record_query_page(page.items.len());
        Ok(page)
    }

    fn scan_page(
        &self,
        request: &ScanRequest,
        start: Option<&ContinuationToken>,
    ) -> StoreResult<ItemPage> {
        self.record(StoreCall::ScanPage {
            table: request.table_name.clone(),
        })?;
        let size = request.page_size.unwrap_or(self.config.page_size);
        let page = self.with_table(&request.table_name, |t| {
            let (candidates, attributes) = t.scan_candidates();
            Self::page_of(
                &candidates,
                &attributes,
                &request.filter_conditions,
                start,
                size,
            )
        })?;
        self.stats.record_scan_page(page.items.len());
        Ok(page)
    }

    fn count_page(
        &self,
        request: &CountRequest,
        start: Option<&ContinuationToken>,
    ) -> StoreResult<CountPage> {
        self.record(StoreCall::CountPage {
            table: request.table_name().to_string(),
        })?;
        self.stats.record_count_page();
        let size = self.config.count_page_size;
        self.with_table(request.table_name(), |t| {
            let (candidates, attributes, filters) = match request {
                CountRequest::Query(q) => {
                    let (c, a) = t.query_candidates(q)?;
                    (c, a, q.filter_conditions.as_slice())
                }
                CountRequest::Scan(s) => {
                    let (c, a) = t.scan_candidates();
                    (c, a, s.filter_conditions.as_slice())
                }
            };
            let (from, to) = window(&candidates, &attributes, start, size)?;
            let count = candidates[from..to]
                .iter()
                .filter(|item| matches_all(item, filters))
                .count() as u64;
            Ok(CountPage {
                count,
                continuation: continuation_after(&candidates, &attributes, to),
            })
        })
    }

    fn put_item(&self, table: &str, item: Item) -> StoreResult<()> {
        self.record(StoreCall::PutItem {
            table: table.to_string(),
        })?;
        self.with_table_mut(table, |t| t.upsert(item))?;
        self.stats.record_writes(1);
        Ok(())
    }

    fn delete_item(&self, table: &str, key: &ItemKey) -> StoreResult<()> {
        self.record(StoreCall::DeleteItem {
            table: table.to_string(),
        })?;
        self.with_table_mut(table, |t| {
            t.remove(key);
            Ok(())
        })?;
        self.stats.record_deletes(1);
        Ok(())
    }

    fn batch_put(&self, table: &str, items: Vec<Item>) -> StoreResult<()> {
        self.record(StoreCall::BatchPut {
            table: table.to_string(),
            items: items.len(),
        })?;
        let count = items.len();
        self.with_table_mut(table, |t| items.into_iter().try_for_each(|item| t.upsert(item)))?;
        self.stats.record_writes(count);
        Ok(())
    }

    fn batch_delete(&self, table: &str, keys: Vec<ItemKey>) -> StoreResult<()> {
        self.record(StoreCall::BatchDelete {
            table: table.to_string(),
            keys: keys.len(),
        })?;
        self.with_table_mut(table, |t| {
            keys.iter().for_each(|key| t.remove(key));
            Ok(())
        })?;
        self.stats.record_deletes(keys.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::KeyAttribute;
    use crate::pagination::PaginatedItems;
    use widerepo_codec::{AttributeValue, ComparisonOperator};

    fn s(v: &str) -> AttributeValue {
        AttributeValue::S(v.into())
    }

    fn n(v: i64) -> AttributeValue {
        AttributeValue::number(v)
    }

    fn track(user: &str, name: &str, plays: i64) -> Item {
        let mut item = Item::new();
        item.insert("user".into(), s(user));
        item.insert("name".into(), s(name));
        item.insert("plays".into(), n(plays));
        item
    }

    fn store(page_size: usize) -> InMemoryStore {
        let store = InMemoryStore::with_config(
            MemoryStoreConfig::new()
                .page_size(page_size)
                .count_page_size(page_size),
        );
        store
            .create_table(
                TableDefinition::new("playlists", "user")
                    .with_sort_key("name")
                    .with_index("by_plays", "plays"),
            )
            .unwrap();
        for (i, name) in ["e", "a", "d", "b", "c"].iter().enumerate() {
            store
                .put_item("playlists", track("alice", name, 10 - i as i64))
                .unwrap();
        }
        store.put_item("playlists", track("bob", "z", 1)).unwrap();
        store.clear_calls();
        store
    }

    fn query(range: Option<Condition>, forward: bool) -> QueryRequest {
        QueryRequest {
            table_name: "playlists".into(),
            index_name: None,
            partition: KeyAttribute::new("user", s("alice")),
            range_condition: range,
            filter_conditions: vec![],
            scan_forward: forward,
            page_size: None,
        }
    }

    fn names(items: &[Item]) -> Vec<String> {
        items
            .iter()
            .map(|i| i["name"].as_s().unwrap().to_string())
            .collect()
    }

    #[test]
    fn put_replaces_by_key() {
        let store = store(10);
        store.put_item("playlists", track("alice", "a", 99)).unwrap();
        assert_eq!(store.item_count("playlists").unwrap(), 6);

        let key = ItemKey::partition("user", s("alice")).with_sort("name", s("a"));
        let item = store.get_item("playlists", &key).unwrap().unwrap();
        assert_eq!(item["plays"], n(99));
    }

    #[test]
    fn query_orders_by_sort_key() {
        let store = store(10);
        let page = store.query_page(&query(None, true), None).unwrap();
        assert_eq!(names(&page.items), ["a", "b", "c", "d", "e"]);
        assert!(page.continuation.is_none());

        let page = store.query_page(&query(None, false), None).unwrap();
        assert_eq!(names(&page.items), ["e", "d", "c", "b", "a"]);
    }

    #[test]
    fn query_applies_range_condition() {
        let store = store(10);
        let range = Condition::new("name", ComparisonOperator::Gt, vec![s("c")]);
        let page = store.query_page(&query(Some(range), true), None).unwrap();
        assert_eq!(names(&page.items), ["d", "e"]);
    }

    #[test]
    fn query_rejects_non_key_operators() {
        let store = store(10);
        let range = Condition::new("name", ComparisonOperator::Ne, vec![s("c")]);
        assert!(matches!(
            store.query_page(&query(Some(range), true), None),
            Err(StoreError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn query_on_index_orders_numerically() {
        let store = store(10);
        let mut request = query(None, true);
        request.index_name = Some("by_plays".into());
        let page = store.query_page(&request, None).unwrap();
        assert_eq!(names(&page.items), ["c", "b", "d", "a", "e"]);
    }

    #[test]
    fn truncated_pages_carry_continuation() {
        let store = store(2);
        let first = store.query_page(&query(None, true), None).unwrap();
        assert_eq!(names(&first.items), ["a", "b"]);
        let token = first.continuation.unwrap();

        let second = store.query_page(&query(None, true), Some(&token)).unwrap();
        assert_eq!(names(&second.items), ["c", "d"]);

        let third = store
            .query_page(&query(None, true), second.continuation.as_ref())
            .unwrap();
        assert_eq!(names(&third.items), ["e"]);
        assert!(third.continuation.is_none());
    }

    #[test]
    fn paginated_items_follow_continuations_lazily() {
        let store = store(2);
        let mut items = PaginatedItems::query(&store, query(None, true));
        assert_eq!(items.pages_fetched(), 0);

        let first = items.next().unwrap().unwrap();
        assert_eq!(first["name"], s("a"));
        assert_eq!(items.pages_fetched(), 1);

        let rest: Vec<Item> = items.by_ref().map(Result::unwrap).collect();
        assert_eq!(names(&rest), ["b", "c", "d", "e"]);
        assert_eq!(items.pages_fetched(), 3);
    }

    #[test]
    fn scan_skips_empty_filtered_pages() {
        let store = store(1);
        let request = ScanRequest {
            table_name: "playlists".into(),
            filter_conditions: vec![Condition::eq("user", s("bob"))],
            page_size: None,
        };
        let found: Vec<Item> = PaginatedItems::scan(&store, request)
            .map(Result::unwrap)
            .collect();
        assert_eq!(names(&found), ["z"]);
        assert_eq!(store.stats().scan_pages, 6);
    }

    #[test]
    fn count_is_truncated_per_page() {
        let store = store(4);
        let request = CountRequest::Scan(ScanRequest {
            table_name: "playlists".into(),
            filter_conditions: vec![],
            page_size: None,
        });
        let first = store.count_page(&request, None).unwrap();
        assert_eq!(first.count, 4);
        let second = store
            .count_page(&request, first.continuation.as_ref())
            .unwrap();
        assert_eq!(second.count, 2);
        assert!(second.continuation.is_none());
    }

    #[test]
    fn calls_are_recorded_in_order() {
        let store = store(10);
        let key = ItemKey::partition("user", s("alice")).with_sort("name", s("a"));
        store.get_item("playlists", &key).unwrap();
        store.query_page(&query(None, true), None).unwrap();
        store.delete_item("playlists", &key).unwrap();

        assert_eq!(
            store.calls(),
            vec![
                StoreCall::GetItem {
                    table: "playlists".into()
                },
                StoreCall::QueryPage {
                    table: "playlists".into(),
                    index: None
                },
                StoreCall::DeleteItem {
                    table: "playlists".into()
                },
            ]
        );
        assert_eq!(store.item_count("playlists").unwrap(), 5);
    }

    #[test]
    fn injected_failure_hits_next_call_only() {
        let store = store(10);
        store.fail_next_call("throttled");
        let key = ItemKey::partition("user", s("alice")).with_sort("name", s("a"));
        assert!(matches!(
            store.get_item("playlists", &key),
            Err(StoreError::Unavailable { .. })
        ));
        assert!(store.get_item("playlists", &key).unwrap().is_some());
    }

    #[test]
    fn missing_table() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.put_item("nope", Item::new()),
            Err(StoreError::TableNotFound { .. })
        ));
    }

    #[test]
    fn batch_operations() {
        let store = store(10);
        store
            .batch_put(
                "playlists",
                vec![track("carol", "x", 1), track("carol", "y", 2)],
            )
            .unwrap();
        assert_eq!(store.item_count("playlists").unwrap(), 8);

        store
            .batch_delete(
                "playlists",
                vec![
                    ItemKey::partition("user", s("carol")).with_sort("name", s("x")),
                    ItemKey::partition("user", s("carol")).with_sort("name", s("y")),
                ],
            )
            .unwrap();
        assert_eq!(store.item_count("playlists").unwrap(), 6);
        assert_eq!(store.stats().writes, 2);
        assert_eq!(store.stats().deletes, 2);
    }

    proptest::proptest! {
        #[test]
        fn page_size_does_not_change_results(page_size in 1usize..8, threshold in 0i64..12, forward: bool) {
            let filter = Condition::new("plays", ComparisonOperator::Ge, vec![n(threshold)]);
            let request = |size: usize| {
                let mut request = query(None, forward);
                request.filter_conditions = vec![filter.clone()];
                request.page_size = Some(size);
                request
            };

            let small = store(page_size);
            let paged: Vec<Item> = PaginatedItems::query(&small, request(page_size))
                .collect::<StoreResult<_>>()
                .unwrap();
            let whole: Vec<Item> = PaginatedItems::query(&small, request(100))
                .collect::<StoreResult<_>>()
                .unwrap();
            proptest::prop_assert_eq!(names(&paged), names(&whole));

            let mut total = 0;
            let mut start = None;
            loop {
                let page = small
                    .count_page(&CountRequest::Query(request(page_size)), start.as_ref())
                    .unwrap();
                total += page.count;
                start = page.continuation;
                if start.is_none() {
                    break;
                }
            }
            proptest::prop_assert_eq!(total, whole.len() as u64);
        }
    }
}
