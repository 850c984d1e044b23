//! Lazy, forward-only result sequences.

use crate::client::{ContinuationToken, ItemPage, QueryRequest, ScanRequest, StoreClient};
use crate::error::StoreResult;
use std::collections::VecDeque;
use widerepo_codec::Item;

#[derive(Debug)]
enum PageSource {
    Query(QueryRequest),
    Scan(ScanRequest),
}

/// Items of a query or scan, fetched a page at a time as iteration advances.
///
/// Each call to `next` that drains the local buffer performs a store
/// round-trip. The sequence cannot be restarted; an error ends it.
pub struct PaginatedItems<'a> {
    client: &'a dyn StoreClient,
    source: PageSource,
    buffer: VecDeque<Item>,
    continuation: Option<ContinuationToken>,
    exhausted: bool,
    pages_fetched: usize,
}

impl<'a> PaginatedItems<'a> {
    /// Lazily runs a range query.
    pub fn query(client: &'a dyn StoreClient, request: QueryRequest) -> Self {
        Self::new(client, PageSource::Query(request))
    }

    /// Lazily runs a scan.
    pub fn scan(client: &'a dyn StoreClient, request: ScanRequest) -> Self {
        Self::new(client, PageSource::Scan(request))
    }

    fn new(client: &'a dyn StoreClient, source: PageSource) -> Self {
        Self {
            client,
            source,
            buffer: VecDeque::new(),
            continuation: None,
            exhausted: false,
            pages_fetched: 0,
        }
    }

    /// Number of round-trips performed so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    fn fetch_page(&mut self) -> StoreResult<ItemPage> {
        let start = self.continuation.as_ref();
        let page = match &self.source {
            PageSource::Query(request) => self.client.query_page(request, start)?,
            PageSource::Scan(request) => self.client.scan_page(request, start)?,
        };
        self.pages_fetched += 1;
        tracing::trace!(
            page = self.pages_fetched,
            items = page.items.len(),
            truncated = page.continuation.is_some(),
            "fetched result page"
        );
        Ok(page)
    }
}

impl Iterator for PaginatedItems<'_> {
    type Item = StoreResult<Item>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if self.exhausted {
                return None;
            }
            match self.fetch_page() {
                Ok(page) => {
                    self.buffer.extend(page.items);
                    self.continuation = page.continuation;
                    self.exhausted = self.continuation.is_none();
                }
                Err(e) => {
                    self.exhausted = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl std::fmt::Debug for PaginatedItems<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginatedItems")
            .field("source", &self.source)
            .field("buffered", &self.buffer.len())
            .field("exhausted", &self.exhausted)
            .field("pages_fetched", &self.pages_fetched)
            .finish()
    }
}
