//! # WideRepo Store
//!
//! Store client interface and implementations for WideRepo.
//!
//! This crate is the boundary between the query engine and a partitioned,
//! wide-column store. The engine only ever talks to a [`StoreClient`]; all
//! network I/O, retries and timeouts live behind it.
//!
//! ## Design Principles
//!
//! - One trait method is one round-trip
//! - Query, scan and count responses may be truncated and carry a
//!   [`ContinuationToken`]
//! - [`PaginatedItems`] turns truncated pages into a lazy, forward-only
//!   sequence; iterating it performs I/O
//! - Clients must be `Send + Sync`
//!
//! ## Available Clients
//!
//! - [`InMemoryStore`] - For testing and local tooling
//!
//! ## Example
//!
//! ```rust
//! use widerepo_codec::{AttributeValue, Item};
//! use widerepo_store::{
//!     InMemoryStore, KeyAttribute, PaginatedItems, QueryRequest, StoreClient, TableDefinition,
//! };
//!
//! let store = InMemoryStore::new();
//! store.create_table(TableDefinition::new("events", "stream").with_sort_key("seq")).unwrap();
//! for seq in 0..3 {
//!     let mut item = Item::new();
//!     item.insert("stream".into(), AttributeValue::from("orders"));
//!     item.insert("seq".into(), AttributeValue::number(seq));
//!     store.put_item("events", item).unwrap();
//! }
//!
//! let request = QueryRequest {
//!     table_name: "events".into(),
//!     index_name: None,
//!     partition: KeyAttribute::new("stream", AttributeValue::from("orders")),
//!     range_condition: None,
//!     filter_conditions: vec![],
//!     scan_forward: false,
//!     page_size: Some(1),
//! };
//! let seqs: Vec<_> = PaginatedItems::query(&store, request)
//!     .map(|item| item.unwrap()["seq"].to_i64().unwrap())
//!     .collect();
//! assert_eq!(seqs, vec![2, 1, 0]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod error;
mod eval;
mod memory;
mod pagination;
mod stats;

pub use client::{
    ContinuationToken, CountPage, CountRequest, ItemKey, ItemPage, KeyAttribute, QueryRequest,
    ScanRequest, StoreClient,
};
pub use error::{StoreError, StoreResult};
pub use eval::{compare_attributes, matches, matches_all};
pub use memory::{InMemoryStore, LocalIndex, MemoryStoreConfig, StoreCall, TableDefinition};
pub use pagination::PaginatedItems;
pub use stats::{StatsSnapshot, StoreStats};
