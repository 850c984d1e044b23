//! # WideRepo Core
//!
//! Query planning and execution engine for WideRepo repositories.
//!
//! This crate turns declared data-access methods into the cheapest access
//! path a partitioned wide-column store offers:
//! - **Lookup**: a single-item fetch by primary key
//! - **Range query**: partition equality plus one bounded sort key condition
//! - **Scan**: a full-table read with filters, only when explicitly enabled
//!
//! ## Pipeline
//!
//! ```text
//! PredicateTree ──► Criteria ──► Planner ──► Plan ──► StoreClient ──► shaping
//!                   (compiled     (lookup /           (lazy pages)     (single, list,
//!                    conditions)   range / scan)                        page, slice, count)
//! ```
//!
//! Planning is deterministic and happens before any store call, so
//! unsupported requests and missing scan opt-ins fail without I/O.
//!
//! ## Example
//!
//! ```rust
//! use widerepo_codec::Value;
//! use widerepo_core::{Criteria, Plan, Planner, StaticEntityMetadata};
//!
//! let users = StaticEntityMetadata::new("users", "id");
//! let mut criteria = Criteria::new(&users);
//! criteria.with_equals("id", Value::from("u1")).unwrap();
//!
//! let plan = Planner::new(&users, "users").plan(&criteria).unwrap();
//! assert!(matches!(plan, Plan::Lookup { .. }));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod compiler;
mod config;
mod count;
mod criteria;
pub mod entity;
mod error;
mod execution;
mod metadata;
mod method;
mod planner;
mod predicate;
mod repository;

pub use compiler::ConditionCompiler;
pub use config::{RepositoryConfig, ScanPolicy};
pub use count::{count_all, count_plan};
pub use criteria::{Criteria, Direction, Sort};
pub use entity::Entity;
pub use error::{CoreError, CoreResult};
pub use execution::{
    collection, paged, single, single_or_none, sliced, Page, PageRequest, QueryOutput, Slice,
};
pub use metadata::{table_definition, EntityMetadata, StaticEntityMetadata};
pub use method::{Arguments, QueryMethod, ResultMode};
pub use planner::{Plan, Planner, SCAN_COUNT_REMEDY, SCAN_REMEDY};
pub use predicate::{Part, PartKind, PredicateTree};
pub use repository::Repository;

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
