//! Query method descriptions.

use crate::config::ScanPolicy;
use crate::criteria::{Criteria, Sort};
use crate::error::CoreResult;
use crate::execution::PageRequest;
use crate::metadata::EntityMetadata;
use crate::predicate::PredicateTree;
use serde::{Deserialize, Serialize};
use widerepo_codec::Value;

/// How the results of a query method are shaped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultMode {
    /// Exactly one entity.
    Single,
    /// At most one entity.
    SingleOrNone,
    /// All matching entities.
    #[default]
    Collection,
    /// One page plus the total count.
    Paged,
    /// One page plus whether more follow.
    Sliced,
    /// Delete the single matching entity and return it.
    Delete,
    /// Number of matching entities.
    Count,
}

/// A derived query method: predicate, ordering, limit and result shape.
///
/// # Example
///
/// ```rust
/// use widerepo_core::{Part, PartKind, PredicateTree, QueryMethod, ResultMode, Sort};
///
/// // find_top_10_by_user_and_name_starting_with_order_by_name_desc
/// let method = QueryMethod::new(
///     "find_top_10_by_user_and_name_starting_with_order_by_name_desc",
///     PredicateTree::and([Part::eq("user"), Part::new("name", PartKind::StartingWith)]),
/// )
/// .order_by(Sort::desc("name"))
/// .limit(10)
/// .returning(ResultMode::Collection);
///
/// assert_eq!(method.tree().argument_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryMethod {
    name: String,
    tree: PredicateTree,
    sorts: Vec<Sort>,
    limit: Option<usize>,
    mode: ResultMode,
    scan: ScanPolicy,
}

impl QueryMethod {
    /// Creates a collection-returning method.
    pub fn new(name: impl Into<String>, tree: PredicateTree) -> Self {
        Self {
            name: name.into(),
            tree,
            sorts: Vec::new(),
            limit: None,
            mode: ResultMode::default(),
            scan: ScanPolicy::disabled(),
        }
    }

    /// Adds a sort order.
    #[must_use]
    pub fn order_by(mut self, sort: Sort) -> Self {
        self.sorts.push(sort);
        self
    }

    /// Caps the number of results.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the result shape.
    #[must_use]
    pub const fn returning(mut self, mode: ResultMode) -> Self {
        self.mode = mode;
        self
    }

    /// Allows this method to fall back to a scan.
    #[must_use]
    pub const fn enable_scan(mut self) -> Self {
        self.scan.scan_enabled = true;
        self
    }

    /// Allows this method to count with a scan.
    #[must_use]
    pub const fn enable_scan_count(mut self) -> Self {
        self.scan.scan_count_enabled = true;
        self
    }

    /// Method name, used in errors and logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The predicate.
    pub fn tree(&self) -> &PredicateTree {
        &self.tree
    }

    /// Requested sort orders.
    pub fn sorts(&self) -> &[Sort] {
        &self.sorts
    }

    /// Result cap.
    pub fn max_results(&self) -> Option<usize> {
        self.limit
    }

    /// Result shape.
    pub fn mode(&self) -> ResultMode {
        self.mode
    }

    /// Method-level scan opt-ins.
    pub fn scan_policy(&self) -> ScanPolicy {
        self.scan
    }

    /// Builds the criteria for one invocation.
    pub fn criteria<'m>(
        &self,
        metadata: &'m dyn EntityMetadata,
        args: &[Value],
    ) -> CoreResult<Criteria<'m>> {
        let mut criteria = Criteria::new(metadata);
        self.tree.apply(&mut criteria, args)?;
        for sort in &self.sorts {
            criteria.with_sort(sort.clone());
        }
        Ok(criteria)
    }
}

/// Arguments of one query method invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Vec<Value>,
    page: Option<PageRequest>,
}

impl Arguments {
    /// Positional predicate arguments.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values, page: None }
    }

    /// No arguments.
    pub fn none() -> Self {
        Self::default()
    }

    /// Adds the page to read for paged and sliced methods.
    #[must_use]
    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = Some(page);
        self
    }

    /// Positional predicate arguments.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Requested page.
    pub fn page(&self) -> Option<PageRequest> {
        self.page
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}
