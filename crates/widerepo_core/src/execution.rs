//! Result shaping.
//!
//! Strategies consume a lazy, forward-only result sequence in which every
//! `next()` may perform store I/O. They stop pulling as soon as the shape
//! they produce is complete.
//!
//! The store only offers forward continuation, so offsets are emulated by
//! reading and discarding results: a page at `offset` costs
//! `offset + page_size` reads.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Which slice of the results to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    /// Results to skip.
    pub offset: usize,
    /// Results per page.
    pub page_size: usize,
}

impl PageRequest {
    /// Creates a page request.
    #[must_use]
    pub const fn new(offset: usize, page_size: usize) -> Self {
        Self { offset, page_size }
    }

    /// The `index`-th page of `page_size` results (zero-based).
    #[must_use]
    pub const fn of(index: usize, page_size: usize) -> Self {
        Self::new(index.saturating_mul(page_size), page_size)
    }

    fn validate(self) -> CoreResult<Self> {
        if self.page_size == 0 {
            return Err(CoreError::invalid_argument("page size must be at least 1"));
        }
        Ok(self)
    }

    /// Results this page may hold under `limit`.
    fn capacity(self, limit: Option<usize>) -> usize {
        match limit {
            Some(limit) => self.page_size.min(limit.saturating_sub(self.offset)),
            None => self.page_size,
        }
    }
}

/// A page of results with the total number of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Results in this page.
    pub content: Vec<T>,
    /// The page that was requested.
    pub request: PageRequest,
    /// Total number of results, capped by the method's limit.
    pub total: u64,
}

impl<T> Page<T> {
    fn empty(request: PageRequest) -> Self {
        Self {
            content: Vec::new(),
            request,
            total: 0,
        }
    }

    /// Whether results follow this page.
    pub fn has_next(&self) -> bool {
        ((self.request.offset + self.content.len()) as u64) < self.total
    }

    /// Number of pages of this size needed to hold every result.
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.request.page_size.max(1) as u64)
    }

    /// Maps the page content.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            request: self.request,
            total: self.total,
        }
    }
}

/// A page of results that only knows whether more follow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice<T> {
    /// Results in this slice.
    pub content: Vec<T>,
    /// The page that was requested.
    pub request: PageRequest,
    /// Whether more results follow.
    pub has_more: bool,
}

impl<T> Slice<T> {
    fn empty(request: PageRequest) -> Self {
        Self {
            content: Vec::new(),
            request,
            has_more: false,
        }
    }

    /// Maps the slice content.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Slice<U> {
        Slice {
            content: self.content.into_iter().map(f).collect(),
            request: self.request,
            has_more: self.has_more,
        }
    }
}

/// The result of a query method, shaped by its [`crate::ResultMode`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", content = "result", rename_all = "snake_case")]
pub enum QueryOutput<T> {
    /// Exactly one entity.
    Single(T),
    /// At most one entity.
    Optional(Option<T>),
    /// Every matching entity, up to the limit.
    List(Vec<T>),
    /// A page with a total count.
    Page(Page<T>),
    /// A page with a look-ahead flag.
    Slice(Slice<T>),
    /// The entity that was deleted.
    Deleted(T),
    /// Number of matching entities.
    Count(u64),
}

impl<T> QueryOutput<T> {
    /// The entities carried by this output, in result order.
    pub fn into_entities(self) -> Vec<T> {
        match self {
            QueryOutput::Single(entity) | QueryOutput::Deleted(entity) => vec![entity],
            QueryOutput::Optional(entity) => entity.into_iter().collect(),
            QueryOutput::List(entities) => entities,
            QueryOutput::Page(page) => page.content,
            QueryOutput::Slice(slice) => slice.content,
            QueryOutput::Count(_) => Vec::new(),
        }
    }
}

/// Materializes exactly one result.
pub fn single<T>(method: &str, results: impl Iterator<Item = CoreResult<T>>) -> CoreResult<T> {
    let mut all = results.collect::<CoreResult<Vec<T>>>()?;
    match (all.pop(), all.len()) {
        (Some(entity), 0) => Ok(entity),
        (Some(_), rest) => Err(CoreError::non_unique(method, rest + 1)),
        (None, _) => Err(CoreError::not_found(method)),
    }
}

/// Returns the first result, if any.
pub fn single_or_none<T>(
    mut results: impl Iterator<Item = CoreResult<T>>,
) -> CoreResult<Option<T>> {
    results.next().transpose()
}

/// Materializes every result, stopping after `limit`.
pub fn collection<T>(
    results: impl Iterator<Item = CoreResult<T>>,
    limit: Option<usize>,
) -> CoreResult<Vec<T>> {
    match limit {
        Some(limit) => results.take(limit).collect(),
        None => results.collect(),
    }
}

/// Reads one page, then calls `count` for the total.
///
/// The count is skipped when the results end before `offset`.
pub fn paged<T>(
    mut results: impl Iterator<Item = CoreResult<T>>,
    request: PageRequest,
    limit: Option<usize>,
    count: impl FnOnce() -> CoreResult<u64>,
) -> CoreResult<Page<T>> {
    let request = request.validate()?;
    let Some(content) = skip_take(&mut results, request, limit)? else {
        return Ok(Page::empty(request));
    };
    let total = count()?;
    let total = limit.map_or(total, |limit| total.min(limit as u64));
    Ok(Page {
        content,
        request,
        total,
    })
}

/// Reads one page plus one look-ahead result.
pub fn sliced<T>(
    mut results: impl Iterator<Item = CoreResult<T>>,
    request: PageRequest,
    limit: Option<usize>,
) -> CoreResult<Slice<T>> {
    let request = request.validate()?;
    let Some(content) = skip_take(&mut results, request, limit)? else {
        return Ok(Slice::empty(request));
    };
    let reached_limit = limit.is_some_and(|limit| request.offset + content.len() >= limit);
    let has_more = !reached_limit && results.next().transpose()?.is_some();
    Ok(Slice {
        content,
        request,
        has_more,
    })
}

/// Skips `offset` results and collects the page. `None` when the results
/// end before `offset`.
fn skip_take<T>(
    results: &mut impl Iterator<Item = CoreResult<T>>,
    request: PageRequest,
    limit: Option<usize>,
) -> CoreResult<Option<Vec<T>>> {
    for _ in 0..request.offset {
        match results.next() {
            Some(result) => {
                result?;
            }
            None => return Ok(None),
        }
    }
    let content = results
        .by_ref()
        .take(request.capacity(limit))
        .collect::<CoreResult<Vec<T>>>()?;
    Ok(Some(content))
}
