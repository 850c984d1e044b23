//! Count execution.
//!
//! Count responses may be truncated: each round-trip returns a partial
//! count and, when more remains, a continuation token. Counting loops until
//! no token comes back.

use crate::error::{CoreError, CoreResult};
use crate::planner::Plan;
use tracing::{debug, trace};
use widerepo_store::{ContinuationToken, CountRequest, StoreClient};

/// Sums every partial count of `request`.
pub fn count_all(store: &dyn StoreClient, request: &CountRequest) -> CoreResult<u64> {
    let mut total: u64 = 0;
    let mut start: Option<ContinuationToken> = None;
    let mut round_trips = 0usize;

    loop {
        let page = store.count_page(request, start.as_ref())?;
        round_trips += 1;
        total = total.saturating_add(page.count);
        trace!(
            table = request.table_name(),
            partial = page.count,
            total,
            "count page"
        );
        match page.continuation {
            Some(token) => start = Some(token),
            None => break,
        }
    }

    debug!(table = request.table_name(), total, round_trips, "count complete");
    Ok(total)
}

/// Counts the items `plan` reads.
pub fn count_plan(store: &dyn StoreClient, plan: &Plan) -> CoreResult<u64> {
    match plan {
        Plan::Lookup { table_name, key } => Ok(u64::from(store.get_item(table_name, key)?.is_some())),
        Plan::Unplannable => Err(CoreError::unsupported_operation(
            "cannot count an unplannable request",
        )),
        plan => match plan.count_request() {
            Some(request) => count_all(store, &request),
            None => Ok(0),
        },
    }
}
