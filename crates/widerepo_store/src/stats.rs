//! Store call statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Round-trip counters for a store client.
///
/// All counters are atomic and can be read while calls are in progress.
#[derive(Debug, Default)]
pub struct StoreStats {
    get_items: AtomicU64,
    query_pages: AtomicU64,
    scan_pages: AtomicU64,
    count_pages: AtomicU64,
    writes: AtomicU64,
    deletes: AtomicU64,
    items_returned: AtomicU64,
}

impl StoreStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_get_item(&self) {
        self.get_items.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_query_page(&self, items: usize) {
        self.query_pages.fetch_add(1, Ordering::Relaxed);
        self.items_returned.fetch_add(items as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_scan_page(&self, items: usize) {
        self.scan_pages.fetch_add(1, Ordering::Relaxed);
        self.items_returned.fetch_add(items as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_count_page(&self) {
        self.count_pages.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_writes(&self, count: usize) {
        self.writes.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_deletes(&self, count: usize) {
        self.deletes.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Returns a point-in-time copy of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            get_items: self.get_items.load(Ordering::Relaxed),
            query_pages: self.query_pages.load(Ordering::Relaxed),
            scan_pages: self.scan_pages.load(Ordering::Relaxed),
            count_pages: self.count_pages.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            items_returned: self.items_returned.load(Ordering::Relaxed),
        }
    }

    /// Resets all counters to zero.
    pub fn reset(&self) {
        self.get_items.store(0, Ordering::Relaxed);
        self.query_pages.store(0, Ordering::Relaxed);
        self.scan_pages.store(0, Ordering::Relaxed);
        self.count_pages.store(0, Ordering::Relaxed);
        self.writes.store(0, Ordering::Relaxed);
        self.deletes.store(0, Ordering::Relaxed);
        self.items_returned.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time copy of [`StoreStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Single-item lookups.
    pub get_items: u64,
    /// Query pages fetched.
    pub query_pages: u64,
    /// Scan pages fetched.
    pub scan_pages: u64,
    /// Count pages fetched.
    pub count_pages: u64,
    /// Items written.
    pub writes: u64,
    /// Items deleted.
    pub deletes: u64,
    /// Items returned by query and scan pages.
    pub items_returned: u64,
}

impl StatsSnapshot {
    /// Total read round-trips of any kind.
    #[must_use]
    pub fn read_round_trips(&self) -> u64 {
        self.get_items + self.query_pages + self.scan_pages + self.count_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_and_reset() {
        let stats = StoreStats::new();
        stats.record_get_item();
        stats.record_query_page(3);
        stats.record_scan_page(2);
        stats.record_count_page();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.items_returned, 5);
        assert_eq!(snapshot.read_round_trips(), 4);

        stats.reset();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }
}
