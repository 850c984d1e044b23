//! Repository configuration.

/// Opt-ins for the expensive scan path.
///
/// A scan is never issued implicitly. Repositories opt in as a whole via
/// [`RepositoryConfig::scan`]; individual query methods opt in via
/// [`crate::QueryMethod::enable_scan`]. The effective permission for a call
/// is the union of both levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanPolicy {
    /// Whether unplannable queries may fall back to a scan.
    pub scan_enabled: bool,

    /// Whether totals for paged queries may be computed with a scan count.
    pub scan_count_enabled: bool,
}

impl ScanPolicy {
    /// A policy with every scan disabled.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            scan_enabled: false,
            scan_count_enabled: false,
        }
    }

    /// A policy with scans and scan counts enabled.
    #[must_use]
    pub const fn enabled() -> Self {
        Self {
            scan_enabled: true,
            scan_count_enabled: true,
        }
    }

    /// Sets whether scans are enabled.
    #[must_use]
    pub const fn scan_enabled(mut self, value: bool) -> Self {
        self.scan_enabled = value;
        self
    }

    /// Sets whether scan counts are enabled.
    #[must_use]
    pub const fn scan_count_enabled(mut self, value: bool) -> Self {
        self.scan_count_enabled = value;
        self
    }

    /// Combines a repository-level policy with a method-level one.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            scan_enabled: self.scan_enabled || other.scan_enabled,
            scan_count_enabled: self.scan_count_enabled || other.scan_count_enabled,
        }
    }
}

/// Configuration for a repository.
#[derive(Debug, Clone, Default)]
pub struct RepositoryConfig {
    /// Prefix prepended to every table name (e.g. per environment).
    pub table_name_prefix: Option<String>,

    /// Items requested per store round-trip; the store default when `None`.
    pub fetch_size: Option<usize>,

    /// Repository-wide scan opt-ins.
    pub scan: ScanPolicy,
}

impl RepositoryConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the table name prefix.
    #[must_use]
    pub fn table_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_name_prefix = Some(prefix.into());
        self
    }

    /// Sets the number of items requested per round-trip.
    #[must_use]
    pub const fn fetch_size(mut self, size: usize) -> Self {
        self.fetch_size = Some(size);
        self
    }

    /// Sets the repository-wide scan policy.
    #[must_use]
    pub const fn scan(mut self, policy: ScanPolicy) -> Self {
        self.scan = policy;
        self
    }

    /// Resolves the physical table name for an entity's table.
    #[must_use]
    pub fn resolve_table_name(&self, table: &str) -> String {
        match &self.table_name_prefix {
            Some(prefix) => format!("{prefix}{table}"),
            None => table.to_string(),
        }
    }
}
