//! Per-session operator state.

use chrono::NaiveDate;

/// Default quantity for a freshly created line item.
pub const DEFAULT_QUANTITY: i64 = 1;

/// State accumulated while the operator scans, owned by the console.
///
/// `last_element_id` tracks the focused item: the most recently created or
/// fetched row, and the implicit target of the next multiplier or comment
/// scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub last_provider: Option<String>,
    pub last_weight: f64,
    pub last_element_id: Option<u64>,
    pub filter_date: Option<NaiveDate>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the focused item and provider when the table is cleared. The
    /// scale weight and date filter survive a clear.
    pub fn reset_counters(&mut self) {
        self.last_provider = None;
        self.last_element_id = None;
    }
}
