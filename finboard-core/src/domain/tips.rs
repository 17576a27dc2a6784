//! Restaurant-billing rows ("tips" dataset).

use serde::{Deserialize, Serialize};

/// Column names of the tips dataset, in export order.
pub const TIPS_COLUMNS: [&str; 5] = ["total_bill", "tip", "size", "day", "time"];

/// One validated bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipRecord {
    pub total_bill: f64,
    pub tip: f64,
    pub size: u32,
    pub day: String,
    pub time: String,
}

/// Validated, non-empty set of bills. Row order carries no meaning but is
/// kept stable for display and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularRecord {
    rows: Vec<TipRecord>,
}

impl TabularRecord {
    pub(crate) fn new(rows: Vec<TipRecord>) -> Self {
        debug_assert!(!rows.is_empty());
        Self { rows }
    }

    pub fn rows(&self) -> &[TipRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> &[TipRecord] {
        &self.rows[..n.min(self.rows.len())]
    }
}
