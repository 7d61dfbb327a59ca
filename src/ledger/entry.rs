use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One concrete, immutable journal row. The engine appends these when a
/// recurring template comes due; nothing in this crate mutates them after.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category_id: Uuid,
    /// Signed amount: negative for expense categories, positive for income.
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl LedgerEntry {
    pub fn new(
        owner_id: Uuid,
        category_id: Uuid,
        amount: f64,
        date: NaiveDate,
        note: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            category_id,
            amount,
            date,
            note,
        }
    }
}
