use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Categorises ledger activity and determines the sign of generated amounts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub kind: CategoryKind,
}

impl Category {
    pub fn new(owner_id: Uuid, name: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into(),
            kind,
        }
    }
}

/// Supported category types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CategoryKind {
    Income,
    Expense,
}

impl CategoryKind {
    /// Parses a stored type string, case-insensitively.
    pub fn parse(raw: &str) -> Option<CategoryKind> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "income" => Some(CategoryKind::Income),
            "expense" => Some(CategoryKind::Expense),
            _ => None,
        }
    }

    /// Applies this kind's sign convention to an unsigned magnitude.
    pub fn signed_amount(&self, magnitude: f64) -> f64 {
        match self {
            CategoryKind::Expense => -magnitude.abs(),
            CategoryKind::Income => magnitude.abs(),
        }
    }
}
