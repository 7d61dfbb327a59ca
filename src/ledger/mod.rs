//! Recurrence domain models: templates, generated entries, and cadence math.

pub mod cadence;
pub mod category;
pub mod entry;
pub mod template;

pub use cadence::Cadence;
pub use category::{Category, CategoryKind};
pub use entry::LedgerEntry;
pub use template::RecurrenceTemplate;
