//! Persistence boundaries consumed by the recurrence engine.
//!
//! The engine never talks to a concrete backend; it is constructed with
//! trait objects so tests and callers can substitute their own stores.

pub mod json_backend;
pub mod memory;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::errors::Result;
use crate::ledger::{CategoryKind, LedgerEntry, RecurrenceTemplate};

/// Read/advance access to recurrence templates.
pub trait TemplateStore: Send + Sync {
    /// Returns one snapshot of templates that may be due for the owner as of
    /// the reference date. Implementations may over-approximate; the engine
    /// re-applies the authoritative due predicate on the snapshot.
    fn list_due(&self, owner_id: Uuid, as_of: NaiveDate) -> Result<Vec<RecurrenceTemplate>>;

    /// Compare-and-swap advancement of a template's schedule cursor.
    ///
    /// Persists `next` only when the stored cursor still equals `expected`
    /// (with an unset cursor comparing as the template's start date) and
    /// returns whether the swap happened. A `false` return means another
    /// invocation already claimed the occurrence.
    fn advance_cursor(&self, template_id: Uuid, expected: NaiveDate, next: NaiveDate)
        -> Result<bool>;

    fn insert(&self, template: RecurrenceTemplate) -> Result<()>;
    fn get(&self, template_id: Uuid) -> Result<Option<RecurrenceTemplate>>;
    fn remove(&self, template_id: Uuid) -> Result<()>;
    fn set_paused(&self, template_id: Uuid, paused: bool) -> Result<()>;
}

/// Category metadata resolution, keyed by owner to keep queries scoped.
pub trait CategoryLookup: Send + Sync {
    fn category_kind(&self, owner_id: Uuid, category_id: Uuid) -> Result<Option<CategoryKind>>;
}

/// Append-only sink for materialized journal entries.
pub trait LedgerSink: Send + Sync {
    fn append(&self, entry: LedgerEntry) -> Result<Uuid>;
    fn entries_for(&self, owner_id: Uuid) -> Result<Vec<LedgerEntry>>;
}

pub use json_backend::JsonStore;
pub use memory::MemoryStore;
