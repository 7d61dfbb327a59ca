use std::{
    collections::HashMap,
    sync::Mutex,
};

use chrono::NaiveDate;
use uuid::Uuid;

use super::{CategoryLookup, LedgerSink, TemplateStore};
use crate::errors::{EngineError, Result};
use crate::ledger::{Category, CategoryKind, LedgerEntry, RecurrenceTemplate};

/// In-process store backing all three engine boundaries.
///
/// Interior mutability keeps the trait surface `&self`, matching what a
/// database-backed implementation would expose. The mutex also gives the
/// cursor compare-and-swap its required per-template atomicity.
#[derive(Default)]
pub struct MemoryStore {
    templates: Mutex<HashMap<Uuid, RecurrenceTemplate>>,
    categories: Mutex<HashMap<Uuid, Category>>,
    entries: Mutex<Vec<LedgerEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_category(&self, category: Category) -> Uuid {
        let id = category.id;
        self.categories.lock().unwrap().insert(id, category);
        id
    }

    pub fn template_count(&self) -> usize {
        self.templates.lock().unwrap().len()
    }
}

impl TemplateStore for MemoryStore {
    fn list_due(&self, owner_id: Uuid, as_of: NaiveDate) -> Result<Vec<RecurrenceTemplate>> {
        let templates = self.templates.lock().unwrap();
        let mut due: Vec<RecurrenceTemplate> = templates
            .values()
            .filter(|t| t.owner_id == owner_id && t.is_due(as_of))
            .cloned()
            .collect();
        due.sort_by_key(|t| (t.cursor(), t.id));
        Ok(due)
    }

    fn advance_cursor(
        &self,
        template_id: Uuid,
        expected: NaiveDate,
        next: NaiveDate,
    ) -> Result<bool> {
        let mut templates = self.templates.lock().unwrap();
        let template = templates
            .get_mut(&template_id)
            .ok_or(EngineError::TemplateNotFound(template_id))?;
        if template.cursor() != expected {
            return Ok(false);
        }
        template.next_run_date = Some(next);
        Ok(true)
    }

    fn insert(&self, template: RecurrenceTemplate) -> Result<()> {
        self.templates
            .lock()
            .unwrap()
            .insert(template.id, template);
        Ok(())
    }

    fn get(&self, template_id: Uuid) -> Result<Option<RecurrenceTemplate>> {
        Ok(self.templates.lock().unwrap().get(&template_id).cloned())
    }

    fn remove(&self, template_id: Uuid) -> Result<()> {
        self.templates
            .lock()
            .unwrap()
            .remove(&template_id)
            .map(|_| ())
            .ok_or(EngineError::TemplateNotFound(template_id))
    }

    fn set_paused(&self, template_id: Uuid, paused: bool) -> Result<()> {
        let mut templates = self.templates.lock().unwrap();
        let template = templates
            .get_mut(&template_id)
            .ok_or(EngineError::TemplateNotFound(template_id))?;
        template.is_paused = paused;
        Ok(())
    }
}

impl CategoryLookup for MemoryStore {
    fn category_kind(&self, owner_id: Uuid, category_id: Uuid) -> Result<Option<CategoryKind>> {
        let categories = self.categories.lock().unwrap();
        Ok(categories
            .get(&category_id)
            .filter(|c| c.owner_id == owner_id)
            .map(|c| c.kind))
    }
}

impl LedgerSink for MemoryStore {
    fn append(&self, entry: LedgerEntry) -> Result<Uuid> {
        let id = entry.id;
        self.entries.lock().unwrap().push(entry);
        Ok(id)
    }

    fn entries_for(&self, owner_id: Uuid) -> Result<Vec<LedgerEntry>> {
        let entries = self.entries.lock().unwrap();
        let mut owned: Vec<LedgerEntry> = entries
            .iter()
            .filter(|e| e.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by_key(|e| e.date);
        Ok(owned)
    }
}
