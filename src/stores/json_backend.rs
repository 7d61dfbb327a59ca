use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CategoryLookup, LedgerSink, TemplateStore};
use crate::errors::{EngineError, Result};
use crate::ledger::{Category, CategoryKind, LedgerEntry, RecurrenceTemplate};

const CURRENT_SCHEMA_VERSION: u8 = 1;
const BOOK_FILE: &str = "book.json";

static DEFAULT_BASE_DIR: Lazy<PathBuf> = Lazy::new(|| {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("recurrence_core")
});

/// On-disk snapshot holding every collection the engine touches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Book {
    #[serde(default = "Book::schema_version_default")]
    pub schema_version: u8,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub templates: Vec<RecurrenceTemplate>,
    #[serde(default)]
    pub entries: Vec<LedgerEntry>,
}

impl Book {
    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

/// JSON-file-backed store implementing all three engine boundaries.
///
/// The whole book lives in memory behind a mutex and every mutation is
/// staged to a temporary file before renaming over the real one, so a
/// crash mid-write never leaves a truncated book behind.
pub struct JsonStore {
    path: PathBuf,
    book: Mutex<Book>,
}

impl JsonStore {
    /// Opens (or initializes) the book under `root`, defaulting to the
    /// platform data directory.
    pub fn open(root: Option<PathBuf>) -> Result<Self> {
        let base = root.unwrap_or_else(|| DEFAULT_BASE_DIR.clone());
        fs::create_dir_all(&base)?;
        let path = base.join(BOOK_FILE);
        let book = if path.exists() {
            load_book(&path)?
        } else {
            Book {
                schema_version: CURRENT_SCHEMA_VERSION,
                ..Book::default()
            }
        };
        Ok(Self {
            path,
            book: Mutex::new(book),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn add_category(&self, category: Category) -> Result<Uuid> {
        let id = category.id;
        let mut book = self.book.lock().unwrap();
        book.categories.push(category);
        save_book(&self.path, &book)?;
        Ok(id)
    }

    /// Runs `mutate` against the locked book and persists the result.
    fn with_book<T>(&self, mutate: impl FnOnce(&mut Book) -> Result<T>) -> Result<T> {
        let mut book = self.book.lock().unwrap();
        let value = mutate(&mut book)?;
        save_book(&self.path, &book)?;
        Ok(value)
    }
}

fn load_book(path: &Path) -> Result<Book> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn save_book(path: &Path, book: &Book) -> Result<()> {
    let json = serde_json::to_string_pretty(book)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

impl TemplateStore for JsonStore {
    fn list_due(&self, owner_id: Uuid, as_of: NaiveDate) -> Result<Vec<RecurrenceTemplate>> {
        let book = self.book.lock().unwrap();
        let mut due: Vec<RecurrenceTemplate> = book
            .templates
            .iter()
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
        self.with_book(|book| {
            let template = book
                .templates
                .iter_mut()
                .find(|t| t.id == template_id)
                .ok_or(EngineError::TemplateNotFound(template_id))?;
            if template.cursor() != expected {
                return Ok(false);
            }
            template.next_run_date = Some(next);
            Ok(true)
        })
    }

    fn insert(&self, template: RecurrenceTemplate) -> Result<()> {
        self.with_book(|book| {
            book.templates.retain(|t| t.id != template.id);
            book.templates.push(template);
            Ok(())
        })
    }

    fn get(&self, template_id: Uuid) -> Result<Option<RecurrenceTemplate>> {
        let book = self.book.lock().unwrap();
        Ok(book.templates.iter().find(|t| t.id == template_id).cloned())
    }

    fn remove(&self, template_id: Uuid) -> Result<()> {
        self.with_book(|book| {
            let before = book.templates.len();
            book.templates.retain(|t| t.id != template_id);
            if book.templates.len() == before {
                return Err(EngineError::TemplateNotFound(template_id));
            }
            Ok(())
        })
    }

    fn set_paused(&self, template_id: Uuid, paused: bool) -> Result<()> {
        self.with_book(|book| {
            let template = book
                .templates
                .iter_mut()
                .find(|t| t.id == template_id)
                .ok_or(EngineError::TemplateNotFound(template_id))?;
            template.is_paused = paused;
            Ok(())
        })
    }
}

impl CategoryLookup for JsonStore {
    fn category_kind(&self, owner_id: Uuid, category_id: Uuid) -> Result<Option<CategoryKind>> {
        let book = self.book.lock().unwrap();
        Ok(book
            .categories
            .iter()
            .find(|c| c.id == category_id && c.owner_id == owner_id)
            .map(|c| c.kind))
    }
}

impl LedgerSink for JsonStore {
    fn append(&self, entry: LedgerEntry) -> Result<Uuid> {
        let id = entry.id;
        self.with_book(|book| {
            book.entries.push(entry);
            Ok(())
        })?;
        Ok(id)
    }

    fn entries_for(&self, owner_id: Uuid) -> Result<Vec<LedgerEntry>> {
        let book = self.book.lock().unwrap();
        let mut owned: Vec<LedgerEntry> = book
            .entries
            .iter()
            .filter(|e| e.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by_key(|e| e.date);
        Ok(owned)
    }
}
