//! Due-selection and materialization of recurring templates.

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::config::{CatchUpMode, Config};
use crate::errors::Result;
use crate::ledger::{LedgerEntry, RecurrenceTemplate};
use crate::stores::{CategoryLookup, LedgerSink, TemplateStore};

/// Upper bound on per-template steps in full catch-up mode.
const MAX_CATCH_UP_STEPS: usize = 1024;

/// Outcome of one `run_due` invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Templates selected as due in the snapshot.
    pub due: usize,
    /// Entries actually appended to the ledger.
    pub created: usize,
    /// Per-template failures; siblings in the same batch are unaffected.
    pub failures: Vec<RunFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFailure {
    pub template_id: Uuid,
    pub reason: String,
}

/// Materializes due recurring templates into ledger entries and advances
/// their schedule cursors.
///
/// All collaborators are injected at construction time; the engine holds no
/// process-wide state. Both the daily scheduler tick and the on-demand
/// trigger call the same [`RecurrenceEngine::run_due`].
pub struct RecurrenceEngine {
    templates: Arc<dyn TemplateStore>,
    categories: Arc<dyn CategoryLookup>,
    ledger: Arc<dyn LedgerSink>,
    config: Config,
}

impl RecurrenceEngine {
    pub fn new(
        templates: Arc<dyn TemplateStore>,
        categories: Arc<dyn CategoryLookup>,
        ledger: Arc<dyn LedgerSink>,
        config: Config,
    ) -> Self {
        Self {
            templates,
            categories,
            ledger,
            config,
        }
    }

    /// Selects the owner's due templates as of `as_of`, appends one ledger
    /// entry per claimed occurrence, and advances each cursor.
    ///
    /// Each template is an independent unit of work: a failure is recorded
    /// in the summary without aborting siblings, and nothing already
    /// persisted is rolled back. Occurrences are claimed by a
    /// compare-and-swap on the cursor before the entry is written, so a
    /// concurrent invocation racing on the same template cannot double-book
    /// the same due date; the loser of the swap skips creation.
    pub fn run_due(&self, owner_id: Uuid, as_of: NaiveDate) -> Result<RunSummary> {
        let snapshot = self.templates.list_due(owner_id, as_of)?;
        let mut summary = RunSummary::default();

        for template in snapshot.iter().filter(|t| t.is_due(as_of)) {
            summary.due += 1;
            if let Err(err) = self.materialize(template, as_of, &mut summary) {
                tracing::warn!(
                    template = %template.id,
                    error = %err,
                    "recurring template failed, continuing batch"
                );
                summary.failures.push(RunFailure {
                    template_id: template.id,
                    reason: err.to_string(),
                });
            }
        }

        tracing::info!(
            owner = %owner_id,
            due = summary.due,
            created = summary.created,
            "processed due recurring templates"
        );
        Ok(summary)
    }

    /// Processes one template: a single step, or repeated steps until the
    /// cursor passes the reference date when full catch-up is configured.
    fn materialize(
        &self,
        template: &RecurrenceTemplate,
        as_of: NaiveDate,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let signed_amount = self.resolve_signed_amount(template);
        let mut cursor = template.cursor();
        let mut steps = 0usize;

        while cursor <= as_of {
            let next = template.step_from(cursor);
            // Claim the occurrence before writing the entry. Losing the swap
            // means a concurrent runner already materialized this date.
            if !self.templates.advance_cursor(template.id, cursor, next)? {
                tracing::debug!(
                    template = %template.id,
                    date = %cursor,
                    "cursor already advanced by a concurrent run, skipping"
                );
                break;
            }

            let entry = LedgerEntry::new(
                template.owner_id,
                template.category_id,
                signed_amount,
                cursor,
                template.note.clone(),
            );
            self.ledger.append(entry)?;
            summary.created += 1;

            cursor = next;
            steps += 1;
            if self.config.catch_up_mode == CatchUpMode::SingleStep
                || steps >= MAX_CATCH_UP_STEPS
            {
                break;
            }
            if let Some(end) = template.end_date {
                if cursor > end {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Infers the entry sign from the category. An unresolved category
    /// degrades to the unsigned magnitude rather than skipping the entry.
    fn resolve_signed_amount(&self, template: &RecurrenceTemplate) -> f64 {
        let kind = match self
            .categories
            .category_kind(template.owner_id, template.category_id)
        {
            Ok(kind) => kind,
            Err(err) => {
                tracing::warn!(
                    template = %template.id,
                    category = %template.category_id,
                    error = %err,
                    "category lookup failed, using unsigned amount"
                );
                None
            }
        };
        match kind {
            Some(kind) => kind.signed_amount(template.amount),
            None => {
                tracing::warn!(
                    template = %template.id,
                    category = %template.category_id,
                    "category missing, using unsigned amount"
                );
                template.amount
            }
        }
    }
}
