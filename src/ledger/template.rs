use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cadence::Cadence;
use crate::errors::EngineError;

/// A recurring-transaction definition owned by a single user.
///
/// The template stores an unsigned magnitude; the sign of generated entries
/// is inferred from the referenced category at materialization time.
/// `next_run_date` is the mutable scheduling cursor: it only moves forward,
/// one cadence step at a time, and only when an entry has been created for
/// the date it pointed to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurrenceTemplate {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category_id: Uuid,
    pub amount: f64,
    pub cadence: Cadence,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// `None` until the template has run once; seeded from `start_date`.
    #[serde(default)]
    pub next_run_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_paused: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

fn default_interval() -> u32 {
    1
}

impl RecurrenceTemplate {
    /// Creates a validated template. Invalid input is rejected here so the
    /// engine never has to handle a zero interval or non-positive amount.
    pub fn new(
        owner_id: Uuid,
        category_id: Uuid,
        amount: f64,
        cadence: Cadence,
        interval: u32,
        start_date: NaiveDate,
    ) -> Result<Self, EngineError> {
        if !(amount > 0.0) {
            return Err(EngineError::Validation(format!(
                "amount must be positive, got {}",
                amount
            )));
        }
        if interval == 0 {
            return Err(EngineError::Validation(
                "interval must be at least 1".into(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            category_id,
            amount,
            cadence,
            interval,
            day_of_month: None,
            start_date,
            end_date: None,
            next_run_date: None,
            is_paused: false,
            note: None,
        })
    }

    pub fn with_day_of_month(mut self, day: u32) -> Result<Self, EngineError> {
        if !(1..=31).contains(&day) {
            return Err(EngineError::Validation(format!(
                "day_of_month must be within 1-31, got {}",
                day
            )));
        }
        self.day_of_month = Some(day);
        Ok(self)
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// The schedule cursor, seeded to `start_date` for a template that has
    /// never run. Both the due check and the entry date use this value.
    pub fn cursor(&self) -> NaiveDate {
        self.next_run_date.unwrap_or(self.start_date)
    }

    /// Whether this template should materialize as of the reference date:
    /// unpaused, cursor reached, and end date (when set) not yet passed.
    pub fn is_due(&self, as_of: NaiveDate) -> bool {
        if self.is_paused {
            return false;
        }
        if self.cursor() > as_of {
            return false;
        }
        match self.end_date {
            Some(end) => end >= as_of,
            None => true,
        }
    }

    /// The cursor value after exactly one cadence step from `from`.
    pub fn step_from(&self, from: NaiveDate) -> NaiveDate {
        self.cadence.advance(from, self.interval, self.day_of_month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn template(cadence: Cadence, interval: u32, start: NaiveDate) -> RecurrenceTemplate {
        RecurrenceTemplate::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            100.0,
            cadence,
            interval,
            start,
        )
        .unwrap()
    }

    #[test]
    fn rejects_zero_interval_and_non_positive_amount() {
        let owner = Uuid::new_v4();
        let category = Uuid::new_v4();
        let start = ymd(2025, 1, 1);
        assert!(RecurrenceTemplate::new(owner, category, 100.0, Cadence::Daily, 0, start).is_err());
        assert!(RecurrenceTemplate::new(owner, category, 0.0, Cadence::Daily, 1, start).is_err());
        assert!(RecurrenceTemplate::new(owner, category, -5.0, Cadence::Daily, 1, start).is_err());
    }

    #[test]
    fn rejects_out_of_range_day_of_month() {
        let t = template(Cadence::Monthly, 1, ymd(2025, 1, 31));
        assert!(t.clone().with_day_of_month(0).is_err());
        assert!(t.clone().with_day_of_month(32).is_err());
        assert!(t.with_day_of_month(31).is_ok());
    }

    #[test]
    fn unset_cursor_is_seeded_from_start_date() {
        let t = template(Cadence::Daily, 1, ymd(2025, 2, 1));
        assert_eq!(t.cursor(), ymd(2025, 2, 1));
        assert!(t.is_due(ymd(2025, 2, 1)));
        assert!(!t.is_due(ymd(2025, 1, 31)));
    }

    #[test]
    fn paused_templates_are_never_due() {
        let mut t = template(Cadence::Daily, 1, ymd(2025, 1, 1));
        t.is_paused = true;
        assert!(!t.is_due(ymd(2030, 1, 1)));
    }

    #[test]
    fn end_date_before_reference_excludes_template() {
        let t = template(Cadence::Daily, 1, ymd(2024, 12, 1)).with_end_date(ymd(2025, 1, 1));
        // Cursor in the past but the series already ended.
        assert!(!t.is_due(ymd(2025, 1, 2)));
        assert!(t.is_due(ymd(2025, 1, 1)));
    }
}
