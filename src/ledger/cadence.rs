use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Recurrence unit governing the size of one schedule step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Daily,
    Weekly,
    Monthly,
}

impl Cadence {
    /// Advances `from` by exactly one step of `interval` cadence units.
    ///
    /// Monthly steps keep the anchored day (`day_of_month` when set, the
    /// current day otherwise) and clamp it to the last day of shorter
    /// months instead of rolling into the next one.
    pub fn advance(&self, from: NaiveDate, interval: u32, day_of_month: Option<u32>) -> NaiveDate {
        match self {
            Cadence::Daily => from + Duration::days(interval as i64),
            Cadence::Weekly => from + Duration::weeks(interval as i64),
            Cadence::Monthly => {
                let anchor = day_of_month.unwrap_or(from.day());
                shift_month_anchored(from, interval as i32, anchor)
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Cadence::Daily => "daily",
            Cadence::Weekly => "weekly",
            Cadence::Monthly => "monthly",
        }
    }
}

fn shift_month_anchored(date: NaiveDate, months: i32, anchor_day: u32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    let day = anchor_day.min(days_in_month(year, month as u32));
    NaiveDate::from_ymd_opt(year, month as u32, day).unwrap_or(date)
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap());
    let last_current = first_next - Duration::days(1);
    last_current.day()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_and_weekly_are_plain_offsets() {
        assert_eq!(Cadence::Daily.advance(ymd(2025, 1, 1), 3, None), ymd(2025, 1, 4));
        assert_eq!(Cadence::Weekly.advance(ymd(2025, 1, 1), 2, None), ymd(2025, 1, 15));
    }

    #[test]
    fn monthly_clamps_day_31_across_february() {
        // Leap year keeps the 29th, non-leap the 28th.
        assert_eq!(
            Cadence::Monthly.advance(ymd(2024, 1, 31), 1, Some(31)),
            ymd(2024, 2, 29)
        );
        assert_eq!(
            Cadence::Monthly.advance(ymd(2025, 1, 31), 1, Some(31)),
            ymd(2025, 2, 28)
        );
    }

    #[test]
    fn monthly_anchor_reemerges_in_longer_months() {
        let feb = Cadence::Monthly.advance(ymd(2025, 1, 31), 1, Some(31));
        assert_eq!(feb, ymd(2025, 2, 28));
        assert_eq!(Cadence::Monthly.advance(feb, 1, Some(31)), ymd(2025, 3, 31));
    }

    #[test]
    fn monthly_without_anchor_uses_current_day() {
        assert_eq!(Cadence::Monthly.advance(ymd(2025, 5, 10), 1, None), ymd(2025, 6, 10));
        assert_eq!(Cadence::Monthly.advance(ymd(2025, 10, 31), 1, None), ymd(2025, 11, 30));
    }

    #[test]
    fn monthly_interval_crosses_year_boundary() {
        assert_eq!(
            Cadence::Monthly.advance(ymd(2024, 11, 15), 3, None),
            ymd(2025, 2, 15)
        );
    }

    #[test]
    fn repeated_single_steps_compose_for_linear_cadences() {
        let start = ymd(2025, 3, 7);
        let mut walked = start;
        for _ in 0..6 {
            walked = Cadence::Daily.advance(walked, 1, None);
        }
        assert_eq!(walked, Cadence::Daily.advance(start, 6, None));

        let mut weekly = start;
        for _ in 0..4 {
            weekly = Cadence::Weekly.advance(weekly, 1, None);
        }
        assert_eq!(weekly, Cadence::Weekly.advance(start, 4, None));
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2025, 12), 31);
    }
}
