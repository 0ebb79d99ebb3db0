//! Freeze window: which calendar dates are still open for timesheet edits.
//!
//! On or after the configured freeze day the previous month is closed and
//! only the caller's current month stays editable. Before the freeze day the
//! previous month is editable as well. There is no upper bound; future dates
//! are left to the caller.
//!
//! The comparison is `day >= freeze_day`: with a freeze day of 12, the 12th
//! itself already belongs to the frozen side.

use chrono::{Datelike, Duration, NaiveDate};

/// The editable window relative to a caller-supplied current date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreezeWindow {
    current_date: NaiveDate,
    earliest_editable: NaiveDate,
}

impl FreezeWindow {
    /// Compute the window for `current_date` (the caller's local day).
    pub fn new(current_date: NaiveDate, freeze_day_of_month: u32) -> Self {
        let current_month_start = first_of_month(current_date);
        let freeze_day = effective_freeze_day(current_date, freeze_day_of_month);

        let earliest_editable = if current_date.day() >= freeze_day {
            current_month_start
        } else {
            first_of_month(current_month_start - Duration::days(1))
        };

        Self {
            current_date,
            earliest_editable,
        }
    }

    pub fn current_date(&self) -> NaiveDate {
        self.current_date
    }

    /// First calendar date that is not frozen.
    pub fn earliest_editable(&self) -> NaiveDate {
        self.earliest_editable
    }

    pub fn is_editable(&self, date: NaiveDate) -> bool {
        date >= self.earliest_editable
    }

    /// Keep only editable dates, preserving input order.
    pub fn filter_editable<I>(&self, dates: I) -> Vec<NaiveDate>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        dates.into_iter().filter(|d| self.is_editable(*d)).collect()
    }
}

/// Subset of `candidates` that are not yet frozen as of `current_date`.
pub fn not_yet_frozen_dates(
    candidates: &[NaiveDate],
    current_date: NaiveDate,
    freeze_day_of_month: u32,
) -> Vec<NaiveDate> {
    FreezeWindow::new(current_date, freeze_day_of_month).filter_editable(candidates.iter().copied())
}

/// Freeze day clamped to the length of `current_date`'s month.
pub fn effective_freeze_day(current_date: NaiveDate, freeze_day_of_month: u32) -> u32 {
    freeze_day_of_month.min(days_in_month(current_date))
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    let first = first_of_month(date);
    // 32 days past the 1st always lands in the following month.
    let next_first = first_of_month(first + Duration::days(32));
    (next_first - first).num_days() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // -----------------------------------------------------------------------
    // Calendar helpers
    // -----------------------------------------------------------------------

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(date(2020, 2, 10)), 29);
        assert_eq!(days_in_month(date(2021, 2, 10)), 28);
        assert_eq!(days_in_month(date(2021, 1, 31)), 31);
        assert_eq!(days_in_month(date(2021, 4, 1)), 30);
        assert_eq!(days_in_month(date(2021, 12, 31)), 31);
    }

    #[test]
    fn first_of_month_strips_day() {
        assert_eq!(first_of_month(date(2021, 3, 17)), date(2021, 3, 1));
        assert_eq!(first_of_month(date(2021, 3, 1)), date(2021, 3, 1));
    }

    #[test]
    fn freeze_day_clamped_to_short_month() {
        assert_eq!(effective_freeze_day(date(2021, 2, 5), 31), 28);
        assert_eq!(effective_freeze_day(date(2021, 3, 5), 31), 31);
        assert_eq!(effective_freeze_day(date(2021, 2, 5), 12), 12);
    }

    // -----------------------------------------------------------------------
    // Window
    // -----------------------------------------------------------------------

    #[test]
    fn before_freeze_day_previous_month_is_editable() {
        let window = FreezeWindow::new(date(2021, 1, 2), 12);
        assert_eq!(window.earliest_editable(), date(2020, 12, 1));
        assert!(window.is_editable(date(2020, 12, 1)));
        assert!(window.is_editable(date(2020, 12, 31)));
        assert!(window.is_editable(date(2021, 1, 20)));
        assert!(!window.is_editable(date(2020, 11, 30)));
    }

    #[test]
    fn after_freeze_day_only_current_month_is_editable() {
        let window = FreezeWindow::new(date(2021, 1, 15), 12);
        assert_eq!(window.earliest_editable(), date(2021, 1, 1));
        assert!(!window.is_editable(date(2020, 12, 31)));
        assert!(window.is_editable(date(2021, 1, 1)));
    }

    #[test]
    fn freeze_day_itself_is_already_frozen() {
        let window = FreezeWindow::new(date(2021, 1, 12), 12);
        assert!(!window.is_editable(date(2020, 12, 31)));

        let day_before = FreezeWindow::new(date(2021, 1, 11), 12);
        assert!(day_before.is_editable(date(2020, 12, 31)));
    }

    #[test]
    fn freeze_day_one_never_leaves_previous_month_open() {
        for day in 1..=31 {
            let window = FreezeWindow::new(date(2021, 3, day), 1);
            assert_eq!(window.earliest_editable(), date(2021, 3, 1));
        }
    }

    #[test]
    fn clamped_freeze_day_freezes_on_last_day_of_short_month() {
        let on_last_day = FreezeWindow::new(date(2021, 2, 28), 31);
        assert_eq!(on_last_day.earliest_editable(), date(2021, 2, 1));

        let day_before = FreezeWindow::new(date(2021, 2, 27), 31);
        assert_eq!(day_before.earliest_editable(), date(2021, 1, 1));
    }

    #[test]
    fn previous_month_wraps_year() {
        let window = FreezeWindow::new(date(2021, 1, 1), 5);
        assert_eq!(window.earliest_editable(), date(2020, 12, 1));
    }

    #[test]
    fn future_dates_are_not_excluded() {
        let window = FreezeWindow::new(date(2021, 1, 15), 12);
        assert!(window.is_editable(date(2021, 6, 30)));
    }

    #[test]
    fn not_yet_frozen_dates_scenario() {
        let candidates = [
            date(2020, 11, 30),
            date(2020, 12, 15),
            date(2021, 1, 10),
        ];

        let early = not_yet_frozen_dates(&candidates, date(2021, 1, 2), 12);
        assert_eq!(early, vec![date(2020, 12, 15), date(2021, 1, 10)]);

        let late = not_yet_frozen_dates(&candidates, date(2021, 1, 15), 12);
        assert_eq!(late, vec![date(2021, 1, 10)]);
    }

    #[test]
    fn dates_before_previous_month_are_never_editable() {
        let old = date(2020, 11, 30);
        for day in 1..=31 {
            for freeze in 1..=31 {
                let window = FreezeWindow::new(date(2021, 1, day), freeze);
                assert!(!window.is_editable(old));
            }
        }
    }
}
