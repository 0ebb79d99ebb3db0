//! Daily and weekly effort ceilings.
//!
//! Weeks start on Sunday. Totals are always computed for the state that
//! would exist after a proposal is applied: the proposed tasks' hours on the
//! target date replace whatever is persisted for those tasks, everything else
//! in the day/week stays counted.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};

use crate::policy::TimesheetPolicy;
use crate::types::{DbId, Hours};

/// Hours proposed for one task on one date.
pub type TaskHours = (DbId, Hours);

/// Summed hours. Wider than [`Hours`] so totals never wrap.
pub type HoursTotal = i64;

/// No single task can be filled with more than a calendar day.
pub const MAX_TASK_HOURS_PER_DAY: Hours = 24;

/// Configured ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffortLimits {
    pub daily: Hours,
    pub weekly: Hours,
}

impl From<&TimesheetPolicy> for EffortLimits {
    fn from(policy: &TimesheetPolicy) -> Self {
        Self {
            daily: policy.daily_efforts_limit,
            weekly: policy.weekly_efforts_limit,
        }
    }
}

/// Which ceiling a proposal would break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitBreach {
    Daily {
        date: NaiveDate,
        total: HoursTotal,
        limit: Hours,
    },
    Weekly {
        week_start: NaiveDate,
        total: HoursTotal,
        limit: Hours,
    },
}

impl fmt::Display for LimitBreach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitBreach::Daily { date, total, limit } => {
                write!(f, "{total}h on {date} exceeds daily limit of {limit}h")
            }
            LimitBreach::Weekly {
                week_start,
                total,
                limit,
            } => write!(
                f,
                "{total}h in week of {week_start} exceeds weekly limit of {limit}h"
            ),
        }
    }
}

/// Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

/// Inclusive Sunday..=Saturday bounds of the week containing `date`.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = week_start(date);
    (start, start + Duration::days(6))
}

/// Persisted hours per date and task for one user.
#[derive(Debug, Clone, Default)]
pub struct EffortLedger {
    by_date: BTreeMap<NaiveDate, BTreeMap<DbId, Hours>>,
}

impl EffortLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, DbId, Hours)>,
    {
        let mut ledger = Self::new();
        for (date, task_id, hours) in entries {
            ledger.by_date.entry(date).or_default().insert(task_id, hours);
        }
        ledger
    }

    pub fn day_total(&self, date: NaiveDate) -> HoursTotal {
        self.by_date
            .get(&date)
            .map(|tasks| tasks.values().copied().map(HoursTotal::from).sum())
            .unwrap_or(0)
    }

    pub fn week_total(&self, date: NaiveDate) -> HoursTotal {
        let (start, end) = week_bounds(date);
        self.by_date
            .range(start..=end)
            .flat_map(|(_, tasks)| tasks.values())
            .copied()
            .map(HoursTotal::from)
            .sum()
    }

    /// Day total after `proposal` replaces its tasks' hours on `date`.
    pub fn day_total_with(&self, date: NaiveDate, proposal: &[TaskHours]) -> HoursTotal {
        let untouched: HoursTotal = self
            .by_date
            .get(&date)
            .map(|tasks| {
                tasks
                    .iter()
                    .filter(|(task_id, _)| !proposal.iter().any(|(p, _)| p == *task_id))
                    .map(|(_, hours)| HoursTotal::from(*hours))
                    .sum()
            })
            .unwrap_or(0);
        untouched
            + proposal
                .iter()
                .map(|(_, hours)| HoursTotal::from(*hours))
                .sum::<HoursTotal>()
    }

    /// Week total after `proposal` replaces its tasks' hours on `date`.
    pub fn week_total_with(&self, date: NaiveDate, proposal: &[TaskHours]) -> HoursTotal {
        self.week_total(date) - self.day_total(date) + self.day_total_with(date, proposal)
    }

    /// Apply `proposal` to the ledger so later checks in the same batch see it.
    pub fn record(&mut self, date: NaiveDate, proposal: &[TaskHours]) {
        let tasks = self.by_date.entry(date).or_default();
        for (task_id, hours) in proposal {
            tasks.insert(*task_id, *hours);
        }
    }
}

impl EffortLimits {
    pub fn check_daily(
        &self,
        ledger: &EffortLedger,
        date: NaiveDate,
        proposal: &[TaskHours],
    ) -> Result<(), LimitBreach> {
        let total = ledger.day_total_with(date, proposal);
        if total > HoursTotal::from(self.daily) {
            return Err(LimitBreach::Daily {
                date,
                total,
                limit: self.daily,
            });
        }
        Ok(())
    }

    pub fn check_weekly(
        &self,
        ledger: &EffortLedger,
        date: NaiveDate,
        proposal: &[TaskHours],
    ) -> Result<(), LimitBreach> {
        let total = ledger.week_total_with(date, proposal);
        if total > HoursTotal::from(self.weekly) {
            return Err(LimitBreach::Weekly {
                week_start: week_start(date),
                total,
                limit: self.weekly,
            });
        }
        Ok(())
    }

    /// Daily check first, then weekly.
    pub fn check(
        &self,
        ledger: &EffortLedger,
        date: NaiveDate,
        proposal: &[TaskHours],
    ) -> Result<(), LimitBreach> {
        self.check_daily(ledger, date, proposal)?;
        self.check_weekly(ledger, date, proposal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const LIMITS: EffortLimits = EffortLimits {
        daily: 8,
        weekly: 40,
    };

    #[test]
    fn week_starts_on_sunday() {
        // 2021-01-24 is a Sunday.
        assert_eq!(week_start(date(2021, 1, 24)), date(2021, 1, 24));
        assert_eq!(week_start(date(2021, 1, 27)), date(2021, 1, 24));
        assert_eq!(week_start(date(2021, 1, 30)), date(2021, 1, 24));
        assert_eq!(week_start(date(2021, 1, 31)), date(2021, 1, 31));
        assert_eq!(
            week_bounds(date(2021, 1, 27)),
            (date(2021, 1, 24), date(2021, 1, 30))
        );
    }

    #[test]
    fn week_spanning_month_boundary() {
        assert_eq!(
            week_bounds(date(2021, 2, 2)),
            (date(2021, 1, 31), date(2021, 2, 6))
        );
    }

    #[test]
    fn empty_week_compares_proposal_directly() {
        let ledger = EffortLedger::new();
        assert!(LIMITS.check_weekly(&ledger, date(2021, 1, 25), &[(1, 8)]).is_ok());
        assert_eq!(ledger.week_total_with(date(2021, 1, 25), &[(1, 8)]), 8);
    }

    #[test]
    fn daily_limit_breach_reported() {
        let ledger = EffortLedger::new();
        let result = LIMITS.check(&ledger, date(2021, 1, 25), &[(1, 5), (2, 4)]);
        assert_matches!(result, Err(LimitBreach::Daily { total: 9, limit: 8, .. }));
    }

    #[test]
    fn daily_total_counts_untouched_tasks() {
        let ledger = EffortLedger::from_entries([(date(2021, 1, 25), 1, 6)]);
        assert_eq!(ledger.day_total_with(date(2021, 1, 25), &[(2, 3)]), 9);
        assert!(LIMITS.check_daily(&ledger, date(2021, 1, 25), &[(2, 3)]).is_err());
    }

    #[test]
    fn replacing_same_task_does_not_double_count() {
        let ledger = EffortLedger::from_entries([(date(2021, 1, 25), 1, 8)]);
        assert_eq!(ledger.day_total_with(date(2021, 1, 25), &[(1, 8)]), 8);
        assert!(LIMITS.check(&ledger, date(2021, 1, 25), &[(1, 8)]).is_ok());
    }

    #[test]
    fn weekly_limit_excludes_replaced_entries_on_target_date() {
        let d = |day| date(2021, 1, day);
        let ledger = EffortLedger::from_entries([
            (d(25), 1, 8),
            (d(26), 1, 8),
            (d(27), 1, 8),
            (d(28), 1, 8),
            (d(29), 1, 8),
        ]);
        assert_eq!(ledger.week_total(d(25)), 40);
        // Rewriting Friday with the same hours stays at the limit.
        assert!(LIMITS.check_weekly(&ledger, d(29), &[(1, 8)]).is_ok());
        // Adding Saturday breaks it.
        assert_matches!(
            LIMITS.check_weekly(&ledger, d(30), &[(1, 1)]),
            Err(LimitBreach::Weekly { total: 41, week_start, .. }) if week_start == d(24)
        );
    }

    #[test]
    fn entries_outside_week_are_ignored() {
        let ledger = EffortLedger::from_entries([
            (date(2021, 1, 23), 1, 8),
            (date(2021, 1, 31), 1, 8),
        ]);
        assert_eq!(ledger.week_total(date(2021, 1, 27)), 0);
    }

    #[test]
    fn recorded_proposals_count_toward_later_checks() {
        let limits = EffortLimits {
            daily: 8,
            weekly: 10,
        };
        let mut ledger = EffortLedger::new();
        assert!(limits.check(&ledger, date(2021, 1, 25), &[(1, 6)]).is_ok());
        ledger.record(date(2021, 1, 25), &[(1, 6)]);
        assert!(limits.check(&ledger, date(2021, 1, 26), &[(1, 6)]).is_err());
        assert!(limits.check(&ledger, date(2021, 1, 26), &[(1, 4)]).is_ok());
    }

    #[test]
    fn totals_near_i32_max_do_not_wrap() {
        let big = Hours::MAX / 2 + 1;
        let ledger = EffortLedger::from_entries([(date(2021, 1, 25), 1, big)]);
        let total = ledger.day_total_with(date(2021, 1, 25), &[(2, big)]);
        assert_eq!(total, 2 * HoursTotal::from(big));
        assert_matches!(
            LIMITS.check(&ledger, date(2021, 1, 25), &[(2, big)]),
            Err(LimitBreach::Daily { limit: 8, .. })
        );
    }

    #[test]
    fn breach_display_mentions_limit() {
        let breach = LimitBreach::Daily {
            date: date(2021, 1, 25),
            total: 9,
            limit: 8,
        };
        assert_eq!(breach.to_string(), "9h on 2021-01-25 exceeds daily limit of 8h");
    }
}
