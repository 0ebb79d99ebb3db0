//! Shared building blocks for turning requested efforts into entry writes.
//!
//! Planners are pure: the engine loads everything a decision needs inside
//! its transaction, hands it over here, and executes the returned plan.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;

use crate::effort_limits::LimitBreach;
use crate::timesheet_status::TimesheetStatus;
use crate::types::{DbId, Hours};

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether the window shares at least one day with `from..=to`.
    pub fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.start <= to && from <= self.end
    }

    /// Whether `inner` lies completely inside this window.
    pub fn encloses(&self, inner: &DateWindow) -> bool {
        self.start <= inner.start && inner.end <= self.end
    }
}

/// An active task the user may log against, with its project's window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskScope {
    pub task_id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub task_window: DateWindow,
    pub project_window: DateWindow,
}

impl TaskScope {
    /// An entry on `date` must fall in both the task and the project window.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.task_window.contains(date) && self.project_window.contains(date)
    }
}

/// A persisted entry as seen by a planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExistingEntry {
    pub entry_id: DbId,
    pub task_id: DbId,
    pub date: NaiveDate,
    pub hours: Hours,
    pub status: TimesheetStatus,
}

/// Persisted entries for one user keyed by (task, date).
#[derive(Debug, Clone, Default)]
pub struct ExistingEntries {
    by_key: HashMap<(DbId, NaiveDate), ExistingEntry>,
}

impl ExistingEntries {
    pub fn get(&self, task_id: DbId, date: NaiveDate) -> Option<&ExistingEntry> {
        self.by_key.get(&(task_id, date))
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExistingEntry> {
        self.by_key.values()
    }
}

impl FromIterator<ExistingEntry> for ExistingEntries {
    fn from_iter<I: IntoIterator<Item = ExistingEntry>>(iter: I) -> Self {
        Self {
            by_key: iter
                .into_iter()
                .map(|entry| ((entry.task_id, entry.date), entry))
                .collect(),
        }
    }
}

/// A new (user, task, date) entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub task_id: DbId,
    pub task_title: String,
    pub date: NaiveDate,
    pub hours: Hours,
    pub status: TimesheetStatus,
}

/// A rewrite of an existing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryUpdate {
    pub entry_id: DbId,
    pub task_id: DbId,
    pub date: NaiveDate,
    pub hours: Hours,
    pub status: TimesheetStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryWrite {
    Create(NewEntry),
    Update(EntryUpdate),
}

impl EntryWrite {
    pub fn task_id(&self) -> DbId {
        match self {
            EntryWrite::Create(new) => new.task_id,
            EntryWrite::Update(update) => update.task_id,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            EntryWrite::Create(new) => new.date,
            EntryWrite::Update(update) => update.date,
        }
    }

    pub fn hours(&self) -> Hours {
        match self {
            EntryWrite::Create(new) => new.hours,
            EntryWrite::Update(update) => update.hours,
        }
    }
}

/// Why part of a request was left out of the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Frozen,
    Limit(LimitBreach),
    OutsideTaskWindow,
    Locked(TimesheetStatus),
    EmptyEffort,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Frozen => f.write_str("date is frozen"),
            SkipReason::Limit(breach) => write!(f, "{breach}"),
            SkipReason::OutsideTaskWindow => f.write_str("date outside task or project window"),
            SkipReason::Locked(status) => write!(f, "entry is {}", status.name()),
            SkipReason::EmptyEffort => f.write_str("no hours to record"),
        }
    }
}

/// A policy skip. `task_id` is `None` when the whole date was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedEffort {
    pub date: NaiveDate,
    pub task_id: Option<DbId>,
    pub reason: SkipReason,
}

/// Writes to execute atomically plus what was skipped along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WritePlan {
    pub writes: Vec<EntryWrite>,
    pub skipped: Vec<SkippedEffort>,
}

impl WritePlan {
    pub fn creates(&self) -> impl Iterator<Item = &NewEntry> {
        self.writes.iter().filter_map(|w| match w {
            EntryWrite::Create(new) => Some(new),
            EntryWrite::Update(_) => None,
        })
    }

    pub fn updates(&self) -> impl Iterator<Item = &EntryUpdate> {
        self.writes.iter().filter_map(|w| match w {
            EntryWrite::Update(update) => Some(update),
            EntryWrite::Create(_) => None,
        })
    }

    pub(crate) fn skip_date(&mut self, date: NaiveDate, reason: SkipReason) {
        self.skipped.push(SkippedEffort {
            date,
            task_id: None,
            reason,
        });
    }

    pub(crate) fn skip_task(&mut self, date: NaiveDate, task_id: DbId, reason: SkipReason) {
        self.skipped.push(SkippedEffort {
            date,
            task_id: Some(task_id),
            reason,
        });
    }
}

/// Decide how `hours` for `scope` on `date` gets written by the entry owner.
///
/// New entries are only created for non-zero hours. Existing entries are
/// overwritten unless they have left the owner's hands (submitted/approved).
pub(crate) fn plan_owner_write(
    scope: &TaskScope,
    date: NaiveDate,
    hours: Hours,
    existing: Option<&ExistingEntry>,
) -> Result<EntryWrite, SkipReason> {
    if !scope.covers(date) {
        return Err(SkipReason::OutsideTaskWindow);
    }

    let status = TimesheetStatus::for_saved_hours(hours);
    match existing {
        Some(entry) if !entry.status.is_owner_editable() => Err(SkipReason::Locked(entry.status)),
        Some(entry) => Ok(EntryWrite::Update(EntryUpdate {
            entry_id: entry.entry_id,
            task_id: scope.task_id,
            date,
            hours,
            status,
        })),
        None if hours == 0 => Err(SkipReason::EmptyEffort),
        None => Ok(EntryWrite::Create(NewEntry {
            task_id: scope.task_id,
            task_title: scope.title.clone(),
            date,
            hours,
            status,
        })),
    }
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use super::*;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Task `task_id` on project `project_id`, both spanning 2021-01-02..=2021-02-10.
    pub fn scope(task_id: DbId, project_id: DbId) -> TaskScope {
        let window = DateWindow::new(date(2021, 1, 2), date(2021, 2, 10));
        TaskScope {
            task_id,
            project_id,
            title: format!("Task {task_id}"),
            task_window: window,
            project_window: window,
        }
    }

    pub fn existing(
        entry_id: DbId,
        task_id: DbId,
        date: NaiveDate,
        hours: Hours,
        status: TimesheetStatus,
    ) -> ExistingEntry {
        ExistingEntry {
            entry_id,
            task_id,
            date,
            hours,
            status,
        }
    }
}
