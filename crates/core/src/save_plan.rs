//! Planning for SaveTimesheets.
//!
//! Order of checks per request:
//! 1. payload shape (negative hours, duplicate dates/tasks) fails the request;
//! 2. frozen dates are skipped;
//! 3. every remaining project must be assigned to the user and every task
//!    must belong to its stated project, otherwise the request fails;
//! 4. per task: window, lock and zero-hour skips;
//! 5. per date: daily and weekly ceilings, skipping the whole date on breach.
//!
//! A plan with no writes is a validation failure.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::effort_limits::{EffortLedger, EffortLimits, TaskHours, MAX_TASK_HOURS_PER_DAY};
use crate::error::CoreError;
use crate::freeze_window::FreezeWindow;
use crate::planning::{plan_owner_write, ExistingEntries, SkipReason, TaskScope, WritePlan};
use crate::types::{DbId, Hours};

/// Hours for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEffort {
    pub task_id: DbId,
    pub hours: Hours,
}

/// Hours for the tasks of one project on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEfforts {
    pub project_id: DbId,
    pub tasks: Vec<TaskEffort>,
}

/// Everything the caller wants recorded for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayEfforts {
    pub date: NaiveDate,
    pub projects: Vec<ProjectEfforts>,
}

/// Request body shared by SaveTimesheets and SubmitTimesheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveTimesheetsRequest {
    /// The caller's local calendar date.
    pub current_date: NaiveDate,
    #[serde(default)]
    pub days: Vec<DayEfforts>,
}

/// Read-only inputs loaded by the engine for one save.
#[derive(Debug)]
pub struct SaveContext<'a> {
    pub window: FreezeWindow,
    pub limits: EffortLimits,
    /// Projects with an active membership whose window overlaps the dates saved.
    pub assigned_projects: &'a BTreeSet<DbId>,
    /// Active tasks referenced by the request, keyed by task id.
    pub tasks: &'a HashMap<DbId, TaskScope>,
    pub existing: &'a ExistingEntries,
    /// Persisted hours covering every week touched by the request.
    pub ledger: EffortLedger,
}

/// Reject payloads that are malformed regardless of persisted state.
pub fn validate_payload(days: &[DayEfforts]) -> Result<(), CoreError> {
    let mut dates = HashSet::new();
    for day in days {
        if !dates.insert(day.date) {
            return Err(CoreError::Validation(format!(
                "Date {} appears more than once",
                day.date
            )));
        }

        let mut tasks = HashSet::new();
        for project in &day.projects {
            for task in &project.tasks {
                if task.hours < 0 {
                    return Err(CoreError::Validation(format!(
                        "Hours for task {} on {} must not be negative",
                        task.task_id, day.date
                    )));
                }
                if task.hours > MAX_TASK_HOURS_PER_DAY {
                    return Err(CoreError::Validation(format!(
                        "Hours for task {} on {} must not exceed {MAX_TASK_HOURS_PER_DAY}",
                        task.task_id, day.date
                    )));
                }
                if !tasks.insert(task.task_id) {
                    return Err(CoreError::Validation(format!(
                        "Task {} appears more than once on {}",
                        task.task_id, day.date
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Inclusive range of the non-frozen dates in the request, if any.
pub fn editable_date_range(
    days: &[DayEfforts],
    window: &FreezeWindow,
) -> Option<(NaiveDate, NaiveDate)> {
    let mut editable = days.iter().map(|d| d.date).filter(|d| window.is_editable(*d));
    let first = editable.next()?;
    Some(editable.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}

/// Task ids referenced anywhere in the request.
pub fn referenced_task_ids(days: &[DayEfforts]) -> Vec<DbId> {
    let ids: BTreeSet<DbId> = days
        .iter()
        .flat_map(|d| d.projects.iter())
        .flat_map(|p| p.tasks.iter())
        .map(|t| t.task_id)
        .collect();
    ids.into_iter().collect()
}

/// Build the write plan for a save request.
pub fn plan_save(days: &[DayEfforts], ctx: SaveContext<'_>) -> Result<WritePlan, CoreError> {
    validate_payload(days)?;

    let SaveContext {
        window,
        limits,
        assigned_projects,
        tasks,
        existing,
        mut ledger,
    } = ctx;

    let mut ordered: Vec<&DayEfforts> = days.iter().collect();
    ordered.sort_by_key(|d| d.date);

    let mut plan = WritePlan::default();
    let mut editable = Vec::with_capacity(ordered.len());
    for day in ordered {
        if window.is_editable(day.date) {
            editable.push(day);
        } else {
            plan.skip_date(day.date, SkipReason::Frozen);
        }
    }

    for day in &editable {
        for project in &day.projects {
            if !assigned_projects.contains(&project.project_id) {
                return Err(CoreError::Validation(format!(
                    "Project {} is not assigned to the user for {}",
                    project.project_id, day.date
                )));
            }
            for task in &project.tasks {
                match tasks.get(&task.task_id) {
                    Some(scope) if scope.project_id == project.project_id => {}
                    _ => {
                        return Err(CoreError::Validation(format!(
                            "Task {} is not an active task of project {}",
                            task.task_id, project.project_id
                        )))
                    }
                }
            }
        }
    }

    for day in editable {
        let mut day_writes = Vec::new();
        for project in &day.projects {
            for task in &project.tasks {
                // Presence was checked above.
                let Some(scope) = tasks.get(&task.task_id) else {
                    continue;
                };
                match plan_owner_write(
                    scope,
                    day.date,
                    task.hours,
                    existing.get(task.task_id, day.date),
                ) {
                    Ok(write) => day_writes.push(write),
                    Err(reason) => plan.skip_task(day.date, task.task_id, reason),
                }
            }
        }

        if day_writes.is_empty() {
            continue;
        }

        let proposal: Vec<TaskHours> = day_writes.iter().map(|w| (w.task_id(), w.hours())).collect();
        if let Err(breach) = limits.check(&ledger, day.date, &proposal) {
            plan.skip_date(day.date, SkipReason::Limit(breach));
            continue;
        }
        ledger.record(day.date, &proposal);
        plan.writes.extend(day_writes);
    }

    if plan.writes.is_empty() {
        return Err(CoreError::Validation(
            "No timesheet data available to save".to_string(),
        ));
    }
    Ok(plan)
}
