//! Timesheet entry model and read-side projections.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use timesheet_core::duplication::SourceEffort;
use timesheet_core::error::CoreError;
use timesheet_core::planning::{DateWindow, ExistingEntry, TaskScope};
use timesheet_core::timesheet_status::{StatusId, TimesheetStatus};
use timesheet_core::types::{DbId, Hours, Timestamp};

/// A row from the `timesheet_entries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimesheetEntry {
    pub id: DbId,
    pub user_id: DbId,
    pub task_id: DbId,
    pub task_title: String,
    pub entry_date: NaiveDate,
    pub hours: Hours,
    pub status_id: StatusId,
    /// Populated only by a rejection.
    pub manager_comment: Option<String>,
    pub submitted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TimesheetEntry {
    pub fn status(&self) -> Result<TimesheetStatus, CoreError> {
        TimesheetStatus::try_from(self.status_id)
    }

    pub fn to_existing(&self) -> Result<ExistingEntry, CoreError> {
        Ok(ExistingEntry {
            entry_id: self.id,
            task_id: self.task_id,
            date: self.entry_date,
            hours: self.hours,
            status: self.status()?,
        })
    }
}

/// An entry joined with its task's project, for read paths and responses.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimesheetEntryDetail {
    pub id: DbId,
    pub user_id: DbId,
    pub task_id: DbId,
    pub task_title: String,
    pub project_id: DbId,
    pub project_title: String,
    pub entry_date: NaiveDate,
    pub hours: Hours,
    pub status_id: StatusId,
    pub manager_comment: Option<String>,
    pub submitted_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

/// A filled entry on a duplication source date with the windows of its
/// task and project.
#[derive(Debug, Clone, FromRow)]
pub struct SourceEffortRow {
    pub task_id: DbId,
    pub project_id: DbId,
    pub task_title: String,
    pub hours: Hours,
    pub task_start: NaiveDate,
    pub task_end: NaiveDate,
    pub project_start: NaiveDate,
    pub project_end: NaiveDate,
}

impl From<SourceEffortRow> for SourceEffort {
    fn from(row: SourceEffortRow) -> Self {
        SourceEffort {
            scope: TaskScope {
                task_id: row.task_id,
                project_id: row.project_id,
                title: row.task_title,
                task_window: DateWindow::new(row.task_start, row.task_end),
                project_window: DateWindow::new(row.project_start, row.project_end),
            },
            hours: row.hours,
        }
    }
}
