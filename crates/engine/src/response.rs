//! Caller-facing shapes returned by engine operations.

use chrono::NaiveDate;
use serde::Serialize;
use timesheet_core::error::CoreError;
use timesheet_core::timesheet_status::TimesheetStatus;
use timesheet_core::types::{DbId, Hours, Timestamp};
use timesheet_db::models::project::ProjectAssignment;
use timesheet_db::models::task::Task;
use timesheet_db::models::timesheet_entry::TimesheetEntryDetail;

/// One timesheet entry as returned by every read and write operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimesheetEntryResponse {
    pub id: DbId,
    pub user_id: DbId,
    pub project_id: DbId,
    pub project_title: String,
    pub task_id: DbId,
    pub task_title: String,
    pub date: NaiveDate,
    pub hours: Hours,
    pub status: TimesheetStatus,
    pub manager_comment: Option<String>,
    pub submitted_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

impl TryFrom<TimesheetEntryDetail> for TimesheetEntryResponse {
    type Error = CoreError;

    fn try_from(row: TimesheetEntryDetail) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            project_id: row.project_id,
            project_title: row.project_title,
            task_id: row.task_id,
            task_title: row.task_title,
            date: row.entry_date,
            hours: row.hours,
            status: TimesheetStatus::try_from(row.status_id)?,
            manager_comment: row.manager_comment,
            submitted_at: row.submitted_at,
            updated_at: row.updated_at,
        })
    }
}

/// A project the user is assigned to, with the tasks open in the queried range.
#[derive(Debug, Clone, Serialize)]
pub struct AssignedProject {
    #[serde(flatten)]
    pub project: ProjectAssignment,
    pub tasks: Vec<Task>,
}

pub(crate) fn into_responses(
    rows: Vec<TimesheetEntryDetail>,
) -> Result<Vec<TimesheetEntryResponse>, CoreError> {
    rows.into_iter().map(TimesheetEntryResponse::try_from).collect()
}
