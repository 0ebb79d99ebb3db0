//! Task model, DTOs and the joined scope projection used for planning.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use timesheet_core::planning::{DateWindow, TaskScope};
use timesheet_core::types::{DbId, Timestamp};

use crate::models::status::{RecordLifecycle, StatusId};

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub origin_id: StatusId,
    /// Set only for member-added tasks.
    pub membership_id: Option<DbId>,
    pub lifecycle_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Task {
    pub fn is_active(&self) -> bool {
        self.lifecycle_id == RecordLifecycle::Active.id()
    }
}

/// DTO for creating a new task.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub project_id: DbId,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// An active task joined with its project's window.
#[derive(Debug, Clone, FromRow)]
pub struct TaskScopeRow {
    pub task_id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub task_start: NaiveDate,
    pub task_end: NaiveDate,
    pub project_start: NaiveDate,
    pub project_end: NaiveDate,
}

impl From<TaskScopeRow> for TaskScope {
    fn from(row: TaskScopeRow) -> Self {
        TaskScope {
            task_id: row.task_id,
            project_id: row.project_id,
            title: row.title,
            task_window: DateWindow::new(row.task_start, row.task_end),
            project_window: DateWindow::new(row.project_start, row.project_end),
        }
    }
}
