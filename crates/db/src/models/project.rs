//! Project entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use timesheet_core::planning::DateWindow;
use timesheet_core::types::{DbId, Timestamp};

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub billable_hours: i32,
    pub non_billable_hours: i32,
    /// The manager who owns the project and decides its timesheets.
    pub manager_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.start_date, self.end_date)
    }
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Defaults to 0 if omitted.
    pub billable_hours: Option<i32>,
    /// Defaults to 0 if omitted.
    pub non_billable_hours: Option<i32>,
    pub manager_id: DbId,
}

/// DTO for the owning manager's schedule and budget edits. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProjectSchedule {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub billable_hours: Option<i32>,
    pub non_billable_hours: Option<i32>,
}

/// A project the user holds an active membership on.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectAssignment {
    pub project_id: DbId,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub membership_id: DbId,
    pub is_billable: bool,
}
