//! Read paths and the standalone date helpers.

use std::collections::HashMap;

use chrono::NaiveDate;
use timesheet_core::error::CoreError;
use timesheet_core::types::DbId;
use timesheet_db::models::task::Task;
use timesheet_db::repositories::{ProjectRepo, TaskRepo, TimesheetEntryRepo};

use crate::error::EngineResult;
use crate::response::{into_responses, AssignedProject, TimesheetEntryResponse};
use crate::service::TimesheetService;

fn ensure_range(from: NaiveDate, to: NaiveDate) -> Result<(), CoreError> {
    if from > to {
        return Err(CoreError::Validation(format!(
            "Range start {from} is after range end {to}"
        )));
    }
    Ok(())
}

impl TimesheetService {
    /// A user's entries dated `from..=to`, frozen dates included.
    pub async fn get_timesheets(
        &self,
        user_id: DbId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<TimesheetEntryResponse>> {
        ensure_range(from, to)?;
        let rows =
            TimesheetEntryRepo::list_details_for_user_between(&self.pool, user_id, from, to).await?;
        Ok(into_responses(rows)?)
    }

    /// Submitted entries awaiting a decision by `manager_id`.
    pub async fn get_pending_approvals(
        &self,
        manager_id: DbId,
        project_id: Option<DbId>,
    ) -> EngineResult<Vec<TimesheetEntryResponse>> {
        let rows =
            TimesheetEntryRepo::list_pending_for_manager(&self.pool, manager_id, project_id).await?;
        Ok(into_responses(rows)?)
    }

    /// Projects the user may log against in `from..=to`, each with its
    /// active tasks overlapping the range.
    pub async fn get_assigned_projects(
        &self,
        user_id: DbId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<AssignedProject>> {
        ensure_range(from, to)?;
        let mut conn = self.pool.acquire().await?;

        let projects = ProjectRepo::list_assigned(&mut *conn, user_id, from, to).await?;
        let project_ids: Vec<DbId> = projects.iter().map(|p| p.project_id).collect();

        let mut tasks_by_project: HashMap<DbId, Vec<Task>> = HashMap::new();
        for task in
            TaskRepo::list_active_for_projects_between(&mut *conn, &project_ids, from, to).await?
        {
            tasks_by_project.entry(task.project_id).or_default().push(task);
        }

        Ok(projects
            .into_iter()
            .map(|project| AssignedProject {
                tasks: tasks_by_project.remove(&project.project_id).unwrap_or_default(),
                project,
            })
            .collect())
    }

    /// The subset of `candidates` still editable as of the caller's date.
    pub fn not_yet_frozen_dates(
        &self,
        candidates: &[NaiveDate],
        current_date: NaiveDate,
    ) -> Vec<NaiveDate> {
        self.freeze_window(current_date)
            .filter_editable(candidates.iter().copied())
    }

    /// Whether `current_date` is a plausible local date for some time zone
    /// right now.
    pub fn is_current_date_valid(&self, current_date: NaiveDate) -> bool {
        self.is_plausible_date(current_date)
    }
}
