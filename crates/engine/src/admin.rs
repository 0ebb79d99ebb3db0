//! Project, task and membership administration.

use sqlx::PgConnection;
use timesheet_core::error::CoreError;
use timesheet_core::planning::DateWindow;
use timesheet_core::project_rules::{
    validate_budgets, validate_task_window, validate_title, validate_window,
};
use timesheet_core::types::DbId;
use timesheet_db::models::membership::{AddMember, Membership};
use timesheet_db::models::project::{CreateProject, Project, UpdateProjectSchedule};
use timesheet_db::models::status::TaskOrigin;
use timesheet_db::models::task::{CreateTask, Task};
use timesheet_db::repositories::{MembershipRepo, ProjectRepo, TaskRepo};

use crate::error::EngineResult;
use crate::service::TimesheetService;

/// Load a project and require `manager_id` to own it.
async fn owned_project(
    conn: &mut PgConnection,
    manager_id: DbId,
    project_id: DbId,
    lock: bool,
) -> EngineResult<Project> {
    let found = if lock {
        ProjectRepo::find_by_id_for_update(&mut *conn, project_id).await?
    } else {
        ProjectRepo::find_by_id(&mut *conn, project_id).await?
    };
    let project = found.ok_or(CoreError::NotFound {
        entity: "Project",
        id: project_id,
    })?;

    if project.manager_id != manager_id {
        tracing::warn!(manager_id, project_id, "Project is owned by another manager");
        return Err(CoreError::Forbidden(format!(
            "Project {project_id} is not managed by the caller"
        ))
        .into());
    }
    Ok(project)
}

impl TimesheetService {
    pub async fn create_project(&self, input: &CreateProject) -> EngineResult<Project> {
        validate_title("Project", &input.title)?;
        validate_window("Project", &DateWindow::new(input.start_date, input.end_date))?;
        validate_budgets(
            input.billable_hours.unwrap_or(0),
            input.non_billable_hours.unwrap_or(0),
        )?;

        let project = ProjectRepo::create(&self.pool, input).await?;
        tracing::info!(project_id = project.id, manager_id = project.manager_id, "Project created");
        Ok(project)
    }

    /// Change a project's dates or budgets. Only the owning manager may do
    /// this, and no active task may end up outside the new window.
    pub async fn update_project_schedule(
        &self,
        manager_id: DbId,
        project_id: DbId,
        input: &UpdateProjectSchedule,
    ) -> EngineResult<Project> {
        let mut tx = self.pool.begin().await?;
        let current = owned_project(&mut *tx, manager_id, project_id, true).await?;

        let window = DateWindow::new(
            input.start_date.unwrap_or(current.start_date),
            input.end_date.unwrap_or(current.end_date),
        );
        validate_window("Project", &window)?;
        validate_budgets(
            input.billable_hours.unwrap_or(current.billable_hours),
            input.non_billable_hours.unwrap_or(current.non_billable_hours),
        )?;

        let stranded =
            ProjectRepo::count_tasks_outside(&mut *tx, project_id, window.start, window.end)
                .await?;
        if stranded > 0 {
            return Err(CoreError::Validation(format!(
                "{stranded} active task(s) would fall outside {} to {}",
                window.start, window.end
            ))
            .into());
        }

        let updated = ProjectRepo::update_schedule(&mut *tx, project_id, input)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Project",
                id: project_id,
            })?;
        tx.commit().await?;

        tracing::info!(project_id, manager_id, "Project schedule updated");
        Ok(updated)
    }

    /// Create a task on behalf of `actor_id`.
    ///
    /// Manager-origin tasks require the actor to own the project;
    /// member-origin tasks require an active membership, which the task
    /// then references.
    pub async fn create_task(
        &self,
        actor_id: DbId,
        origin: TaskOrigin,
        input: &CreateTask,
    ) -> EngineResult<Task> {
        validate_title("Task", &input.title)?;
        let task_window = DateWindow::new(input.start_date, input.end_date);
        validate_window("Task", &task_window)?;

        let mut tx = self.pool.begin().await?;
        let membership_id = match origin {
            TaskOrigin::Manager => {
                let project = owned_project(&mut *tx, actor_id, input.project_id, false).await?;
                validate_task_window(&task_window, &project.window())?;
                None
            }
            TaskOrigin::Member => {
                let project = ProjectRepo::find_by_id(&mut *tx, input.project_id)
                    .await?
                    .ok_or(CoreError::NotFound {
                        entity: "Project",
                        id: input.project_id,
                    })?;
                validate_task_window(&task_window, &project.window())?;
                let membership = MembershipRepo::find_active(&mut *tx, input.project_id, actor_id)
                    .await?
                    .ok_or_else(|| {
                        CoreError::Forbidden(format!(
                            "User {actor_id} is not a member of project {}",
                            input.project_id
                        ))
                    })?;
                Some(membership.id)
            }
        };

        let task = TaskRepo::create(&mut *tx, input, origin, membership_id).await?;
        tx.commit().await?;

        tracing::info!(task_id = task.id, project_id = task.project_id, actor_id, ?origin, "Task created");
        Ok(task)
    }

    /// Soft-remove a task. Returns `false` if it was already removed.
    pub async fn remove_task(&self, manager_id: DbId, task_id: DbId) -> EngineResult<bool> {
        let mut tx = self.pool.begin().await?;
        let task = TaskRepo::find_by_id(&mut *tx, task_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Task",
                id: task_id,
            })?;
        owned_project(&mut *tx, manager_id, task.project_id, false).await?;

        let removed = TaskRepo::remove(&mut *tx, task_id).await?;
        tx.commit().await?;

        tracing::info!(task_id, manager_id, removed, "Task removal requested");
        Ok(removed)
    }

    /// Add `input.user_id` to a project the manager owns, reactivating a
    /// previous membership if there is one.
    pub async fn add_member(&self, manager_id: DbId, input: &AddMember) -> EngineResult<Membership> {
        let mut tx = self.pool.begin().await?;
        owned_project(&mut *tx, manager_id, input.project_id, false).await?;

        let membership = MembershipRepo::add_or_reactivate(&mut *tx, input).await?;
        tx.commit().await?;

        tracing::info!(
            project_id = input.project_id,
            user_id = input.user_id,
            membership_id = membership.id,
            "Member added",
        );
        Ok(membership)
    }

    /// Soft-remove a membership. Returns `false` if none was active.
    pub async fn remove_member(
        &self,
        manager_id: DbId,
        project_id: DbId,
        user_id: DbId,
    ) -> EngineResult<bool> {
        let mut tx = self.pool.begin().await?;
        owned_project(&mut *tx, manager_id, project_id, false).await?;

        let removed = MembershipRepo::remove(&mut *tx, project_id, user_id).await?;
        tx.commit().await?;

        tracing::info!(project_id, user_id, removed, "Member removal requested");
        Ok(removed)
    }
}
