//! Repository for the `tasks` table.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use timesheet_core::types::DbId;

use crate::models::status::{active, RecordLifecycle, TaskOrigin};
use crate::models::task::{CreateTask, Task, TaskScopeRow};

const COLUMNS: &str = "id, project_id, title, start_date, end_date, origin_id, membership_id, \
    lifecycle_id, created_at, updated_at";

/// Provides task operations. Removal is a lifecycle change, never a delete.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a task. Member-added tasks carry the member's `membership_id`.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateTask,
        origin: TaskOrigin,
        membership_id: Option<DbId>,
    ) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks
                (project_id, title, start_date, end_date, origin_id, membership_id, lifecycle_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(input.project_id)
            .bind(&input.title)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(origin.id())
            .bind(membership_id)
            .bind(RecordLifecycle::Active.id())
            .fetch_one(&mut *conn)
            .await
    }

    /// Find a task by ID regardless of lifecycle.
    pub async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Mark a task removed. Returns `true` if an active row was removed.
    ///
    /// Entries already logged against the task are kept.
    pub async fn remove(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE tasks t SET lifecycle_id = $2 WHERE t.id = $1 AND {}",
            active("t")
        );
        let result = sqlx::query(&query)
            .bind(id)
            .bind(RecordLifecycle::Removed.id())
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List the active tasks of a project ordered by start date.
    pub async fn list_active_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks t
             WHERE t.project_id = $1 AND {}
             ORDER BY t.start_date, t.id",
            active("t")
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Active tasks of the given projects whose window overlaps `from..=to`.
    pub async fn list_active_for_projects_between(
        conn: &mut PgConnection,
        project_ids: &[DbId],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks t
             WHERE t.project_id = ANY($1)
               AND {}
               AND t.start_date <= $3
               AND t.end_date >= $2
             ORDER BY t.project_id, t.start_date, t.id",
            active("t")
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(project_ids)
            .bind(from)
            .bind(to)
            .fetch_all(&mut *conn)
            .await
    }

    /// Active tasks among `task_ids`, joined with their project windows.
    ///
    /// Removed or unknown ids are simply absent from the result.
    pub async fn find_active_scopes(
        conn: &mut PgConnection,
        task_ids: &[DbId],
    ) -> Result<Vec<TaskScopeRow>, sqlx::Error> {
        let query = format!(
            "SELECT t.id AS task_id, t.project_id, t.title,
                    t.start_date AS task_start, t.end_date AS task_end,
                    p.start_date AS project_start, p.end_date AS project_end
             FROM tasks t
             JOIN projects p ON p.id = t.project_id
             WHERE t.id = ANY($1) AND {}",
            active("t")
        );
        sqlx::query_as::<_, TaskScopeRow>(&query)
            .bind(task_ids)
            .fetch_all(&mut *conn)
            .await
    }
}
