//! Repository for the `projects` table.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use timesheet_core::types::DbId;

use crate::models::project::{CreateProject, Project, ProjectAssignment, UpdateProjectSchedule};
use crate::models::status::active;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, start_date, end_date, billable_hours, non_billable_hours, \
    manager_id, created_at, updated_at";

/// Provides CRUD and membership-scoped reads for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    ///
    /// Budgets default to 0 when omitted.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects
                (title, start_date, end_date, billable_hours, non_billable_hours, manager_id)
             VALUES ($1, $2, $3, COALESCE($4, 0), COALESCE($5, 0), $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.title)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.billable_hours)
            .bind(input.non_billable_hours)
            .bind(input.manager_id)
            .fetch_one(pool)
            .await
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find a project by ID and lock it for the rest of the transaction.
    pub async fn find_by_id_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Update dates and budgets. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_schedule(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateProjectSchedule,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                start_date = COALESCE($2, start_date),
                end_date = COALESCE($3, end_date),
                billable_hours = COALESCE($4, billable_hours),
                non_billable_hours = COALESCE($5, non_billable_hours)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.billable_hours)
            .bind(input.non_billable_hours)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Count active tasks of a project that would fall outside `start..=end`.
    pub async fn count_tasks_outside(
        conn: &mut PgConnection,
        project_id: DbId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM tasks t
             WHERE t.project_id = $1
               AND {}
               AND (t.start_date < $2 OR t.end_date > $3)",
            active("t")
        );
        let row: (i64,) = sqlx::query_as(&query)
            .bind(project_id)
            .bind(start)
            .bind(end)
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.0)
    }

    /// Projects with an active membership for `user_id` whose window overlaps
    /// `from..=to`, ordered by title.
    pub async fn list_assigned(
        conn: &mut PgConnection,
        user_id: DbId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ProjectAssignment>, sqlx::Error> {
        let query = format!(
            "SELECT p.id AS project_id, p.title, p.start_date, p.end_date,
                    m.id AS membership_id, m.is_billable
             FROM projects p
             JOIN project_memberships m ON m.project_id = p.id
             WHERE m.user_id = $1
               AND {}
               AND p.start_date <= $3
               AND p.end_date >= $2
             ORDER BY p.title, p.id",
            active("m")
        );
        sqlx::query_as::<_, ProjectAssignment>(&query)
            .bind(user_id)
            .bind(from)
            .bind(to)
            .fetch_all(&mut *conn)
            .await
    }
}
