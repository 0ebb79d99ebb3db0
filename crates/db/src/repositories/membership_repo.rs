//! Repository for the `project_memberships` table.

use sqlx::{PgConnection, PgPool};
use timesheet_core::types::DbId;

use crate::models::membership::{AddMember, Membership};
use crate::models::status::{active, RecordLifecycle};

const COLUMNS: &str = "id, project_id, user_id, is_billable, lifecycle_id, created_at, updated_at";

/// Provides membership operations. Memberships are never hard-deleted.
pub struct MembershipRepo;

impl MembershipRepo {
    /// Add a user to a project, reactivating a removed membership instead of
    /// inserting a duplicate. The billable flag is refreshed either way.
    pub async fn add_or_reactivate(
        conn: &mut PgConnection,
        input: &AddMember,
    ) -> Result<Membership, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_memberships (project_id, user_id, is_billable, lifecycle_id)
             VALUES ($1, $2, COALESCE($3, true), $4)
             ON CONFLICT ON CONSTRAINT uq_project_memberships_project_user DO UPDATE SET
                is_billable = EXCLUDED.is_billable,
                lifecycle_id = EXCLUDED.lifecycle_id
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Membership>(&query)
            .bind(input.project_id)
            .bind(input.user_id)
            .bind(input.is_billable)
            .bind(RecordLifecycle::Active.id())
            .fetch_one(&mut *conn)
            .await
    }

    /// Mark a membership removed. Returns `true` if an active row was removed.
    pub async fn remove(
        conn: &mut PgConnection,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE project_memberships m SET lifecycle_id = $3
             WHERE m.project_id = $1 AND m.user_id = $2 AND {}",
            active("m")
        );
        let result = sqlx::query(&query)
            .bind(project_id)
            .bind(user_id)
            .bind(RecordLifecycle::Removed.id())
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find the active membership of `user_id` on `project_id`.
    pub async fn find_active(
        conn: &mut PgConnection,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Membership>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_memberships m
             WHERE m.project_id = $1 AND m.user_id = $2 AND {}",
            active("m")
        );
        sqlx::query_as::<_, Membership>(&query)
            .bind(project_id)
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find a membership regardless of lifecycle.
    pub async fn find(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Membership>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_memberships
             WHERE project_id = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, Membership>(&query)
            .bind(project_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
