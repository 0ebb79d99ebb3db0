//! Repository for the `timesheet_entries` table.
//!
//! Writes here never check business rules; the engine plans them first and
//! verifies the affected row counts afterwards.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use timesheet_core::planning::{EntryUpdate, NewEntry};
use timesheet_core::timesheet_status::{StatusId, TimesheetStatus};
use timesheet_core::types::DbId;

use crate::models::status::active;
use crate::models::timesheet_entry::{SourceEffortRow, TimesheetEntry, TimesheetEntryDetail};

const COLUMNS: &str = "id, user_id, task_id, task_title, entry_date, hours, status_id, \
    manager_comment, submitted_at, created_at, updated_at";

/// Same columns qualified with the `e` alias for joined queries.
const E_COLUMNS: &str = "e.id, e.user_id, e.task_id, e.task_title, e.entry_date, e.hours, \
    e.status_id, e.manager_comment, e.submitted_at, e.created_at, e.updated_at";

const DETAIL_SELECT: &str = "SELECT e.id, e.user_id, e.task_id, e.task_title, t.project_id, \
    p.title AS project_title, e.entry_date, e.hours, e.status_id, e.manager_comment, \
    e.submitted_at, e.updated_at \
    FROM timesheet_entries e \
    JOIN tasks t ON t.id = e.task_id \
    JOIN projects p ON p.id = t.project_id";

/// Status ids an owner is allowed to overwrite.
fn owner_editable_ids() -> Vec<StatusId> {
    [
        TimesheetStatus::None,
        TimesheetStatus::Saved,
        TimesheetStatus::Submitted,
        TimesheetStatus::Approved,
        TimesheetStatus::Rejected,
    ]
    .into_iter()
    .filter(|s| s.is_owner_editable())
    .map(StatusId::from)
    .collect()
}

/// Provides entry reads and the write primitives the engine composes.
pub struct TimesheetEntryRepo;

impl TimesheetEntryRepo {
    /// All of a user's entries dated within `from..=to`.
    pub async fn list_for_user_between(
        conn: &mut PgConnection,
        user_id: DbId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TimesheetEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM timesheet_entries
             WHERE user_id = $1 AND entry_date BETWEEN $2 AND $3
             ORDER BY entry_date, task_id"
        );
        sqlx::query_as::<_, TimesheetEntry>(&query)
            .bind(user_id)
            .bind(from)
            .bind(to)
            .fetch_all(&mut *conn)
            .await
    }

    /// Detailed entries of a user within `from..=to`.
    pub async fn list_details_for_user_between(
        pool: &PgPool,
        user_id: DbId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TimesheetEntryDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT}
             WHERE e.user_id = $1 AND e.entry_date BETWEEN $2 AND $3
             ORDER BY e.entry_date, e.task_id"
        );
        sqlx::query_as::<_, TimesheetEntryDetail>(&query)
            .bind(user_id)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }

    /// Detailed entries for the given ids.
    pub async fn list_details_by_ids(
        conn: &mut PgConnection,
        ids: &[DbId],
    ) -> Result<Vec<TimesheetEntryDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT}
             WHERE e.id = ANY($1)
             ORDER BY e.entry_date, e.task_id"
        );
        sqlx::query_as::<_, TimesheetEntryDetail>(&query)
            .bind(ids)
            .fetch_all(&mut *conn)
            .await
    }

    /// Submitted entries on projects managed by `manager_id`, optionally
    /// restricted to one project.
    pub async fn list_pending_for_manager(
        pool: &PgPool,
        manager_id: DbId,
        project_id: Option<DbId>,
    ) -> Result<Vec<TimesheetEntryDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT}
             WHERE p.manager_id = $1
               AND e.status_id = $2
               AND ($3::BIGINT IS NULL OR p.id = $3)
             ORDER BY e.submitted_at, e.entry_date, e.id"
        );
        sqlx::query_as::<_, TimesheetEntryDetail>(&query)
            .bind(manager_id)
            .bind(StatusId::from(TimesheetStatus::Submitted))
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Filled entries of a user on `date` whose task is active and whose
    /// project the user is still an active member of.
    pub async fn list_source_efforts(
        conn: &mut PgConnection,
        user_id: DbId,
        date: NaiveDate,
    ) -> Result<Vec<SourceEffortRow>, sqlx::Error> {
        let query = format!(
            "SELECT e.task_id, t.project_id, t.title AS task_title, e.hours,
                    t.start_date AS task_start, t.end_date AS task_end,
                    p.start_date AS project_start, p.end_date AS project_end
             FROM timesheet_entries e
             JOIN tasks t ON t.id = e.task_id
             JOIN projects p ON p.id = t.project_id
             JOIN project_memberships m ON m.project_id = p.id AND m.user_id = e.user_id
             WHERE e.user_id = $1
               AND e.entry_date = $2
               AND e.hours > 0
               AND {}
               AND {}
             ORDER BY t.project_id, e.task_id",
            active("t"),
            active("m")
        );
        sqlx::query_as::<_, SourceEffortRow>(&query)
            .bind(user_id)
            .bind(date)
            .fetch_all(&mut *conn)
            .await
    }

    /// Insert an entry, or overwrite hours and status if one already exists
    /// for the same (user, task, date). The last concurrent writer wins.
    ///
    /// Returns `None` when the existing row is no longer owner-editable.
    pub async fn upsert(
        conn: &mut PgConnection,
        user_id: DbId,
        entry: &NewEntry,
    ) -> Result<Option<TimesheetEntry>, sqlx::Error> {
        let query = format!(
            "INSERT INTO timesheet_entries
                (user_id, task_id, task_title, entry_date, hours, status_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT ON CONSTRAINT uq_timesheet_entries_user_task_date DO UPDATE SET
                hours = EXCLUDED.hours,
                status_id = EXCLUDED.status_id
             WHERE timesheet_entries.status_id = ANY($7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimesheetEntry>(&query)
            .bind(user_id)
            .bind(entry.task_id)
            .bind(&entry.task_title)
            .bind(entry.date)
            .bind(entry.hours)
            .bind(StatusId::from(entry.status))
            .bind(owner_editable_ids())
            .fetch_optional(&mut *conn)
            .await
    }

    /// Rewrite an owner-editable entry. Returns `None` if the entry is gone,
    /// belongs to someone else, or has left the owner's hands meanwhile.
    ///
    /// The manager comment is left untouched.
    pub async fn update_effort(
        conn: &mut PgConnection,
        user_id: DbId,
        update: &EntryUpdate,
    ) -> Result<Option<TimesheetEntry>, sqlx::Error> {
        let query = format!(
            "UPDATE timesheet_entries SET hours = $3, status_id = $4
             WHERE id = $1 AND user_id = $2 AND status_id = ANY($5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimesheetEntry>(&query)
            .bind(update.entry_id)
            .bind(user_id)
            .bind(update.hours)
            .bind(StatusId::from(update.status))
            .bind(owner_editable_ids())
            .fetch_optional(&mut *conn)
            .await
    }

    /// Lock and return every `Saved` entry of a user.
    pub async fn lock_saved_for_user(
        conn: &mut PgConnection,
        user_id: DbId,
    ) -> Result<Vec<TimesheetEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM timesheet_entries
             WHERE user_id = $1 AND status_id = $2
             ORDER BY entry_date, task_id
             FOR UPDATE"
        );
        sqlx::query_as::<_, TimesheetEntry>(&query)
            .bind(user_id)
            .bind(StatusId::from(TimesheetStatus::Saved))
            .fetch_all(&mut *conn)
            .await
    }

    /// Move the given `Saved` entries of a user to `Submitted`, stamping
    /// `submitted_at`. Returns the number of rows changed.
    pub async fn mark_submitted(
        conn: &mut PgConnection,
        user_id: DbId,
        ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE timesheet_entries SET status_id = $3, submitted_at = NOW()
             WHERE user_id = $1 AND id = ANY($2) AND status_id = $4",
        )
        .bind(user_id)
        .bind(ids)
        .bind(StatusId::from(TimesheetStatus::Submitted))
        .bind(StatusId::from(TimesheetStatus::Saved))
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Lock the `Submitted` entries among `ids` that sit on projects owned by
    /// `manager_id`. Ids failing either condition are absent.
    pub async fn lock_pending_for_manager(
        conn: &mut PgConnection,
        manager_id: DbId,
        ids: &[DbId],
    ) -> Result<Vec<TimesheetEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {E_COLUMNS}
             FROM timesheet_entries e
             JOIN tasks t ON t.id = e.task_id
             JOIN projects p ON p.id = t.project_id
             WHERE e.id = ANY($1) AND e.status_id = $2 AND p.manager_id = $3
             FOR UPDATE OF e"
        );
        sqlx::query_as::<_, TimesheetEntry>(&query)
            .bind(ids)
            .bind(StatusId::from(TimesheetStatus::Submitted))
            .bind(manager_id)
            .fetch_all(&mut *conn)
            .await
    }

    /// Record a manager decision on a `Submitted` entry. Returns rows changed.
    pub async fn apply_decision(
        conn: &mut PgConnection,
        id: DbId,
        status: TimesheetStatus,
        manager_comment: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE timesheet_entries SET status_id = $2, manager_comment = $3
             WHERE id = $1 AND status_id = $4",
        )
        .bind(id)
        .bind(StatusId::from(status))
        .bind(manager_comment)
        .bind(StatusId::from(TimesheetStatus::Submitted))
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_editable_ids_exclude_locked_statuses() {
        assert_eq!(owner_editable_ids(), vec![1, 2, 5]);
    }
}
