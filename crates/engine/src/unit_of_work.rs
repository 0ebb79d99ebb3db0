//! Helpers shared by the mutating operations.

use sqlx::PgConnection;
use timesheet_core::planning::{EntryWrite, WritePlan};
use timesheet_core::types::DbId;
use timesheet_db::repositories::TimesheetEntryRepo;

use crate::error::{ensure_rows_affected, EngineResult};
use crate::response::{into_responses, TimesheetEntryResponse};

/// Execute every write of `plan` for `user_id`, returning the written ids.
///
/// A write that matches no editable row means the entry changed hands after
/// it was planned; the whole unit of work fails.
pub(crate) async fn execute_plan(
    conn: &mut PgConnection,
    user_id: DbId,
    operation: &'static str,
    plan: &WritePlan,
) -> EngineResult<Vec<DbId>> {
    let mut ids = Vec::with_capacity(plan.writes.len());
    for write in &plan.writes {
        match write {
            EntryWrite::Create(new) => {
                if let Some(row) = TimesheetEntryRepo::upsert(&mut *conn, user_id, new).await? {
                    ids.push(row.id);
                }
            }
            EntryWrite::Update(update) => {
                if let Some(row) =
                    TimesheetEntryRepo::update_effort(&mut *conn, user_id, update).await?
                {
                    ids.push(row.id);
                }
            }
        }
    }
    ensure_rows_affected(operation, plan.writes.len() as u64, ids.len() as u64)?;
    Ok(ids)
}

/// Log each policy skip of a plan.
pub(crate) fn log_skips(user_id: DbId, operation: &'static str, plan: &WritePlan) {
    for skip in &plan.skipped {
        tracing::debug!(
            user_id,
            operation,
            date = %skip.date,
            task_id = ?skip.task_id,
            reason = %skip.reason,
            "Effort skipped",
        );
    }
}

/// Reload written entries in their response shape.
pub(crate) async fn load_responses(
    conn: &mut PgConnection,
    ids: &[DbId],
) -> EngineResult<Vec<TimesheetEntryResponse>> {
    let rows = TimesheetEntryRepo::list_details_by_ids(&mut *conn, ids).await?;
    Ok(into_responses(rows)?)
}
