//! SaveTimesheets.

use std::collections::{BTreeSet, HashMap};

use sqlx::PgConnection;
use timesheet_core::effort_limits::{week_bounds, EffortLedger};
use timesheet_core::error::CoreError;
use timesheet_core::planning::{ExistingEntries, TaskScope};
use timesheet_core::save_plan::{
    editable_date_range, plan_save, referenced_task_ids, validate_payload, SaveContext,
    SaveTimesheetsRequest,
};
use timesheet_core::types::DbId;
use timesheet_db::models::timesheet_entry::TimesheetEntry;
use timesheet_db::repositories::{ProjectRepo, TaskRepo, TimesheetEntryRepo};

use crate::error::EngineResult;
use crate::response::TimesheetEntryResponse;
use crate::service::TimesheetService;
use crate::unit_of_work::{execute_plan, load_responses, log_skips};

impl TimesheetService {
    /// Record the hours in `request` for `user_id`.
    ///
    /// Frozen dates, dates over a limit and locked entries are skipped; the
    /// entries actually written are returned. Nothing is written when the
    /// request fails.
    pub async fn save_timesheets(
        &self,
        user_id: DbId,
        request: &SaveTimesheetsRequest,
    ) -> EngineResult<Vec<TimesheetEntryResponse>> {
        self.validate_current_date(request.current_date)?;

        let mut tx = self.pool.begin().await?;
        let ids = self.save_in(&mut *tx, user_id, request).await?;
        let written = load_responses(&mut *tx, &ids).await?;
        tx.commit().await?;

        tracing::info!(user_id, written = written.len(), "Timesheets saved");
        Ok(written)
    }

    /// Plan and execute a save on an open transaction, returning written ids.
    ///
    /// The caller has already checked the current date.
    pub(crate) async fn save_in(
        &self,
        conn: &mut PgConnection,
        user_id: DbId,
        request: &SaveTimesheetsRequest,
    ) -> EngineResult<Vec<DbId>> {
        validate_payload(&request.days)?;

        let window = self.freeze_window(request.current_date);
        let Some((from, to)) = editable_date_range(&request.days, &window) else {
            tracing::debug!(user_id, "Every requested date is frozen");
            return Err(
                CoreError::Validation("No timesheet data available to save".to_string()).into(),
            );
        };

        let assigned: BTreeSet<DbId> = ProjectRepo::list_assigned(&mut *conn, user_id, from, to)
            .await?
            .into_iter()
            .map(|a| a.project_id)
            .collect();

        let task_ids = referenced_task_ids(&request.days);
        let tasks: HashMap<DbId, TaskScope> = TaskRepo::find_active_scopes(&mut *conn, &task_ids)
            .await?
            .into_iter()
            .map(|row| {
                let scope = TaskScope::from(row);
                (scope.task_id, scope)
            })
            .collect();

        let (week_from, _) = week_bounds(from);
        let (_, week_to) = week_bounds(to);
        let persisted =
            TimesheetEntryRepo::list_for_user_between(&mut *conn, user_id, week_from, week_to)
                .await?;
        let existing = to_existing(&persisted)?;
        let ledger = ledger_of(&persisted);

        let plan = plan_save(
            &request.days,
            SaveContext {
                window,
                limits: self.limits(),
                assigned_projects: &assigned,
                tasks: &tasks,
                existing: &existing,
                ledger,
            },
        )?;
        log_skips(user_id, "save", &plan);

        execute_plan(conn, user_id, "save", &plan).await
    }
}

pub(crate) fn to_existing(rows: &[TimesheetEntry]) -> Result<ExistingEntries, CoreError> {
    rows.iter().map(TimesheetEntry::to_existing).collect()
}

pub(crate) fn ledger_of(rows: &[TimesheetEntry]) -> EffortLedger {
    EffortLedger::from_entries(rows.iter().map(|e| (e.entry_date, e.task_id, e.hours)))
}
