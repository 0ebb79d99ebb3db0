//! SubmitTimesheets.

use timesheet_core::error::CoreError;
use timesheet_core::save_plan::SaveTimesheetsRequest;
use timesheet_core::timesheet_status::{Actor, TimesheetStatus};
use timesheet_core::types::DbId;
use timesheet_db::repositories::TimesheetEntryRepo;

use crate::error::{ensure_rows_affected, EngineResult};
use crate::response::TimesheetEntryResponse;
use crate::service::TimesheetService;
use crate::unit_of_work::load_responses;

impl TimesheetService {
    /// Save `request` (when it carries any days) and submit every saved,
    /// non-frozen entry of `user_id` in the same transaction.
    ///
    /// Fails without changes when nothing is left to submit.
    pub async fn submit_timesheets(
        &self,
        user_id: DbId,
        request: &SaveTimesheetsRequest,
    ) -> EngineResult<Vec<TimesheetEntryResponse>> {
        self.validate_current_date(request.current_date)?;

        let mut tx = self.pool.begin().await?;
        if !request.days.is_empty() {
            self.save_in(&mut *tx, user_id, request).await?;
        }

        let saved = TimesheetEntryRepo::lock_saved_for_user(&mut *tx, user_id).await?;
        if saved.is_empty() {
            return Err(
                CoreError::Validation("No saved timesheets to submit".to_string()).into(),
            );
        }

        let window = self.freeze_window(request.current_date);
        let mut ids = Vec::with_capacity(saved.len());
        for entry in &saved {
            if !window.is_editable(entry.entry_date) {
                tracing::debug!(user_id, entry_id = entry.id, date = %entry.entry_date, "Skipping frozen entry");
                continue;
            }
            entry
                .status()?
                .validate_transition(TimesheetStatus::Submitted, Actor::Owner)?;
            ids.push(entry.id);
        }
        if ids.is_empty() {
            return Err(CoreError::Validation(
                "All saved timesheets fall on frozen dates".to_string(),
            )
            .into());
        }

        let changed = TimesheetEntryRepo::mark_submitted(&mut *tx, user_id, &ids).await?;
        ensure_rows_affected("submit", ids.len() as u64, changed)?;

        let submitted = load_responses(&mut *tx, &ids).await?;
        tx.commit().await?;

        tracing::info!(
            user_id,
            submitted = submitted.len(),
            frozen = saved.len() - ids.len(),
            "Timesheets submitted",
        );
        Ok(submitted)
    }
}
