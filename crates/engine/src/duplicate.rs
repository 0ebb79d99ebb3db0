//! DuplicateEfforts.

use timesheet_core::duplication::{
    editable_targets, plan_duplicate, DuplicateEffortsRequest, DuplicationContext, SourceEffort,
};
use timesheet_core::effort_limits::week_bounds;
use timesheet_core::error::CoreError;
use timesheet_core::types::DbId;
use timesheet_db::repositories::TimesheetEntryRepo;

use crate::error::EngineResult;
use crate::response::TimesheetEntryResponse;
use crate::save::{ledger_of, to_existing};
use crate::service::TimesheetService;
use crate::unit_of_work::{execute_plan, load_responses, log_skips};

impl TimesheetService {
    /// Copy the filled entries of `request.source_date` onto each editable
    /// target date.
    ///
    /// Target dates over a limit are skipped whole; tasks whose window
    /// misses a target are skipped for that target.
    pub async fn duplicate_efforts(
        &self,
        user_id: DbId,
        request: &DuplicateEffortsRequest,
    ) -> EngineResult<Vec<TimesheetEntryResponse>> {
        self.validate_current_date(request.current_date)?;

        let window = self.freeze_window(request.current_date);
        let targets = editable_targets(request, &window)?;
        let (Some(&first), Some(&last)) = (targets.first(), targets.last()) else {
            return Err(CoreError::Validation(
                "No editable target dates to duplicate onto".to_string(),
            )
            .into());
        };

        let mut tx = self.pool.begin().await?;

        let source: Vec<SourceEffort> =
            TimesheetEntryRepo::list_source_efforts(&mut *tx, user_id, request.source_date)
                .await?
                .into_iter()
                .map(SourceEffort::from)
                .collect();

        let (week_from, _) = week_bounds(first);
        let (_, week_to) = week_bounds(last);
        let persisted =
            TimesheetEntryRepo::list_for_user_between(&mut *tx, user_id, week_from, week_to).await?;
        let existing = to_existing(&persisted)?;

        let plan = plan_duplicate(
            request.source_date,
            &source,
            &targets,
            DuplicationContext {
                limits: self.limits(),
                existing: &existing,
                ledger: ledger_of(&persisted),
            },
        )?;
        log_skips(user_id, "duplicate", &plan);

        let ids = execute_plan(&mut *tx, user_id, "duplicate", &plan).await?;
        let written = load_responses(&mut *tx, &ids).await?;
        tx.commit().await?;

        tracing::info!(
            user_id,
            source_date = %request.source_date,
            targets = targets.len(),
            written = written.len(),
            skipped = plan.skipped.len(),
            "Efforts duplicated",
        );
        Ok(written)
    }
}
