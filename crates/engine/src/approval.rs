//! ApproveOrRejectTimesheets.

use timesheet_core::approval::{ensure_all_matched, resolve_decisions, ApprovalDecision};
use timesheet_core::error::CoreError;
use timesheet_core::timesheet_status::{Actor, TimesheetStatus};
use timesheet_core::types::DbId;
use timesheet_db::repositories::TimesheetEntryRepo;

use crate::error::{ensure_rows_affected, EngineResult};
use crate::response::TimesheetEntryResponse;
use crate::service::TimesheetService;
use crate::unit_of_work::load_responses;

impl TimesheetService {
    /// Apply a batch of manager decisions on submitted entries.
    ///
    /// Every distinct id must be a `Submitted` entry on a project owned by
    /// `manager_id`; otherwise the batch fails as not found and nothing
    /// changes.
    pub async fn approve_or_reject_timesheets(
        &self,
        manager_id: DbId,
        decisions: &[ApprovalDecision],
    ) -> EngineResult<Vec<TimesheetEntryResponse>> {
        let resolved = resolve_decisions(decisions)?;
        let ids: Vec<DbId> = resolved.keys().copied().collect();

        let mut tx = self.pool.begin().await?;

        let pending = TimesheetEntryRepo::lock_pending_for_manager(&mut *tx, manager_id, &ids).await?;
        if let Err(err) = ensure_all_matched(ids.len(), pending.len()) {
            tracing::warn!(
                manager_id,
                requested = ids.len(),
                matched = pending.len(),
                "Approval batch references entries the manager cannot decide",
            );
            return Err(err.into());
        }

        let mut changed = 0;
        for entry in &pending {
            let decision = resolved.get(&entry.id).ok_or_else(|| {
                CoreError::Internal(format!("Locked unrequested timesheet entry {}", entry.id))
            })?;
            entry
                .status()?
                .validate_transition(decision.status, Actor::Manager)?;
            changed += TimesheetEntryRepo::apply_decision(
                &mut *tx,
                entry.id,
                decision.status,
                decision.manager_comment.as_deref(),
            )
            .await?;
        }
        ensure_rows_affected("approval", ids.len() as u64, changed)?;

        let decided = load_responses(&mut *tx, &ids).await?;
        tx.commit().await?;

        let approved = resolved
            .values()
            .filter(|d| d.status == TimesheetStatus::Approved)
            .count();
        tracing::info!(
            manager_id,
            approved,
            rejected = resolved.len() - approved,
            "Timesheet decisions recorded",
        );
        Ok(decided)
    }
}
