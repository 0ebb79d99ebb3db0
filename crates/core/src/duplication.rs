//! Planning for DuplicateEfforts: copy one date's filled entries onto others.
//!
//! The limit check for a target date uses every source task, including tasks
//! whose window will not cover that target. This can over-reject a target;
//! it is kept that way until product confirms otherwise.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::effort_limits::{EffortLedger, EffortLimits, TaskHours};
use crate::error::CoreError;
use crate::freeze_window::FreezeWindow;
use crate::planning::{plan_owner_write, ExistingEntries, SkipReason, TaskScope, WritePlan};
use crate::types::Hours;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateEffortsRequest {
    /// The caller's local calendar date.
    pub current_date: NaiveDate,
    pub source_date: NaiveDate,
    pub target_dates: Vec<NaiveDate>,
}

/// One filled task on the source date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEffort {
    pub scope: TaskScope,
    pub hours: Hours,
}

/// Read-only inputs loaded by the engine for one duplication.
#[derive(Debug)]
pub struct DuplicationContext<'a> {
    pub limits: EffortLimits,
    pub existing: &'a ExistingEntries,
    /// Persisted hours covering every week touched by the targets.
    pub ledger: EffortLedger,
}

/// Distinct, ascending, editable target dates other than the source date.
///
/// Fails when nothing is left to copy onto.
pub fn editable_targets(
    request: &DuplicateEffortsRequest,
    window: &FreezeWindow,
) -> Result<Vec<NaiveDate>, CoreError> {
    let targets: BTreeSet<NaiveDate> = request
        .target_dates
        .iter()
        .copied()
        .filter(|d| *d != request.source_date && window.is_editable(*d))
        .collect();

    if targets.is_empty() {
        return Err(CoreError::Validation(
            "No editable target dates to duplicate onto".to_string(),
        ));
    }
    Ok(targets.into_iter().collect())
}

/// Build the write plan copying `source` onto each of `targets`.
pub fn plan_duplicate(
    source_date: NaiveDate,
    source: &[SourceEffort],
    targets: &[NaiveDate],
    ctx: DuplicationContext<'_>,
) -> Result<WritePlan, CoreError> {
    let filled: Vec<&SourceEffort> = source.iter().filter(|s| s.hours > 0).collect();
    if filled.is_empty() {
        return Err(CoreError::Validation(format!(
            "No efforts recorded on {source_date} to duplicate"
        )));
    }

    let DuplicationContext {
        limits,
        existing,
        mut ledger,
    } = ctx;

    let source_proposal: Vec<TaskHours> = filled
        .iter()
        .map(|s| (s.scope.task_id, s.hours))
        .collect();

    let mut plan = WritePlan::default();
    for &target in targets {
        if let Err(breach) = limits.check(&ledger, target, &source_proposal) {
            plan.skip_date(target, SkipReason::Limit(breach));
            continue;
        }

        let mut written = Vec::with_capacity(filled.len());
        for effort in &filled {
            match plan_owner_write(
                &effort.scope,
                target,
                effort.hours,
                existing.get(effort.scope.task_id, target),
            ) {
                Ok(write) => {
                    written.push((write.task_id(), write.hours()));
                    plan.writes.push(write);
                }
                Err(reason) => plan.skip_task(target, effort.scope.task_id, reason),
            }
        }
        ledger.record(target, &written);
    }

    if plan.writes.is_empty() {
        return Err(CoreError::Validation(
            "No target date could take the duplicated efforts".to_string(),
        ));
    }
    Ok(plan)
}
