//! Manager approval decisions on submitted timesheet entries.
//!
//! Validation helpers shared by the engine and any transport in front of it.
//! Ownership and pending-state checks need the database and live in the
//! engine; this module only normalizes the payload and decides the comment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::timesheet_status::{Actor, TimesheetStatus};
use crate::types::DbId;

/// Maximum length for a manager comment.
pub const MAX_MANAGER_COMMENT_LENGTH: usize = 2_000;

/// One requested decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalDecision {
    pub timesheet_id: DbId,
    pub status: TimesheetStatus,
    #[serde(default)]
    pub manager_comment: Option<String>,
}

/// A decision after normalization: target status plus the comment to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDecision {
    pub status: TimesheetStatus,
    pub manager_comment: Option<String>,
}

/// Comment persisted for a decision: kept on rejection, cleared otherwise.
pub fn comment_for(status: TimesheetStatus, comment: Option<&str>) -> Option<String> {
    match status {
        TimesheetStatus::Rejected => comment
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
        TimesheetStatus::None
        | TimesheetStatus::Saved
        | TimesheetStatus::Submitted
        | TimesheetStatus::Approved => None,
    }
}

/// Validate and de-duplicate decisions, keyed by entry id.
///
/// The same id may repeat only with an identical decision.
pub fn resolve_decisions(
    decisions: &[ApprovalDecision],
) -> Result<BTreeMap<DbId, ResolvedDecision>, CoreError> {
    if decisions.is_empty() {
        return Err(CoreError::Validation(
            "At least one timesheet decision is required".to_string(),
        ));
    }

    let mut resolved = BTreeMap::new();
    for decision in decisions {
        TimesheetStatus::Submitted.validate_transition(decision.status, Actor::Manager)?;

        if let Some(comment) = &decision.manager_comment {
            if comment.chars().count() > MAX_MANAGER_COMMENT_LENGTH {
                return Err(CoreError::Validation(format!(
                    "Manager comment exceeds maximum length of {MAX_MANAGER_COMMENT_LENGTH} characters"
                )));
            }
        }

        let next = ResolvedDecision {
            status: decision.status,
            manager_comment: comment_for(decision.status, decision.manager_comment.as_deref()),
        };
        match resolved.get(&decision.timesheet_id) {
            Some(previous) if *previous != next => {
                return Err(CoreError::Validation(format!(
                    "Conflicting decisions for timesheet {}",
                    decision.timesheet_id
                )));
            }
            Some(_) => {}
            None => {
                resolved.insert(decision.timesheet_id, next);
            }
        }
    }
    Ok(resolved)
}

/// Every requested id must have matched a pending entry the manager owns.
pub fn ensure_all_matched(requested: usize, matched: usize) -> Result<(), CoreError> {
    if requested == matched {
        Ok(())
    } else {
        Err(CoreError::NotFoundBatch {
            entity: "TimesheetEntry",
            requested,
            matched,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn decision(id: DbId, status: TimesheetStatus, comment: Option<&str>) -> ApprovalDecision {
        ApprovalDecision {
            timesheet_id: id,
            status,
            manager_comment: comment.map(str::to_string),
        }
    }

    #[test]
    fn rejection_keeps_comment() {
        assert_eq!(
            comment_for(TimesheetStatus::Rejected, Some("  missing details ")),
            Some("missing details".to_string())
        );
    }

    #[test]
    fn approval_clears_comment() {
        assert_eq!(comment_for(TimesheetStatus::Approved, Some("fine")), None);
    }

    #[test]
    fn blank_rejection_comment_is_none() {
        assert_eq!(comment_for(TimesheetStatus::Rejected, Some("   ")), None);
    }

    #[test]
    fn empty_batch_rejected() {
        assert_matches!(resolve_decisions(&[]), Err(CoreError::Validation(_)));
    }

    #[test]
    fn only_approve_or_reject_allowed() {
        let result = resolve_decisions(&[decision(1, TimesheetStatus::Saved, None)]);
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg.contains("Submitted -> Saved"));
    }

    #[test]
    fn duplicate_identical_decisions_collapse() {
        let resolved = resolve_decisions(&[
            decision(1, TimesheetStatus::Approved, None),
            decision(1, TimesheetStatus::Approved, None),
            decision(2, TimesheetStatus::Rejected, Some("redo")),
        ])
        .unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(
            resolved[&2].manager_comment.as_deref(),
            Some("redo")
        );
    }

    #[test]
    fn conflicting_duplicate_decisions_rejected() {
        let result = resolve_decisions(&[
            decision(1, TimesheetStatus::Approved, None),
            decision(1, TimesheetStatus::Rejected, Some("no")),
        ]);
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg.contains("Conflicting"));
    }

    #[test]
    fn overlong_comment_rejected() {
        let long = "x".repeat(MAX_MANAGER_COMMENT_LENGTH + 1);
        let result = resolve_decisions(&[decision(1, TimesheetStatus::Rejected, Some(&long))]);
        assert!(result.is_err());
    }

    #[test]
    fn match_count_mismatch_is_not_found() {
        assert!(ensure_all_matched(3, 3).is_ok());
        assert_matches!(
            ensure_all_matched(3, 2),
            Err(CoreError::NotFoundBatch { requested: 3, matched: 2, .. })
        );
    }

    #[test]
    fn decision_deserializes_with_status_name() {
        let d: ApprovalDecision =
            serde_json::from_str(r#"{"timesheet_id": 4, "status": "rejected", "manager_comment": "why"}"#)
                .unwrap();
        assert_eq!(d.status, TimesheetStatus::Rejected);
    }
}
