//! Timesheet entry status and its state machine.
//!
//! ```text
//! None -> Saved -> Submitted -> Approved
//!                            -> Rejected -> Saved
//! ```
//!
//! Owners move entries between `None`, `Saved` and `Submitted`; the manager
//! owning the entry's project moves `Submitted` entries to `Approved` or
//! `Rejected`. `Approved` is terminal. A zero-hour rewrite sends an
//! owner-editable entry back to `None`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Hours;

/// Status ID type matching SMALLINT in the `timesheet_statuses` lookup table.
pub type StatusId = i16;

/// Approval status of a single (user, task, date) entry.
///
/// Discriminants match the seed order of `timesheet_statuses`.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimesheetStatus {
    None = 1,
    Saved = 2,
    Submitted = 3,
    Approved = 4,
    Rejected = 5,
}

/// Who is asking for a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// The user the entry belongs to.
    Owner,
    /// The manager owning the entry's project.
    Manager,
}

impl TimesheetStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    pub fn name(self) -> &'static str {
        match self {
            TimesheetStatus::None => "None",
            TimesheetStatus::Saved => "Saved",
            TimesheetStatus::Submitted => "Submitted",
            TimesheetStatus::Approved => "Approved",
            TimesheetStatus::Rejected => "Rejected",
        }
    }

    /// Status an owner-written entry takes for the given hours.
    pub fn for_saved_hours(hours: Hours) -> Self {
        if hours == 0 {
            TimesheetStatus::None
        } else {
            TimesheetStatus::Saved
        }
    }

    /// Whether the owner may still rewrite hours on an entry in this status.
    pub fn is_owner_editable(self) -> bool {
        match self {
            TimesheetStatus::None | TimesheetStatus::Saved | TimesheetStatus::Rejected => true,
            TimesheetStatus::Submitted | TimesheetStatus::Approved => false,
        }
    }

    /// Target statuses reachable from `self` for the given actor.
    pub fn valid_transitions(self, actor: Actor) -> &'static [TimesheetStatus] {
        use TimesheetStatus as S;
        match (actor, self) {
            (Actor::Owner, S::None) => &[S::None, S::Saved],
            (Actor::Owner, S::Saved) => &[S::None, S::Saved, S::Submitted],
            (Actor::Owner, S::Rejected) => &[S::None, S::Saved],
            (Actor::Owner, S::Submitted | S::Approved) => &[],
            (Actor::Manager, S::Submitted) => &[S::Approved, S::Rejected],
            (Actor::Manager, S::None | S::Saved | S::Approved | S::Rejected) => &[],
        }
    }

    pub fn can_transition(self, to: TimesheetStatus, actor: Actor) -> bool {
        self.valid_transitions(actor).contains(&to)
    }

    /// Validate a state transition, returning a validation error for invalid ones.
    pub fn validate_transition(self, to: TimesheetStatus, actor: Actor) -> Result<(), CoreError> {
        if self.can_transition(to, actor) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "Invalid timesheet transition: {} -> {}",
                self.name(),
                to.name()
            )))
        }
    }
}

impl From<TimesheetStatus> for StatusId {
    fn from(value: TimesheetStatus) -> Self {
        value as StatusId
    }
}

impl TryFrom<StatusId> for TimesheetStatus {
    type Error = CoreError;

    fn try_from(id: StatusId) -> Result<Self, Self::Error> {
        match id {
            1 => Ok(TimesheetStatus::None),
            2 => Ok(TimesheetStatus::Saved),
            3 => Ok(TimesheetStatus::Submitted),
            4 => Ok(TimesheetStatus::Approved),
            5 => Ok(TimesheetStatus::Rejected),
            other => Err(CoreError::Internal(format!(
                "Unknown timesheet status id {other}"
            ))),
        }
    }
}
