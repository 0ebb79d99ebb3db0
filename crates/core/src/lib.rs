//! Timesheet domain logic with no database or transport dependencies.
//!
//! Everything here is pure so the freeze, limit and transition rules can be
//! tested in isolation and reused by the engine and any future tooling.

pub mod approval;
pub mod client_date;
pub mod duplication;
pub mod effort_limits;
pub mod error;
pub mod freeze_window;
pub mod planning;
pub mod policy;
pub mod project_rules;
pub mod save_plan;
pub mod timesheet_status;
pub mod types;
