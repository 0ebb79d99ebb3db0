//! Transactional units of work over the timesheet domain.
//!
//! Every mutating operation opens one transaction, loads what its planner
//! needs, executes the plan and verifies row counts before committing.
//! Returning early drops the transaction, which rolls it back.

pub mod admin;
pub mod approval;
pub mod clock;
pub mod config;
pub mod duplicate;
pub mod error;
pub mod query;
pub mod response;
pub mod save;
pub mod service;
pub mod submit;

mod unit_of_work;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult, Outcome};
pub use response::{AssignedProject, TimesheetEntryResponse};
pub use service::TimesheetService;
