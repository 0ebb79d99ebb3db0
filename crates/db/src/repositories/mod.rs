//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods. Methods
//! that take part in an engine unit of work accept `&mut PgConnection` so
//! callers can pass `&mut *tx`; standalone CRUD accepts `&PgPool`.

pub mod membership_repo;
pub mod project_repo;
pub mod task_repo;
pub mod timesheet_entry_repo;

pub use membership_repo::MembershipRepo;
pub use project_repo::ProjectRepo;
pub use task_repo::TaskRepo;
pub use timesheet_entry_repo::TimesheetEntryRepo;
