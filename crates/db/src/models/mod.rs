//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for inserts and patches
//! - Read-side projections joined across tables where the engine needs them

pub mod membership;
pub mod project;
pub mod status;
pub mod task;
pub mod timesheet_entry;
