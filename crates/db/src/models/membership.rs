//! Project membership model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use timesheet_core::types::{DbId, Timestamp};

use crate::models::status::{RecordLifecycle, StatusId};

/// A row from the `project_memberships` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Membership {
    pub id: DbId,
    pub project_id: DbId,
    pub user_id: DbId,
    pub is_billable: bool,
    pub lifecycle_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Membership {
    pub fn is_active(&self) -> bool {
        self.lifecycle_id == RecordLifecycle::Active.id()
    }
}

/// DTO for adding (or re-adding) a user to a project.
#[derive(Debug, Clone, Deserialize)]
pub struct AddMember {
    pub project_id: DbId,
    pub user_id: DbId,
    /// Defaults to `true` if omitted.
    pub is_billable: Option<bool>,
}
