//! Validation for projects, tasks and memberships.

use crate::error::CoreError;
use crate::planning::DateWindow;

/// Maximum length for project and task titles.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Validate a project or task title: non-blank and within length limits.
pub fn validate_title(kind: &str, title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation(format!("{kind} title must not be empty")));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "{kind} title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// A window must not end before it starts.
pub fn validate_window(kind: &str, window: &DateWindow) -> Result<(), CoreError> {
    if window.start > window.end {
        return Err(CoreError::Validation(format!(
            "{kind} start date {} is after end date {}",
            window.start, window.end
        )));
    }
    Ok(())
}

/// Hour budgets are reporting figures, not caps, but must not be negative.
pub fn validate_budgets(billable_hours: i32, non_billable_hours: i32) -> Result<(), CoreError> {
    if billable_hours < 0 || non_billable_hours < 0 {
        return Err(CoreError::Validation(
            "Project hour budgets must not be negative".to_string(),
        ));
    }
    Ok(())
}

/// A task's window must lie inside its project's window.
pub fn validate_task_window(task: &DateWindow, project: &DateWindow) -> Result<(), CoreError> {
    validate_window("Task", task)?;
    if !project.encloses(task) {
        return Err(CoreError::Validation(format!(
            "Task window {}..{} is outside project window {}..{}",
            task.start, task.end, project.start, project.end
        )));
    }
    Ok(())
}
