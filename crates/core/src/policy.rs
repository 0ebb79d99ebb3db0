//! Timesheet business-rule configuration.
//!
//! The policy is loaded once at process start and shared read-only with
//! every unit of work. Nothing in the engine reads these values from
//! ambient state.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::CoreError;
use crate::types::Hours;

/// Default day of month on which the previous month freezes.
pub const DEFAULT_FREEZE_DAY_OF_MONTH: u32 = 12;

/// Default ceiling on hours logged for one calendar date.
pub const DEFAULT_DAILY_EFFORTS_LIMIT: Hours = 16;

/// Default ceiling on hours logged for one Sunday-start week.
pub const DEFAULT_WEEKLY_EFFORTS_LIMIT: Hours = 80;

/// Freeze and effort-cap rules applied to every save, submit and duplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_limit_order"))]
pub struct TimesheetPolicy {
    /// Day of month at which the previous month's entries become immutable.
    /// Clamped to the month's last day when the month is shorter.
    #[validate(range(min = 1, max = 31))]
    pub freeze_day_of_month: u32,

    #[validate(range(min = 1, max = 24))]
    pub daily_efforts_limit: Hours,

    #[validate(range(min = 1, max = 168))]
    pub weekly_efforts_limit: Hours,
}

impl Default for TimesheetPolicy {
    fn default() -> Self {
        Self {
            freeze_day_of_month: DEFAULT_FREEZE_DAY_OF_MONTH,
            daily_efforts_limit: DEFAULT_DAILY_EFFORTS_LIMIT,
            weekly_efforts_limit: DEFAULT_WEEKLY_EFFORTS_LIMIT,
        }
    }
}

impl TimesheetPolicy {
    /// Run field and cross-field validation, flattening errors into a
    /// [`CoreError::Validation`].
    pub fn validated(self) -> Result<Self, CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(format!("Invalid timesheet policy: {e}")))?;
        Ok(self)
    }
}

fn validate_limit_order(policy: &TimesheetPolicy) -> Result<(), ValidationError> {
    if policy.daily_efforts_limit > policy.weekly_efforts_limit {
        let mut err = ValidationError::new("daily_exceeds_weekly");
        err.message = Some("daily_efforts_limit must not exceed weekly_efforts_limit".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn default_policy_is_valid() {
        assert!(TimesheetPolicy::default().validated().is_ok());
    }

    #[test]
    fn freeze_day_zero_is_rejected() {
        let policy = TimesheetPolicy {
            freeze_day_of_month: 0,
            ..TimesheetPolicy::default()
        };
        assert_matches!(policy.validated(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn freeze_day_above_31_is_rejected() {
        let policy = TimesheetPolicy {
            freeze_day_of_month: 32,
            ..TimesheetPolicy::default()
        };
        assert!(policy.validated().is_err());
    }

    #[test]
    fn daily_limit_above_weekly_is_rejected() {
        let policy = TimesheetPolicy {
            freeze_day_of_month: 12,
            daily_efforts_limit: 20,
            weekly_efforts_limit: 10,
        };
        let err = policy.validated().unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("weekly"));
    }

    #[test]
    fn deserializes_from_json() {
        let policy: TimesheetPolicy = serde_json::from_str(
            r#"{"freeze_day_of_month": 5, "daily_efforts_limit": 8, "weekly_efforts_limit": 40}"#,
        )
        .unwrap();
        assert_eq!(policy.freeze_day_of_month, 5);
        assert_eq!(policy.daily_efforts_limit, 8);
        assert_eq!(policy.weekly_efforts_limit, 40);
    }
}
