//! Plausibility check for the caller-supplied "current date".
//!
//! Business rules are evaluated against the caller's local calendar day,
//! which the caller passes explicitly. The server only checks that the day
//! could be "today" somewhere on Earth: UTC offsets range from -12h to +14h.

use chrono::{Duration, NaiveDate};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Largest offset west of UTC.
pub const MAX_HOURS_BEHIND_UTC: i64 = 12;

/// Largest offset east of UTC.
pub const MAX_HOURS_AHEAD_UTC: i64 = 14;

/// Whether `client_date` is the local date of some time zone at `now`.
pub fn is_current_date_valid(client_date: NaiveDate, now: Timestamp) -> bool {
    let earliest = (now - Duration::hours(MAX_HOURS_BEHIND_UTC)).date_naive();
    let latest = (now + Duration::hours(MAX_HOURS_AHEAD_UTC)).date_naive();
    earliest <= client_date && client_date <= latest
}

/// Like [`is_current_date_valid`] but as a validation error.
pub fn validate_current_date(client_date: NaiveDate, now: Timestamp) -> Result<(), CoreError> {
    if is_current_date_valid(client_date, now) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Current date {client_date} is not plausible for server time {}",
            now.format("%Y-%m-%dT%H:%M:%SZ")
        )))
    }
}
