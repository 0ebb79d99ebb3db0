use std::sync::Arc;

use chrono::NaiveDate;
use timesheet_core::client_date;
use timesheet_core::effort_limits::EffortLimits;
use timesheet_core::error::CoreError;
use timesheet_core::freeze_window::FreezeWindow;
use timesheet_core::policy::TimesheetPolicy;
use timesheet_db::DbPool;

use crate::clock::{Clock, SystemClock};

/// Entry point for every timesheet operation.
///
/// Holds the pool, the immutable policy and the clock used for the
/// client-date plausibility check. Operations are implemented in the
/// sibling modules (`save`, `submit`, `duplicate`, `approval`, `query`,
/// `admin`).
#[derive(Clone)]
pub struct TimesheetService {
    pub(crate) pool: DbPool,
    pub(crate) policy: Arc<TimesheetPolicy>,
    clock: Arc<dyn Clock>,
}

impl TimesheetService {
    pub fn new(pool: DbPool, policy: Arc<TimesheetPolicy>) -> Self {
        Self {
            pool,
            policy,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock, e.g. with a [`crate::FixedClock`] in tests.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn policy(&self) -> &TimesheetPolicy {
        &self.policy
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// The editable window as seen from the caller's `current_date`.
    pub fn freeze_window(&self, current_date: NaiveDate) -> FreezeWindow {
        FreezeWindow::new(current_date, self.policy.freeze_day_of_month)
    }

    pub(crate) fn limits(&self) -> EffortLimits {
        EffortLimits::from(self.policy.as_ref())
    }

    pub(crate) fn validate_current_date(&self, current_date: NaiveDate) -> Result<(), CoreError> {
        client_date::validate_current_date(current_date, self.clock.now())
    }

    pub(crate) fn is_plausible_date(&self, current_date: NaiveDate) -> bool {
        client_date::is_current_date_valid(current_date, self.clock.now())
    }
}
