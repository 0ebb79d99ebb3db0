use std::str::FromStr;

use timesheet_core::error::CoreError;
use timesheet_core::policy::{
    TimesheetPolicy, DEFAULT_DAILY_EFFORTS_LIMIT, DEFAULT_FREEZE_DAY_OF_MONTH,
    DEFAULT_WEEKLY_EFFORTS_LIMIT,
};
use timesheet_db::DEFAULT_MAX_CONNECTIONS;

/// Engine configuration loaded once at process start.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub policy: TimesheetPolicy,
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default    |
    /// |----------------------------------|------------|
    /// | `DATABASE_URL`                   | (required) |
    /// | `DB_MAX_CONNECTIONS`             | `20`       |
    /// | `TIMESHEET_FREEZE_DAY_OF_MONTH`  | `12`       |
    /// | `TIMESHEET_DAILY_EFFORTS_LIMIT`  | `16`       |
    /// | `TIMESHEET_WEEKLY_EFFORTS_LIMIT` | `80`       |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] with an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| CoreError::Validation("DATABASE_URL must be set".to_string()))?;

        let max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;

        let policy = TimesheetPolicy {
            freeze_day_of_month: parse_or(
                &lookup,
                "TIMESHEET_FREEZE_DAY_OF_MONTH",
                DEFAULT_FREEZE_DAY_OF_MONTH,
            )?,
            daily_efforts_limit: parse_or(
                &lookup,
                "TIMESHEET_DAILY_EFFORTS_LIMIT",
                DEFAULT_DAILY_EFFORTS_LIMIT,
            )?,
            weekly_efforts_limit: parse_or(
                &lookup,
                "TIMESHEET_WEEKLY_EFFORTS_LIMIT",
                DEFAULT_WEEKLY_EFFORTS_LIMIT,
            )?,
        }
        .validated()?;

        Ok(Self {
            database_url,
            max_connections,
            policy,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, CoreError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| CoreError::Validation(format!("{key} must be a valid number, got {raw:?}"))),
    }
}
