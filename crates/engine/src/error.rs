use timesheet_core::error::CoreError;

/// Error type returned by every engine operation.
///
/// Wraps [`CoreError`] for domain failures and keeps database errors intact
/// so callers can log them; [`EngineError::outcome`] gives the category a
/// transport should report.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A domain-level error from `timesheet_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for engine return values.
pub type EngineResult<T> = Result<T, EngineError>;

/// What the caller should be told about a failed unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Validation,
    NotFound,
    Forbidden,
    ServerError,
}

impl EngineError {
    pub fn outcome(&self) -> Outcome {
        match self {
            EngineError::Core(core) => match core {
                CoreError::NotFound { .. } | CoreError::NotFoundBatch { .. } => Outcome::NotFound,
                CoreError::Validation(_) => Outcome::Validation,
                CoreError::Forbidden(_) => Outcome::Forbidden,
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal engine error");
                    Outcome::ServerError
                }
            },
            EngineError::Database(err) => classify_sqlx_error(err),
        }
    }
}

/// Classify a sqlx error.
///
/// - `RowNotFound` is NotFound.
/// - Unique (`uq_`) and check (`ck_`) constraint violations are Validation.
/// - Everything else is a server error.
fn classify_sqlx_error(err: &sqlx::Error) -> Outcome {
    match err {
        sqlx::Error::RowNotFound => Outcome::NotFound,
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or_default();
            match db_err.code().as_deref() {
                // PostgreSQL unique_violation
                Some("23505") if constraint.starts_with("uq_") => Outcome::Validation,
                // PostgreSQL check_violation
                Some("23514") if constraint.starts_with("ck_") => Outcome::Validation,
                _ => {
                    tracing::error!(error = %db_err, "Database error");
                    Outcome::ServerError
                }
            }
        }
        other => {
            tracing::error!(error = %other, "Database error");
            Outcome::ServerError
        }
    }
}

/// Fail the unit of work when a write touched a different number of rows
/// than the plan called for.
pub(crate) fn ensure_rows_affected(
    operation: &'static str,
    expected: u64,
    actual: u64,
) -> Result<(), CoreError> {
    if expected == actual {
        return Ok(());
    }
    tracing::error!(operation, expected, actual, "Row count mismatch, rolling back");
    Err(CoreError::Internal(format!(
        "{operation} affected {actual} rows, expected {expected}"
    )))
}
