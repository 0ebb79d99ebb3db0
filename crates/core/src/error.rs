use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// A batch request referenced rows that do not exist or are not
    /// visible to the caller.
    #[error("Entities not found: {matched} of {requested} {entity} rows matched")]
    NotFoundBatch {
        entity: &'static str,
        requested: usize,
        matched: usize,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
