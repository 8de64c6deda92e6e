use thiserror::Error;

/// Errors raised by a `ContactStore`. Absence of a record is never an error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl From<crate::filter::error::FilterError> for StoreError {
    fn from(err: crate::filter::error::FilterError) -> Self {
        StoreError::QueryError(err.to_string())
    }
}
