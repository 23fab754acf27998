use thiserror::Error;

use super::sql::SqlError;

/// Failures raised by the data-access layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// The addressed record does not exist ("No company: c9").
    #[error("{0}")]
    NotFound(String),

    /// The request conflicts with stored data ("Duplicate company: c1").
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Sql(#[from] SqlError),

    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Password hashing failed: {0}")]
    Hash(#[source] anyhow::Error),
}
