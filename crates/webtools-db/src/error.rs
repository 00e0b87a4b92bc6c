//! Database error types.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    InvalidConnection(String),

    #[error(transparent)]
    Rejected(#[from] webtools_tools::ToolError),
}

impl DbError {
    /// Errors caused by the request rather than the database.
    pub fn is_client_error(&self) -> bool {
        matches!(self, DbError::InvalidConnection(_) | DbError::Rejected(_))
    }
}
