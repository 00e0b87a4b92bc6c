use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Input is required")]
    EmptyInput,

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid JWT: {0}")]
    InvalidJwt(String),

    #[error("Invalid base64 segment: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Secret is required")]
    SecretRequired,

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Indent must be between 0 and 8, got {0}")]
    InvalidIndent(usize),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Both inputs must be JSON objects or arrays")]
    NotComparable,

    #[error("Only SELECT, SHOW, DESCRIBE, EXPLAIN and WITH queries are allowed")]
    ReadOnlyViolation,

    #[error("Multiple statements are not allowed")]
    MultipleStatements,
}

pub type Result<T> = std::result::Result<T, ToolError>;
