//! HTTP handlers for all API routes.

pub mod config;
pub mod db;
pub mod health;
pub mod history;
pub mod ollama;
pub mod prompts;
pub mod tools;

use axum::Json;
use serde::Serialize;
use webtools_common::ApiResponse;

use crate::error::ApiError;

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Wrap `data` in a successful envelope.
pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::ok(data)))
}

/// Non-numeric or non-positive limits fall back to `default`.
pub fn parse_limit(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

/// Trimmed, non-empty text or `None`.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(Some("10"), 50), 10);
        assert_eq!(parse_limit(Some("ten"), 50), 50);
        assert_eq!(parse_limit(Some("0"), 50), 50);
        assert_eq!(parse_limit(None, 100), 100);
    }
}
