//! Key/value settings.

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use webtools_common::ConfigEntry;

use super::{ok, ApiResult};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct ConfigBody {
    pub config: ConfigEntry,
}

#[derive(Debug, Deserialize)]
pub struct SetBody {
    pub value: Value,
}

/// GET /api/config/{key}
pub async fn get(State(state): State<SharedState>, Path(key): Path<String>) -> ApiResult<ConfigBody> {
    let config = state
        .config_repo()?
        .get(&key)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("config key {key} not found")))?;
    ok(ConfigBody { config })
}

/// PUT /api/config/{key}
pub async fn set(
    State(state): State<SharedState>,
    Path(key): Path<String>,
    ApiJson(body): ApiJson<SetBody>,
) -> ApiResult<ConfigBody> {
    let repo = state.config_repo()?;
    if key.trim().is_empty() {
        return Err(ApiError::bad_request("key is required"));
    }
    let config = repo.set(&key, &body.value).await?;
    ok(ConfigBody { config })
}
