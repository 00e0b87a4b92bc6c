//! Server-side tool history.

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use webtools_common::{NewToolHistory, ToolHistory};

use super::{non_blank, ok, parse_limit, ApiResult};
use crate::error::ApiError;
use crate::extract::{parse_id, ApiJson, ApiQuery};
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct Saved {
    pub entry: ToolHistory,
}

/// POST /api/history
pub async fn save(
    State(state): State<SharedState>,
    ApiJson(body): ApiJson<NewToolHistory>,
) -> ApiResult<Saved> {
    let repo = state.history_repo()?;
    if body.tool_name.trim().is_empty() {
        return Err(ApiError::bad_request("tool_name is required"));
    }
    let entry = repo.save(&body).await?;
    ok(Saved { entry })
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub tool_name: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryList {
    pub history: Vec<ToolHistory>,
}

/// GET /api/history?tool_name=&limit=
pub async fn list(
    State(state): State<SharedState>,
    ApiQuery(params): ApiQuery<HistoryParams>,
) -> ApiResult<HistoryList> {
    let repo = state.history_repo()?;
    let tool_name = non_blank(params.tool_name.as_deref())
        .ok_or_else(|| ApiError::bad_request("tool_name is required"))?;
    let limit = parse_limit(params.limit.as_deref(), state.history_limit);
    let history = repo.list(tool_name, limit).await?;
    ok(HistoryList { history })
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: u64,
}

/// DELETE /api/history/{id}
pub async fn delete(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    let repo = state.history_repo()?;
    repo.delete(parse_id(&id)?).await?;
    ok(Deleted { deleted: 1 })
}

/// DELETE /api/history?tool_name=
pub async fn clear(
    State(state): State<SharedState>,
    ApiQuery(params): ApiQuery<HistoryParams>,
) -> ApiResult<Deleted> {
    let repo = state.history_repo()?;
    let tool_name = non_blank(params.tool_name.as_deref())
        .ok_or_else(|| ApiError::bad_request("tool_name is required"))?;
    let deleted = repo.clear(tool_name).await?;
    tracing::info!(tool_name, deleted, "History cleared");
    ok(Deleted { deleted })
}
