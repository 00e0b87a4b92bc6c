//! Prompt library CRUD.

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use webtools_common::{NewPrompt, Prompt};
use webtools_db::PromptQuery;

use super::{non_blank, ok, parse_limit, ApiResult};
use crate::error::ApiError;
use crate::extract::{parse_id, ApiJson, ApiQuery};
use crate::state::SharedState;

const REQUIRED: &str = "title and content are required";

#[derive(Debug, Serialize)]
pub struct PromptBody {
    pub prompt: Prompt,
}

#[derive(Debug, Serialize)]
pub struct PromptList {
    pub prompts: Vec<Prompt>,
}

#[derive(Debug, Serialize)]
pub struct TagList {
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct UseCount {
    pub use_count: i32,
}

#[derive(Debug, Serialize)]
pub struct Empty {}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub tags: Option<String>,
    pub limit: Option<String>,
}

/// POST /api/prompts
pub async fn create(
    State(state): State<SharedState>,
    ApiJson(body): ApiJson<NewPrompt>,
) -> ApiResult<PromptBody> {
    let repo = state.prompt_repo()?;
    let draft = body.validate().ok_or_else(|| ApiError::bad_request(REQUIRED))?;
    let prompt = repo.create(&draft).await?;
    tracing::info!(id = prompt.id, "Prompt created");
    ok(PromptBody { prompt })
}

/// GET /api/prompts?search=&tags=a,b&limit=
pub async fn list(
    State(state): State<SharedState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<PromptList> {
    let repo = state.prompt_repo()?;
    let query = PromptQuery {
        search: non_blank(params.search.as_deref()).map(str::to_string),
        tags: PromptQuery::split_tags(params.tags.as_deref()),
        limit: parse_limit(params.limit.as_deref(), state.prompt_limit),
    };
    let prompts = repo.list(&query).await?;
    ok(PromptList { prompts })
}

/// GET /api/prompts/tags
pub async fn tags(State(state): State<SharedState>) -> ApiResult<TagList> {
    let tags = state.prompt_repo()?.tags().await?;
    ok(TagList { tags })
}

/// GET /api/prompts/{id}
pub async fn get(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<PromptBody> {
    let repo = state.prompt_repo()?;
    let prompt = repo.get(parse_id(&id)?).await?;
    ok(PromptBody { prompt })
}

/// PUT /api/prompts/{id}
pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<NewPrompt>,
) -> ApiResult<PromptBody> {
    let repo = state.prompt_repo()?;
    let id = parse_id(&id)?;
    let draft = body.validate().ok_or_else(|| ApiError::bad_request(REQUIRED))?;
    let prompt = repo.update(id, &draft).await?;
    ok(PromptBody { prompt })
}

/// DELETE /api/prompts/{id}
pub async fn delete(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Empty> {
    let repo = state.prompt_repo()?;
    repo.delete(parse_id(&id)?).await?;
    ok(Empty {})
}

/// POST /api/prompts/{id}/use
pub async fn increment_use(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<UseCount> {
    let repo = state.prompt_repo()?;
    let use_count = repo.increment_use(parse_id(&id)?).await?;
    ok(UseCount { use_count })
}
