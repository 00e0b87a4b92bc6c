//! Ollama proxy: model list, SQL generation, chat and translation.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use webtools_llm::prompts::{self, Dialect, Style};
use webtools_llm::{ChatMessage, ChatRequest, GenerateOptions, GenerateRequest, ModelInfo};

use super::{non_blank, ok, ApiResult};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct ModelList {
    pub models: Vec<ModelInfo>,
    pub host: String,
}

/// GET /api/ollama/models
pub async fn list_models(State(state): State<SharedState>) -> ApiResult<ModelList> {
    let models = state.llm.list_models().await?;
    ok(ModelList { models, host: state.llm.host().to_string() })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    #[serde(default)]
    pub prompt: String,
    pub schema: Option<String>,
    pub model: Option<String>,
    pub db_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GeneratedSql {
    pub sql: String,
    /// Same text as `sql`, for clients that read the generic field.
    pub response: String,
}

/// POST /api/ollama/generate
pub async fn generate_sql(
    State(state): State<SharedState>,
    ApiJson(body): ApiJson<GenerateBody>,
) -> ApiResult<GeneratedSql> {
    let Some(request) = non_blank(Some(body.prompt.as_str())) else {
        return Err(ApiError::bad_request("Prompt is required"));
    };
    let dialect: Dialect = body.db_type.as_deref().unwrap_or_default().parse().unwrap_or_default();
    let prompt = prompts::sql_prompt(request, body.schema.as_deref(), dialect);

    let raw = state
        .llm
        .generate(GenerateRequest::new(prompt, GenerateOptions::SQL).with_model(body.model))
        .await?;
    let sql = prompts::clean_sql(&raw);
    tracing::debug!(?dialect, chars = sql.len(), "Generated SQL");
    ok(GeneratedSql { response: sql.clone(), sql })
}

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    #[serde(default)]
    pub message: String,
    pub model: Option<String>,
    /// Earlier turns, oldest first.
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub response: String,
}

/// POST /api/ollama/chat
pub async fn chat(
    State(state): State<SharedState>,
    ApiJson(body): ApiJson<ChatBody>,
) -> ApiResult<ChatReply> {
    if body.message.trim().is_empty() {
        return Err(ApiError::bad_request("Message is required"));
    }
    let mut messages = body.messages;
    messages.push(ChatMessage::user(body.message));

    let response = state
        .llm
        .chat(ChatRequest {
            messages,
            model: body.model.filter(|m| !m.trim().is_empty()),
            options: GenerateOptions::CHAT,
        })
        .await?;
    ok(ChatReply { response })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateBody {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub source_lang: String,
    #[serde(default)]
    pub target_lang: String,
    pub style: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Translation {
    pub translation: String,
}

/// POST /api/ollama/translate
pub async fn translate(
    State(state): State<SharedState>,
    ApiJson(body): ApiJson<TranslateBody>,
) -> ApiResult<Translation> {
    if body.text.trim().is_empty() || body.source_lang.is_empty() || body.target_lang.is_empty() {
        return Err(ApiError::bad_request(
            "Text, source language, and target language are required",
        ));
    }
    if body.source_lang == body.target_lang {
        return Err(ApiError::bad_request("Source and target languages cannot be the same"));
    }

    let style = Style::parse_lenient(body.style.as_deref());
    let prompt = prompts::translation_prompt(&body.text, &body.source_lang, &body.target_lang, style);
    let raw = state
        .llm
        .generate(GenerateRequest::new(prompt, GenerateOptions::TRANSLATION).with_model(body.model))
        .await?;
    ok(Translation { translation: prompts::clean_translation(&raw) })
}
