//! LLM backend trait and the Ollama implementation.
//!
//! Endpoints used:
//!   POST /api/generate  single prompt, non-streaming
//!   POST /api/chat      multi-turn conversation, non-streaming
//!   GET  /api/tags      installed models

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Ollama API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Invalid response from Ollama")]
    InvalidResponse,
    #[error("Model output is not valid JSON: {0}")]
    InvalidOutput(String),
}

// ── Request / Response ────────────────────────────────────────────────────────

/// Sampling options forwarded verbatim as Ollama `options`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    pub num_predict: u32,
}

impl GenerateOptions {
    pub const SQL: Self         = Self { temperature: 0.1, top_p: Some(0.9), num_predict: 1000 };
    pub const TRANSLATION: Self = Self { temperature: 0.2, top_p: Some(0.9), num_predict: 2000 };
    pub const CHAT: Self        = Self { temperature: 0.3, top_p: None,      num_predict: 2000 };
    pub const JSON_REPAIR: Self = Self { temperature: 0.1, top_p: Some(0.9), num_predict: 2000 };
}

impl Default for GenerateOptions {
    fn default() -> Self { Self::SQL }
}

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    /// Falls back to the backend's default model.
    pub model: Option<String>,
    pub options: GenerateOptions,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>, options: GenerateOptions) -> Self {
        Self { prompt: prompt.into(), model: None, options }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model.filter(|m| !m.trim().is_empty());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,   // "system" | "user" | "assistant"
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub model: Option<String>,
    pub options: GenerateOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub modified_at: String,
}

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn generate(&self, req: GenerateRequest) -> Result<String, LlmError>;
    async fn chat(&self, req: ChatRequest) -> Result<String, LlmError>;
    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError>;
    fn model_id(&self) -> &str;
    fn host(&self) -> &str;
}

async fn check_response_status(resp: reqwest::Response) -> Result<serde_json::Value, LlmError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v["error"].as_str().map(str::to_string))
            .unwrap_or(body);
        return Err(LlmError::Api { status: status.as_u16(), message });
    }
    Ok(resp.json().await?)
}

// ── Ollama ────────────────────────────────────────────────────────────────────

pub struct OllamaBackend {
    pub base_url: String,
    pub model: String,
    client: reqwest::Client,
}

impl OllamaBackend {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    fn resolve_model<'a>(&'a self, requested: &'a Option<String>) -> &'a str {
        requested.as_deref().unwrap_or(&self.model)
    }
}

#[async_trait]
impl LlmBackend for OllamaBackend {
    async fn generate(&self, req: GenerateRequest) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.base_url);
        let model = self.resolve_model(&req.model);
        let body = serde_json::json!({
            "model":   model,
            "prompt":  req.prompt,
            "stream":  false,
            "options": req.options,
        });
        tracing::debug!(model, prompt_len = req.prompt.len(), "Ollama generate");

        let resp = self.client.post(&url).json(&body).send().await?;
        let json = check_response_status(resp).await?;
        json["response"]
            .as_str()
            .map(str::to_string)
            .ok_or(LlmError::InvalidResponse)
    }

    async fn chat(&self, req: ChatRequest) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.base_url);
        let model = self.resolve_model(&req.model);
        let body = serde_json::json!({
            "model":    model,
            "messages": req.messages,
            "stream":   false,
            "options":  req.options,
        });
        tracing::debug!(model, turns = req.messages.len(), "Ollama chat");

        let resp = self.client.post(&url).json(&body).send().await?;
        let json = check_response_status(resp).await?;
        json["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or(LlmError::InvalidResponse)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = self.client.get(&url).send().await?;
        let json = check_response_status(resp).await?;
        let models = match json.get("models") {
            Some(models) if !models.is_null() => serde_json::from_value(models.clone())?,
            _ => Vec::new(),
        };
        Ok(models)
    }

    fn model_id(&self) -> &str { &self.model }
    fn host(&self) -> &str { &self.base_url }
}
