//! The pure tools over HTTP, plus AI-assisted JSON repair.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use webtools_llm::{prompts, GenerateOptions, GenerateRequest};
use webtools_tools::diff::{DiffLine, DiffStats};
use webtools_tools::image::UrlItem;
use webtools_tools::json::{self, Indent, JsonMode, JsonOptions, JsonOutput};
use webtools_tools::jwt::{self, DecodedJwt};
use webtools_tools::timestamp::{self, Conversion};
use webtools_tools::{diff, image, lenient, ToolError};

use super::{ok, ApiResult};
use crate::extract::ApiJson;
use crate::state::SharedState;

fn indent_of(width: Option<usize>) -> Result<Indent, ToolError> {
    width.map_or(Ok(Indent::default()), Indent::from_width)
}

// ── JSON ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonBody {
    #[serde(default)]
    pub input: String,
    pub mode: JsonMode,
    /// Spaces per level; 0 selects a tab.
    pub indent: Option<usize>,
    pub sort_keys: Option<bool>,
}

/// POST /api/tools/json
pub async fn json_tool(ApiJson(body): ApiJson<JsonBody>) -> ApiResult<JsonOutput> {
    let defaults = JsonOptions::default();
    let opts = JsonOptions {
        indent: indent_of(body.indent)?,
        sort_keys: body.sort_keys.unwrap_or(defaults.sort_keys),
    };
    ok(json::process(body.mode, &body.input, &opts)?)
}

#[derive(Debug, Deserialize)]
pub struct FixBody {
    #[serde(default)]
    pub input: String,
    pub indent: Option<usize>,
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Fixed {
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// POST /api/tools/jsonfix
pub async fn jsonfix(ApiJson(body): ApiJson<FixBody>) -> ApiResult<Fixed> {
    let output = lenient::repair(&body.input, indent_of(body.indent)?)?;
    ok(Fixed { output, data: None })
}

/// POST /api/tools/jsonfix/ai
pub async fn jsonfix_ai(
    State(state): State<SharedState>,
    ApiJson(body): ApiJson<FixBody>,
) -> ApiResult<Fixed> {
    if body.input.trim().is_empty() {
        return Err(ToolError::EmptyInput.into());
    }
    let indent = indent_of(body.indent)?;
    let raw = state
        .llm
        .generate(
            GenerateRequest::new(prompts::json_repair_prompt(&body.input), GenerateOptions::JSON_REPAIR)
                .with_model(body.model),
        )
        .await?;
    let value = prompts::clean_json_output(&raw)?;
    ok(Fixed { output: json::to_pretty(&value, indent), data: Some(value) })
}

// ── JWT ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TokenBody {
    #[serde(default)]
    pub token: String,
    pub secret: Option<String>,
}

/// POST /api/tools/jwt/decode
pub async fn jwt_decode(ApiJson(body): ApiJson<TokenBody>) -> ApiResult<DecodedJwt> {
    ok(jwt::decode(&body.token)?)
}

#[derive(Debug, Deserialize)]
pub struct EncodeBody {
    pub header: Option<Value>,
    pub payload: Value,
    pub secret: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Encoded {
    pub token: String,
}

/// POST /api/tools/jwt/encode
pub async fn jwt_encode(ApiJson(body): ApiJson<EncodeBody>) -> ApiResult<Encoded> {
    let header = body.header.unwrap_or_else(jwt::default_header);
    let secret = body.secret.filter(|s| !s.is_empty());
    let token = jwt::encode(&header, &body.payload, secret.as_deref().unwrap_or(jwt::DEFAULT_SECRET))?;
    ok(Encoded { token })
}

#[derive(Debug, Serialize)]
pub struct Verified {
    pub valid: bool,
}

/// POST /api/tools/jwt/verify
pub async fn jwt_verify(ApiJson(body): ApiJson<TokenBody>) -> ApiResult<Verified> {
    let secret = body.secret.filter(|s| !s.is_empty()).ok_or(ToolError::SecretRequired)?;
    ok(Verified { valid: jwt::verify(&body.token, &secret)? })
}

// ── Timestamp ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct InputBody {
    #[serde(default)]
    pub input: String,
}

#[derive(Debug, Serialize)]
pub struct Conversions {
    pub conversions: Vec<Conversion>,
}

/// POST /api/tools/timestamp/to-date
pub async fn timestamp_to_date(ApiJson(body): ApiJson<InputBody>) -> ApiResult<Conversions> {
    ok(Conversions { conversions: timestamp::timestamp_to_date(&body.input)? })
}

/// POST /api/tools/timestamp/to-timestamp
pub async fn date_to_timestamp(ApiJson(body): ApiJson<InputBody>) -> ApiResult<Conversions> {
    ok(Conversions { conversions: timestamp::date_to_timestamp(&body.input)? })
}

// ── Image ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct KeyBody {
    #[serde(default)]
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct UrlList {
    pub urls: Vec<UrlItem>,
}

/// POST /api/tools/image/key-to-urls
pub async fn image_key_to_urls(ApiJson(body): ApiJson<KeyBody>) -> ApiResult<UrlList> {
    ok(UrlList { urls: image::key_to_urls(&body.key)? })
}

#[derive(Debug, Deserialize)]
pub struct UrlBody {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ImageKey {
    pub key: String,
}

/// POST /api/tools/image/url-to-key
pub async fn image_url_to_key(ApiJson(body): ApiJson<UrlBody>) -> ApiResult<ImageKey> {
    ok(ImageKey { key: image::url_to_key(&body.url)? })
}

// ── Diff ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DiffBody {
    #[serde(default)]
    pub old: String,
    #[serde(default)]
    pub new: String,
}

#[derive(Debug, Serialize)]
pub struct DiffResult {
    pub lines: Vec<DiffLine>,
    pub stats: DiffStats,
    pub identical: bool,
    pub text: String,
}

/// POST /api/tools/diff
pub async fn json_diff(ApiJson(body): ApiJson<DiffBody>) -> ApiResult<DiffResult> {
    let result = diff::diff_str(&body.old, &body.new)?;
    ok(DiffResult {
        identical: result.is_identical(),
        text: result.to_text(),
        lines: result.lines,
        stats: result.stats,
    })
}
