//! Configuration loading for webtools.
//!
//! Sources, later ones winning:
//!   1. built-in defaults
//!   2. `webtools.toml` in the current directory, or the file named by `WEBTOOLS_CONFIG`
//!   3. `.env` (loaded with dotenvy, never overriding variables already set)
//!   4. environment variables `API_PORT`, `DB_*`, `OLLAMA_HOST`, `OLLAMA_MODEL`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub prompts: PromptConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16    { 3001 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind(), port: default_port() }
    }
}

/// Connection settings for the persistence database (history, prompts, config).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// When false the server starts without persistence.
    #[serde(default = "bool_true")]
    pub enabled: bool,
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    #[serde(default = "default_db_user")]
    pub user: String,
    #[serde(default = "default_db_password")]
    pub password: String,
    #[serde(default = "default_db_name")]
    pub name: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn bool_true()               -> bool   { true }
fn default_db_host()         -> String { "localhost".to_string() }
fn default_db_port()         -> u16    { 5432 }
fn default_db_user()         -> String { "webtools".to_string() }
fn default_db_password()     -> String { "webtools123".to_string() }
fn default_db_name()         -> String { "webtools".to_string() }
fn default_max_connections() -> u32    { 25 }
fn default_min_connections() -> u32    { 5 }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            enabled: bool_true(),
            host: default_db_host(),
            port: default_db_port(),
            user: default_db_user(),
            password: default_db_password(),
            name: default_db_name(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
        }
    }
}

impl DatabaseConfig {
    /// Connection string with the password masked, for logs.
    pub fn display_url(&self) -> String {
        format!("postgres://{}:***@{}:{}/{}", self.user, self.host, self.port, self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_host")]
    pub host: String,
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

fn default_ollama_host()  -> String { "http://localhost:11434".to_string() }
fn default_ollama_model() -> String { "llama3.2".to_string() }

impl Default for OllamaConfig {
    fn default() -> Self {
        Self { host: default_ollama_host(), model: default_ollama_model() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Rows returned by `GET /api/history` without a `limit`.
    #[serde(default = "default_history_limit")]
    pub default_limit: i64,
    /// Items kept per tool in local history files.
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    /// Local history directory; defaults to `~/.webtools/history`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_history_limit() -> i64   { 50 }
fn default_max_items()     -> usize { 100 }

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { default_limit: default_history_limit(), max_items: default_max_items(), dir: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default = "default_prompt_limit")]
    pub default_limit: i64,
}

fn default_prompt_limit() -> i64 { 100 }

impl Default for PromptConfig {
    fn default() -> Self {
        Self { default_limit: default_prompt_limit() }
    }
}

mod tests;

impl Config {
    /// Load configuration from file, `.env` and the process environment.
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env");
        }

        let path = std::env::var("WEBTOOLS_CONFIG")
            .unwrap_or_else(|_| "webtools.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            tracing::info!(path = %path, "Loading config file");
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment overrides through `lookup`. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("API_PORT") {
            self.server.port = parse_value("API_PORT", &v)?;
        }
        if let Some(v) = get("DB_HOST") {
            self.database.host = v;
        }
        if let Some(v) = get("DB_PORT") {
            self.database.port = parse_value("DB_PORT", &v)?;
        }
        if let Some(v) = get("DB_USER") {
            self.database.user = v;
        }
        if let Some(v) = get("DB_PASSWORD") {
            self.database.password = v;
        }
        if let Some(v) = get("DB_NAME") {
            self.database.name = v;
        }
        if let Some(v) = get("DB_ENABLED") {
            self.database.enabled = parse_bool("DB_ENABLED", &v)?;
        }
        if let Some(v) = get("OLLAMA_HOST") {
            self.ollama.host = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = get("OLLAMA_MODEL") {
            self.ollama.model = v;
        }
        if let Some(v) = get("WEBTOOLS_HISTORY_DIR") {
            self.history.dir = Some(PathBuf::from(v));
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key: key.to_string(), value: value.to_string() }),
    }
}
