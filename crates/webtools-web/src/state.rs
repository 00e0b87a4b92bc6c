//! Shared application state for the web server.

use std::sync::Arc;

use webtools_config::Config;
use webtools_db::{
    ConfigRepository, Database, HistoryRepository, PgConfigRepository, PgHistoryRepository,
    PgPromptRepository, PromptRepository,
};
use webtools_llm::{LlmBackend, OllamaBackend};

use crate::error::ApiError;

/// Shared state injected into every Axum handler.
///
/// The repositories are `None` when the persistence database could not be
/// reached at start-up; routes that need them answer 503.
#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<dyn LlmBackend>,
    pub history: Option<Arc<dyn HistoryRepository>>,
    pub prompts: Option<Arc<dyn PromptRepository>>,
    pub settings: Option<Arc<dyn ConfigRepository>>,
    pub history_limit: i64,
    pub prompt_limit: i64,
}

impl AppState {
    pub fn new(llm: Arc<dyn LlmBackend>) -> Self {
        Self {
            llm,
            history: None,
            prompts: None,
            settings: None,
            history_limit: webtools_db::DEFAULT_HISTORY_LIMIT,
            prompt_limit: webtools_db::DEFAULT_PROMPT_LIMIT,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let llm = OllamaBackend::new(&config.ollama.host, &config.ollama.model);
        let mut state = Self::new(Arc::new(llm));
        state.history_limit = config.history.default_limit;
        state.prompt_limit = config.prompts.default_limit;
        state
    }

    pub fn with_database(self, db: &Database) -> Self {
        let pool = db.pool().clone();
        self.with_repositories(
            Arc::new(PgHistoryRepository::new(pool.clone())),
            Arc::new(PgPromptRepository::new(pool.clone())),
            Arc::new(PgConfigRepository::new(pool)),
        )
    }

    pub fn with_repositories(
        mut self,
        history: Arc<dyn HistoryRepository>,
        prompts: Arc<dyn PromptRepository>,
        settings: Arc<dyn ConfigRepository>,
    ) -> Self {
        self.history = Some(history);
        self.prompts = Some(prompts);
        self.settings = Some(settings);
        self
    }

    pub fn history_repo(&self) -> Result<&dyn HistoryRepository, ApiError> {
        self.history.as_deref().ok_or(ApiError::DatabaseUnavailable)
    }

    pub fn prompt_repo(&self) -> Result<&dyn PromptRepository, ApiError> {
        self.prompts.as_deref().ok_or(ApiError::DatabaseUnavailable)
    }

    pub fn config_repo(&self) -> Result<&dyn ConfigRepository, ApiError> {
        self.settings.as_deref().ok_or(ApiError::DatabaseUnavailable)
    }
}

pub type SharedState = Arc<AppState>;
