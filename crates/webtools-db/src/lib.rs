//! webtools-db — persistence for tool history, prompts and settings,
//! plus read-only introspection of user-supplied MySQL/PostgreSQL servers.
//!
//! ```rust,no_run
//! use webtools_db::{Database, HistoryRepository, PgHistoryRepository};
//!
//! # async fn run(cfg: &webtools_config::DatabaseConfig) -> webtools_db::Result<()> {
//! let db = Database::connect(cfg).await?;
//! db.initialize().await?;
//! let history = PgHistoryRepository::new(db.pool().clone());
//! let recent = history.list("json", 10).await?;
//! # let _ = recent;
//! # Ok(())
//! # }
//! ```

pub mod config_store;
pub mod database;
pub mod error;
pub mod history;
pub mod inspect;
pub mod prompts;
pub mod schema;

pub use config_store::{ConfigRepository, PgConfigRepository};
pub use database::Database;
pub use error::{DbError, Result};
pub use history::{HistoryRepository, PgHistoryRepository, DEFAULT_HISTORY_LIMIT};
pub use prompts::{PgPromptRepository, PromptQuery, PromptRepository, DEFAULT_PROMPT_LIMIT};
