//! webtools-web — JSON API for the webtools suite.
//!   - Ollama proxy: models, SQL generation, chat, translation
//!   - Ad-hoc MySQL/PostgreSQL introspection for the AI SQL tool
//!   - History, prompt library and settings persistence
//!   - The pure tools under `/api/tools/*`

pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod state;
