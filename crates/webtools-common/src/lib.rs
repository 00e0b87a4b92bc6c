//! webtools-common — Shared types and errors used across all webtools crates.

pub mod envelope;
pub mod error;
pub mod history;
pub mod records;

// Re-export commonly used types
pub use envelope::ApiResponse;
pub use error::{Result, WebtoolsError};
pub use history::{HistoryItem, HistoryLog, StorageKey, MAX_HISTORY_ITEMS};
pub use records::{ConfigEntry, NewPrompt, NewToolHistory, Prompt, ToolHistory};
