//! Server-side records shared by the persistence layer and the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored tool invocation (`tool_history` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolHistory {
    pub id: i64,
    pub tool_name: String,
    pub input_data: Value,
    pub output_data: Value,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for [`ToolHistory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewToolHistory {
    pub tool_name: String,
    #[serde(default)]
    pub input_data: Value,
    #[serde(default)]
    pub output_data: Value,
}

/// A reusable prompt template (`prompts` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub use_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update payload for [`Prompt`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPrompt {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewPrompt {
    /// Title and content are mandatory; tags are trimmed and empty ones dropped.
    pub fn validate(mut self) -> Option<Self> {
        if self.title.trim().is_empty() || self.content.trim().is_empty() {
            return None;
        }
        self.tags = self
            .tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        Some(self)
    }
}

/// A key/value setting (`config` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: Value,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_prompt_requires_title_and_content() {
        let p = NewPrompt { title: " ".into(), content: "x".into(), tags: vec![] };
        assert!(p.validate().is_none());

        let p = NewPrompt {
            title: "Review".into(),
            content: "Review this code".into(),
            tags: vec![" rust ".into(), "".into()],
        };
        assert_eq!(p.validate().unwrap().tags, vec!["rust".to_string()]);
    }
}
