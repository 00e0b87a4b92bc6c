//! Capped tool-invocation history.
//!
//! Each tool keeps its own newest-first list of [`HistoryItem`]s, bounded by
//! a fixed capacity and persisted as a plain JSON array. Lists can be merged
//! with items fetched from the server; duplicates are detected by their
//! millisecond timestamp.

use std::fs;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::records::{NewToolHistory, ToolHistory};

/// Upper bound on items kept per tool.
pub const MAX_HISTORY_ITEMS: usize = 100;

/// Characters of input/output shown in history listings.
pub const HISTORY_PREVIEW_LENGTH: usize = 200;

/// One recorded tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub input: String,
    pub output: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl HistoryItem {
    pub fn new(kind: impl Into<String>, input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            input: input.into(),
            output: output.into(),
            timestamp: Utc::now().timestamp_millis(),
            mode: None,
            data: None,
        }
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Shortened input for listings.
    pub fn input_preview(&self) -> String {
        preview(&self.input)
    }

    pub fn output_preview(&self) -> String {
        preview(&self.output)
    }

    /// Shape used when mirroring a local item into the server table.
    pub fn to_remote(&self, tool_name: &str) -> NewToolHistory {
        let mut input = serde_json::json!({
            "type": self.kind,
            "input": self.input,
            "timestamp": self.timestamp,
        });
        if let Some(mode) = &self.mode {
            input["mode"] = Value::String(mode.clone());
        }
        if let Some(data) = &self.data {
            input["data"] = data.clone();
        }
        NewToolHistory {
            tool_name: tool_name.to_string(),
            input_data: input,
            output_data: Value::String(self.output.clone()),
        }
    }

    /// Rebuild a local item from a server record.
    ///
    /// Records written by [`HistoryItem::to_remote`] round-trip exactly; any
    /// other record falls back to its text form and `created_at`.
    pub fn from_remote(record: &ToolHistory) -> Self {
        let input_obj = record.input_data.as_object();
        let field_str = |name: &str| {
            input_obj
                .and_then(|o| o.get(name))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let input = field_str("input").unwrap_or_else(|| value_text(&record.input_data));
        let kind = field_str("type").unwrap_or_else(|| record.tool_name.clone());
        let timestamp = input_obj
            .and_then(|o| o.get("timestamp"))
            .and_then(Value::as_i64)
            .unwrap_or_else(|| record.created_at.timestamp_millis());

        Self {
            kind,
            input,
            output: value_text(&record.output_data),
            timestamp,
            mode: field_str("mode"),
            data: input_obj.and_then(|o| o.get("data")).cloned(),
        }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= HISTORY_PREVIEW_LENGTH {
        return text.to_string();
    }
    let mut out: String = text.chars().take(HISTORY_PREVIEW_LENGTH).collect();
    out.push_str("...");
    out
}

/// Returns true when `value` has the minimal history item shape.
pub fn is_valid_item(value: &Value) -> bool {
    let Some(obj) = value.as_object() else { return false };
    obj.get("type").is_some_and(Value::is_string)
        && obj.get("input").is_some_and(Value::is_string)
        && obj.get("output").is_some_and(Value::is_string)
        && obj.get("timestamp").is_some_and(Value::is_number)
}

/// Per-tool storage names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Json,
    Image,
    Jwt,
    Timestamp,
    AiSql,
    JsonFix,
    Diff,
    Translate,
}

impl StorageKey {
    pub const ALL: [StorageKey; 8] = [
        StorageKey::Json,
        StorageKey::Image,
        StorageKey::Jwt,
        StorageKey::Timestamp,
        StorageKey::AiSql,
        StorageKey::JsonFix,
        StorageKey::Diff,
        StorageKey::Translate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Json => "json_history",
            StorageKey::Image => "image_history",
            StorageKey::Jwt => "jwt_history",
            StorageKey::Timestamp => "timestamp_history",
            StorageKey::AiSql => "aisql_history",
            StorageKey::JsonFix => "jsonfix_history",
            StorageKey::Diff => "diff_history",
            StorageKey::Translate => "translate_history",
        }
    }

    /// Tool name used for the server-side `tool_history.tool_name` column.
    pub fn tool_name(&self) -> &'static str {
        self.as_str().trim_end_matches("_history")
    }

    /// Accepts either the tool name (`jwt`) or the storage key (`jwt_history`).
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == name || k.tool_name() == name)
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Newest-first, capacity-bounded list of history items.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    items: Vec<HistoryItem>,
    capacity: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::with_capacity(MAX_HISTORY_ITEMS)
    }
}

impl HistoryLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { items: Vec::new(), capacity: capacity.max(1) }
    }

    /// Load a log from a JSON array file.
    ///
    /// A missing file yields an empty log. Unparseable content is logged and
    /// treated as empty; entries without the history item shape are skipped.
    pub fn load(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        let path = path.as_ref();
        let mut log = Self::with_capacity(capacity);
        if !path.exists() {
            return Ok(log);
        }

        let raw = fs::read_to_string(path)?;
        let values: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to parse history");
                return Ok(log);
            }
        };

        let total = values.len();
        log.items = values
            .into_iter()
            .filter(is_valid_item)
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect();
        if log.items.len() < total {
            tracing::debug!(
                skipped = total - log.items.len(),
                "Skipped malformed history entries"
            );
        }
        log.items.truncate(log.capacity);
        Ok(log)
    }

    /// Write the log as a JSON array, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let bytes = serde_json::to_vec(&self.items)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, index: usize) -> Option<&HistoryItem> {
        self.items.get(index)
    }

    /// Insert at the front and drop whatever falls past capacity.
    pub fn push(&mut self, item: HistoryItem) {
        self.items.insert(0, item);
        self.items.truncate(self.capacity);
    }

    /// Timestamp and push a new entry.
    pub fn record(
        &mut self,
        kind: impl Into<String>,
        input: impl Into<String>,
        output: impl Into<String>,
        mode: Option<&str>,
    ) -> &HistoryItem {
        let mut item = HistoryItem::new(kind, input, output);
        item.mode = mode.map(str::to_string);
        self.push(item);
        &self.items[0]
    }

    pub fn delete(&mut self, index: usize) -> Option<HistoryItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Merge items from another source, skipping timestamps already present.
    /// Returns how many items were added before the capacity cut.
    pub fn merge(&mut self, others: impl IntoIterator<Item = HistoryItem>) -> usize {
        let mut added = 0;
        for item in others {
            if self.items.iter().any(|i| i.timestamp == item.timestamp) {
                continue;
            }
            self.items.push(item);
            added += 1;
        }
        self.items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        self.items.truncate(self.capacity);
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn item_at(ts: i64, input: &str) -> HistoryItem {
        HistoryItem { timestamp: ts, ..HistoryItem::new("decode", input, "out") }
    }

    #[test]
    fn test_push_is_newest_first_and_capped() {
        let mut log = HistoryLog::with_capacity(3);
        for i in 0..5 {
            log.push(item_at(i, &format!("in{i}")));
        }
        assert_eq!(log.len(), 3);
        let inputs: Vec<_> = log.items().iter().map(|i| i.input.as_str()).collect();
        assert_eq!(inputs, vec!["in4", "in3", "in2"]);
    }

    #[test]
    fn test_delete_out_of_range_is_noop() {
        let mut log = HistoryLog::default();
        log.push(item_at(1, "a"));
        assert!(log.delete(5).is_none());
        assert_eq!(log.delete(0).map(|i| i.input), Some("a".to_string()));
        assert!(log.is_empty());
    }

    #[test]
    fn test_merge_dedups_on_timestamp() {
        let mut log = HistoryLog::with_capacity(10);
        log.push(item_at(100, "local-a"));
        log.push(item_at(300, "local-b"));

        let added = log.merge(vec![item_at(300, "remote-dup"), item_at(200, "remote-new")]);
        assert_eq!(added, 1);
        let stamps: Vec<_> = log.items().iter().map(|i| i.timestamp).collect();
        assert_eq!(stamps, vec![300, 200, 100]);
        assert_eq!(log.get(0).map(|i| i.input.as_str()), Some("local-b"));
    }

    #[test]
    fn test_record_stamps_and_pushes() {
        let mut log = HistoryLog::with_capacity(2);
        log.push(item_at(1, "old"));
        let before = Utc::now().timestamp_millis();
        let recorded = log.record("json_processing", " {} ", "{}", Some("format")).clone();
        let after = Utc::now().timestamp_millis();

        assert!((before..=after).contains(&recorded.timestamp));
        assert_eq!(recorded.kind, "json_processing");
        assert_eq!(recorded.mode.as_deref(), Some("format"));
        assert_eq!(log.get(0), Some(&recorded));

        log.record("json_processing", "b", "b", None);
        assert_eq!(log.len(), 2);
        assert_eq!(log.get(1).map(|i| i.input.as_str()), Some(" {} "));
    }

    #[test]
    fn test_merge_past_capacity_keeps_newest() {
        let mut log = HistoryLog::with_capacity(3);
        log.push(item_at(10, "local"));

        let added = log.merge((1..=5).map(|i| item_at(i * 5, &format!("remote{i}"))));
        // 10 is already present
        assert_eq!(added, 4);
        let stamps: Vec<_> = log.items().iter().map(|i| i.timestamp).collect();
        assert_eq!(stamps, vec![25, 20, 15]);
    }

    #[test]
    fn test_merge_dedups_within_batch() {
        let mut log = HistoryLog::with_capacity(10);
        let added = log.merge(vec![item_at(7, "first"), item_at(7, "second"), item_at(8, "third")]);
        assert_eq!(added, 2);
        let inputs: Vec<_> = log.items().iter().map(|i| i.input.as_str()).collect();
        assert_eq!(inputs, vec!["third", "first"]);
    }

    #[test]
    fn test_save_and_load_skip_invalid_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("jwt_history.json");

        let mut log = HistoryLog::default();
        log.push(item_at(1, "x").with_mode("format"));
        log.save(&path).unwrap();

        let loaded = HistoryLog::load(&path, 100).unwrap();
        assert_eq!(loaded.items(), log.items());

        std::fs::write(&path, r#"[{"type":"a","input":"i","output":"o","timestamp":5},{"type":1}]"#).unwrap();
        let loaded = HistoryLog::load(&path, 100).unwrap();
        assert_eq!(loaded.len(), 1);

        std::fs::write(&path, "not json").unwrap();
        assert!(HistoryLog::load(&path, 100).unwrap().is_empty());
    }

    #[test]
    fn test_remote_round_trip() {
        let item = item_at(1_700_000_000_000, "eyJ...").with_mode("ai");
        let remote = item.to_remote("jwt");
        let record = ToolHistory {
            id: 7,
            tool_name: remote.tool_name,
            input_data: remote.input_data,
            output_data: remote.output_data,
            created_at: Utc.timestamp_millis_opt(5).unwrap(),
        };
        assert_eq!(HistoryItem::from_remote(&record), item);
    }

    #[test]
    fn test_from_remote_foreign_record_uses_created_at() {
        let record = ToolHistory {
            id: 1,
            tool_name: "aisql".into(),
            input_data: serde_json::json!({"prompt": "list users"}),
            output_data: serde_json::json!("SELECT * FROM users"),
            created_at: Utc.timestamp_millis_opt(42).unwrap(),
        };
        let item = HistoryItem::from_remote(&record);
        assert_eq!(item.kind, "aisql");
        assert_eq!(item.timestamp, 42);
        assert_eq!(item.input, r#"{"prompt":"list users"}"#);
        assert_eq!(item.output, "SELECT * FROM users");
    }

    #[test]
    fn test_storage_key_parse() {
        assert_eq!(StorageKey::parse("jwt"), Some(StorageKey::Jwt));
        assert_eq!(StorageKey::parse("jsonfix_history"), Some(StorageKey::JsonFix));
        assert_eq!(StorageKey::AiSql.tool_name(), "aisql");
        assert_eq!(StorageKey::parse("nope"), None);
    }

    #[test]
    fn test_preview_truncates() {
        let item = HistoryItem::new("t", "x".repeat(500), "short");
        assert_eq!(item.input_preview().chars().count(), HISTORY_PREVIEW_LENGTH + 3);
        assert_eq!(item.output_preview(), "short");
    }
}
