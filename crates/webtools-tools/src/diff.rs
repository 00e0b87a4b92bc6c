//! Top-level structural diff of two JSON documents.

use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, ToolError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Added,
    Removed,
    Modified,
    Unchanged,
}

/// One changed key. Values are compact JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffLine {
    #[serde(rename = "type")]
    pub kind: DiffKind,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonDiff {
    pub lines: Vec<DiffLine>,
    pub stats: DiffStats,
}

impl JsonDiff {
    pub fn is_identical(&self) -> bool {
        self.lines.iter().all(|l| l.kind == DiffKind::Unchanged)
    }

    /// Plain-text rendering used for history and the CLI.
    pub fn to_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| {
                let old = line.old_value.as_deref().unwrap_or_default();
                let new = line.new_value.as_deref().unwrap_or_default();
                match line.kind {
                    DiffKind::Unchanged => "No differences found".to_string(),
                    DiffKind::Added => format!("+ {}: {}", line.key, new),
                    DiffKind::Removed => format!("- {}: {}", line.key, old),
                    DiffKind::Modified => format!("~ {}:\n  - {}\n  + {}", line.key, old, new),
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Top-level entries as (key, value) pairs; array indices become keys.
fn entries(value: &Value) -> Result<Vec<(String, &Value)>> {
    match value {
        Value::Object(map) => Ok(map.iter().map(|(k, v)| (k.clone(), v)).collect()),
        Value::Array(items) => Ok(items.iter().enumerate().map(|(i, v)| (i.to_string(), v)).collect()),
        _ => Err(ToolError::NotComparable),
    }
}

fn lookup<'a>(entries: &'a [(String, &'a Value)], key: &str) -> Option<&'a Value> {
    entries.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
}

pub fn diff(old: &Value, new: &Value) -> Result<JsonDiff> {
    let old_entries = entries(old)?;
    let new_entries = entries(new)?;

    let mut lines = Vec::new();
    let mut stats = DiffStats::default();

    for (key, value) in &old_entries {
        if lookup(&new_entries, key).is_none() {
            stats.removed += 1;
            lines.push(DiffLine {
                kind: DiffKind::Removed,
                key: key.clone(),
                old_value: Some(value.to_string()),
                new_value: None,
            });
        }
    }

    for (key, value) in &new_entries {
        if lookup(&old_entries, key).is_none() {
            stats.added += 1;
            lines.push(DiffLine {
                kind: DiffKind::Added,
                key: key.clone(),
                old_value: None,
                new_value: Some(value.to_string()),
            });
        }
    }

    for (key, old_value) in &old_entries {
        let Some(new_value) = lookup(&new_entries, key) else { continue };
        let (old_text, new_text) = (old_value.to_string(), new_value.to_string());
        if old_text != new_text {
            // a modification counts on both sides
            stats.added += 1;
            stats.removed += 1;
            lines.push(DiffLine {
                kind: DiffKind::Modified,
                key: key.clone(),
                old_value: Some(old_text),
                new_value: Some(new_text),
            });
        }
    }

    if lines.is_empty() {
        lines.push(DiffLine {
            kind: DiffKind::Unchanged,
            key: String::new(),
            old_value: None,
            new_value: None,
        });
    }

    Ok(JsonDiff { lines, stats })
}

/// [`diff`] over JSON text.
pub fn diff_str(old: &str, new: &str) -> Result<JsonDiff> {
    if old.trim().is_empty() || new.trim().is_empty() {
        return Err(ToolError::EmptyInput);
    }
    let old: Value = serde_json::from_str(old).map_err(|e| ToolError::InvalidJson(e.to_string()))?;
    let new: Value = serde_json::from_str(new).map_err(|e| ToolError::InvalidJson(e.to_string()))?;
    diff(&old, &new)
}
