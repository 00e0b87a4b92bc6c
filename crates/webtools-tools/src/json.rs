//! JSON formatter: format, minify, escape, unescape and quick fix.

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, ToolError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonMode {
    Format,
    Minify,
    Escape,
    Unescape,
    Fix,
}

impl JsonMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonMode::Format   => "format",
            JsonMode::Minify   => "minify",
            JsonMode::Escape   => "escape",
            JsonMode::Unescape => "unescape",
            JsonMode::Fix      => "fix",
        }
    }
}

impl FromStr for JsonMode {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "format"   => Ok(JsonMode::Format),
            "minify"   => Ok(JsonMode::Minify),
            "escape"   => Ok(JsonMode::Escape),
            "unescape" => Ok(JsonMode::Unescape),
            "fix"      => Ok(JsonMode::Fix),
            other => Err(ToolError::InvalidJson(format!("unknown mode '{other}'"))),
        }
    }
}

/// Widest indent accepted from callers.
pub const MAX_INDENT: usize = 8;

/// Pretty-print indentation. A width of 0 selects tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    Spaces(usize),
    Tab,
}

impl Indent {
    pub fn from_width(width: usize) -> Result<Self> {
        match width {
            0 => Ok(Indent::Tab),
            n if n <= MAX_INDENT => Ok(Indent::Spaces(n)),
            n => Err(ToolError::InvalidIndent(n)),
        }
    }

    /// Fails for a space width above [`MAX_INDENT`].
    pub fn check(self) -> Result<Self> {
        match self {
            Indent::Spaces(n) if n > MAX_INDENT => Err(ToolError::InvalidIndent(n)),
            other => Ok(other),
        }
    }

    fn as_bytes(&self) -> Vec<u8> {
        match self {
            Indent::Spaces(n) => vec![b' '; (*n).min(MAX_INDENT)],
            Indent::Tab => vec![b'\t'],
        }
    }
}

impl Default for Indent {
    fn default() -> Self { Indent::Spaces(2) }
}

#[derive(Debug, Clone, Copy)]
pub struct JsonOptions {
    pub indent: Indent,
    pub sort_keys: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self { indent: Indent::default(), sort_keys: true }
    }
}

/// Result of [`process`]. `repaired` is set by [`JsonMode::Fix`] and holds
/// the corrected source text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonOutput {
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repaired: Option<String>,
}

impl JsonOutput {
    fn plain(output: String) -> Self {
        Self { output, repaired: None }
    }
}

/// Live validation state of an input buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "lowercase")]
pub enum Validation {
    Empty,
    Valid,
    Invalid(String),
}

/// Run one formatter operation over `input`.
pub fn process(mode: JsonMode, input: &str, opts: &JsonOptions) -> Result<JsonOutput> {
    let raw = input.trim();
    if raw.is_empty() {
        return Err(ToolError::EmptyInput);
    }
    opts.indent.check()?;

    match mode {
        JsonMode::Escape => Ok(JsonOutput::plain(escape(raw))),
        JsonMode::Unescape => Ok(JsonOutput::plain(unescape(raw, opts.indent))),
        JsonMode::Format => {
            let mut value = parse(raw)?;
            if opts.sort_keys {
                value = sort_keys(&value);
            }
            Ok(JsonOutput::plain(to_pretty(&value, opts.indent)))
        }
        JsonMode::Minify => {
            let value = parse(raw)?;
            Ok(JsonOutput::plain(value.to_string()))
        }
        JsonMode::Fix => {
            let repaired = quick_fix(raw);
            let value = parse(&repaired)?;
            Ok(JsonOutput {
                output: to_pretty(&value, opts.indent),
                repaired: Some(repaired),
            })
        }
    }
}

pub fn parse(input: &str) -> Result<Value> {
    serde_json::from_str(input).map_err(|e| ToolError::InvalidJson(e.to_string()))
}

pub fn validate(input: &str) -> Validation {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Validation::Empty;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(_) => Validation::Valid,
        Err(e) => Validation::Invalid(e.to_string()),
    }
}

/// Recursively sort object keys; arrays keep their element order.
pub fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::with_capacity(map.len());
            for key in keys {
                sorted.insert(key.clone(), sort_keys(&map[key]));
            }
            Value::Object(sorted)
        }
        other => other.clone(),
    }
}

pub fn to_pretty(value: &Value, indent: Indent) -> String {
    let indent = indent.as_bytes();
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    if value.serialize(&mut ser).is_err() {
        return value.to_string();
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// The raw text as a JSON string literal.
pub fn escape(raw: &str) -> String {
    Value::String(raw.to_string()).to_string()
}

/// Undo [`escape`]. Text that is not valid JSON gets `\"` and `\\` unescaped.
pub fn unescape(raw: &str, indent: Indent) -> String {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::String(s)) => s,
        Ok(other) => to_pretty(&other, indent),
        Err(_) => raw.replace("\\\"", "\"").replace("\\\\", "\\"),
    }
}

fn bare_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([{,]\s*)([a-zA-Z_$][a-zA-Z0-9_$]*)\s*:").unwrap())
}

fn trailing_comma_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",(\s*[}\]])").unwrap())
}

/// Best-effort repair of JavaScript-ish object literals:
/// single quotes, bare keys and trailing commas.
pub fn quick_fix(raw: &str) -> String {
    let fixed = raw.replace('\'', "\"");
    let fixed = bare_key_regex().replace_all(&fixed, "$1\"$2\":");
    trailing_comma_regex().replace_all(&fixed, "$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_sorts_nested_keys() {
        let out = process(
            JsonMode::Format,
            r#"{"b":1,"a":{"d":[{"z":1,"y":2}],"c":true}}"#,
            &JsonOptions::default(),
        )
        .unwrap();
        let expected = "{\n  \"a\": {\n    \"c\": true,\n    \"d\": [\n      {\n        \"y\": 2,\n        \"z\": 1\n      }\n    ]\n  },\n  \"b\": 1\n}";
        assert_eq!(out.output, expected);
    }

    #[test]
    fn test_format_keeps_input_order_when_not_sorting() {
        let opts = JsonOptions { indent: Indent::Spaces(4), sort_keys: false };
        let out = process(JsonMode::Format, r#"{"b":1,"a":2}"#, &opts).unwrap();
        assert_eq!(out.output, "{\n    \"b\": 1,\n    \"a\": 2\n}");
    }

    #[test]
    fn test_tab_indent() {
        let opts = JsonOptions { indent: Indent::from_width(0).unwrap(), sort_keys: false };
        let out = process(JsonMode::Format, r#"{"a":[1]}"#, &opts).unwrap();
        assert_eq!(out.output, "{\n\t\"a\": [\n\t\t1\n\t]\n}");
    }

    #[test]
    fn test_indent_width_is_bounded() {
        assert_eq!(Indent::from_width(4).unwrap(), Indent::Spaces(4));
        assert!(matches!(Indent::from_width(1_000_000_000), Err(ToolError::InvalidIndent(_))));

        let opts = JsonOptions { indent: Indent::Spaces(usize::MAX), sort_keys: false };
        let err = process(JsonMode::Format, r#"{"a":1}"#, &opts).unwrap_err();
        assert!(matches!(err, ToolError::InvalidIndent(_)));
        assert_eq!(to_pretty(&serde_json::json!([1]), Indent::Spaces(usize::MAX)), "[\n        1\n]");
    }

    #[test]
    fn test_minify() {
        let out = process(JsonMode::Minify, "{\n \"a\" : [1, 2],\n \"b\": null }", &JsonOptions::default()).unwrap();
        assert_eq!(out.output, r#"{"a":[1,2],"b":null}"#);
    }

    #[test]
    fn test_escape_then_unescape() {
        let escaped = process(JsonMode::Escape, r#"{"a":"b"}"#, &JsonOptions::default()).unwrap();
        assert_eq!(escaped.output, r#""{\"a\":\"b\"}""#);
        let back = process(JsonMode::Unescape, &escaped.output, &JsonOptions::default()).unwrap();
        assert_eq!(back.output, r#"{"a":"b"}"#);
    }

    #[test]
    fn test_unescape_fallbacks() {
        assert_eq!(unescape(r#"{"a":1}"#, Indent::Spaces(2)), "{\n  \"a\": 1\n}");
        assert_eq!(unescape(r#"say \"hi\" C:\\tmp"#, Indent::Spaces(2)), r#"say "hi" C:\tmp"#);
    }

    #[test]
    fn test_fix_repairs_js_literal() {
        let out = process(JsonMode::Fix, "{name: 'John', tags: ['a', 'b',], }", &JsonOptions::default()).unwrap();
        assert_eq!(out.repaired.as_deref(), Some(r#"{"name": "John", "tags": ["a", "b"]}"#));
        assert_eq!(out.output, "{\n  \"name\": \"John\",\n  \"tags\": [\n    \"a\",\n    \"b\"\n  ]\n}");
    }

    #[test]
    fn test_invalid_and_empty_input() {
        assert!(matches!(process(JsonMode::Format, "   ", &JsonOptions::default()), Err(ToolError::EmptyInput)));
        let err = process(JsonMode::Minify, "{a:1}", &JsonOptions::default()).unwrap_err();
        assert!(err.to_string().starts_with("Invalid JSON"));
    }

    #[test]
    fn test_validate() {
        assert_eq!(validate(""), Validation::Empty);
        assert_eq!(validate("[1,2]"), Validation::Valid);
        assert!(matches!(validate("[1,"), Validation::Invalid(_)));
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("Minify".parse::<JsonMode>().unwrap(), JsonMode::Minify);
        assert!("pretty".parse::<JsonMode>().is_err());
    }
}
