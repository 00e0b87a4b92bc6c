//! Prompt templates and response cleanup for the AI tools.

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::backend::LlmError;

// ── SQL generation ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    MySql,
    Postgres,
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "mysql" => Ok(Dialect::MySql),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            other => Err(format!("unsupported database type '{other}'")),
        }
    }
}

/// Build the SQL generation prompt. Without a schema the request is sent as is.
pub fn sql_prompt(request: &str, schema: Option<&str>, dialect: Dialect) -> String {
    let Some(schema) = schema.filter(|s| !s.trim().is_empty()) else {
        return request.to_string();
    };
    match dialect {
        Dialect::MySql => format!(
            "You are a MySQL expert. Based on the following database schema, write a MySQL query for the request.\n\n\
             Database Schema:\n{schema}\n\n\
             Request: {request}\n\n\
             Write only the SQL query, nothing else. Do not include markdown code blocks."
        ),
        Dialect::Postgres => format!(
            "You are a PostgreSQL expert. Based on the following database schema, write a PostgreSQL query for the request.\n\n\
             Database Schema:\n{schema}\n\n\
             Request: {request}\n\n\
             Write only the SQL query, nothing else. Do not include markdown code blocks. \
             Use PostgreSQL syntax (e.g., SERIAL for auto-increment, $1 for parameters if needed)."
        ),
    }
}

fn sql_fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)```(sql?)?").unwrap())
}

fn sql_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^sql\s*").unwrap())
}

/// Strip Markdown fences and a leading `sql` language tag.
pub fn clean_sql(text: &str) -> String {
    let without_fences = sql_fence_regex().replace_all(text, "");
    let trimmed = without_fences.trim();
    sql_tag_regex().replace(trimmed, "").trim().to_string()
}

// ── Translation ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Standard,
    Casual,
    Formal,
}

impl Style {
    /// Unknown or missing styles read as [`Style::Standard`].
    pub fn parse_lenient(s: Option<&str>) -> Self {
        match s.map(str::trim) {
            Some("casual") => Style::Casual,
            Some("formal") => Style::Formal,
            _ => Style::Standard,
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            Style::Casual => "Use casual, conversational language that sounds natural and friendly. Prefer everyday expressions and colloquialisms where appropriate.",
            Style::Formal => "Use formal, professional language with precise terminology. Maintain a serious, academic tone suitable for business or official documents.",
            Style::Standard => "Use clear, natural language that is neither too casual nor overly formal. Aim for accuracy and readability.",
        }
    }
}

/// Display name for a language code; unknown codes pass through.
pub fn language_name(code: &str) -> &str {
    match code {
        "zh" => "Chinese",
        "en" => "English",
        "ja" => "Japanese",
        other => other,
    }
}

pub fn translation_prompt(text: &str, source: &str, target: &str, style: Style) -> String {
    let source = language_name(source);
    let target = language_name(target);
    format!(
        "You are a professional translator specializing in {source}, {target}, and cross-cultural communication.\n\n\
         Task: Translate the following {source} text to {target}.\n\n\
         Style Guidelines: {style}\n\n\
         Important Rules:\n\
         1. Provide ONLY the translation, no explanations or additional text\n\
         2. Maintain the original meaning and context\n\
         3. Adapt cultural references appropriately for the target audience\n\
         4. Preserve the tone and intent of the original text\n\
         5. Use natural, fluent language in the target language\n\
         6. If the text contains technical terms, translate them accurately\n\
         7. For names and proper nouns, use standard transliterations\n\n\
         Text to translate:\n{text}\n\n\
         Translation:",
        style = style.instruction(),
    )
}

fn translation_prefix_regexes() -> &'static [Regex; 3] {
    static RE: OnceLock<[Regex; 3]> = OnceLock::new();
    RE.get_or_init(|| {
        [
            Regex::new(r"(?i)^Translation:\s*").unwrap(),
            Regex::new(r"(?i)^Here is the translation:\s*").unwrap(),
            Regex::new(r"(?i)^The translation is:\s*").unwrap(),
        ]
    })
}

/// Remove the preambles models like to put before a translation.
pub fn clean_translation(text: &str) -> String {
    let mut out = text.to_string();
    for re in translation_prefix_regexes() {
        out = re.replace(&out, "").into_owned();
    }
    out.trim().to_string()
}

// ── JSON repair ───────────────────────────────────────────────────────────────

pub fn json_repair_prompt(input: &str) -> String {
    format!(
        "You must output ONLY valid JSON. No markdown, no explanation, no text whatsoever.\n\n\
         Input:\n{input}\n\n\
         Output (pure JSON only, nothing else):"
    )
}

/// Strip fences from model output; the remainder must parse as JSON.
pub fn clean_json_output(text: &str) -> Result<serde_json::Value, LlmError> {
    let cleaned = text.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();
    serde_json::from_str(cleaned).map_err(|e| LlmError::InvalidOutput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sql_prompt_without_schema_is_verbatim() {
        assert_eq!(sql_prompt("list users", None, Dialect::Postgres), "list users");
        assert_eq!(sql_prompt("list users", Some("  "), Dialect::MySql), "list users");
    }

    #[test]
    fn test_sql_prompt_dialects() {
        let mysql = sql_prompt("count orders", Some("Table: orders"), Dialect::MySql);
        assert!(mysql.starts_with("You are a MySQL expert."));
        assert!(mysql.contains("Database Schema:\nTable: orders\n\nRequest: count orders\n\n"));

        let pg = sql_prompt("count orders", Some("Table: orders"), Dialect::Postgres);
        assert!(pg.starts_with("You are a PostgreSQL expert."));
        assert!(pg.ends_with("$1 for parameters if needed)."));
    }

    #[test]
    fn test_dialect_parse() {
        assert_eq!("".parse::<Dialect>().unwrap(), Dialect::MySql);
        assert_eq!("postgres".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert!("oracle".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_clean_sql() {
        assert_eq!(clean_sql("```sql\nSELECT 1;\n```"), "SELECT 1;");
        assert_eq!(clean_sql("```SQL SELECT 1```"), "SELECT 1");
        assert_eq!(clean_sql("sql\nSELECT * FROM t"), "SELECT * FROM t");
        assert_eq!(clean_sql("  SELECT 2  "), "SELECT 2");
    }

    #[test]
    fn test_translation_prompt() {
        let prompt = translation_prompt("你好", "zh", "en", Style::Formal);
        assert!(prompt.starts_with("You are a professional translator specializing in Chinese, English,"));
        assert!(prompt.contains("Task: Translate the following Chinese text to English."));
        assert!(prompt.contains("Style Guidelines: Use formal, professional language"));
        assert!(prompt.ends_with("Text to translate:\n你好\n\nTranslation:"));
        assert!(translation_prompt("x", "fr", "de", Style::Standard).contains("following fr text to de"));
    }

    #[test]
    fn test_style_parse_lenient() {
        assert_eq!(Style::parse_lenient(Some("casual")), Style::Casual);
        assert_eq!(Style::parse_lenient(Some("pirate")), Style::Standard);
        assert_eq!(Style::parse_lenient(None), Style::Standard);
    }

    #[test]
    fn test_clean_translation() {
        assert_eq!(clean_translation("Translation: Hello"), "Hello");
        assert_eq!(clean_translation("here is the translation:\n Hello "), "Hello");
        assert_eq!(clean_translation("Hello"), "Hello");
    }

    #[test]
    fn test_clean_json_output() {
        let value = clean_json_output("```json\n{\"a\": 1}\n```").unwrap();
        assert_eq!(value, serde_json::json!({"a": 1}));
        assert!(matches!(clean_json_output("Sure! {\"a\": 1}"), Err(LlmError::InvalidOutput(_))));
    }
}
