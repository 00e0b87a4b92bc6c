//! Tool commands: run the pure tools and describe what to record.

use std::io::Read;

use anyhow::{bail, Context};
use serde_json::json;
use webtools_common::{HistoryItem, StorageKey};
use webtools_config::Config;
use webtools_tools::json::{self, Indent, JsonOptions};
use webtools_tools::{diff, image, jwt, lenient, timestamp};

use crate::cli::{Command, ImageCommand, JwtCommand, TsCommand};

/// Result of one tool command.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub output: String,
    /// History entry to store, if the command is recorded.
    pub record: Option<(StorageKey, HistoryItem)>,
}

impl Outcome {
    fn recorded(output: String, key: StorageKey, item: HistoryItem) -> Self {
        Self { output, record: Some((key, item)) }
    }

    fn plain(output: String) -> Self {
        Self { output, record: None }
    }
}

/// Configuration for `command`. Tool commands run on defaults when the
/// configuration cannot be loaded; `history` commands fail instead.
pub fn settle_config(loaded: webtools_config::Result<Config>, command: &Command) -> anyhow::Result<Config> {
    match loaded {
        Ok(config) => Ok(config),
        Err(e) if !matches!(command, Command::History { .. }) => {
            tracing::warn!(error = %e, "Invalid configuration, using defaults");
            Ok(Config::default())
        }
        Err(e) => Err(anyhow::Error::new(e).context("loading configuration")),
    }
}

/// Run a tool command. `history` commands are handled by the caller.
pub fn run_tool(command: Command, stdin: &mut dyn Read) -> anyhow::Result<Outcome> {
    match command {
        Command::Json { mode, indent, no_sort, input } => {
            let raw = input.read(stdin)?;
            let opts = JsonOptions { indent: Indent::from_width(indent)?, sort_keys: !no_sort };
            let result = json::process(mode, &raw, &opts)?;
            let item = HistoryItem::new("json_processing", raw.trim(), result.output.as_str())
                .with_mode(mode.as_str());
            Ok(Outcome::recorded(result.output, StorageKey::Json, item))
        }

        Command::Jsonfix { indent, input } => {
            let raw = input.read(stdin)?;
            let output = lenient::repair(&raw, Indent::from_width(indent)?)?;
            let item = HistoryItem::new("jsonfix_processing", raw.trim(), output.as_str()).with_mode("fix");
            Ok(Outcome::recorded(output, StorageKey::JsonFix, item))
        }

        Command::Jwt { command } => run_jwt(command, stdin),
        Command::Ts { command } => run_timestamp(command, stdin),
        Command::Image { command } => run_image(command, stdin),

        Command::Diff { old, new, files } => {
            let (old, new) = if files {
                (
                    std::fs::read_to_string(&old).with_context(|| format!("reading {old}"))?,
                    std::fs::read_to_string(&new).with_context(|| format!("reading {new}"))?,
                )
            } else {
                (old, new)
            };
            let result = diff::diff_str(&old, &new)?;
            let output = result.to_text();
            let item = HistoryItem::new("diff", old.trim(), output.as_str())
                .with_data(json!({ "old": old.trim(), "new": new.trim(), "stats": result.stats }));
            Ok(Outcome::recorded(output, StorageKey::Diff, item))
        }

        Command::History { .. } => bail!("history is not a tool command"),
    }
}

fn run_jwt(command: JwtCommand, stdin: &mut dyn Read) -> anyhow::Result<Outcome> {
    match command {
        JwtCommand::Decode { input } => {
            let token = input.read(stdin)?;
            let decoded = jwt::decode(&token)?;
            let output = serde_json::to_string_pretty(&json!({
                "header": decoded.header,
                "payload": decoded.payload,
            }))?;
            let item = HistoryItem::new("decode", token.trim(), output.as_str());
            Ok(Outcome::recorded(output, StorageKey::Jwt, item))
        }
        JwtCommand::Encode { header, secret, input } => {
            let payload = input.read(stdin)?;
            let header = header.unwrap_or_else(|| jwt::default_header().to_string());
            let token = jwt::encode_str(&header, &payload, &secret)?;
            let recorded_input = json!({
                "header": json::parse(&header)?,
                "payload": json::parse(&payload)?,
            })
            .to_string();
            let item = HistoryItem::new("encode", recorded_input, token.as_str());
            Ok(Outcome::recorded(token, StorageKey::Jwt, item))
        }
        JwtCommand::Verify { secret, input } => {
            let token = input.read(stdin)?;
            if !jwt::verify(&token, &secret)? {
                bail!("Invalid signature");
            }
            Ok(Outcome::plain("Signature verified".to_string()))
        }
    }
}

fn run_timestamp(command: TsCommand, stdin: &mut dyn Read) -> anyhow::Result<Outcome> {
    match command {
        TsCommand::ToDate { input } => {
            let raw = input.read(stdin)?;
            let output = timestamp::render(&timestamp::timestamp_to_date(&raw)?);
            let item = HistoryItem::new("timestamp_to_date", raw.trim(), output.as_str());
            Ok(Outcome::recorded(output, StorageKey::Timestamp, item))
        }
        TsCommand::ToTs { input } => {
            let raw = input.read(stdin)?;
            let output = timestamp::render(&timestamp::date_to_timestamp(&raw)?);
            let item = HistoryItem::new("date_to_timestamp", raw.trim(), output.as_str());
            Ok(Outcome::recorded(output, StorageKey::Timestamp, item))
        }
        TsCommand::Now => Ok(Outcome::plain(format!(
            "{}\n{}",
            timestamp::current_timestamp(),
            timestamp::current_iso()
        ))),
    }
}

fn run_image(command: ImageCommand, stdin: &mut dyn Read) -> anyhow::Result<Outcome> {
    match command {
        ImageCommand::KeyToUrls { input } => {
            let key = input.read(stdin)?;
            let output = image::key_to_urls(&key)?
                .iter()
                .map(|u| format!("{}: {}", u.label, u.url))
                .collect::<Vec<_>>()
                .join("\n");
            let item = HistoryItem::new("key_to_url", key.trim(), output.as_str());
            Ok(Outcome::recorded(output, StorageKey::Image, item))
        }
        ImageCommand::UrlToKey { input } => {
            let url = input.read(stdin)?;
            let key = image::url_to_key(&url)?;
            let item = HistoryItem::new("url_to_key", url.trim(), key.as_str());
            Ok(Outcome::recorded(key, StorageKey::Image, item))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::HistoryCommand;
    use crate::input::InputArgs;
    use pretty_assertions::assert_eq;
    use webtools_tools::json::JsonMode;

    fn run(command: Command) -> Outcome {
        run_tool(command, &mut std::io::empty()).unwrap()
    }

    #[test]
    fn test_json_records_mode() {
        let outcome = run(Command::Json {
            mode: JsonMode::Format,
            indent: 2,
            no_sort: false,
            input: InputArgs::literal(r#"{"b":1,"a":2}"#),
        });
        assert_eq!(outcome.output, "{\n  \"a\": 2,\n  \"b\": 1\n}");
        let (key, item) = outcome.record.unwrap();
        assert_eq!(key, StorageKey::Json);
        assert_eq!(item.kind, "json_processing");
        assert_eq!(item.mode.as_deref(), Some("format"));
    }

    #[test]
    fn test_jwt_encode_then_verify() {
        let token = run(Command::Jwt {
            command: JwtCommand::Encode {
                header: None,
                secret: "k".into(),
                input: InputArgs::literal(r#"{"sub":"1"}"#),
            },
        })
        .output;

        let ok = run(Command::Jwt {
            command: JwtCommand::Verify { secret: "k".into(), input: InputArgs::literal(token.clone()) },
        });
        assert_eq!(ok.output, "Signature verified");
        assert!(ok.record.is_none());

        let bad = run_tool(
            Command::Jwt { command: JwtCommand::Verify { secret: "x".into(), input: InputArgs::literal(token) } },
            &mut std::io::empty(),
        );
        assert_eq!(bad.unwrap_err().to_string(), "Invalid signature");
    }

    #[test]
    fn test_diff_records_stats() {
        let outcome = run(Command::Diff { old: r#"{"a":1}"#.into(), new: r#"{"a":2}"#.into(), files: false });
        let (key, item) = outcome.record.unwrap();
        assert_eq!(key, StorageKey::Diff);
        assert_eq!(item.data.unwrap()["stats"], json!({"added": 1, "removed": 1}));
    }

    #[test]
    fn test_reads_stdin_when_no_argument() {
        let mut stdin = "name: \"x\"".as_bytes();
        let outcome = run_tool(Command::Jsonfix { indent: 2, input: InputArgs::default() }, &mut stdin).unwrap();
        assert_eq!(outcome.output, "{\n  \"name\": \"x\"\n}");
    }

    fn broken_config() -> webtools_config::Result<Config> {
        let mut config = Config::default();
        config.apply_env(|key| (key == "DB_PORT").then(|| "not-a-port".to_string()))?;
        Ok(config)
    }

    #[test]
    fn test_broken_config_only_blocks_history() {
        let json = Command::Json { mode: JsonMode::Minify, indent: 2, no_sort: false, input: InputArgs::literal("{}") };
        let config = settle_config(broken_config(), &json).unwrap();
        assert_eq!(config.history.max_items, Config::default().history.max_items);

        let history = Command::History { command: HistoryCommand::Clear { tool: StorageKey::Jwt } };
        let err = settle_config(broken_config(), &history).unwrap_err();
        assert!(err.to_string().contains("loading configuration"));
        assert!(err.root_cause().to_string().contains("DB_PORT"));
    }

    #[test]
    fn test_errors_are_not_recorded() {
        let err = run_tool(
            Command::Json { mode: JsonMode::Minify, indent: 2, no_sort: false, input: InputArgs::literal("{") },
            &mut std::io::empty(),
        );
        assert!(err.is_err());
    }
}
