//! Command-line definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use webtools_common::StorageKey;
use webtools_tools::json::JsonMode;
use webtools_tools::jwt::DEFAULT_SECRET;

use crate::input::InputArgs;

pub const DEFAULT_SERVER: &str = "http://localhost:3001";

#[derive(Debug, Parser)]
#[command(name = "webtools")]
#[command(about = "JSON, JWT, timestamp, image URL and diff tools with local history", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory holding the per-tool history files.
    #[arg(long, global = true, env = "WEBTOOLS_HISTORY_DIR")]
    pub history_dir: Option<PathBuf>,

    /// Do not record this invocation in history.
    #[arg(long, global = true)]
    pub no_history: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Format, minify, escape, unescape or quick-fix JSON.
    Json {
        /// format | minify | escape | unescape | fix
        mode: JsonMode,
        /// Spaces per level; 0 indents with a tab.
        #[arg(long, default_value_t = 2)]
        indent: usize,
        /// Keep object keys in input order.
        #[arg(long)]
        no_sort: bool,
        #[command(flatten)]
        input: InputArgs,
    },

    /// Turn protobuf-style `key: value` text into JSON.
    Jsonfix {
        #[arg(long, default_value_t = 2)]
        indent: usize,
        #[command(flatten)]
        input: InputArgs,
    },

    /// Decode, sign or verify JSON Web Tokens.
    Jwt {
        #[command(subcommand)]
        command: JwtCommand,
    },

    /// Convert between Unix timestamps and dates.
    Ts {
        #[command(subcommand)]
        command: TsCommand,
    },

    /// Convert between CDN image keys and URLs.
    Image {
        #[command(subcommand)]
        command: ImageCommand,
    },

    /// Compare the top-level keys of two JSON documents.
    Diff {
        old: String,
        new: String,
        /// Treat OLD and NEW as file paths.
        #[arg(long)]
        files: bool,
    },

    /// Inspect, edit or sync the local history.
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum JwtCommand {
    Decode {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Sign a payload (the input) with HMAC.
    Encode {
        /// Header JSON; defaults to {"alg":"HS256","typ":"JWT"}.
        #[arg(long)]
        header: Option<String>,
        #[arg(long, default_value = DEFAULT_SECRET)]
        secret: String,
        #[command(flatten)]
        input: InputArgs,
    },
    Verify {
        #[arg(long)]
        secret: String,
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Debug, Subcommand)]
pub enum TsCommand {
    /// Unix timestamp (seconds or milliseconds) to dates.
    ToDate {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Date text to Unix timestamps.
    ToTs {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Print the current time.
    Now,
}

#[derive(Debug, Subcommand)]
pub enum ImageCommand {
    KeyToUrls {
        #[command(flatten)]
        input: InputArgs,
    },
    UrlToKey {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    List {
        #[arg(value_parser = parse_tool)]
        tool: StorageKey,
        /// Print full input and output.
        #[arg(long)]
        full: bool,
    },
    Delete {
        #[arg(value_parser = parse_tool)]
        tool: StorageKey,
        /// Position as shown by `history list`.
        index: usize,
    },
    Clear {
        #[arg(value_parser = parse_tool)]
        tool: StorageKey,
    },
    /// Copy local items to the server.
    Push {
        #[arg(value_parser = parse_tool)]
        tool: StorageKey,
        #[arg(long, env = "WEBTOOLS_SERVER", default_value = DEFAULT_SERVER)]
        server: String,
    },
    /// Merge server items into the local history.
    Pull {
        #[arg(value_parser = parse_tool)]
        tool: StorageKey,
        #[arg(long, env = "WEBTOOLS_SERVER", default_value = DEFAULT_SERVER)]
        server: String,
    },
}

fn parse_tool(s: &str) -> Result<StorageKey, String> {
    StorageKey::parse(s).ok_or_else(|| {
        let known: Vec<&str> = StorageKey::ALL.iter().map(|k| k.tool_name()).collect();
        format!("unknown tool '{s}' (expected one of: {})", known.join(", "))
    })
}
