//! webtools command line
//!
//! Run with: cargo run -p webtools-cli -- json format '{"b":1,"a":2}'

use std::io::{self, Write};

use anyhow::Context;
use chrono::{Local, TimeZone};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use webtools_cli::cli::{Cli, Command, HistoryCommand};
use webtools_cli::commands::{run_tool, settle_config};
use webtools_cli::remote::RemoteHistory;
use webtools_cli::store::HistoryStore;
use webtools_common::HistoryItem;
use webtools_config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let config = settle_config(Config::load(), &cli.command)?;

    let dir = cli
        .history_dir
        .clone()
        .or_else(|| config.history.dir.clone())
        .or_else(HistoryStore::default_dir)
        .context("cannot determine a history directory; pass --history-dir")?;
    let store = HistoryStore::new(dir, config.history.max_items);

    let mut stdout = io::stdout().lock();
    match cli.command {
        Command::History { command } => run_history(command, &store, &mut stdout).await?,
        command => {
            let outcome = run_tool(command, &mut io::stdin().lock())?;
            writeln!(stdout, "{}", outcome.output)?;
            if let (false, Some((key, item))) = (cli.no_history, outcome.record) {
                if let Err(e) = store.record(key, item) {
                    tracing::warn!(error = %e, "Failed to save history");
                }
            }
        }
    }
    Ok(())
}

async fn run_history(command: HistoryCommand, store: &HistoryStore, out: &mut dyn Write) -> anyhow::Result<()> {
    match command {
        HistoryCommand::List { tool, full } => {
            let log = store.load(tool)?;
            if log.is_empty() {
                writeln!(out, "No history for {}", tool.tool_name())?;
            }
            for (i, item) in log.items().iter().enumerate() {
                print_item(out, i, item, full)?;
            }
        }
        HistoryCommand::Delete { tool, index } => {
            let mut log = store.load(tool)?;
            match log.delete(index) {
                Some(_) => {
                    store.save(tool, &log)?;
                    writeln!(out, "Deleted item {index}")?;
                }
                None => writeln!(out, "No item at {index}")?,
            }
        }
        HistoryCommand::Clear { tool } => {
            let mut log = store.load(tool)?;
            log.clear();
            store.save(tool, &log)?;
            writeln!(out, "Cleared {} history", tool.tool_name())?;
        }
        HistoryCommand::Push { tool, server } => {
            let log = store.load(tool)?;
            let pushed = RemoteHistory::new(server).push(tool, log.items()).await?;
            writeln!(out, "Pushed {pushed} item(s)")?;
        }
        HistoryCommand::Pull { tool, server } => {
            let mut log = store.load(tool)?;
            let remote = RemoteHistory::new(server).pull(tool, log.capacity()).await?;
            let added = log.merge(remote);
            store.save(tool, &log)?;
            writeln!(out, "Merged {added} new item(s)")?;
        }
    }
    Ok(())
}

fn print_item(out: &mut dyn Write, index: usize, item: &HistoryItem, full: bool) -> io::Result<()> {
    let when = Local
        .timestamp_millis_opt(item.timestamp)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| item.timestamp.to_string());
    let kind = match &item.mode {
        Some(mode) => format!("{} ({mode})", item.kind),
        None => item.kind.clone(),
    };
    writeln!(out, "[{index}] {when}  {kind}")?;
    if full {
        writeln!(out, "  input:\n{}\n  output:\n{}", item.input, item.output)
    } else {
        writeln!(out, "  in:  {}\n  out: {}", item.input_preview(), item.output_preview())
    }
}
