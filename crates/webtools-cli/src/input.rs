//! Where a command's text comes from: argument, `--file`, or stdin.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

#[derive(Debug, Clone, Default, Args)]
pub struct InputArgs {
    /// Input text; read from --file or stdin when omitted.
    pub text: Option<String>,

    /// Read input from a file.
    #[arg(short = 'f', long = "file", conflicts_with = "text")]
    pub file: Option<PathBuf>,
}

impl InputArgs {
    pub fn literal(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), file: None }
    }

    /// Resolve the input, falling back to `stdin`.
    pub fn read(&self, stdin: &mut dyn Read) -> anyhow::Result<String> {
        if let Some(text) = &self.text {
            return Ok(text.clone());
        }
        if let Some(path) = &self.file {
            return std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()));
        }
        let mut buf = String::new();
        stdin.read_to_string(&mut buf).context("reading stdin")?;
        Ok(buf)
    }
}
