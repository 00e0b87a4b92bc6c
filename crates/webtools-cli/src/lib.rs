//! webtools-cli — the text tools on the command line, with per-tool
//! history files and optional sync against a webtools server.

pub mod cli;
pub mod commands;
pub mod input;
pub mod remote;
pub mod store;
