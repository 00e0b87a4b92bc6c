//! webtools-tools — The pure text tools behind the webtools suite.
//!
//!   - JSON formatter (format / minify / escape / unescape / quick fix)
//!   - Lenient protobuf-style `key:value` reader used by JSON fix
//!   - JWT decoder / HMAC encoder
//!   - Timestamp converter
//!   - CDN image key <-> URL converter
//!   - Top-level JSON diff
//!   - Read-only SQL guard
//!
//! Nothing here performs I/O; the HTTP server and the CLI wrap these functions.

pub mod error;
pub mod json;
pub mod lenient;
pub mod jwt;
pub mod timestamp;
pub mod image;
pub mod diff;
pub mod sql;

pub use error::{Result, ToolError};
