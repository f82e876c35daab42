//! Report formatters for duplicate scan results.
//!
//! - [`text`]: the human-readable report (default)
//! - [`json`]: a JSON document for scripting
//!
//! Reports are written to stdout only after a fully successful run.

pub mod json;
pub mod text;

pub use json::{JsonOutput, JsonOutputError};
pub use text::{format_size_mb_kb, write_report};
