//! Structural diffing of source files using tree-sitter
//!
//! Dispatches on file extension. Currently Java is the only structured
//! language; other files are traced from their textual hunks alone.

mod java;

use anyhow::{bail, Result};
use std::collections::BTreeSet;

/// Whether `path` has a structural parser, i.e. its deletion indices get
/// refined to semantically changed lines before tracing.
pub fn supports(path: &str) -> bool {
    path.ends_with(".java")
}

/// One-based line numbers in `to` that differ structurally from `from`.
///
/// Reformatting, comment-only and import-only edits yield an empty set.
pub fn affected_line_numbers(path: &str, from: &str, to: &str) -> Result<BTreeSet<u32>> {
    if path.ends_with(".java") {
        return java::affected_line_numbers(from, to);
    }
    bail!("no structural parser for {}", path)
}
