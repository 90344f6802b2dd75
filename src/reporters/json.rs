//! JSON reporters
//!
//! Serialization is deterministic: all maps involved keep insertion order,
//! so identical inputs produce byte-identical output.

use crate::graph::AnnotationMap;
use crate::models::CommitDiff;
use anyhow::Result;

/// Render the parsed fix commits with their per-file hunks and change types.
pub fn render_commits(commits: &[CommitDiff]) -> Result<String> {
    Ok(serde_json::to_string_pretty(commits)?)
}

/// Render the outer annotation map, fix commit hash → traced graphs.
pub fn render_annotations(map: &AnnotationMap) -> Result<String> {
    Ok(serde_json::to_string_pretty(map)?)
}
