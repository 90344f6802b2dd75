//! Recursive blame-driven line tracing
//!
//! [`Tracer::trace`] walks the ancestry of every deleted line of a file,
//! building a [`FileAnnotationGraph`] per commit frame and recursing into
//! each ancestor up to a configured depth.

pub mod driver;

use crate::git::Repo;
use crate::graph::{FileAnnotationGraph, LineMapping};
use crate::models::{CommitDiff, NO_LINE};
use crate::parsers;
use anyhow::Result;
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Tracing parameters.
#[derive(Debug, Clone)]
pub struct TraceOptions {
    /// Maximum number of ancestor generations to recurse through.
    pub depth: u32,
    /// Keep iterating ancestors after one fails to produce a subgraph.
    /// The default stops at the first exhausted ancestor chain, matching
    /// the historical behavior this tool is validated against.
    pub trace_all_ancestors: bool,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            depth: 3,
            trace_all_ancestors: false,
        }
    }
}

/// Walks line ancestry through repeated blame calls.
pub struct Tracer<'r, R: Repo> {
    repo: &'r R,
    opts: TraceOptions,
}

impl<'r, R: Repo> Tracer<'r, R> {
    pub fn new(repo: &'r R, opts: TraceOptions) -> Self {
        Self { repo, opts }
    }

    /// Trace the deleted lines of `path` in `source` through `step` more
    /// ancestor generations.
    ///
    /// Returns `None` when no steps remain or `source` does not touch
    /// `path`; otherwise a graph whose first revision is `source`.
    pub fn trace(
        &self,
        path: &str,
        source: &CommitDiff,
        step: u32,
    ) -> Result<Option<FileAnnotationGraph>> {
        if step == 0 || !source.files.contains_key(path) {
            return Ok(None);
        }

        let del_indexes = self.build_del_indexes(path, source);

        let mut graph = FileAnnotationGraph::new(path);
        graph.revisions.push(source.hash.clone());

        // Root commits have nothing to blame against.
        let Some(parent) = source.parent.as_deref() else {
            return Ok(Some(graph));
        };

        let blame = match self.repo.blame(parent, path) {
            Ok(blame) if !blame.is_empty() => blame,
            Ok(_) => return Ok(Some(graph)),
            Err(e) => {
                debug!(path, commit = %source.hash, "blame failed: {e:#}");
                return Ok(Some(graph));
            }
        };

        let found_revisions = link_revisions_with_line_numbers(&del_indexes, &blame);
        for (revision, lines) in &found_revisions {
            graph.add_mapping(revision, lines.clone());
        }

        for revision in found_revisions.keys() {
            let sub_source = self.repo.commit_diff(revision)?;
            match self.trace(path, &sub_source, step - 1)? {
                Some(sub_graph) => graph.attach_subgraph(revision, sub_graph),
                None if self.opts.trace_all_ancestors => continue,
                None => break,
            }
        }

        Ok(Some(graph))
    }

    /// Deletion line indices of `path` in `source`, parent-side, zero-based.
    ///
    /// For structured files the textual indices are intersected with the
    /// structurally affected lines, dropping deletions that only reformat,
    /// touch comments or reorder imports.
    fn build_del_indexes(&self, path: &str, source: &CommitDiff) -> Vec<i64> {
        let mut del_indexes: Vec<i64> = source.files[path]
            .deletions
            .iter()
            .map(|d| d.line)
            .collect();

        if parsers::supports(path) {
            let refined = self.structurally_changed_lines(path, source);
            del_indexes.retain(|i| refined.contains(i));
        }

        del_indexes
    }

    /// Zero-based parent-file lines of `path` that changed structurally in
    /// `source`. Empty on any read or parse failure, which makes the caller
    /// trace nothing for this file.
    fn structurally_changed_lines(&self, path: &str, source: &CommitDiff) -> HashSet<i64> {
        let Some(parent) = source.parent.as_deref() else {
            return HashSet::new();
        };

        let result = (|| -> Result<Option<HashSet<i64>>> {
            let Some(revision) = self.repo.read_file(&source.hash, path)? else {
                return Ok(None);
            };
            let Some(parent_rev) = self.repo.read_file(parent, path)? else {
                return Ok(None);
            };
            let revision = String::from_utf8(revision)?;
            let parent_rev = String::from_utf8(parent_rev)?;

            // Line numbers come back one-based in the parent file.
            let affected = parsers::affected_line_numbers(path, &revision, &parent_rev)?;
            Ok(Some(affected.into_iter().map(|l| l as i64 - 1).collect()))
        })();

        match result {
            Ok(Some(lines)) => lines,
            Ok(None) => HashSet::new(),
            Err(e) => {
                warn!(
                    path,
                    commit = %source.hash,
                    parent = %parent,
                    "structural diff failed: {e:#}"
                );
                HashSet::new()
            }
        }
    }
}

/// Group deletion indices by the ancestor commit blame attributes them to.
///
/// Indices of [`NO_LINE`] and indices blame cannot attribute are skipped;
/// a line blame places outside the ancestor file is recorded as [`NO_LINE`].
/// Ancestor order is first-encounter order.
fn link_revisions_with_line_numbers(
    del_indexes: &[i64],
    blame: &crate::git::BlameFile,
) -> IndexMap<String, LineMapping> {
    let mut found: IndexMap<String, LineMapping> = IndexMap::new();

    for &index in del_indexes {
        if index == NO_LINE {
            continue;
        }
        let Some(revision) = blame.source_commit(index) else {
            continue;
        };
        found
            .entry(revision.to_string())
            .or_default()
            .insert(index, blame.source_line(index));
    }

    found
}
