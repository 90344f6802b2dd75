//! Per-fix-commit orchestration
//!
//! Diffs every fix commit against its first parent, filters the touched
//! files down to the ones worth tracing, and collects the per-file graphs
//! into the outer annotation map.

use crate::git::Repo;
use crate::graph::AnnotationMap;
use crate::models::CommitDiff;
use crate::trace::{TraceOptions, Tracer};
use anyhow::Result;
use tracing::{debug, info};

const IGNORED_EXTENSIONS: &[&str] = &[".md", ".txt", ".markdown"];

/// Whether a changed file takes part in tracing: not under a `test` path
/// segment and not a documentation extension.
pub fn is_traceable(path: &str) -> bool {
    if path.split('/').any(|segment| segment == "test") {
        return false;
    }
    !IGNORED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Runs the tracer over a set of fix commits.
pub struct Driver<'r, R: Repo> {
    repo: &'r R,
    opts: TraceOptions,
}

impl<'r, R: Repo> Driver<'r, R> {
    pub fn new(repo: &'r R, opts: TraceOptions) -> Self {
        Self { repo, opts }
    }

    /// Diff each fix commit, returning the parsed diffs in input order.
    pub fn parse_commits(&self, fix_commits: &[String]) -> Result<Vec<CommitDiff>> {
        fix_commits
            .iter()
            .map(|hash| self.repo.commit_diff(hash))
            .collect()
    }

    /// Build the line-mapping graph for every eligible file of every fix
    /// commit. Files the tracer cannot follow contribute `None` entries.
    pub fn build_line_mapping_graph(&self, commits: &[CommitDiff]) -> Result<AnnotationMap> {
        let tracer = Tracer::new(self.repo, self.opts.clone());
        let mut map = AnnotationMap::new();

        for commit in commits {
            let mut graphs = Vec::new();
            for path in commit.change_kinds.keys() {
                if !is_traceable(path) {
                    debug!(path = %path, commit = %commit.hash, "skipping uninteresting file");
                    continue;
                }
                graphs.push(tracer.trace(path, commit, self.opts.depth)?);
            }
            map.insert(commit.hash.clone(), graphs);
        }

        Ok(map)
    }

    /// Full pipeline: parse diffs, then trace them.
    pub fn annotate(&self, fix_commits: &[String]) -> Result<(Vec<CommitDiff>, AnnotationMap)> {
        info!("Parsing diff lines for {} fix commits", fix_commits.len());
        let parsed = self.parse_commits(fix_commits)?;

        info!("Building line mapping graph");
        let map = self.build_line_mapping_graph(&parsed)?;

        Ok((parsed, map))
    }
}
