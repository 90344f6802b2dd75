//! Repository facade over git2
//!
//! Wraps a discovered repository with the handful of read-only operations
//! the tracer needs: resolving hashes, first-parent lookups, blob reads and
//! blame. Blame results are memoized per `(commit, path)` since a deep trace
//! blames the same pair repeatedly.

use crate::git::blame::BlameFile;
use crate::git::{diff, Repo};
use crate::models::CommitDiff;
use anyhow::{Context, Result};
use git2::{BlameOptions, ErrorCode, Repository};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors from the repository facade.
#[derive(Error, Debug)]
pub enum RepoError {
    #[error("commit {0} not found in repository")]
    NotFound(String),

    #[error("commit {0} has no parent")]
    NoParent(String),

    #[error("blame of {path} at {commit} failed: {source}")]
    BlameFailed {
        commit: String,
        path: String,
        source: git2::Error,
    },

    #[error(transparent)]
    Git(#[from] git2::Error),
}

/// Read-only git repository handle with blame memoization.
pub struct GitRepo {
    repo: Repository,
    context_lines: u32,
    blame_cache: RefCell<HashMap<(String, String), BlameFile>>,
}

impl GitRepo {
    /// Discover and open the repository containing `path`.
    ///
    /// `context_lines` is the diff context width used when diffing commits;
    /// it changes hunk grouping but not the set of changed lines.
    pub fn open(path: &Path, context_lines: u32) -> Result<Self> {
        let repo = Repository::discover(path)
            .with_context(|| format!("Failed to open git repository at {:?}", path))?;
        debug!("Opened git repository at {:?}", repo.path());
        Ok(Self {
            repo,
            context_lines,
            blame_cache: RefCell::new(HashMap::new()),
        })
    }

    /// Resolve a hash (or abbreviation) to the full commit id.
    pub fn resolve(&self, hash: &str) -> Result<String, RepoError> {
        let object = self
            .repo
            .revparse_single(hash)
            .map_err(|_| RepoError::NotFound(hash.to_string()))?;
        let commit = object
            .peel_to_commit()
            .map_err(|_| RepoError::NotFound(hash.to_string()))?;
        Ok(commit.id().to_string())
    }

    /// Full id of the first parent of `hash`.
    pub fn first_parent(&self, hash: &str) -> Result<String, RepoError> {
        let oid = git2::Oid::from_str(hash).map_err(|_| RepoError::NotFound(hash.to_string()))?;
        let commit = self
            .repo
            .find_commit(oid)
            .map_err(|_| RepoError::NotFound(hash.to_string()))?;
        commit
            .parent_id(0)
            .map(|id| id.to_string())
            .map_err(|_| RepoError::NoParent(hash.to_string()))
    }

    fn read_file_at(&self, commit: &str, path: &str) -> Result<Option<Vec<u8>>, RepoError> {
        let oid = git2::Oid::from_str(commit).map_err(|_| RepoError::NotFound(commit.to_string()))?;
        let commit = self
            .repo
            .find_commit(oid)
            .map_err(|_| RepoError::NotFound(commit.to_string()))?;
        let tree = commit.tree()?;

        let entry = match tree.get_path(Path::new(path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let blob = match self.repo.find_blob(entry.id()) {
            Ok(blob) => blob,
            // A tree entry that is not a blob (submodule, directory) reads
            // as absent rather than as an error.
            Err(_) => return Ok(None),
        };
        Ok(Some(blob.content().to_vec()))
    }

    fn blame_at(&self, start: &str, path: &str) -> Result<BlameFile, RepoError> {
        let key = (start.to_string(), path.to_string());
        if let Some(cached) = self.blame_cache.borrow().get(&key) {
            return Ok(cached.clone());
        }

        let oid = git2::Oid::from_str(start).map_err(|_| RepoError::NotFound(start.to_string()))?;
        let mut opts = BlameOptions::new();
        opts.newest_commit(oid);

        let blame = self
            .repo
            .blame_file(Path::new(path), Some(&mut opts))
            .map_err(|source| RepoError::BlameFailed {
                commit: start.to_string(),
                path: path.to_string(),
                source,
            })?;

        let result = BlameFile::from_git(&blame);
        self.blame_cache.borrow_mut().insert(key, result.clone());
        Ok(result)
    }
}

impl Repo for GitRepo {
    fn read_file(&self, commit: &str, path: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.read_file_at(commit, path)?)
    }

    fn blame(&self, start: &str, path: &str) -> Result<BlameFile> {
        Ok(self.blame_at(start, path)?)
    }

    fn commit_diff(&self, hash: &str) -> Result<CommitDiff> {
        diff::commit_diff(&self.repo, hash, self.context_lines)
    }
}
