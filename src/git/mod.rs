//! Git repository access
//!
//! Read-only access to commits, trees and blobs, per-commit diffs against the
//! first parent, and line-level blame. The tracer only sees the [`Repo`]
//! trait, so its recursion can be exercised against scripted repositories in
//! tests.

pub mod blame;
pub mod diff;
pub mod repository;
#[cfg(test)]
pub(crate) mod testutil;

pub use blame::{BlameFile, BlameLine};
pub use repository::{GitRepo, RepoError};

use crate::models::CommitDiff;
use anyhow::Result;

/// The repository operations the tracer and driver depend on.
pub trait Repo {
    /// Bytes of `path` at `commit`, or `None` if the path is absent there.
    fn read_file(&self, commit: &str, path: &str) -> Result<Option<Vec<u8>>>;

    /// Blame every line of `path` as of `start`, attributing each line to
    /// the ancestor commit that introduced it.
    fn blame(&self, start: &str, path: &str) -> Result<BlameFile>;

    /// Diff `commit` against its first parent, producing per-file hunks.
    fn commit_diff(&self, hash: &str) -> Result<CommitDiff>;
}
