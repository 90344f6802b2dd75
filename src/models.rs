//! Core data models for annotrace
//!
//! Plain serde-derived data shared between the differ, the tracer and the
//! JSON reporters. Line indices are zero-based `i64` everywhere; `-1` is the
//! sentinel for an index that could not be determined.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Sentinel for a line index that does not exist or could not be parsed.
pub const NO_LINE: i64 = -1;

/// How a file changed in a commit, relative to its first parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
}

impl ChangeKind {
    /// Map a git2 delta status onto the change kinds the tracer cares about.
    pub fn from_delta(delta: git2::Delta) -> Option<Self> {
        match delta {
            git2::Delta::Added => Some(ChangeKind::Added),
            git2::Delta::Modified => Some(ChangeKind::Modified),
            git2::Delta::Deleted => Some(ChangeKind::Deleted),
            git2::Delta::Renamed => Some(ChangeKind::Renamed),
            git2::Delta::Copied => Some(ChangeKind::Copied),
            _ => None,
        }
    }
}

/// One added or deleted line of a diff hunk.
///
/// For deletions `line` is the zero-based index in the parent file; for
/// additions it is the zero-based index in the child file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub line: i64,
    pub text: String,
}

/// Added and deleted lines of one file in a commit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileDiff {
    pub additions: Vec<DiffLine>,
    pub deletions: Vec<DiffLine>,
}

/// A commit together with its per-file diff against the first parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDiff {
    /// Full hex hash of the commit.
    pub hash: String,
    /// Full hex hash of the first parent; `None` for root commits.
    pub parent: Option<String>,
    /// Change kind per touched path, in diff order.
    pub change_kinds: IndexMap<String, ChangeKind>,
    /// Hunk lines per touched path, in diff order.
    pub files: IndexMap<String, FileDiff>,
}

/// Dates attached to a bug-fix commit by the issue tracker miner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueDates {
    pub resolutiondate: Option<String>,
    pub commitdate: Option<String>,
    pub creationdate: Option<String>,
}

/// The set of bug-fixing commits to trace, with their issue dates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Issues {
    /// Resolved full commit hashes, in issue-file order, deduplicated.
    pub revisions: Vec<String>,
    /// Dates keyed by the hash as it appeared in the issue file.
    pub dates: IndexMap<String, IssueDates>,
}
