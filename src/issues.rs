//! Bug-fix commit input
//!
//! Reads the issue-miner output: a JSON object mapping issue identifiers to
//! records carrying the fix commit hash and its date triple. The hashes are
//! resolved against the repository; the dates are retained untouched for
//! downstream analyses.

use crate::git::GitRepo;
use crate::models::{IssueDates, Issues};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct IssueRecord {
    hash: String,
    #[serde(default)]
    resolutiondate: Option<String>,
    #[serde(default)]
    commitdate: Option<String>,
    #[serde(default)]
    creationdate: Option<String>,
}

/// Read the bug-fix commit set from `path`.
///
/// A missing or unparseable file yields an empty set; an unresolvable hash
/// is an error, since it points at the wrong repository.
pub fn read_bug_fix_commits(path: &Path, repo: &GitRepo) -> Result<Issues> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) => {
            warn!("Could not read issue file {:?}: {}", path, e);
            return Ok(Issues::default());
        }
    };

    // Document order is kept so repeated runs see the commits in the same
    // order.
    let records: IndexMap<String, IssueRecord> = match serde_json::from_str(&data) {
        Ok(records) => records,
        Err(e) => {
            warn!("Could not parse issue file {:?}: {}", path, e);
            return Ok(Issues::default());
        }
    };

    let mut issues = Issues::default();
    for (issue, record) in records {
        let resolved = repo
            .resolve(&record.hash)
            .with_context(|| format!("resolving fix commit {} for issue {}", record.hash, issue))?;

        issues.dates.insert(
            record.hash.clone(),
            IssueDates {
                resolutiondate: record.resolutiondate,
                commitdate: record.commitdate,
                creationdate: record.creationdate,
            },
        );
        if !issues.revisions.contains(&resolved) {
            issues.revisions.push(resolved);
        }
    }

    info!("Found {} fix commits", issues.revisions.len());
    Ok(issues)
}
