//! The annotate command
//!
//! Opens the repository, reads the bug-fix commit set, runs the driver and
//! writes the two JSON artifacts: the parsed commits and the annotation
//! graphs.

use crate::git::GitRepo;
use crate::issues;
use crate::reporters;
use crate::trace::driver::Driver;
use crate::trace::TraceOptions;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

const COMMITS_FILE: &str = "commits.json";
const ANNOTATIONS_FILE: &str = "annotations.json";

pub fn run(
    repo_path: &Path,
    issues_file: &Path,
    depth: u32,
    context: u32,
    result_path: Option<&Path>,
    trace_all_ancestors: bool,
) -> Result<()> {
    let repo = GitRepo::open(repo_path, context)?;

    let result_dir = match result_path {
        Some(dir) => dir.to_path_buf(),
        None => {
            eprintln!("Result path not set! Using default directory instead.");
            PathBuf::from("./results")
        }
    };
    std::fs::create_dir_all(&result_dir)
        .with_context(|| format!("Failed to create result directory {:?}", result_dir))?;

    let issues = issues::read_bug_fix_commits(issues_file, &repo)?;
    if issues.revisions.is_empty() {
        info!("No fix commits to trace");
        return Ok(());
    }

    let driver = Driver::new(
        &repo,
        TraceOptions {
            depth,
            trace_all_ancestors,
        },
    );
    let (parsed, map) = driver.annotate(&issues.revisions)?;

    info!("Saving parsed commits to file");
    std::fs::write(
        result_dir.join(COMMITS_FILE),
        reporters::json::render_commits(&parsed)?,
    )
    .with_context(|| format!("Failed to write {}", COMMITS_FILE))?;

    info!("Saving annotation graphs to file");
    std::fs::write(
        result_dir.join(ANNOTATIONS_FILE),
        reporters::json::render_annotations(&map)?,
    )
    .with_context(|| format!("Failed to write {}", ANNOTATIONS_FILE))?;

    Ok(())
}
