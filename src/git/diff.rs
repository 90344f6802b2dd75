//! Commit diffing against the first parent
//!
//! Produces per-file hunk lines and change kinds for a commit. Deletion
//! indices are in the parent file's coordinate system, addition indices in
//! the commit's own, both zero-based.

use crate::models::{ChangeKind, CommitDiff, DiffLine, FileDiff, NO_LINE};
use anyhow::{Context, Result};
use git2::{DiffDelta, DiffOptions, Repository};
use indexmap::IndexMap;
use std::cell::RefCell;

fn delta_path(delta: &DiffDelta) -> Option<String> {
    let file = if delta.status() == git2::Delta::Deleted {
        delta.old_file()
    } else {
        delta.new_file()
    };
    file.path().map(|p| p.to_string_lossy().into_owned())
}

fn line_index(lineno: Option<u32>) -> i64 {
    lineno.map(|n| n as i64 - 1).unwrap_or(NO_LINE)
}

/// Diff `hash` against its first parent.
///
/// `context_lines` only affects how hunks are grouped in the underlying
/// diff, never the set of changed lines.
pub fn commit_diff(repo: &Repository, hash: &str, context_lines: u32) -> Result<CommitDiff> {
    let oid = git2::Oid::from_str(hash).with_context(|| format!("Invalid commit id {}", hash))?;
    let commit = repo
        .find_commit(oid)
        .with_context(|| format!("Commit {} not found", hash))?;

    let parent = commit.parent(0).ok();
    let tree = commit.tree()?;
    let parent_tree = parent.as_ref().map(|p| p.tree()).transpose()?;

    let mut opts = DiffOptions::new();
    opts.context_lines(context_lines);

    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;

    // Both callbacks write into the file map, so it lives in a RefCell.
    let change_kinds: RefCell<IndexMap<String, ChangeKind>> = RefCell::new(IndexMap::new());
    let files: RefCell<IndexMap<String, FileDiff>> = RefCell::new(IndexMap::new());

    diff.foreach(
        &mut |delta, _| {
            if let (Some(kind), Some(path)) =
                (ChangeKind::from_delta(delta.status()), delta_path(&delta))
            {
                change_kinds.borrow_mut().insert(path.clone(), kind);
                files.borrow_mut().entry(path).or_default();
            }
            true
        },
        None,
        None,
        Some(&mut |delta, _hunk, line| {
            let Some(path) = delta_path(&delta) else {
                return true;
            };
            let text = String::from_utf8_lossy(line.content())
                .trim_end_matches(['\n', '\r'])
                .to_string();
            let mut files = files.borrow_mut();
            let entry = files.entry(path).or_default();
            match line.origin() {
                '+' => entry.additions.push(DiffLine {
                    line: line_index(line.new_lineno()),
                    text,
                }),
                '-' => entry.deletions.push(DiffLine {
                    line: line_index(line.old_lineno()),
                    text,
                }),
                _ => {}
            }
            true
        }),
    )?;

    Ok(CommitDiff {
        hash: commit.id().to_string(),
        parent: parent.map(|p| p.id().to_string()),
        change_kinds: change_kinds.into_inner(),
        files: files.into_inner(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testutil::ScratchRepo;

    #[test]
    fn deletions_are_parent_indexed_additions_child_indexed() {
        let scratch = ScratchRepo::new();
        scratch.commit_file("a.c", "one\ntwo\nthree\n", "add a.c");
        let second = scratch.commit_file("a.c", "one\nTWO\nthree\n", "edit line two");
        let repo = Repository::discover(scratch.path()).expect("open");

        let diff = commit_diff(&repo, &second, 0).expect("diff");
        let file = diff.files.get("a.c").expect("a.c in hunk map");

        assert_eq!(
            file.deletions,
            vec![DiffLine {
                line: 1,
                text: "two".to_string()
            }]
        );
        assert_eq!(
            file.additions,
            vec![DiffLine {
                line: 1,
                text: "TWO".to_string()
            }]
        );
        assert_eq!(diff.change_kinds.get("a.c"), Some(&ChangeKind::Modified));
    }

    #[test]
    fn deleted_file_keyed_by_old_path() {
        let scratch = ScratchRepo::new();
        scratch.commit_file("gone.c", "one\n", "add gone.c");
        scratch.remove("gone.c");
        let second = scratch.commit("remove gone.c");
        let repo = Repository::discover(scratch.path()).expect("open");

        let diff = commit_diff(&repo, &second, 0).expect("diff");
        assert_eq!(diff.change_kinds.get("gone.c"), Some(&ChangeKind::Deleted));
        let file = diff.files.get("gone.c").expect("gone.c in hunk map");
        assert_eq!(file.deletions.len(), 1);
        assert!(file.additions.is_empty());
    }

    #[test]
    fn root_commit_diffs_against_empty_tree() {
        let scratch = ScratchRepo::new();
        let root = scratch.commit_file("a.c", "one\ntwo\n", "add a.c");
        let repo = Repository::discover(scratch.path()).expect("open");

        let diff = commit_diff(&repo, &root, 0).expect("diff");
        assert!(diff.parent.is_none());
        let file = diff.files.get("a.c").expect("a.c in hunk map");
        assert_eq!(file.additions.len(), 2);
        assert!(file.deletions.is_empty());
        assert_eq!(diff.change_kinds.get("a.c"), Some(&ChangeKind::Added));
    }

    #[test]
    fn context_width_does_not_change_line_sets() {
        let scratch = ScratchRepo::new();
        scratch.commit_file("a.c", "a\nb\nc\nd\ne\nf\ng\nh\n", "add a.c");
        let second = scratch.commit_file("a.c", "a\nb\nc\nD\ne\nf\ng\nh\n", "edit d");
        let repo = Repository::discover(scratch.path()).expect("open");

        let narrow = commit_diff(&repo, &second, 0).expect("diff");
        let wide = commit_diff(&repo, &second, 5).expect("diff");
        assert_eq!(
            narrow.files.get("a.c").expect("a.c").deletions,
            wide.files.get("a.c").expect("a.c").deletions
        );
        assert_eq!(
            narrow.files.get("a.c").expect("a.c").additions,
            wide.files.get("a.c").expect("a.c").additions
        );
    }
}
