//! Per-line blame results
//!
//! [`BlameFile`] flattens a git2 blame into one entry per line of the blamed
//! file, so the tracer can index it by deletion line number.

use crate::models::NO_LINE;

/// Attribution of a single line: the commit that introduced it and the
/// zero-based line index in that commit's version of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlameLine {
    pub commit: String,
    pub line: i64,
}

/// Blame of a whole file at some commit, indexed by zero-based line number.
#[derive(Debug, Clone, Default)]
pub struct BlameFile {
    lines: Vec<Option<BlameLine>>,
}

impl BlameFile {
    /// Build from an already-computed git2 blame.
    pub fn from_git(blame: &git2::Blame) -> Self {
        let mut lines: Vec<Option<BlameLine>> = Vec::new();

        for hunk in blame.iter() {
            let start = hunk.final_start_line(); // 1-based
            let count = hunk.lines_in_hunk();
            let orig_start = hunk.orig_start_line(); // 1-based
            let commit = hunk.orig_commit_id().to_string();

            let end = start + count - 1;
            if lines.len() < end {
                lines.resize(end, None);
            }
            for offset in 0..count {
                lines[start - 1 + offset] = Some(BlameLine {
                    commit: commit.clone(),
                    line: (orig_start + offset) as i64 - 1,
                });
            }
        }

        Self { lines }
    }

    /// Build from explicit per-line entries (tests, scripted repositories).
    pub fn from_lines(lines: Vec<Option<BlameLine>>) -> Self {
        Self { lines }
    }

    /// Number of lines in the blamed file.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The commit that introduced line `index`, or `None` past the end of
    /// the file or for a line blame left unattributed.
    pub fn source_commit(&self, index: i64) -> Option<&str> {
        if index < 0 {
            return None;
        }
        self.lines
            .get(index as usize)
            .and_then(|l| l.as_ref())
            .map(|l| l.commit.as_str())
    }

    /// Line index of `index` in the introducing commit's version of the
    /// file, or [`NO_LINE`] when out of bounds.
    pub fn source_line(&self, index: i64) -> i64 {
        if index < 0 {
            return NO_LINE;
        }
        self.lines
            .get(index as usize)
            .and_then(|l| l.as_ref())
            .map(|l| l.line)
            .unwrap_or(NO_LINE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(commit: &str, line: i64) -> Option<BlameLine> {
        Some(BlameLine {
            commit: commit.to_string(),
            line,
        })
    }

    #[test]
    fn accessors_in_bounds() {
        let blame = BlameFile::from_lines(vec![entry("aaa", 0), entry("bbb", 4)]);
        assert_eq!(blame.source_commit(1), Some("bbb"));
        assert_eq!(blame.source_line(1), 4);
        assert_eq!(blame.len(), 2);
    }

    #[test]
    fn out_of_bounds_yields_no_commit_and_sentinel() {
        let blame = BlameFile::from_lines(vec![entry("aaa", 0)]);
        assert_eq!(blame.source_commit(99), None);
        assert_eq!(blame.source_line(99), NO_LINE);
        assert_eq!(blame.source_commit(-1), None);
        assert_eq!(blame.source_line(-1), NO_LINE);
    }

    #[test]
    fn gaps_are_unattributed() {
        let blame = BlameFile::from_lines(vec![entry("aaa", 0), None, entry("aaa", 2)]);
        assert_eq!(blame.source_commit(1), None);
        assert_eq!(blame.source_line(1), NO_LINE);
    }
}
