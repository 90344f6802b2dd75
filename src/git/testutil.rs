//! Scratch repositories for tests.

use git2::Repository;
use std::path::Path;
use tempfile::TempDir;

/// A throwaway git repository backed by a temp directory.
pub struct ScratchRepo {
    dir: TempDir,
    repo: Repository,
}

impl ScratchRepo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let repo = Repository::init(dir.path()).expect("init repository");
        {
            let mut config = repo.config().expect("open config");
            config.set_str("user.name", "Test User").expect("set name");
            config
                .set_str("user.email", "test@example.com")
                .expect("set email");
        }
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, rel: &str, content: &str) {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(path, content).expect("write file");
    }

    pub fn remove(&self, rel: &str) {
        std::fs::remove_file(self.dir.path().join(rel)).expect("remove file");
    }

    /// Stage everything and commit, returning the full hash.
    pub fn commit(&self, message: &str) -> String {
        let sig = self.repo.signature().expect("signature");
        let tree_id = {
            let mut index = self.repo.index().expect("index");
            index
                .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
                .expect("stage");
            // Also record removals of tracked files.
            index
                .update_all(["*"].iter(), None)
                .expect("stage removals");
            index.write().expect("write index");
            index.write_tree().expect("write tree")
        };
        let tree = self.repo.find_tree(tree_id).expect("find tree");
        let parent = self
            .repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        let oid = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("commit");
        oid.to_string()
    }

    pub fn commit_file(&self, rel: &str, content: &str, message: &str) -> String {
        self.write(rel, content);
        self.commit(message)
    }
}
