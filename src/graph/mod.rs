//! Line-mapping annotation graphs
//!
//! A [`FileAnnotationGraph`] records, for one file and one traced commit,
//! which ancestor commits the deleted lines were last introduced in, and at
//! which line index there. Subgraphs nest the same structure per ancestor,
//! bounded by the trace depth. All maps keep insertion order, which is
//! observable through serialization.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Line-index mapping from the traced commit to one ancestor:
/// child line index → line index in the ancestor's version of the file.
/// A value of [`crate::models::NO_LINE`] means blame placed the line
/// outside the ancestor.
pub type LineMapping = IndexMap<i64, i64>;

/// Provenance of the deleted lines of one file, rooted at one commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAnnotationGraph {
    pub file_path: String,
    /// The traced commit first, then every ancestor in first-seen order.
    pub revisions: Vec<String>,
    /// Per-ancestor line mappings, in first-seen order.
    pub mappings: IndexMap<String, LineMapping>,
    /// At most one nested graph per ancestor commit.
    pub sub_graphs: IndexMap<String, FileAnnotationGraph>,
}

impl FileAnnotationGraph {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            revisions: Vec::new(),
            mappings: IndexMap::new(),
            sub_graphs: IndexMap::new(),
        }
    }

    /// Record line mappings for an ancestor commit.
    ///
    /// A first mapping for `commit` also appends it to `revisions`. Merging
    /// into an existing mapping only fills child lines not seen before, so
    /// the earliest observation of a child line always wins.
    pub fn add_mapping(&mut self, commit: &str, lines: LineMapping) {
        match self.mappings.get_mut(commit) {
            None => {
                self.revisions.push(commit.to_string());
                self.mappings.insert(commit.to_string(), lines);
            }
            Some(existing) => {
                for (child, parent) in lines {
                    existing.entry(child).or_insert(parent);
                }
            }
        }
    }

    /// Attach (or replace) the subgraph traced for an ancestor commit.
    pub fn attach_subgraph(&mut self, commit: &str, graph: FileAnnotationGraph) {
        self.sub_graphs.insert(commit.to_string(), graph);
    }

    /// Longest chain of nested subgraphs below this graph.
    pub fn depth(&self) -> usize {
        self.sub_graphs
            .values()
            .map(|g| 1 + g.depth())
            .max()
            .unwrap_or(0)
    }
}

/// The outer result map: fix-commit hash → one entry per eligible file,
/// `None` where the file could not be traced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationMap(pub IndexMap<String, Vec<Option<FileAnnotationGraph>>>);

impl AnnotationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, commit: String, graphs: Vec<Option<FileAnnotationGraph>>) {
        self.0.insert(commit, graphs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NO_LINE;

    fn mapping(pairs: &[(i64, i64)]) -> LineMapping {
        pairs.iter().copied().collect()
    }

    #[test]
    fn add_mapping_registers_revision_once() {
        let mut graph = FileAnnotationGraph::new("foo.c");
        graph.revisions.push("root".to_string());

        graph.add_mapping("abc", mapping(&[(3, 7)]));
        graph.add_mapping("abc", mapping(&[(4, 8)]));

        assert_eq!(graph.revisions, vec!["root", "abc"]);
        assert_eq!(graph.mappings["abc"], mapping(&[(3, 7), (4, 8)]));
    }

    #[test]
    fn merge_keeps_first_writer_on_duplicate_child_line() {
        let mut graph = FileAnnotationGraph::new("foo.c");
        graph.add_mapping("abc", mapping(&[(3, 7)]));
        graph.add_mapping("abc", mapping(&[(3, 99), (5, 11)]));

        assert_eq!(graph.mappings["abc"], mapping(&[(3, 7), (5, 11)]));
    }

    #[test]
    fn attach_subgraph_replaces() {
        let mut graph = FileAnnotationGraph::new("foo.c");
        graph.add_mapping("abc", mapping(&[(1, 1)]));

        graph.attach_subgraph("abc", FileAnnotationGraph::new("foo.c"));
        let mut replacement = FileAnnotationGraph::new("foo.c");
        replacement.revisions.push("abc".to_string());
        graph.attach_subgraph("abc", replacement.clone());

        assert_eq!(graph.sub_graphs.len(), 1);
        assert_eq!(graph.sub_graphs["abc"], replacement);
    }

    #[test]
    fn depth_counts_longest_chain() {
        let mut leaf = FileAnnotationGraph::new("foo.c");
        leaf.revisions.push("c".to_string());
        let mut mid = FileAnnotationGraph::new("foo.c");
        mid.attach_subgraph("c", leaf);
        let mut root = FileAnnotationGraph::new("foo.c");
        root.attach_subgraph("b", mid);
        root.attach_subgraph("d", FileAnnotationGraph::new("foo.c"));

        assert_eq!(root.depth(), 2);
    }

    #[test]
    fn sentinel_round_trips_through_json() {
        let mut graph = FileAnnotationGraph::new("foo.c");
        graph.revisions.push("root".to_string());
        graph.add_mapping("abc", mapping(&[(99, NO_LINE)]));

        let json = serde_json::to_string(&graph).expect("serialize");
        assert!(json.contains("\"99\":-1"));
        let back: FileAnnotationGraph = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, graph);
    }

    #[test]
    fn serialization_preserves_insertion_order() {
        let mut graph = FileAnnotationGraph::new("foo.c");
        graph.revisions.push("root".to_string());
        graph.add_mapping("zzz", mapping(&[(9, 1), (2, 5)]));
        graph.add_mapping("aaa", mapping(&[(1, 0)]));

        let json = serde_json::to_string(&graph).expect("serialize");
        let zzz = json.find("\"zzz\"").expect("zzz present");
        let aaa = json.rfind("\"aaa\"").expect("aaa present");
        assert!(zzz < aaa);
        assert!(json.find("\"9\"").expect("9") < json.find("\"2\"").expect("2"));
    }
}
