//! The commit graph structure and traversal algorithms.
//!
//! [`CommitGraph`] stores nodes in a [`HashMap`] keyed by [`NodeKey`], keeps
//! an append-ordered log per document, and maintains a forward-edge index
//! (`children`) for descendant queries.
//!
//! # Invariants
//!
//! - The graph is acyclic (append-only, parents must already exist).
//! - Every parent reference resolves to an existing node.
//! - A node's first parent lives in the node's own document.
//! - Each document has exactly one root: its first commit.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use quire_types::{CommitId, DocumentRef};

use crate::error::{DagError, DagResult};
use crate::node::{CommitNode, NodeKey, ParentRelation};

/// A forest of per-document commit DAGs.
#[derive(Clone, Debug, Default)]
pub struct CommitGraph {
    nodes: HashMap<NodeKey, CommitNode>,
    /// Per-document commit ids in append order (oldest first).
    logs: HashMap<DocumentRef, Vec<CommitId>>,
    /// Forward-edge index: parent -> children.
    children: HashMap<NodeKey, Vec<NodeKey>>,
    roots: Vec<NodeKey>,
}

impl CommitGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of commits across all documents.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Append a commit to its document's log.
    ///
    /// Parents must already exist. A document's first commit must be a
    /// root; every later commit needs a sequential first parent in the same
    /// document, optionally followed by one merge parent from any document.
    pub fn add_node(&mut self, node: CommitNode) -> DagResult<NodeKey> {
        let key = node.key();
        if self.nodes.contains_key(&key) {
            return Err(DagError::DuplicateNode {
                document: key.document,
                commit: key.commit,
            });
        }

        if node.parents.len() > 2 {
            return Err(DagError::TooManyParents {
                node: node.id,
                count: node.parents.len(),
            });
        }

        let has_log = self
            .logs
            .get(&node.document)
            .is_some_and(|log| !log.is_empty());
        match node.parents.first() {
            None if has_log => {
                return Err(DagError::SecondRoot {
                    node: node.id,
                    document: node.document,
                });
            }
            Some(first)
                if first.relation != ParentRelation::Sequential
                    || first.document != node.document =>
            {
                return Err(DagError::ForeignParent {
                    node: node.id,
                    document: node.document,
                });
            }
            _ => {}
        }
        if node.parents.iter().skip(1).any(|p| p.relation != ParentRelation::Merge) {
            return Err(DagError::ForeignParent {
                node: node.id,
                document: node.document,
            });
        }

        for parent_ref in &node.parents {
            let Some(parent) = self.nodes.get(&parent_ref.key()) else {
                return Err(DagError::DanglingParent {
                    node: node.id,
                    parent: parent_ref.commit,
                    parent_document: parent_ref.document.clone(),
                });
            };
            if !node.timestamp.is_after(&parent.timestamp) {
                return Err(DagError::TemporalViolation {
                    child: node.id,
                    parent: parent.id,
                });
            }
        }

        for parent_ref in &node.parents {
            self.children
                .entry(parent_ref.key())
                .or_default()
                .push(key.clone());
        }
        if node.is_root() {
            self.roots.push(key.clone());
        }
        self.logs
            .entry(node.document.clone())
            .or_default()
            .push(node.id);

        debug!(
            document = %node.document,
            commit = %node.id.short_hex(),
            parents = node.parents.len(),
            "added commit node"
        );
        self.nodes.insert(key.clone(), node);

        Ok(key)
    }

    // ---------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------

    pub fn get(&self, document: &DocumentRef, commit: &CommitId) -> Option<&CommitNode> {
        self.nodes.get(&NodeKey::new(document.clone(), *commit))
    }

    /// Returns `true` if `commit` belongs to `document`'s own log.
    pub fn contains(&self, document: &DocumentRef, commit: &CommitId) -> bool {
        self.get(document, commit).is_some()
    }

    /// Find a commit by id alone, in whichever document's log holds it.
    pub fn find(&self, commit: &CommitId) -> Option<&CommitNode> {
        self.nodes.values().find(|n| n.id == *commit)
    }

    /// Root nodes, one per document.
    pub fn roots(&self) -> Vec<&CommitNode> {
        self.roots
            .iter()
            .filter_map(|key| self.nodes.get(key))
            .collect()
    }

    pub fn children(&self, key: &NodeKey) -> Vec<&CommitNode> {
        self.children
            .get(key)
            .map(|keys| keys.iter().filter_map(|k| self.nodes.get(k)).collect())
            .unwrap_or_default()
    }

    // ---------------------------------------------------------------
    // Document queries
    // ---------------------------------------------------------------

    /// Commit ids of a document, newest first.
    pub fn history(&self, document: &DocumentRef) -> Vec<CommitId> {
        self.logs
            .get(document)
            .map(|log| log.iter().rev().copied().collect())
            .unwrap_or_default()
    }

    /// Commit nodes of a document, newest first.
    pub fn document_log(&self, document: &DocumentRef) -> Vec<&CommitNode> {
        self.history(document)
            .iter()
            .filter_map(|id| self.get(document, id))
            .collect()
    }

    pub fn log_len(&self, document: &DocumentRef) -> usize {
        self.logs.get(document).map_or(0, Vec::len)
    }

    /// Every document with at least one commit, sorted.
    pub fn documents(&self) -> Vec<&DocumentRef> {
        let mut documents: Vec<&DocumentRef> = self.logs.keys().collect();
        documents.sort();
        documents
    }

    // ---------------------------------------------------------------
    // Ancestry
    // ---------------------------------------------------------------

    /// All ancestors of a node up to `max_depth` levels (BFS upward),
    /// following merge edges across documents.
    ///
    /// The node itself is **not** included.
    pub fn ancestors(&self, key: &NodeKey, max_depth: usize) -> Vec<&CommitNode> {
        let Some(start) = self.nodes.get(key) else {
            return Vec::new();
        };

        let mut visited = HashSet::new();
        visited.insert(key.clone());
        let mut result = Vec::new();
        let mut queue: VecDeque<(NodeKey, usize)> = VecDeque::new();

        for parent in start.parent_keys() {
            if visited.insert(parent.clone()) {
                queue.push_back((parent, 1));
            }
        }

        while let Some((current, depth)) = queue.pop_front() {
            if depth > max_depth {
                continue;
            }
            if let Some(node) = self.nodes.get(&current) {
                result.push(node);
                if depth < max_depth {
                    for parent in node.parent_keys() {
                        if visited.insert(parent.clone()) {
                            queue.push_back((parent, depth + 1));
                        }
                    }
                }
            }
        }

        result
    }

    /// Returns `true` if `ancestor` is reachable from `descendant` by
    /// following parent edges (a node is its own ancestor).
    pub fn is_ancestor(&self, ancestor: &NodeKey, descendant: &NodeKey) -> bool {
        if ancestor == descendant {
            return self.nodes.contains_key(ancestor);
        }
        self.ancestors(descendant, usize::MAX)
            .iter()
            .any(|node| node.id == ancestor.commit && node.document == ancestor.document)
    }

    // ---------------------------------------------------------------
    // Validation
    // ---------------------------------------------------------------

    /// Validate the graph's structural integrity.
    ///
    /// Checks that every parent reference resolves, that every logged id has
    /// a node, and that root tracking matches the nodes.
    pub fn validate(&self) -> DagResult<()> {
        for node in self.nodes.values() {
            for parent_ref in &node.parents {
                if !self.nodes.contains_key(&parent_ref.key()) {
                    return Err(DagError::DanglingParent {
                        node: node.id,
                        parent: parent_ref.commit,
                        parent_document: parent_ref.document.clone(),
                    });
                }
            }
        }

        for (document, log) in &self.logs {
            for id in log {
                if !self.contains(document, id) {
                    return Err(DagError::NodeNotFound {
                        document: document.clone(),
                        commit: *id,
                    });
                }
            }
        }

        for root in &self.roots {
            if let Some(node) = self.nodes.get(root) {
                if !node.is_root() {
                    return Err(DagError::SecondRoot {
                        node: node.id,
                        document: node.document.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
