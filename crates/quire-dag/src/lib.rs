//! Commit graph for Quire.
//!
//! Each document has its own append-only commit DAG. A merge commit's
//! second parent may point into another document's DAG (a fork pulling from
//! its upstream, or an upstream accepting a pull request), so the graph is a
//! forest whose nodes are keyed by `(DocumentRef, CommitId)` rather than by
//! commit id alone.

pub mod dag;
pub mod error;
pub mod node;

pub use dag::CommitGraph;
pub use error::{DagError, DagResult};
pub use node::{CommitMetadata, CommitNode, NodeKey, ParentRef, ParentRelation};
