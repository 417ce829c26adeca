//! In-memory mirror of the doc root.
//!
//! Nodes live in a [`DocTree`] arena and reference each other by
//! [`NodeId`]. The [`NormalizedIndex`] maps encoded path keys to the same
//! handles, so a node mutated once is observed through both views.
//! [`DocCache`] owns the pair and applies every structural edit to both in
//! lockstep.

/// Node arena and tree traversal.
pub mod arena;
/// Initial tree construction from disk.
pub mod builder;
/// Tree + index pair and the cache-side mutation engine.
pub mod cache;
/// Flat path-keyed lookup table.
pub mod index;
/// Sibling ordering.
pub mod order;

pub use arena::{DocNode, DocTree, NodeId, ParentRef};
pub use builder::build_docs;
pub use cache::DocCache;
pub use index::{IndexEntry, NormalizedIndex};
