//! Path-keyed lookup table over the arena.

use super::arena::{DocTree, NodeId, ParentRef};
use std::collections::HashMap;

/// Location of one node: its handle and its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub node: NodeId,
    pub parent: ParentRef,
}

/// Maps encoded path keys to arena handles.
#[derive(Debug, Default, Clone)]
pub struct NormalizedIndex {
    entries: HashMap<String, IndexEntry>,
}

impl NormalizedIndex {
    /// Index every node reachable from the tree roots, directories included.
    ///
    /// Only used on a wholesale rebuild; incremental edits go through
    /// [`super::DocCache`].
    pub fn flatten(tree: &DocTree) -> Self {
        let mut entries = HashMap::with_capacity(tree.len());
        let mut stack: Vec<(NodeId, ParentRef)> = tree
            .roots()
            .iter()
            .map(|id| (*id, ParentRef::Root))
            .collect();

        while let Some((id, parent)) = stack.pop() {
            let Some(node) = tree.get(id) else {
                continue;
            };
            entries.insert(node.key(), IndexEntry { node: id, parent });
            stack.extend(
                node.children
                    .iter()
                    .map(|child| (*child, ParentRef::Node(id))),
            );
        }

        Self { entries }
    }

    /// Handle of the node stored under `key`.
    pub fn lookup(&self, key: &str) -> Option<NodeId> {
        self.entries.get(key).map(|entry| entry.node)
    }

    pub fn entry(&self, key: &str) -> Option<IndexEntry> {
        self.entries.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &IndexEntry)> {
        self.entries.iter()
    }

    pub(crate) fn insert(&mut self, key: String, entry: IndexEntry) -> Option<IndexEntry> {
        self.entries.insert(key, entry)
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<IndexEntry> {
        self.entries.remove(key)
    }
}
