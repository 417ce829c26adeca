//! Arena storage for document nodes.

use super::order::{self, SortKey};
use crate::models::doc::{doc_id, Doc};
use crate::path_codec;
use std::cmp::Ordering;

/// Handle of a node inside a [`DocTree`].
///
/// Handles are reused after release, so never hold one across a mutation
/// that may remove the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Parent of a node: a directory node, or the root list sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentRef {
    Root,
    Node(NodeId),
}

/// One cached file or directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocNode {
    pub name: String,
    pub id: String,
    pub is_dir: bool,
    /// Segments from the doc root to this node, file extension stripped.
    pub path: Vec<String>,
    /// Child handles in sibling order. Always empty for files.
    pub children: Vec<NodeId>,
    pub headings: Vec<String>,
    pub keywords: Vec<String>,
}

impl DocNode {
    fn from_doc(doc: &Doc) -> Self {
        Self {
            name: doc.name.clone(),
            id: doc.id.clone(),
            is_dir: !doc.is_file,
            path: doc.path.clone(),
            children: Vec::new(),
            headings: doc.headings.clone(),
            keywords: doc.keywords.clone(),
        }
    }

    pub fn is_file(&self) -> bool {
        !self.is_dir
    }

    /// Encoded index key of this node.
    pub fn key(&self) -> String {
        path_codec::encode(&self.path)
    }

    pub(crate) fn sort_key(&self) -> SortKey<'_> {
        SortKey {
            is_dir: self.is_dir,
            name: &self.name,
            id: &self.id,
        }
    }

    /// Recompute `id` after `name` or `path` changed.
    pub(crate) fn refresh_id(&mut self) {
        self.id = doc_id(&self.name, &self.path);
    }
}

/// Growable table of nodes plus the ordered top-level list.
#[derive(Debug, Default, Clone)]
pub struct DocTree {
    slots: Vec<Option<DocNode>>,
    free: Vec<usize>,
    roots: Vec<NodeId>,
    live: usize,
}

impl DocTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an arena from an owned tree, keeping the given sibling order.
    pub fn from_docs(docs: &[Doc]) -> Self {
        let mut tree = Self::new();
        let roots = docs.iter().map(|doc| tree.alloc_subtree(doc)).collect();
        tree.roots = roots;
        tree.sort_children(ParentRef::Root);
        tree
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn get(&self, id: NodeId) -> Option<&DocNode> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut DocNode> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Top-level nodes in sibling order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Children of `parent`, or `None` if the parent node is gone.
    pub fn children_of(&self, parent: ParentRef) -> Option<&[NodeId]> {
        match parent {
            ParentRef::Root => Some(&self.roots),
            ParentRef::Node(id) => self.get(id).map(|node| node.children.as_slice()),
        }
    }

    fn children_mut(&mut self, parent: ParentRef) -> Option<&mut Vec<NodeId>> {
        match parent {
            ParentRef::Root => Some(&mut self.roots),
            ParentRef::Node(id) => self.get_mut(id).map(|node| &mut node.children),
        }
    }

    fn alloc(&mut self, node: DocNode) -> NodeId {
        self.live += 1;
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Free a single slot. Children are not touched.
    pub(crate) fn release(&mut self, id: NodeId) -> Option<DocNode> {
        let node = self.slots.get_mut(id.0)?.take()?;
        self.live -= 1;
        self.free.push(id.0);
        Some(node)
    }

    /// Allocate fresh slots for `doc` and every descendant.
    ///
    /// The returned node is not attached to any parent yet.
    pub(crate) fn alloc_subtree(&mut self, doc: &Doc) -> NodeId {
        let id = self.alloc(DocNode::from_doc(doc));
        if !doc.is_file {
            let children: Vec<NodeId> = doc
                .children
                .iter()
                .map(|child| self.alloc_subtree(child))
                .collect();
            if let Some(node) = self.get_mut(id) {
                node.children = children;
            }
            self.sort_children(ParentRef::Node(id));
        }
        id
    }

    /// Append `child` to `parent` and restore sibling order.
    ///
    /// # Returns
    /// `false` if the parent node no longer exists.
    pub(crate) fn attach(&mut self, parent: ParentRef, child: NodeId) -> bool {
        match self.children_mut(parent) {
            Some(children) => children.push(child),
            None => return false,
        }
        self.sort_children(parent)
    }

    /// Unlink `child` from `parent` without freeing anything.
    ///
    /// # Returns
    /// `false` if `child` was not among the parent's children.
    pub(crate) fn detach(&mut self, parent: ParentRef, child: NodeId) -> bool {
        let Some(children) = self.children_mut(parent) else {
            return false;
        };
        let before = children.len();
        children.retain(|id| *id != child);
        children.len() != before
    }

    pub(crate) fn sort_children(&mut self, parent: ParentRef) -> bool {
        let Some(children) = self.children_mut(parent) else {
            return false;
        };
        let mut ids = std::mem::take(children);
        ids.sort_by(|a, b| self.compare_ids(*a, *b));
        if let Some(children) = self.children_mut(parent) {
            *children = ids;
        }
        true
    }

    fn compare_ids(&self, a: NodeId, b: NodeId) -> Ordering {
        match (self.get(a), self.get(b)) {
            (Some(a), Some(b)) => order::compare(a.sort_key(), b.sort_key()),
            _ => Ordering::Equal,
        }
    }

    /// All descendants of `id` in depth-first pre-order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = match self.get(id) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return found,
        };
        while let Some(current) = stack.pop() {
            found.push(current);
            if let Some(node) = self.get(current) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        found
    }

    /// Owned copy of the subtree rooted at `id`.
    pub fn to_doc(&self, id: NodeId) -> Option<Doc> {
        let node = self.get(id)?;
        Some(Doc {
            name: node.name.clone(),
            id: node.id.clone(),
            is_file: node.is_file(),
            path: node.path.clone(),
            children: node
                .children
                .iter()
                .filter_map(|child| self.to_doc(*child))
                .collect(),
            headings: node.headings.clone(),
            keywords: node.keywords.clone(),
        })
    }

    /// Owned copy of `id` with its children listed but not expanded.
    pub fn to_shallow_doc(&self, id: NodeId) -> Option<Doc> {
        let node = self.get(id)?;
        Some(Doc {
            name: node.name.clone(),
            id: node.id.clone(),
            is_file: node.is_file(),
            path: node.path.clone(),
            children: Vec::new(),
            headings: node.headings.clone(),
            keywords: node.keywords.clone(),
        })
    }

    /// Owned copy of the whole tree.
    pub fn to_docs(&self) -> Vec<Doc> {
        self.roots
            .iter()
            .filter_map(|id| self.to_doc(*id))
            .collect()
    }
}
