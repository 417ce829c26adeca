//! Tree + index pair and the in-memory half of every mutation.
//!
//! Each operation here is pure handle surgery on the existing arena and
//! index; nothing rescans the filesystem. The disk half lives in
//! [`crate::service`], which calls into this module only after its
//! filesystem operation succeeded.

use super::arena::{DocNode, DocTree, NodeId, ParentRef};
use super::index::{IndexEntry, NormalizedIndex};
use super::order;
use crate::error::AppError;
use crate::extract::DocMetadata;
use crate::models::doc::{doc_id, Doc, NormalizedDoc, NormalizedDocMap};
use crate::path_codec;
use std::cmp::Ordering;
use std::collections::HashSet;

/// The cached tree and its normalized index.
#[derive(Debug, Default, Clone)]
pub struct DocCache {
    tree: DocTree,
    index: NormalizedIndex,
}

impl DocCache {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wholesale build from an owned tree (the tree builder's output).
    pub fn from_docs(docs: &[Doc]) -> Self {
        let tree = DocTree::from_docs(docs);
        let index = NormalizedIndex::flatten(&tree);
        Self { tree, index }
    }

    pub fn tree(&self) -> &DocTree {
        &self.tree
    }

    pub fn index(&self) -> &NormalizedIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Node stored under `key`.
    pub fn get(&self, key: &str) -> Option<&DocNode> {
        self.index.lookup(key).and_then(|id| self.tree.get(id))
    }

    /// Owned subtree stored under `key`.
    pub fn doc(&self, key: &str) -> Option<Doc> {
        self.index.lookup(key).and_then(|id| self.tree.to_doc(id))
    }

    /// Owned copy of the whole tree.
    pub fn docs(&self) -> Vec<Doc> {
        self.tree.to_docs()
    }

    /// Direct children of the folder at `key` (`""` for the top level),
    /// without their own children.
    ///
    /// # Errors
    /// Returns [`AppError::NotFound`] for unknown keys and
    /// [`AppError::BadRequest`] when `key` names a file.
    pub fn shallow_children(&self, key: &str) -> Result<Vec<Doc>, AppError> {
        let parent = if key.is_empty() {
            ParentRef::Root
        } else {
            let id = self.index.lookup(key).ok_or(AppError::NotFound)?;
            if self.node(id)?.is_file() {
                return Err(AppError::BadRequest(format!("'{}' is not a folder", key)));
            }
            ParentRef::Node(id)
        };
        let children = self.tree.children_of(parent).unwrap_or_default();
        Ok(children
            .iter()
            .filter_map(|id| self.tree.to_shallow_doc(*id))
            .collect())
    }

    /// Serializable form of the index.
    pub fn normalized(&self) -> NormalizedDocMap {
        self.index
            .iter()
            .filter_map(|(key, entry)| {
                let node = self.tree.get(entry.node)?;
                let parent_key = match entry.parent {
                    ParentRef::Root => None,
                    ParentRef::Node(parent) => self.tree.get(parent).map(DocNode::key),
                };
                Some((
                    key.clone(),
                    NormalizedDoc {
                        name: node.name.clone(),
                        id: node.id.clone(),
                        is_file: node.is_file(),
                        path: node.path.clone(),
                        children_keys: node
                            .children
                            .iter()
                            .filter_map(|child| self.tree.get(*child).map(DocNode::key))
                            .collect(),
                        parent_key,
                        headings: node.headings.clone(),
                        keywords: node.keywords.clone(),
                    },
                ))
            })
            .collect()
    }

    fn node(&self, id: NodeId) -> Result<&DocNode, AppError> {
        self.tree
            .get(id)
            .ok_or_else(|| AppError::inconsistency(format!("index points at freed node {:?}", id)))
    }

    fn indexed(&self, key: &str) -> Result<IndexEntry, AppError> {
        self.index
            .entry(key)
            .ok_or_else(|| AppError::inconsistency(format!("no index entry for '{}'", key)))
    }

    fn parent_of_path(&self, path: &[String]) -> Result<ParentRef, AppError> {
        let Some((_, parent_path)) = path.split_last() else {
            return Err(AppError::BadRequest(
                "Document path must not be empty".to_string(),
            ));
        };
        if parent_path.is_empty() {
            return Ok(ParentRef::Root);
        }
        let parent_key = path_codec::encode(parent_path);
        let id = self.index.lookup(&parent_key).ok_or_else(|| {
            AppError::inconsistency(format!(
                "parent '{}' of '{}' is not indexed",
                parent_key,
                path_codec::encode(path)
            ))
        })?;
        if self.node(id)?.is_file() {
            return Err(AppError::inconsistency(format!(
                "parent '{}' of '{}' is a file",
                parent_key,
                path_codec::encode(path)
            )));
        }
        Ok(ParentRef::Node(id))
    }

    /// Make sure every prefix of `dir_path` is a cached directory, inserting
    /// plain directory nodes for the missing ones.
    ///
    /// # Returns
    /// The parent reference for a child of `dir_path`.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] when a prefix is cached as a file.
    pub fn ensure_directories(&mut self, dir_path: &[String]) -> Result<ParentRef, AppError> {
        let mut parent = ParentRef::Root;
        for depth in 1..=dir_path.len() {
            let prefix = &dir_path[..depth];
            let key = path_codec::encode(prefix);
            let id = match self.index.lookup(&key) {
                Some(id) => {
                    if self.node(id)?.is_file() {
                        return Err(AppError::BadRequest(format!("'{}' is a file", key)));
                    }
                    id
                }
                None => {
                    tracing::debug!("[DocCache] inserting implied directory {}", key);
                    self.insert_doc(Doc::new(prefix.to_vec(), false))?
                }
            };
            parent = ParentRef::Node(id);
        }
        Ok(parent)
    }

    /// Link `doc` (and any subtree it carries) under its parent.
    ///
    /// The parent is found through the index from `doc.path`. Every node of
    /// the subtree gets a fresh arena slot and its own index entry.
    ///
    /// # Errors
    /// Returns [`AppError::AlreadyExists`] when the key is taken and
    /// [`AppError::CacheInconsistency`] when the parent is not a cached
    /// directory.
    pub fn insert_doc(&mut self, doc: Doc) -> Result<NodeId, AppError> {
        let key = path_codec::encode(&doc.path);
        if self.index.contains(&key) {
            return Err(AppError::AlreadyExists(key));
        }
        let parent = self.parent_of_path(&doc.path)?;

        let id = self.tree.alloc_subtree(&doc);
        self.index.insert(key, IndexEntry { node: id, parent });
        self.index_subtree(id);
        if !self.tree.attach(parent, id) {
            return Err(AppError::inconsistency(format!(
                "parent of '{}' vanished during insert",
                path_codec::encode(&doc.path)
            )));
        }
        Ok(id)
    }

    fn index_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let children = match self.tree.get(current) {
                Some(node) => node.children.clone(),
                None => continue,
            };
            for child in children {
                if let Some(node) = self.tree.get(child) {
                    self.index.insert(
                        node.key(),
                        IndexEntry {
                            node: child,
                            parent: ParentRef::Node(current),
                        },
                    );
                }
                stack.push(child);
            }
        }
    }

    /// Unlink the node at `key`, then drop it and every descendant from the
    /// index and the arena.
    ///
    /// # Returns
    /// Number of nodes removed.
    ///
    /// # Errors
    /// Returns [`AppError::CacheInconsistency`] when `key` is not indexed or
    /// its parent does not list it.
    pub fn remove(&mut self, key: &str) -> Result<usize, AppError> {
        let entry = self.indexed(key)?;
        if !self.tree.detach(entry.parent, entry.node) {
            return Err(AppError::inconsistency(format!(
                "'{}' is indexed but missing from its parent",
                key
            )));
        }
        self.index.remove(key);

        // The detached node still owns its children, so walk from it.
        let descendants = self.tree.descendants(entry.node);
        for id in &descendants {
            if let Some(node) = self.tree.get(*id) {
                let child_key = node.key();
                if self.index.remove(&child_key).is_none() {
                    tracing::error!("[DocCache] descendant '{}' had no index entry", child_key);
                }
            }
        }
        for id in &descendants {
            self.tree.release(*id);
        }
        self.tree.release(entry.node);
        Ok(descendants.len() + 1)
    }

    /// Rename the node at `key` in place and re-key it and its descendants.
    ///
    /// # Returns
    /// The new key.
    ///
    /// # Errors
    /// Returns [`AppError::AlreadyExists`] when a sibling already uses the
    /// new name, or [`AppError::CacheInconsistency`] for unindexed nodes.
    pub fn rename(&mut self, key: &str, new_name: &str) -> Result<String, AppError> {
        let entry = self.indexed(key)?;
        let mut new_path = self.node(entry.node)?.path.clone();
        if let Some(last) = new_path.last_mut() {
            *last = new_name.to_string();
        }
        let new_key = path_codec::encode(&new_path);
        if new_key == key {
            return Ok(new_key);
        }
        if self.index.contains(&new_key) {
            return Err(AppError::AlreadyExists(new_key));
        }

        let node = self
            .tree
            .get_mut(entry.node)
            .ok_or_else(|| AppError::inconsistency(format!("'{}' points at a freed node", key)))?;
        node.name = new_name.to_string();
        node.path = new_path.clone();
        node.refresh_id();
        let is_dir = node.is_dir;

        self.index.remove(key);
        self.index.insert(new_key.clone(), entry);
        self.tree.sort_children(entry.parent);
        if is_dir {
            self.rebase_descendants(entry.node, &new_path)?;
        }
        Ok(new_key)
    }

    /// Replace the leading `new_prefix.len()` segments of every descendant
    /// path and move their index entries to the new keys.
    ///
    /// File ids embed the full path, so sibling order is only restored once
    /// every id below `id` has been rewritten.
    fn rebase_descendants(&mut self, id: NodeId, new_prefix: &[String]) -> Result<(), AppError> {
        let depth = new_prefix.len();
        let descendants = self.tree.descendants(id);
        let mut folders = vec![id];
        for descendant in &descendants {
            let Some(node) = self.tree.get_mut(*descendant) else {
                continue;
            };
            let old_key = node.key();
            node.path.splice(0..depth, new_prefix.iter().cloned());
            node.refresh_id();
            let new_key = node.key();
            if node.is_dir {
                folders.push(*descendant);
            }

            let entry = self.index.remove(&old_key).ok_or_else(|| {
                AppError::inconsistency(format!("descendant '{}' had no index entry", old_key))
            })?;
            self.index.insert(new_key, entry);
        }
        for folder in folders {
            self.tree.sort_children(ParentRef::Node(folder));
        }
        Ok(())
    }

    /// Replace headings and keywords of the node at `key` in place.
    ///
    /// # Errors
    /// Returns [`AppError::CacheInconsistency`] when `key` is not indexed.
    pub fn update_metadata(&mut self, key: &str, metadata: DocMetadata) -> Result<(), AppError> {
        let entry = self.indexed(key)?;
        let node = self
            .tree
            .get_mut(entry.node)
            .ok_or_else(|| AppError::inconsistency(format!("'{}' points at a freed node", key)))?;
        node.headings = metadata.headings;
        node.keywords = metadata.keywords;
        Ok(())
    }

    /// Deep copy of the subtree at `source_key`, re-rooted at `dest_path`.
    ///
    /// The top node takes the last segment of `dest_path` as its name;
    /// descendants keep their names and relative suffixes.
    pub fn relocated_snapshot(&self, source_key: &str, dest_path: &[String]) -> Result<Doc, AppError> {
        let entry = self.indexed(source_key)?;
        let mut doc = self
            .tree
            .to_doc(entry.node)
            .ok_or_else(|| AppError::inconsistency(format!("'{}' points at a freed node", source_key)))?;
        relocate(&mut doc, dest_path);
        Ok(doc)
    }

    /// Insert a relocated clone of `source_key` at `dest_path`, then drop
    /// the source unless this is a copy.
    ///
    /// # Returns
    /// Handle of the inserted clone.
    pub fn move_or_copy(
        &mut self,
        source_key: &str,
        dest_path: &[String],
        is_copy: bool,
    ) -> Result<NodeId, AppError> {
        let snapshot = self.relocated_snapshot(source_key, dest_path)?;
        let id = self.insert_doc(snapshot)?;
        if !is_copy {
            self.remove(source_key)?;
        }
        Ok(id)
    }

    /// Check every structural invariant of the tree + index pair.
    ///
    /// # Errors
    /// Returns [`AppError::CacheInconsistency`] describing the first
    /// violation found.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut seen = HashSet::new();
        let mut stack: Vec<(NodeId, ParentRef, Vec<String>)> = self
            .tree
            .roots()
            .iter()
            .map(|id| (*id, ParentRef::Root, Vec::new()))
            .collect();
        self.check_sorted(self.tree.roots(), "<root>")?;

        while let Some((id, parent, parent_path)) = stack.pop() {
            if !seen.insert(id) {
                return Err(AppError::CacheInconsistency(format!(
                    "node {:?} is reachable twice",
                    id
                )));
            }
            let node = self.node(id)?;
            let key = node.key();

            let mut expected_path = parent_path;
            expected_path.push(node.name.clone());
            if node.path != expected_path {
                return Err(AppError::CacheInconsistency(format!(
                    "'{}' has path {:?}, expected {:?}",
                    key, node.path, expected_path
                )));
            }
            if node.id != doc_id(&node.name, &node.path) {
                return Err(AppError::CacheInconsistency(format!("'{}' has a stale id", key)));
            }
            match self.index.entry(&key) {
                Some(entry) if entry.node == id && entry.parent == parent => {}
                other => {
                    return Err(AppError::CacheInconsistency(format!(
                        "index entry for '{}' is {:?}, expected node {:?} under {:?}",
                        key, other, id, parent
                    )))
                }
            }
            if node.is_file() && !node.children.is_empty() {
                return Err(AppError::CacheInconsistency(format!(
                    "file '{}' has children",
                    key
                )));
            }
            if node.is_dir && (!node.headings.is_empty() || !node.keywords.is_empty()) {
                return Err(AppError::CacheInconsistency(format!(
                    "directory '{}' carries metadata",
                    key
                )));
            }
            self.check_sorted(&node.children, &key)?;
            stack.extend(
                node.children
                    .iter()
                    .map(|child| (*child, ParentRef::Node(id), node.path.clone())),
            );
        }

        if seen.len() != self.index.len() {
            return Err(AppError::CacheInconsistency(format!(
                "{} reachable nodes but {} index entries",
                seen.len(),
                self.index.len()
            )));
        }
        if seen.len() != self.tree.len() {
            return Err(AppError::CacheInconsistency(format!(
                "{} reachable nodes but {} live arena slots",
                seen.len(),
                self.tree.len()
            )));
        }
        Ok(())
    }

    fn check_sorted(&self, ids: &[NodeId], owner: &str) -> Result<(), AppError> {
        for pair in ids.windows(2) {
            let (a, b) = (self.node(pair[0])?, self.node(pair[1])?);
            if order::compare(a.sort_key(), b.sort_key()) == Ordering::Greater {
                return Err(AppError::CacheInconsistency(format!(
                    "children of '{}' out of order: '{}' before '{}'",
                    owner, a.name, b.name
                )));
            }
        }
        Ok(())
    }
}

fn relocate(doc: &mut Doc, dest_path: &[String]) {
    let old_depth = doc.path.len();
    let mut stack: Vec<&mut Doc> = vec![doc];
    while let Some(current) = stack.pop() {
        let mut path = dest_path.to_vec();
        path.extend_from_slice(&current.path[old_depth..]);
        current.name = path.last().cloned().unwrap_or_default();
        current.id = doc_id(&current.name, &path);
        current.path = path;
        stack.extend(current.children.iter_mut());
    }
}

#[cfg(test)]
mod tests;
