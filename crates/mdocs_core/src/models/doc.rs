//! Owned, serializable views of the document cache.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Build the display id of a node from its name and path.
///
/// The id is only unique among siblings; it exists for UI identity.
pub fn doc_id<S: AsRef<str>>(name: &str, path: &[S]) -> String {
    let joined = path
        .iter()
        .map(|segment| segment.as_ref())
        .collect::<Vec<_>>()
        .join("-");
    format!("{}-{}", name, joined)
}

/// One file or directory with its full subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doc {
    pub name: String,
    pub id: String,
    pub is_file: bool,
    pub path: Vec<String>,
    pub children: Vec<Doc>,
    pub headings: Vec<String>,
    pub keywords: Vec<String>,
}

impl Doc {
    /// Create a childless node with empty metadata at `path`.
    pub fn new(path: Vec<String>, is_file: bool) -> Self {
        let name = path.last().cloned().unwrap_or_default();
        Self {
            id: doc_id(&name, &path),
            name,
            is_file,
            path,
            children: Vec::new(),
            headings: Vec::new(),
            keywords: Vec::new(),
        }
    }

    /// Count this node and all of its descendants.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Doc::subtree_len).sum::<usize>()
    }
}

/// Flat index entry for one node, keyed by its encoded path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedDoc {
    pub name: String,
    pub id: String,
    pub is_file: bool,
    pub path: Vec<String>,
    /// Keys of the children, in sibling order.
    pub children_keys: Vec<String>,
    /// Key of the parent directory. `None` means a top-level node.
    pub parent_key: Option<String>,
    pub headings: Vec<String>,
    pub keywords: Vec<String>,
}

/// Normalized index keyed by encoded path.
pub type NormalizedDocMap = BTreeMap<String, NormalizedDoc>;

/// File content plus cached metadata returned by the read path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub content: String,
    pub file_path: String,
    pub headings: Vec<String>,
    pub keywords: Vec<String>,
}
