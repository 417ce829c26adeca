//! Request payloads for document endpoints. All paths are encoded keys.

use serde::Deserialize;

/// Query for reading one article.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetArticleQuery {
    pub file_path: String,
}

/// Query for listing the direct children of a folder.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubDocQuery {
    #[serde(default)]
    pub folder_doc_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocRequest {
    pub path: String,
    pub is_file: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticleRequest {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocNameRequest {
    pub path: String,
    pub new_name: String,
    pub is_file: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyCutDocRequest {
    pub source_path: String,
    pub dest_path: String,
    pub is_copy: bool,
    pub is_file: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDocRequest {
    pub path: String,
    pub is_file: bool,
}

/// A request body that is either a single item or a batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    /// Flatten into the list of items to apply in order.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}
