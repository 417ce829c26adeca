//! Document tree HTTP handlers.
//!
//! Every path in a request or response is an encoded path key.

use crate::{error::HttpError, AppState};
use axum::{
    extract::{Query, State},
    Json,
};
use mdocs_core::models::doc::{Article, Doc, NormalizedDocMap};
use mdocs_core::models::request::*;
use mdocs_core::CacheStatus;
use serde_json::{json, Value};

/// Whole tree.
pub async fn get_docs(State(state): State<AppState>) -> Result<Json<Vec<Doc>>, HttpError> {
    Ok(Json(state.docs.docs()?))
}

/// Flat index keyed by path.
pub async fn get_normalized_docs(
    State(state): State<AppState>,
) -> Result<Json<NormalizedDocMap>, HttpError> {
    Ok(Json(state.docs.normalized_docs()?))
}

/// Direct children of a folder, or the top level without `folderDocPath`.
pub async fn get_sub_docs(
    State(state): State<AppState>,
    Query(query): Query<SubDocQuery>,
) -> Result<Json<Vec<Doc>>, HttpError> {
    Ok(Json(state.docs.sub_docs(query.folder_doc_path.as_deref())?))
}

/// Read one article.
///
/// # Returns
/// The article, or JSON `null` when the path is unknown.
pub async fn get_article(
    State(state): State<AppState>,
    Query(query): Query<GetArticleQuery>,
) -> Result<Json<Option<Article>>, HttpError> {
    Ok(Json(state.docs.article(&query.file_path)?))
}

/// Create a file or folder.
///
/// # Returns
/// The created node as JSON.
///
/// # Errors
/// 409 if the path exists, 400 for invalid paths, 503 when the cache is
/// not ready.
pub async fn create_doc(
    State(state): State<AppState>,
    Json(req): Json<CreateDocRequest>,
) -> Result<Json<Doc>, HttpError> {
    Ok(Json(state.docs.create(&req.path, req.is_file)?))
}

pub async fn update_article(
    State(state): State<AppState>,
    Json(req): Json<UpdateArticleRequest>,
) -> Result<Json<Value>, HttpError> {
    state.docs.update_content(&req.path, &req.content)?;
    Ok(Json(json!({ "path": req.path })))
}

/// Rename a file or folder.
///
/// # Returns
/// The new path key as `{"path": ...}`.
pub async fn update_doc_name(
    State(state): State<AppState>,
    Json(req): Json<UpdateDocNameRequest>,
) -> Result<Json<Value>, HttpError> {
    let path = state.docs.rename(&req.path, &req.new_name, req.is_file)?;
    Ok(Json(json!({ "path": path })))
}

/// Copy or cut one item or a batch, applied in order.
///
/// The first failure aborts the rest; items before it stay applied.
pub async fn copy_cut_doc(
    State(state): State<AppState>,
    Json(req): Json<OneOrMany<CopyCutDocRequest>>,
) -> Result<Json<Vec<Doc>>, HttpError> {
    let mut pasted = Vec::new();
    for item in req.into_vec() {
        pasted.push(state.docs.move_or_copy(
            &item.source_path,
            &item.dest_path,
            item.is_copy,
            item.is_file,
        )?);
    }
    Ok(Json(pasted))
}

/// Delete one item or a batch, applied in order.
pub async fn delete_doc(
    State(state): State<AppState>,
    Json(req): Json<OneOrMany<DeleteDocRequest>>,
) -> Result<Json<Value>, HttpError> {
    let mut deleted = Vec::new();
    for item in req.into_vec() {
        state.docs.delete(&item.path, item.is_file)?;
        deleted.push(item.path);
    }
    Ok(Json(json!({ "deleted": deleted })))
}

/// Rebuild the cache from disk.
pub async fn refresh_docs(State(state): State<AppState>) -> Result<Json<Value>, HttpError> {
    let status: CacheStatus = state.docs.refresh()?;
    Ok(Json(json!({ "status": status })))
}
