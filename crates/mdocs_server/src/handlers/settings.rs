//! Settings HTTP handlers.

use crate::{error::HttpError, AppState};
use axum::{extract::State, Json};
use mdocs_core::{Settings, SettingsPatch};

pub async fn get_settings(State(state): State<AppState>) -> Result<Json<Settings>, HttpError> {
    Ok(Json(state.docs.settings().get()?))
}

/// Patch settings and rebuild the cache against them.
///
/// # Errors
/// 400 when the new doc root does not exist.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<Settings>, HttpError> {
    Ok(Json(state.docs.update_settings(patch)?))
}
