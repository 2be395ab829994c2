//! Handlers for the first-run setup wizard.

use super::{AppState, Viewer};
use crate::error::AppResult;
use crate::settings::{SetupStatus, SetupStep};
use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct StepRequest {
    pub step: SetupStep,
    pub data: Value,
}

/// Handler: GET /api/setup
pub async fn get_status(
    State(state): State<AppState>,
    viewer: Viewer,
) -> AppResult<Json<SetupStatus>> {
    Ok(Json(state.settings.setup_status(viewer.identity()).await?))
}

/// Handler: POST /api/setup/step
pub async fn post_step(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(request): Json<StepRequest>,
) -> AppResult<Json<SetupStatus>> {
    let status = state
        .settings
        .complete_step(viewer.identity(), request.step, &request.data)
        .await?;
    Ok(Json(status))
}
