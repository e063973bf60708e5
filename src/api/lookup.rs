use axum::{extract::State, Json};
use serde::Deserialize;

use super::AppState;
use crate::{
    error::Result,
    models::ApiResponse,
    services::SessionView,
};

#[derive(Debug, Deserialize)]
pub struct LookupRequest {
    pub address: String,
}

/// POST /api/v1/lookup
///
/// Fetch failures still answer 200 with a `failed` phase; only a malformed
/// address or a duplicate in-flight lookup is an error response.
pub async fn lookup_wallet(
    State(state): State<AppState>,
    Json(req): Json<LookupRequest>,
) -> Result<Json<ApiResponse<SessionView>>> {
    let view = state.service.lookup(&req.address).await?;
    Ok(Json(ApiResponse::success(view)))
}

/// GET /api/v1/session
pub async fn get_session(State(state): State<AppState>) -> Json<ApiResponse<SessionView>> {
    Json(ApiResponse::success(state.service.current_view()))
}
