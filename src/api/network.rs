use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::{
    error::Result,
    models::{ApiResponse, Network, NetworkEndpoint},
    services::SessionView,
};

#[derive(Debug, Deserialize)]
pub struct SelectNetworkRequest {
    pub network: String,
}

#[derive(Debug, Serialize)]
pub struct NetworkEntry {
    #[serde(flatten)]
    pub endpoint: NetworkEndpoint,
    pub active: bool,
}

/// PUT /api/v1/network
pub async fn select_network(
    State(state): State<AppState>,
    Json(req): Json<SelectNetworkRequest>,
) -> Result<Json<ApiResponse<SessionView>>> {
    let network: Network = req.network.parse()?;
    let view = state.service.select_network(network).await;
    Ok(Json(ApiResponse::success(view)))
}

/// GET /api/v1/networks
pub async fn list_networks(State(state): State<AppState>) -> Json<ApiResponse<Vec<NetworkEntry>>> {
    let active = state.service.current_view().network;
    let entries = Network::ALL
        .iter()
        .map(|network| NetworkEntry {
            endpoint: state.config.endpoint(*network),
            active: *network == active,
        })
        .collect();
    Json(ApiResponse::success(entries))
}
