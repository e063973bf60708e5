// src/api/mod.rs

pub mod health;
pub mod lookup;
pub mod network;

use std::sync::Arc;

use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::Config;
use crate::services::WalletLookupService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub service: Arc<WalletLookupService>,
}

// Origins from a comma-separated list; `None` means any origin.
fn allowed_origins(raw: &str) -> Option<Vec<HeaderValue>> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "*" {
        return None;
    }
    let origins: Vec<HeaderValue> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<HeaderValue>() {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", s);
                None
            }
        })
        .collect();
    (!origins.is_empty()).then_some(origins)
}

/// CORS for the lookup routes: only the methods the router serves.
pub fn cors_layer(raw_origins: &str) -> CorsLayer {
    let origin = match allowed_origins(raw_origins) {
        Some(origins) => {
            tracing::info!("CORS restricted to {} origin(s): {}", origins.len(), raw_origins.trim());
            AllowOrigin::list(origins)
        }
        None => {
            tracing::info!("CORS allows any origin");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([CONTENT_TYPE])
}
