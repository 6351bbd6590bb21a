use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;

use super::AppState;
use crate::services::ProcessingService;

fn is_authorized(headers: &HeaderMap, token: Option<&str>) -> bool {
    let Some(token) = token else {
        return false;
    };
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .is_some_and(|given| given == token)
}

/// Rebuild derived data in the background
pub async fn admin_process(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if state.config.server.admin_token.is_none() {
        return (StatusCode::SERVICE_UNAVAILABLE, "Admin endpoint disabled").into_response();
    }
    if !is_authorized(&headers, state.config.server.admin_token.as_deref()) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let pool = state.pool.clone();
    let config = state.config.clone();
    tokio::task::spawn_blocking(move || {
        log::info!("Admin triggered processing started");
        let result = pool
            .get()
            .map_err(anyhow::Error::from)
            .and_then(|mut conn| ProcessingService::new(config).process(&mut conn));
        match result {
            Ok(summary) => log::info!(
                "Admin triggered processing completed: {} games, {} ratings",
                summary.games,
                summary.ratings
            ),
            Err(e) => log::error!("Admin triggered processing failed: {:?}", e),
        }
    });

    (StatusCode::ACCEPTED, "Processing triggered").into_response()
}
