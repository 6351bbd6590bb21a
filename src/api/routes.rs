use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers::{
    admin::admin_process,
    assets::{scripts, styles},
    players::{get_player_history, get_player_json, get_player_page},
    stats::{get_distribution, get_matchups},
    AppState,
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/player/:id/:char", get(get_player_page))
        .route("/api/player/:id/:char", get(get_player_json))
        .route("/api/player/:id/:char/history", get(get_player_history))
        .route("/api/matchups", get(get_matchups))
        .route("/api/distribution", get(get_distribution))
        .route("/api/admin/process", post(admin_process))
        .route("/scripts.js", get(scripts))
        .route("/styles.css", get(styles))
        .with_state(state)
}
