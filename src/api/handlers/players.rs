use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
};
use std::sync::Arc;

use super::AppState;
use crate::api::models::{ErrorResponse, HistoryParams};
use crate::domain::parse_player_id;
use crate::views::{NotFoundPage, PlayerPage};

fn render_html<T: Template>(status: StatusCode, page: T) -> Response {
    match page.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            log::error!("Template error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template Error").into_response()
        }
    }
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

pub async fn get_player_page(
    State(state): State<Arc<AppState>>,
    Path((player_id, char_short)): Path<(String, String)>,
) -> impl IntoResponse {
    let Some(player_id) = parse_player_id(&player_id) else {
        return render_html(
            StatusCode::BAD_REQUEST,
            NotFoundPage {
                message: "Invalid player id",
            },
        );
    };

    let conn = match state.pool.get() {
        Ok(conn) => conn,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "DB Connection Error").into_response(),
    };

    match state.profiles.load_profile(&conn, player_id, &char_short) {
        Ok(Some(player)) => render_html(StatusCode::OK, PlayerPage { player: &player }),
        Ok(None) => render_html(
            StatusCode::NOT_FOUND,
            NotFoundPage {
                message: "No rating found for this player and character",
            },
        ),
        Err(e) => {
            log::error!("Failed to load profile {:X}/{}: {:?}", player_id, char_short, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Query Error").into_response()
        }
    }
}

pub async fn get_player_json(
    State(state): State<Arc<AppState>>,
    Path((player_id, char_short)): Path<(String, String)>,
) -> impl IntoResponse {
    let Some(player_id) = parse_player_id(&player_id) else {
        return json_error(StatusCode::BAD_REQUEST, "Invalid player id");
    };

    let conn = match state.pool.get() {
        Ok(conn) => conn,
        Err(_) => return json_error(StatusCode::INTERNAL_SERVER_ERROR, "DB Connection Error"),
    };

    match state.profiles.load_profile(&conn, player_id, &char_short) {
        Ok(Some(player)) => Json(player).into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "Not found"),
        Err(e) => {
            log::error!("Failed to load profile {:X}/{}: {:?}", player_id, char_short, e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Query Error")
        }
    }
}

pub async fn get_player_history(
    State(state): State<Arc<AppState>>,
    Path((player_id, char_short)): Path<(String, String)>,
    Query(params): Query<HistoryParams>,
) -> impl IntoResponse {
    let Some(player_id) = parse_player_id(&player_id) else {
        return json_error(StatusCode::BAD_REQUEST, "Invalid player id");
    };
    let page = params.page.unwrap_or(0);

    let conn = match state.pool.get() {
        Ok(conn) => conn,
        Err(_) => return json_error(StatusCode::INTERNAL_SERVER_ERROR, "DB Connection Error"),
    };

    match state.history.load_history(&conn, player_id, &char_short, page) {
        Ok(Some(history)) => Json(history).into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "Not found"),
        Err(e) => {
            log::error!("Failed to load history {:X}/{}: {:?}", player_id, char_short, e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Query Error")
        }
    }
}
