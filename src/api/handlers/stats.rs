use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use super::AppState;
use crate::api::models::ErrorResponse;

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

pub async fn get_matchups(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let conn = match state.pool.get() {
        Ok(conn) => conn,
        Err(_) => return json_error(StatusCode::INTERNAL_SERVER_ERROR, "DB Connection Error"),
    };

    match state.stats.load_matchups(&conn) {
        Ok(tables) => Json(tables).into_response(),
        Err(e) => {
            log::error!("Failed to load matchups: {:?}", e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Query Error")
        }
    }
}

pub async fn get_distribution(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let conn = match state.pool.get() {
        Ok(conn) => conn,
        Err(_) => return json_error(StatusCode::INTERNAL_SERVER_ERROR, "DB Connection Error"),
    };

    match state.stats.load_distribution(&conn) {
        Ok(distribution) => Json(distribution).into_response(),
        Err(e) => {
            log::error!("Failed to load distribution: {:?}", e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Query Error")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::api::routes::create_router;
    use crate::config::settings::AppConfig;
    use crate::database::{self, create_memory_pool, setup::init_database, GameSide, RatedGame};
    use crate::services::ProcessingService;

    fn processed_state() -> Arc<AppState> {
        let pool = create_memory_pool().unwrap();
        {
            let mut conn = pool.get().unwrap();
            init_database(&conn).unwrap();

            let side = |id, char_id| GameSide {
                id,
                name: format!("P{}", id),
                char_id,
                platform: 3,
                value: 2.0,
                deviation: 0.3,
            };
            for (timestamp, winner) in [(1, 1), (2, 1), (3, 2)] {
                let game = RatedGame {
                    timestamp,
                    floor: 99,
                    a: side(1, 0),
                    b: side(2, 1),
                    winner,
                };
                database::games::insert_game(&conn, &game).unwrap();
            }
            ProcessingService::new(AppConfig::new())
                .process(&mut conn)
                .unwrap();
        }
        Arc::new(AppState::new(pool, AppConfig::new()))
    }

    async fn get_json(state: Arc<AppState>, uri: &str) -> serde_json::Value {
        let response = create_router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_matchups_endpoint() {
        let json = get_json(processed_state(), "/api/matchups").await;

        let global = json["global"].as_array().unwrap();
        assert_eq!(global.len(), 2);
        assert_eq!(global[0]["character_short"], "SO");
        assert_eq!(global[0]["opponent_short"], "KY");
        assert_eq!(global[0]["game_count"], 3);
        assert_eq!(global[0]["class"], "unknown");

        assert_eq!(json["high_rated"].as_array().map(Vec::len), Some(2));
        let versus = json["versus"].as_array().unwrap();
        assert_eq!(versus.len(), 2);
        assert_eq!(versus[0]["pair_count"], 1);
    }

    #[tokio::test]
    async fn test_distribution_endpoint() {
        let json = get_json(processed_state(), "/api/distribution").await;

        let floors = json["floors"].as_array().unwrap();
        assert_eq!(floors.len(), 11);
        let celestial = &floors[10];
        assert_eq!(celestial["floor"], "Celestial");
        assert_eq!(celestial["player_count"], 2);
        assert_eq!(celestial["game_share"], 100.0);
        assert_eq!(json["ratings"].as_array().map(Vec::len), Some(0));
    }
}
