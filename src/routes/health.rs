use axum::{extract::State, routing::get, Json, Router};
use tracing::warn;

use crate::models::{AppState, HealthResponse, RootResponse};
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .with_state(state)
}

async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    let message = match state.service.store().ping().await {
        Ok(()) => "Course recommendation service connected to the course catalog".to_string(),
        Err(e) => {
            warn!("Course catalog unreachable: {}", e);
            "Unable to connect to the course catalog. Check DATABASE_URL and network access."
                .to_string()
        }
    };

    Json(RootResponse { message })
}

async fn health_check(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    let count = state.service.store().count_courses().await?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        courses_in_db: count,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
