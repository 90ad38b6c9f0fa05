use axum::{extract::State, routing::post, Json, Router};
use tracing::info;

use crate::models::{AppState, RecommendationRequest, RecommendationResponse};
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/recommend", post(post_recommend))
        .with_state(state)
}

pub async fn post_recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    info!(
        user_id = %request.user_id,
        interests = request.user_interests.len(),
        "Received recommendation request"
    );

    let response = state.service.recommend_for_user(request).await?;
    Ok(Json(response))
}
