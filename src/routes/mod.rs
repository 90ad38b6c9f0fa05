//! API Routes
//!
//! - `GET /` - service banner with catalog connectivity
//! - `GET /health` - health check with catalog size
//! - `POST /recommend` - content-based course recommendations

pub mod health;
pub mod recommend;

use axum::Router;
use crate::models::AppState;
use tracing::info;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    Router::new()
        .merge(health::router(state.clone()))
        .merge(recommend::router(state))
}
