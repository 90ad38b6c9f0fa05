// Course Recommender - content-based course recommendations over a course catalog

pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod recommend;
pub mod routes;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

/// Router with the CORS and request-tracing layers the server runs with.
pub fn create_app(state: AppState, allowed_origins: &[String]) -> axum::Router {
    let router = routes::create_router(state);
    let router = middleware::apply_cors(router, allowed_origins);
    middleware::apply_tracing(router)
}
