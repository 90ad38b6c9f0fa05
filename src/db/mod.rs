//! Course catalog access.
//!
//! The recommendation path never talks to a database directly; it receives a
//! [`CourseStore`] handle through `AppState`. `PgCourseStore` backs the HTTP
//! service and `MemoryCourseStore` backs the offline CLI and the tests.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use crate::config::DatabaseConfig;
use anyhow::Result;

pub use memory::*;
pub use operations::*;
pub use pool::*;
pub use store::*;

pub mod memory;
pub mod operations;
pub mod pool;
pub mod store;

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.url)
        .await?;

    // Test connection
    health_check(&pool).await?;

    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))
}
