use async_trait::async_trait;
use thiserror::Error;

use crate::models::CourseRecord;

/// Errors raised while reading or writing the course catalog.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("course document {id} is not a JSON object")]
    InvalidDocument { id: String },

    #[error("course has no identifier")]
    MissingId,

    #[error("course store unavailable: {0}")]
    Unavailable(String),
}

/// Source of catalog records for the recommendation path.
///
/// Implementations own their connection lifecycle; callers only hold an
/// `Arc<dyn CourseStore>`.
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Returns at most `limit` courses in stable catalog order.
    async fn fetch_courses(&self, limit: i64) -> Result<Vec<CourseRecord>, StoreError>;

    async fn count_courses(&self) -> Result<i64, StoreError>;

    /// Cheap reachability probe.
    async fn ping(&self) -> Result<(), StoreError>;
}
