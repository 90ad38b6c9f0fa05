use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, info};

use super::pool::health_check;
use super::store::{CourseStore, StoreError};
use crate::models::CourseRecord;

// Note: runtime query_as so the crate builds without DATABASE_URL at compile time
#[derive(Debug, sqlx::FromRow)]
struct CourseRow {
    id: String,
    document: Json<Value>,
}

impl TryFrom<CourseRow> for CourseRecord {
    type Error = StoreError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        let mut record = CourseRecord::try_from(row.document.0)
            .map_err(|_| StoreError::InvalidDocument { id: row.id.clone() })?;

        // The id column is authoritative when the document does not carry one.
        if record.id().is_none() {
            record.insert("id", Value::String(row.id));
        }
        Ok(record)
    }
}

/// Postgres-backed catalog. Each course is one JSONB document keyed by id.
#[derive(Clone)]
pub struct PgCourseStore {
    pool: PgPool,
}

impl PgCourseStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts or replaces courses by id inside one transaction.
    pub async fn upsert_courses(&self, courses: &[CourseRecord]) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for course in courses {
            let id = course.id().ok_or(StoreError::MissingId)?;
            let document = Value::Object(course.fields().clone());

            written += sqlx::query(
                r#"
                INSERT INTO courses (id, document)
                VALUES ($1, $2)
                ON CONFLICT (id) DO UPDATE
                SET document = EXCLUDED.document, updated_at = NOW()
                "#,
            )
            .bind(&id)
            .bind(Json(document))
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;
        info!(written, "Courses upserted");
        Ok(written)
    }
}

#[async_trait]
impl CourseStore for PgCourseStore {
    async fn fetch_courses(&self, limit: i64) -> Result<Vec<CourseRecord>, StoreError> {
        let rows = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT id, document FROM courses
            ORDER BY created_at ASC, id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), limit, "Fetched course catalog");
        rows.into_iter().map(CourseRecord::try_from).collect()
    }

    async fn count_courses(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        health_check(&self.pool).await?;
        Ok(())
    }
}
