use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::store::{CourseStore, StoreError};
use crate::models::CourseRecord;

/// In-process catalog used by the `rank` command and by tests.
#[derive(Clone, Default)]
pub struct MemoryCourseStore {
    inner: Arc<RwLock<Vec<CourseRecord>>>,
}

impl MemoryCourseStore {
    pub fn new(courses: Vec<CourseRecord>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(courses)),
        }
    }

    /// Loads a catalog from a JSON file holding an array of course objects.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let courses = load_catalog_file(path).await?;
        Ok(Self::new(courses))
    }

    pub async fn insert(&self, course: CourseRecord) {
        let mut guard = self.inner.write().await;
        guard.push(course);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl CourseStore for MemoryCourseStore {
    async fn fetch_courses(&self, limit: i64) -> Result<Vec<CourseRecord>, StoreError> {
        let guard = self.inner.read().await;
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Ok(guard.iter().take(limit).cloned().collect())
    }

    async fn count_courses(&self) -> Result<i64, StoreError> {
        Ok(self.inner.read().await.len() as i64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

pub async fn load_catalog_file(path: impl AsRef<Path>) -> Result<Vec<CourseRecord>> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    let courses: Vec<CourseRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("Catalog {} must be a JSON array of objects", path.display()))?;
    Ok(courses)
}
