use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::ranker::recommend;
use crate::config::RecommendationConfig;
use crate::db::{CourseStore, StoreError};
use crate::models::{CourseRecord, RecommendationRequest, RecommendationResponse};
use crate::types::{AppError, AppResult};
use crate::utils::with_retry;

/// Request path around the ranker: fetch catalog, drop excluded courses,
/// rank what is left.
#[derive(Clone)]
pub struct RecommendationService {
    store: Arc<dyn CourseStore>,
    config: RecommendationConfig,
}

impl RecommendationService {
    pub fn new(store: Arc<dyn CourseStore>, config: RecommendationConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<dyn CourseStore> {
        &self.store
    }

    pub async fn fetch_catalog(&self) -> Result<Vec<CourseRecord>, StoreError> {
        let store = &self.store;
        let limit = self.config.catalog_fetch_limit;
        with_retry(
            move || store.fetch_courses(limit),
            self.config.catalog_fetch_attempts,
            Duration::from_millis(self.config.retry_base_delay_ms),
        )
        .await
    }

    pub async fn recommend_for_user(
        &self,
        request: RecommendationRequest,
    ) -> AppResult<RecommendationResponse> {
        let top_n = self.resolve_top_n(request.top_n)?;

        let catalog = self
            .fetch_catalog()
            .await
            .map_err(AppError::Recommendation)?;
        if catalog.is_empty() {
            info!(user_id = %request.user_id, "Catalog is empty, nothing to recommend");
            return Ok(RecommendationResponse {
                recommendations: Vec::new(),
                user_id: request.user_id,
            });
        }

        let catalog_size = catalog.len();
        let excluded = exclusion_set(&request);
        let candidates = filter_candidates(catalog, &excluded);

        let recommendations = recommend(&request.user_interests, &candidates, top_n)?;

        info!(
            user_id = %request.user_id,
            catalog = catalog_size,
            excluded = catalog_size - candidates.len(),
            returned = recommendations.len(),
            "Recommendations generated"
        );

        Ok(RecommendationResponse {
            recommendations,
            user_id: request.user_id,
        })
    }

    fn resolve_top_n(&self, requested: Option<i64>) -> AppResult<usize> {
        match requested {
            None => Ok(self.config.default_top_n),
            Some(n) if n > 0 => usize::try_from(n)
                .map_err(|_| AppError::InvalidRequest(format!("top_n {} is too large", n))),
            Some(n) => Err(super::RecommendError::InvalidTopN(n).into()),
        }
    }
}

/// Union of the user's enrolled and completed course ids.
pub fn exclusion_set(request: &RecommendationRequest) -> HashSet<&str> {
    request
        .enrolled_courses
        .iter()
        .chain(&request.completed_courses)
        .map(String::as_str)
        .collect()
}

/// Keeps catalog order. Records without an identifier are never excluded.
pub fn filter_candidates(catalog: Vec<CourseRecord>, excluded: &HashSet<&str>) -> Vec<CourseRecord> {
    catalog
        .into_iter()
        .filter(|course| {
            course
                .id()
                .map_or(true, |id| !excluded.contains(id.as_str()))
        })
        .collect()
}
