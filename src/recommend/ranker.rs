use std::cmp::Ordering;

use thiserror::Error;
use tracing::debug;

use super::vectorizer::{TfidfVectorizer, VectorizerError};
use crate::models::{CourseRecord, ScoredRecommendation};

pub const DEFAULT_TOP_N: usize = 5;

pub const SCORE_FIELD: &str = "similarity_score";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecommendError {
    #[error("top_n must be a positive integer, got {0}")]
    InvalidTopN(i64),
}

/// Ranks `candidates` by lexical similarity to `interests`.
///
/// Returns at most `top_n` copies of the candidate records annotated with
/// their score, best first. Equal scores keep candidate order. Courses with
/// no overlap are never returned, and neither empty interests nor an empty
/// candidate list is an error.
pub fn recommend<S: AsRef<str>>(
    interests: &[S],
    candidates: &[CourseRecord],
    top_n: usize,
) -> Result<Vec<ScoredRecommendation>, RecommendError> {
    if top_n == 0 {
        return Err(RecommendError::InvalidTopN(0));
    }
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let texts: Vec<String> = candidates.iter().map(CourseRecord::composite_text).collect();
    let vectorizer = match TfidfVectorizer::fit(&texts) {
        Ok(vectorizer) => vectorizer,
        Err(e @ (VectorizerError::EmptyVocabulary | VectorizerError::NoDocuments)) => {
            debug!(candidates = candidates.len(), "No scorable candidates: {}", e);
            return Ok(Vec::new());
        }
    };

    let query = interests
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(" ");
    let scores = vectorizer.similarities(&query);

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    // sort_by is stable, so ties stay in candidate order
    order.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));

    let recommendations: Vec<ScoredRecommendation> = order
        .into_iter()
        .map(|idx| (idx, round_score(scores[idx])))
        .filter(|&(_, score)| score > 0.0)
        .take(top_n)
        .map(|(idx, score)| {
            let mut course = candidates[idx].clone();
            course.remove(SCORE_FIELD);
            ScoredRecommendation {
                course,
                similarity_score: score,
            }
        })
        .collect();

    debug!(
        candidates = candidates.len(),
        vocabulary = vectorizer.vocabulary().len(),
        returned = recommendations.len(),
        "Ranked candidate pool"
    );

    Ok(recommendations)
}

/// Three-decimal rounding with exact halves going to the even digit,
/// capped at 1.0 against floating-point overshoot.
fn round_score(score: f64) -> f64 {
    ((score * 1000.0).round_ties_even() / 1000.0).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn course(value: Value) -> CourseRecord {
        CourseRecord::try_from(value).unwrap()
    }

    fn ids(recs: &[ScoredRecommendation]) -> Vec<String> {
        recs.iter().filter_map(|r| r.course.id()).collect()
    }

    fn python_and_yoga() -> Vec<CourseRecord> {
        vec![
            course(json!({ "id": "a", "title": "Intro to Python", "tags": ["python", "programming"] })),
            course(json!({ "id": "b", "title": "Advanced Yoga", "tags": ["yoga", "wellness"] })),
        ]
    }

    #[test]
    fn test_only_matching_course_is_returned() {
        let recs = recommend(&["python", "programming"], &python_and_yoga(), 5).unwrap();
        assert_eq!(ids(&recs), vec!["a"]);
        assert!(recs[0].similarity_score > 0.0 && recs[0].similarity_score <= 1.0);
    }

    #[test]
    fn test_empty_interests_yield_nothing() {
        let none: [&str; 0] = [];
        assert!(recommend(&none, &python_and_yoga(), 5).unwrap().is_empty());
    }

    #[test]
    fn test_empty_candidates_yield_nothing() {
        assert!(recommend(&["python"], &[], 5).unwrap().is_empty());
    }

    #[test]
    fn test_zero_top_n_rejected() {
        assert_eq!(
            recommend(&["python"], &python_and_yoga(), 0).unwrap_err(),
            RecommendError::InvalidTopN(0)
        );
    }

    #[test]
    fn test_stop_word_only_catalog_yields_nothing() {
        let candidates = vec![course(json!({ "id": "x", "title": "The", "description": "of and" }))];
        assert!(recommend(&["the"], &candidates, 5).unwrap().is_empty());
    }

    #[test]
    fn test_top_n_limits_and_orders() {
        let candidates: Vec<CourseRecord> = (0..10)
            .map(|i| {
                let extra = "filler ".repeat(i);
                course(json!({
                    "id": format!("c{i}"),
                    "title": "Rust programming",
                    "description": format!("rust {extra}")
                }))
            })
            .collect();

        let recs = recommend(&["rust", "programming"], &candidates, 3).unwrap();
        assert_eq!(recs.len(), 3);
        assert!(recs
            .windows(2)
            .all(|w| w[0].similarity_score >= w[1].similarity_score));
        // Least padding means the highest share of matching terms.
        assert_eq!(recs[0].course.id().as_deref(), Some("c0"));
    }

    #[test]
    fn test_ties_keep_candidate_order() {
        let candidates = vec![
            course(json!({ "id": "first", "title": "Data Science", "tags": ["pandas"] })),
            course(json!({ "id": "other", "title": "Pottery" })),
            course(json!({ "id": "second", "title": "Data Science", "tags": ["pandas"] })),
        ];
        let recs = recommend(&["data science"], &candidates, 5).unwrap();
        assert_eq!(ids(&recs), vec!["first", "second"]);
        assert_eq!(recs[0].similarity_score, recs[1].similarity_score);
    }

    #[test]
    fn test_deterministic() {
        let candidates = python_and_yoga();
        let first = recommend(&["python yoga"], &candidates, 5).unwrap();
        let second = recommend(&["python yoga"], &candidates, 5).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_inputs_not_mutated_and_extra_fields_kept() {
        let candidates = vec![course(json!({
            "id": "a",
            "title": "Python",
            "price": 49,
            "similarity_score": 99
        }))];
        let before = candidates.clone();
        let recs = recommend(&["python"], &candidates, 1).unwrap();

        assert_eq!(candidates, before);
        assert_eq!(recs[0].course.get("price"), Some(&json!(49)));
        assert!(recs[0].course.get(SCORE_FIELD).is_none());
        let rendered = serde_json::to_value(&recs[0]).unwrap();
        assert_eq!(rendered[SCORE_FIELD], json!(1.0));
    }

    #[test]
    fn test_length_bound_over_many_pools() {
        let words = ["python", "rust", "yoga", "cloud", "security", "design"];
        for size in 0..words.len() {
            let pool: Vec<CourseRecord> = words[..size]
                .iter()
                .enumerate()
                .map(|(i, w)| course(json!({ "id": i.to_string(), "title": w, "category": "python" })))
                .collect();
            for top_n in 1..4 {
                let recs = recommend(&["python", "cloud"], &pool, top_n).unwrap();
                assert!(recs.len() <= top_n.min(pool.len()));
                assert!(recs.iter().all(|r| r.similarity_score > 0.0 && r.similarity_score <= 1.0));
            }
        }
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.12345), 0.123);
        assert_eq!(round_score(1.0000000002), 1.0);
        assert_eq!(round_score(0.0004), 0.0);
        assert_eq!(round_score(0.0625), 0.062);
        assert_eq!(round_score(0.1875), 0.188);
    }
}
