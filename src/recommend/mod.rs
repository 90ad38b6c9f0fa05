//! Content-based course recommendation.
//!
//! Courses are ranked by TF-IDF cosine similarity between their text
//! (title, description, tags, category) and the user's stated interests.
//! The vector space is rebuilt from the candidate pool on every call, so
//! nothing is cached between requests.
//!
//! - [`ranker::recommend`] - pure ranking of an already-filtered pool
//! - [`vectorizer`] - tokenizer, TF-IDF space and cosine similarity
//! - [`RecommendationService`] - catalog fetch + exclusion + ranking

pub mod ranker;
pub mod service;
pub mod stop_words;
pub mod vectorizer;

pub use ranker::{recommend, RecommendError, DEFAULT_TOP_N, SCORE_FIELD};
pub use service::{exclusion_set, filter_candidates, RecommendationService};
pub use vectorizer::{cosine_similarity, tokenize, TfidfVectorizer, VectorizerError};
