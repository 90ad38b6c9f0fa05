use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::recommend::RecommendationService;

#[derive(Clone)]
pub struct AppState {
    pub service: RecommendationService,
}

impl AppState {
    pub fn new(service: RecommendationService) -> Self {
        Self { service }
    }
}

/// A course as stored in the catalog.
///
/// Records are kept as the raw JSON object so fields the ranker does not
/// know about (instructor, price, videos, ...) survive into the response.
/// Only `id`, `title`, `description`, `tags` and `category` are interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseRecord(Map<String, Value>);

impl CourseRecord {
    /// Course identifier as text.
    ///
    /// Uses `id` when it holds a usable value, otherwise the document-store
    /// style `_id`, which may be a plain string, a number, or an extended-JSON
    /// `{"$oid": "..."}` object. Empty strings count as missing.
    pub fn id(&self) -> Option<String> {
        self.0
            .get("id")
            .and_then(identifier_text)
            .or_else(|| self.0.get("_id").and_then(identifier_text))
    }

    pub fn title(&self) -> Cow<'_, str> {
        self.text("title")
    }

    pub fn description(&self) -> Cow<'_, str> {
        self.text("description")
    }

    pub fn category(&self) -> Cow<'_, str> {
        self.text("category")
    }

    /// Tags in stored order. A bare string is treated as a single tag.
    pub fn tags(&self) -> Vec<Cow<'_, str>> {
        match self.0.get("tags") {
            Some(Value::Array(items)) => items.iter().map(value_text).collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => vec![value_text(other)],
        }
    }

    /// Title, description, tags and category joined by single spaces.
    /// Missing fields contribute empty text.
    pub fn composite_text(&self) -> String {
        let tags = self.tags().join(" ");
        format!(
            "{} {} {} {}",
            self.title(),
            self.description(),
            tags,
            self.category()
        )
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    fn text(&self, key: &str) -> Cow<'_, str> {
        self.0.get(key).map(value_text).unwrap_or(Cow::Borrowed(""))
    }
}

impl From<Map<String, Value>> for CourseRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl TryFrom<Value> for CourseRecord {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(other),
        }
    }
}

fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

fn identifier_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("$oid").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

/// A catalog record annotated with its similarity to the user's interests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecommendation {
    #[serde(flatten)]
    pub course: CourseRecord,
    /// Cosine similarity rounded to three decimals, in `(0, 1]`.
    pub similarity_score: f64,
}

// API Request/Response types

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    pub user_id: String,
    #[serde(default)]
    pub user_interests: Vec<String>,
    #[serde(default)]
    pub completed_courses: Vec<String>,
    #[serde(default)]
    pub enrolled_courses: Vec<String>,
    /// Signed so that non-positive values reach validation instead of
    /// failing deserialization.
    #[serde(default)]
    pub top_n: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<ScoredRecommendation>,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub courses_in_db: i64,
    pub timestamp: String,
}
