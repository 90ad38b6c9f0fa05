use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

use crate::recommend::DEFAULT_TOP_N;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub recommendation: RecommendationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// Tuning for the recommendation request path.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationConfig {
    /// Used when a request does not carry its own `top_n`.
    pub default_top_n: usize,
    /// Upper bound on the number of catalog records pulled per request.
    pub catalog_fetch_limit: i64,
    /// Total attempts for a catalog fetch; 1 disables retrying.
    pub catalog_fetch_attempts: u32,
    pub retry_base_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
    pub log_dir: Option<String>,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            default_top_n: DEFAULT_TOP_N,
            catalog_fetch_limit: 1000,
            catalog_fetch_attempts: 1,
            retry_base_delay_ms: 200,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                port: parse_var("PORT", "8000")?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "*".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
                max_connections: parse_var("DB_MAX_CONNECTIONS", "10")?,
                min_connections: parse_var("DB_MIN_CONNECTIONS", "1")?,
                acquire_timeout_secs: parse_var("DB_ACQUIRE_TIMEOUT_SECS", "5")?,
            },
            recommendation: RecommendationConfig::from_env()?,
        })
    }
}

impl RecommendationConfig {
    /// Reads only the ranking settings, so offline tools can run without a database.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let config = Self {
            default_top_n: parse_var("DEFAULT_TOP_N", &defaults.default_top_n.to_string())?,
            catalog_fetch_limit: parse_var(
                "CATALOG_FETCH_LIMIT",
                &defaults.catalog_fetch_limit.to_string(),
            )?,
            catalog_fetch_attempts: parse_var(
                "CATALOG_FETCH_ATTEMPTS",
                &defaults.catalog_fetch_attempts.to_string(),
            )?,
            retry_base_delay_ms: parse_var(
                "CATALOG_RETRY_DELAY_MS",
                &defaults.retry_base_delay_ms.to_string(),
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_top_n == 0 {
            bail!("DEFAULT_TOP_N must be a positive integer");
        }
        if self.catalog_fetch_limit <= 0 {
            bail!("CATALOG_FETCH_LIMIT must be a positive integer");
        }
        Ok(())
    }
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self {
            filter: env::var("RUST_LOG")
                .unwrap_or_else(|_| "course_recommender=debug,tower_http=debug".to_string()),
            log_dir: env::var("LOG_DIR").ok().filter(|s| !s.trim().is_empty()),
        }
    }
}

fn parse_var<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse()
        .with_context(|| format!("Invalid value for {}", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_defaults() {
        let config = RecommendationConfig::default();
        assert_eq!(config.default_top_n, 5);
        assert_eq!(config.catalog_fetch_limit, 1000);
        assert_eq!(config.catalog_fetch_attempts, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_top_n_rejected() {
        let config = RecommendationConfig {
            default_top_n: 0,
            ..RecommendationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_var_uses_default() {
        let port: u16 = parse_var("COURSE_RECOMMENDER_TEST_UNSET_PORT", "8000").unwrap();
        assert_eq!(port, 8000);
    }

    #[test]
    fn test_parse_var_reports_key() {
        let err = parse_var::<u16>("COURSE_RECOMMENDER_TEST_UNSET_BAD", "not-a-number")
            .unwrap_err();
        assert!(err.to_string().contains("COURSE_RECOMMENDER_TEST_UNSET_BAD"));
    }
}
