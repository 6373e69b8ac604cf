use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    pub jwt_access_expires: i64,
    /// Refresh token lifetime in seconds.
    pub jwt_refresh_expires: i64,
    pub llm_api_url: String,
    pub llm_model: String,
    pub llm_api_key: String,
    pub rate_limit_ai_per_minute: u64,
    pub rate_limit_recommend_per_minute: u64,
    pub mock_job_count: usize,
    pub mock_job_seed: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            jwt_secret: require_env("JWT_SECRET_KEY")?,
            jwt_access_expires: parse_env("JWT_ACCESS_TOKEN_EXPIRES", 3600)?,
            jwt_refresh_expires: parse_env("JWT_REFRESH_TOKEN_EXPIRES", 2_592_000)?,
            llm_api_url: std::env::var("LLM_API_URL")
                .unwrap_or_else(|_| "http://localhost:11434/api/generate".to_string()),
            llm_model: std::env::var("LLM_MODEL").unwrap_or_else(|_| "llama2".to_string()),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or_default(),
            rate_limit_ai_per_minute: parse_env("RATE_LIMIT_AI_PER_MINUTE", 5)?,
            rate_limit_recommend_per_minute: parse_env("RATE_LIMIT_RECOMMEND_PER_MINUTE", 10)?,
            mock_job_count: parse_env("MOCK_JOB_COUNT", 100)?,
            mock_job_seed: parse_env("MOCK_JOB_SEED", 42)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Fixed configuration for unit tests; nothing here is ever dialled.
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/hireskill_test".to_string(),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_access_expires: 3600,
            jwt_refresh_expires: 2_592_000,
            llm_api_url: "http://127.0.0.1:9/api/generate".to_string(),
            llm_model: "test-model".to_string(),
            llm_api_key: String::new(),
            rate_limit_ai_per_minute: 5,
            rate_limit_recommend_per_minute: 10,
            mock_job_count: 100,
            mock_job_seed: 42,
            port: 8080,
            rust_log: "debug".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u64 = parse_env("HIRESKILL_TEST_UNSET_VALUE", 17).unwrap();
        assert_eq!(value, 17);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("HIRESKILL_TEST_BAD_PORT", "not-a-port");
        let result: Result<u16> = parse_env("HIRESKILL_TEST_BAD_PORT", 8080);
        assert!(result.is_err());
        std::env::remove_var("HIRESKILL_TEST_BAD_PORT");
    }

    #[test]
    fn test_parse_env_trims_whitespace() {
        std::env::set_var("HIRESKILL_TEST_TTL", " 120 ");
        let value: i64 = parse_env("HIRESKILL_TEST_TTL", 0).unwrap();
        assert_eq!(value, 120);
        std::env::remove_var("HIRESKILL_TEST_TTL");
    }
}
