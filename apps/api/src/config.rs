use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{LlmConfig, RetryPolicy, DEFAULT_TIMEOUT};

const DEFAULT_AI_BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v4/chat/completions";
const DEFAULT_AI_MODEL: &str = "glm-4-flash-250414";

/// Application configuration loaded from environment variables.
/// Fails at startup if the AI credential is missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub port: u16,
    pub rust_log: String,
    /// Directory scanned by `GET /api/data-files`.
    pub data_dir: PathBuf,
    /// Résumé shown on startup and restored by reset.
    pub resume_data_path: PathBuf,
    /// Whether intake placeholders sleep to imitate real processing time.
    pub simulate_latency: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let mut llm = LlmConfig::new(
            optional_env("AI_BASE_URL").unwrap_or_else(|| DEFAULT_AI_BASE_URL.to_string()),
            optional_env("AI_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.to_string()),
            require_env("AI_API_KEY")?,
        );
        llm.timeout = parse_env::<u64>("AI_TIMEOUT_MS")?
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TIMEOUT);
        if let Some(max_retries) = parse_env::<u32>("AI_MAX_RETRIES")? {
            llm.retry = RetryPolicy::with_max_retries(max_retries);
        }

        let data_dir = PathBuf::from(optional_env("DATA_DIR").unwrap_or_else(|| "data".to_string()));
        let resume_data_path = optional_env("RESUME_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("resume.json"));

        Ok(Config {
            llm,
            port: parse_env::<u16>("PORT")?.unwrap_or(8080),
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            data_dir,
            resume_data_path,
            simulate_latency: parse_env::<bool>("SIMULATE_LATENCY")?.unwrap_or(true),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    optional_env(key)
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    optional_env(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}"))
        })
        .transpose()
}
