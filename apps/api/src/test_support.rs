//! Shared fixtures for handler and router tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::llm_client::{LlmClient, LlmConfig, RetryPolicy};
use crate::resume::current::{load_default_resume, CurrentResume};
use crate::resume::store::MemoryResumeStore;
use crate::state::AppState;

pub fn bundled_resume_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data/resume.json")
}

/// State whose LLM client talks to `llm_base` (usually a wiremock server)
/// without retries or simulated latency.
pub fn test_state(llm_base: &str, data_dir: &Path) -> AppState {
    let mut llm = LlmConfig::new(format!("{llm_base}/chat/completions"), "test-model", "sk-test");
    llm.timeout = Duration::from_secs(5);
    llm.retry = RetryPolicy {
        max_retries: 0,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(1),
    };

    let config = Config {
        llm: llm.clone(),
        port: 0,
        rust_log: "debug".into(),
        data_dir: data_dir.to_path_buf(),
        resume_data_path: bundled_resume_path(),
        simulate_latency: false,
    };

    let default_resume = load_default_resume(&config.resume_data_path).unwrap();

    AppState {
        llm: LlmClient::new(llm).unwrap(),
        config: Arc::new(config),
        resumes: Arc::new(MemoryResumeStore::new()),
        current: CurrentResume::new(default_resume),
    }
}
