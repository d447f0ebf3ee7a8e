use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::resume::current::CurrentResume;
use crate::resume::store::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    pub config: Arc<Config>,
    /// Pluggable résumé store. Default: `MemoryResumeStore`.
    pub resumes: Arc<dyn ResumeStore>,
    pub current: CurrentResume,
}
