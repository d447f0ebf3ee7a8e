use async_stream::stream;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::llm_client::types::{ChatCompletionRequest, ChatOptions};
use crate::llm_client::{conversation, strip_json_fences, LlmClient};
use crate::optimize::prompts::{build_optimization_prompt, OPTIMIZE_SYSTEM};
use crate::resume::models::ResumeData;
use crate::resume::validation::validate_resume;

const OPTIMIZE_TEMPERATURE: f32 = 0.7;
const OPTIMIZE_MAX_TOKENS: u32 = 2000;
const STREAM_MAX_TOKENS: u32 = 4000;

pub const INVALID_FORMAT_MESSAGE: &str = "AI returned an invalid résumé format, please retry";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    #[serde(default)]
    pub current_resume: Option<Value>,
    #[serde(default)]
    pub suggestions: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
}

impl OptimizeRequest {
    pub fn suggestions(&self) -> Option<&str> {
        non_blank(self.suggestions.as_deref())
    }

    pub fn job_description(&self) -> Option<&str> {
        non_blank(self.job_description.as_deref())
    }

    /// Checks the inputs an optimization needs, returning the message to send
    /// back with a 400.
    pub fn check(&self) -> Result<&Value, &'static str> {
        let resume = self
            .current_resume
            .as_ref()
            .filter(|v| !v.is_null())
            .ok_or("Missing required field: currentResume")?;
        if self.suggestions().is_none() && self.job_description().is_none() {
            return Err("Provide optimization suggestions or a job description");
        }
        Ok(resume)
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResumeData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OptimizeResponse {
    pub fn ok(data: ResumeData) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Asks the model to rewrite the résumé and checks that the reply is a
/// complete résumé. Failures are reported in the response, never returned.
pub async fn optimize_resume(llm: &LlmClient, req: &OptimizeRequest) -> OptimizeResponse {
    let current = match req.check() {
        Ok(current) => current,
        Err(message) => return OptimizeResponse::failed(message),
    };

    let prompt = build_optimization_prompt(current, req.suggestions(), req.job_description());
    let options = ChatOptions {
        temperature: Some(OPTIMIZE_TEMPERATURE),
        max_tokens: Some(OPTIMIZE_MAX_TOKENS),
        ..Default::default()
    };

    let reply = match llm.ask(&prompt, Some(OPTIMIZE_SYSTEM), options).await {
        Ok(reply) => reply,
        Err(e) => {
            error!("Résumé optimization failed: {e}");
            return OptimizeResponse::failed(e.to_string());
        }
    };

    match parse_optimized(&reply) {
        Ok(data) => {
            info!("Résumé optimization succeeded");
            OptimizeResponse::ok(data)
        }
        Err(message) => OptimizeResponse::failed(message),
    }
}

fn parse_optimized(reply: &str) -> Result<ResumeData, String> {
    let value: Value = serde_json::from_str(strip_json_fences(reply)).map_err(|e| {
        warn!("Unparseable optimization reply ({e}): {reply}");
        INVALID_FORMAT_MESSAGE.to_string()
    })?;

    validate_resume(&value)
        .into_result()
        .map_err(|e| format!("Optimized résumé is incomplete: {e}"))
}

/// Streams the model's reply as it is generated. A failure at any point
/// yields one final `{"success":false,"error":...}` string and ends.
pub fn optimize_resume_stream(
    llm: LlmClient,
    req: OptimizeRequest,
) -> impl Stream<Item = String> + Send {
    stream! {
        let current = match req.check() {
            Ok(current) => current,
            Err(message) => {
                yield failure_json(message);
                return;
            }
        };

        let prompt = build_optimization_prompt(current, req.suggestions(), req.job_description());
        let request = ChatCompletionRequest {
            temperature: Some(OPTIMIZE_TEMPERATURE),
            max_tokens: Some(STREAM_MAX_TOKENS),
            ..ChatCompletionRequest::new(conversation(&prompt, Some(OPTIMIZE_SYSTEM)))
        };

        let mut chunks = match llm.complete_stream(&request).await {
            Ok(chunks) => chunks,
            Err(e) => {
                error!("Streaming optimization failed to start: {e}");
                yield failure_json(&e.to_string());
                return;
            }
        };

        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(chunk) => {
                    if let Some(content) = chunk.content().filter(|c| !c.is_empty()) {
                        yield content.to_string();
                    }
                }
                Err(e) => {
                    error!("Streaming optimization interrupted: {e}");
                    yield failure_json(&e.to_string());
                    return;
                }
            }
        }
    }
}

fn failure_json(message: &str) -> String {
    json!({ "success": false, "error": message }).to_string()
}
