//! LLM Client: the single point of contact with the chat-completion endpoint.
//!
//! ARCHITECTURAL RULE: No other module may call the AI provider directly.
//! All completions go through `LlmClient`, which owns transport, retry and
//! stream decoding.
//!
//! The model is fixed per client: whatever model a caller puts on a request is
//! replaced by the configured one before it is sent.
use std::{fmt, pin::Pin, sync::Arc, time::Duration};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::{header, Client, RequestBuilder, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

pub mod retry;
pub mod sse;
pub mod types;

pub use retry::{Backoff, RetryPolicy};
pub use types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ChatOptions, StreamChunk,
};

use retry::TokioBackoff;
use sse::{SseDecoder, SseFrame};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Invalid AI configuration: {0}")]
    Config(String),

    #[error("Request timeout after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API request failed ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode completion response: {0}")]
    Decode(String),
}

impl LlmError {
    /// Transport failures and transient upstream statuses may succeed on a
    /// later attempt; everything else fails the same way every time.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Timeout(_) | LlmError::Network(_) => true,
            LlmError::Api { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            LlmError::Config(_) | LlmError::Decode(_) => false,
        }
    }
}

/// Connection settings for one chat-completion endpoint.
#[derive(Clone)]
pub struct LlmConfig {
    /// Full URL of the chat-completions route.
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl LlmConfig {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    fn validate(&self) -> Result<(), LlmError> {
        let missing: Vec<&str> = [
            ("endpoint", self.endpoint.trim().is_empty()),
            ("model", self.model.trim().is_empty()),
            ("api key", self.api_key.trim().is_empty()),
        ]
        .into_iter()
        .filter_map(|(name, empty)| empty.then_some(name))
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(LlmError::Config(format!("missing {}", missing.join(", "))))
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Lazily decoded completion stream. Dropping it closes the connection.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, LlmError>> + Send>>;

/// Chat-completion client with retry on transient failures and SSE decoding.
/// Cheap to clone; holds no per-call state.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    config: Arc<LlmConfig>,
    backoff: Arc<dyn Backoff>,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        config.validate()?;
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| LlmError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            config: Arc::new(config),
            backoff: Arc::new(TokioBackoff),
        })
    }


    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Sends a blocking completion. Retries retryable failures with
    /// exponential backoff and returns the last error once the budget is spent.
    pub async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LlmError> {
        let mut body = self.outgoing(request);
        body.stream = None;

        let policy = self.config.retry;
        let total = policy.total_attempts();
        let mut retry = 0u32;

        loop {
            match self.send_once(&body).await {
                Ok(response) => {
                    if let Some(usage) = response.usage {
                        debug!(
                            "Chat completion succeeded: prompt_tokens={}, completion_tokens={}",
                            usage.prompt_tokens, usage.completion_tokens
                        );
                    }
                    return Ok(response);
                }
                Err(e) => {
                    warn!(
                        "Chat completion failed (attempt {}/{}): {}",
                        retry + 1,
                        total,
                        e
                    );
                    if retry >= policy.max_retries || !e.is_retryable() {
                        return Err(e);
                    }
                    retry += 1;
                    let delay = policy.delay_for(retry);
                    warn!("Retry {} of {}, waiting {}ms", retry, policy.max_retries, delay.as_millis());
                    self.backoff.wait(delay).await;
                }
            }
        }
    }

    /// Opens a streaming completion. Single attempt: a failed handshake is
    /// returned immediately, and transport errors mid-stream end the stream.
    pub async fn complete_stream(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatStream, LlmError> {
        let mut body = self.outgoing(request);
        body.stream = Some(true);

        let timeout = self.config.timeout;
        let response = tokio::time::timeout(timeout, self.post(&body).send())
            .await
            .map_err(|_| LlmError::Timeout(timeout))?
            .map_err(|e| transport_error(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let err = api_error(status, &body);
            error!("Chat completion stream rejected: {err}");
            return Err(err);
        }

        Ok(Box::pin(decode_event_stream(response.bytes_stream())))
    }

    /// Completes a conversation and returns the first choice's content,
    /// or an empty string when the reply carries no choices.
    pub async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        options: ChatOptions,
    ) -> Result<String, LlmError> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            temperature: Some(options.temperature.unwrap_or(DEFAULT_TEMPERATURE)),
            max_tokens: Some(options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)),
            stream: None,
            stop: options.stop,
            frequency_penalty: options.frequency_penalty,
            presence_penalty: options.presence_penalty,
            user: options.user,
        };

        let response = self.complete(&request).await?;
        Ok(response.text().unwrap_or_default().to_string())
    }

    /// Single question, optionally preceded by a system prompt.
    pub async fn ask(
        &self,
        prompt: &str,
        system: Option<&str>,
        options: ChatOptions,
    ) -> Result<String, LlmError> {
        self.chat(conversation(prompt, system), options).await
    }

    fn outgoing(&self, request: &ChatCompletionRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            ..request.clone()
        }
    }

    fn post(&self, body: &ChatCompletionRequest) -> RequestBuilder {
        self.client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .header(header::CONTENT_TYPE, "application/json")
            .json(body)
    }

    /// One request/response exchange, bounded end to end by the timeout.
    async fn send_once(
        &self,
        body: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LlmError> {
        let timeout = self.config.timeout;
        let exchange = async {
            let response = self
                .post(body)
                .send()
                .await
                .map_err(|e| transport_error(e, timeout))?;
            let status = response.status();
            let bytes = response
                .bytes()
                .await
                .map_err(|e| transport_error(e, timeout))?;

            if !status.is_success() {
                return Err(api_error(status, &bytes));
            }

            serde_json::from_slice::<ChatCompletionResponse>(&bytes)
                .map_err(|e| LlmError::Decode(e.to_string()))
        };

        tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| LlmError::Timeout(timeout))?
    }
}

#[cfg(test)]
impl LlmClient {
    /// Replaces how retry delays are waited out.
    pub fn with_backoff(mut self, backoff: Arc<dyn Backoff>) -> Self {
        self.backoff = backoff;
        self
    }
}

/// Builds `[system?, user]`.
pub fn conversation(prompt: &str, system: Option<&str>) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system.filter(|s| !s.is_empty()) {
        messages.push(ChatMessage::system(system));
    }
    messages.push(ChatMessage::user(prompt));
    messages
}

/// Runs a raw SSE byte stream through `SseDecoder`, yielding chunks in
/// arrival order. Ends at `[DONE]`, at transport close, or at the first
/// transport error.
fn decode_event_stream<S>(body: S) -> impl Stream<Item = Result<StreamChunk, LlmError>> + Send
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
{
    async_stream::try_stream! {
        let mut body = Box::pin(body);
        let mut decoder = SseDecoder::new();

        while let Some(bytes) = body.next().await {
            let bytes = bytes?;
            for frame in decoder.push(&bytes) {
                if let SseFrame::Chunk(chunk) = frame {
                    yield chunk;
                }
            }
            if decoder.is_done() {
                break;
            }
        }

        for frame in decoder.finish() {
            if let SseFrame::Chunk(chunk) = frame {
                yield chunk;
            }
        }
    }
}

fn transport_error(e: reqwest::Error, timeout: Duration) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout(timeout)
    } else {
        LlmError::Network(e)
    }
}

/// Builds an `Api` error from a non-success reply. The body is parsed
/// best-effort; non-JSON bodies fall back to the status description.
fn api_error(status: StatusCode, body: &[u8]) -> LlmError {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .or_else(|| v.get("message").and_then(Value::as_str))
        })
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| status_description(status.as_u16()).to_string());

    LlmError::Api {
        status: status.as_u16(),
        message,
    }
}

pub fn status_description(status: u16) -> &'static str {
    match status {
        400 => "Bad request parameters",
        401 => "Invalid or expired API key",
        403 => "Access denied, check permissions",
        404 => "Requested resource not found",
        429 => "Rate limited, please retry later",
        500 => "Internal server error",
        502 => "Bad gateway",
        503 => "Service temporarily unavailable",
        504 => "Gateway timeout",
        _ => "Unknown error",
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
