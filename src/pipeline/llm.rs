//! Answer generation: one prompt in, one [`Answer`] out.
//!
//! Prompt wording lives in [`crate::prompts`]; this module only moves bytes.
//!
//! ## Failure model
//!
//! [`generate_answer`] is total. A non-200 response, a timeout, a refused
//! connection or an unparsable body all come back as an [`Answer`] variant,
//! never as `Err`. One request per call: no retries, no streaming.

use crate::config::QaConfig;
use crate::error::PdfQaError;
use crate::pipeline::context::Task;
use crate::prompts::build_prompt;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, LLMProvider};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Outcome of one LLM call.
///
/// `Display` renders every variant as user-facing text, so a caller that does
/// not care about the distinction can print any answer as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Answer {
    /// First completion's message content, verbatim.
    Text { content: String },
    /// The provider answered with a non-200 status.
    ProviderError { status: u16, body: String },
    /// The request never produced a usable response.
    TransportError { detail: String },
}

impl Answer {
    pub fn is_ok(&self) -> bool {
        matches!(self, Answer::Text { .. })
    }

    /// Consume the answer, returning its user-facing text.
    pub fn into_text(self) -> String {
        match self {
            Answer::Text { content } => content,
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Text { content } => f.write_str(content),
            Answer::ProviderError { status, body } => write!(f, "API Error: {} - {}", status, body),
            Answer::TransportError { detail } => write!(f, "Error calling API: {}", detail),
        }
    }
}

/// Something that turns a prompt into an [`Answer`].
///
/// Implementations must not fail outward: every error becomes a soft variant.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Answer;
}

/// Build the task prompt and submit it as a single request.
pub async fn generate_answer(
    backend: &dyn CompletionBackend,
    task: Task,
    context: &str,
    question: Option<&str>,
) -> Answer {
    let prompt = build_prompt(task, context, question);
    let start = Instant::now();
    let answer = backend.complete(&prompt).await;
    let elapsed = start.elapsed();

    match &answer {
        Answer::Text { content } => info!(
            "{:?} via {}: {} chars in {:?}",
            task,
            backend.name(),
            content.len(),
            elapsed
        ),
        soft => warn!("{:?} via {} failed after {:?}: {}", task, backend.name(), elapsed, soft),
    }
    answer
}

// ── Chat-completions over HTTP ───────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatRequestMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatRequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// OpenAI-compatible chat-completions client (OpenRouter by default).
///
/// Sends `{model, messages: [{role: "user", content}]}` with a bearer
/// credential. Only HTTP 200 counts as success.
#[derive(Clone)]
pub struct ChatCompletionsClient {
    endpoint: String,
    model: String,
    api_key: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl fmt::Debug for ChatCompletionsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatCompletionsClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ChatCompletionsClient {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PdfQaError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PdfQaError::Internal(format!("HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
            timeout,
            client,
        })
    }

    /// Build from config; the credential comes from the config or the environment.
    pub fn from_config(config: &QaConfig) -> Result<Self, PdfQaError> {
        let api_key = config
            .resolved_api_key()
            .ok_or_else(|| PdfQaError::ProviderNotConfigured {
                provider: "openrouter".to_string(),
                hint: format!(
                    "No API key for {}.\nSet {} or pass --api-key.",
                    config.endpoint,
                    crate::config::API_KEY_ENV
                ),
            })?;

        Self::new(
            config.endpoint.clone(),
            config.model.clone(),
            api_key,
            Duration::from_secs(config.api_timeout_secs),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionBackend for ChatCompletionsClient {
    fn name(&self) -> &str {
        "chat-completions"
    }

    async fn complete(&self, prompt: &str) -> Answer {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatRequestMessage {
                role: "user",
                content: prompt,
            }],
        };
        debug!("POST {} model={} prompt={} chars", self.endpoint, self.model, prompt.len());

        let response = match self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                return Answer::TransportError {
                    detail: format!("request timed out after {}s", self.timeout.as_secs()),
                }
            }
            Err(e) => {
                return Answer::TransportError {
                    detail: e.to_string(),
                }
            }
        };

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Answer::ProviderError {
                status: status.as_u16(),
                body,
            };
        }

        match response.json::<ChatResponse>().await {
            Ok(parsed) => match parsed.choices.into_iter().next() {
                Some(choice) => Answer::Text {
                    content: choice.message.content,
                },
                None => Answer::TransportError {
                    detail: "response contained no choices".to_string(),
                },
            },
            Err(e) => Answer::TransportError {
                detail: format!("malformed response body: {}", e),
            },
        }
    }
}

// ── edgequake-llm providers ──────────────────────────────────────────────

/// Adapter running prompts through any edgequake-llm provider.
///
/// Provider errors carry no HTTP status here, so all of them surface as
/// [`Answer::TransportError`].
pub struct ProviderBackend {
    provider: Arc<dyn LLMProvider>,
    timeout: Duration,
}

impl ProviderBackend {
    pub fn new(provider: Arc<dyn LLMProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }
}

#[async_trait]
impl CompletionBackend for ProviderBackend {
    fn name(&self) -> &str {
        "edgequake-llm"
    }

    async fn complete(&self, prompt: &str) -> Answer {
        let messages = vec![ChatMessage::user(prompt)];

        match tokio::time::timeout(self.timeout, self.provider.chat(&messages, None)).await {
            Ok(Ok(response)) => {
                debug!(
                    "{} input tokens, {} output tokens",
                    response.prompt_tokens, response.completion_tokens
                );
                Answer::Text {
                    content: response.content,
                }
            }
            Ok(Err(e)) => Answer::TransportError {
                detail: format!("{}", e),
            },
            Err(_) => Answer::TransportError {
                detail: format!("request timed out after {}s", self.timeout.as_secs()),
            },
        }
    }
}
