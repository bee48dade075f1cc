//! Configuration for the question-answering pipeline.
//!
//! Every knob lives in [`QaConfig`], built via [`QaConfigBuilder`]. Context
//! truncation thresholds are not configurable; they are constants in
//! [`crate::pipeline::context`].

use crate::error::PdfQaError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// OpenRouter chat-completions endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Model requested from the chat-completions endpoint by default.
pub const DEFAULT_MODEL: &str = "stepfun/step-3.5-flash:free";

/// DuckDuckGo's JavaScript-free results page.
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// Environment variable consulted for the bearer credential.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Configuration for an [`crate::assistant::Assistant`].
///
/// # Example
/// ```rust
/// use edgequake_pdfqa::QaConfig;
///
/// let config = QaConfig::builder()
///     .model("openai/gpt-4.1-nano")
///     .api_key("sk-or-...")
///     .search_max_results(5)
///     .build()
///     .unwrap();
/// assert_eq!(config.api_timeout_secs, 30);
/// ```
#[derive(Clone)]
pub struct QaConfig {
    /// Model identifier sent in every chat-completion request.
    pub model: String,

    /// Chat-completions URL (any OpenAI-compatible server).
    pub endpoint: String,

    /// Bearer credential. If None, [`API_KEY_ENV`] is read when the backend is built.
    pub api_key: Option<String>,

    /// edgequake-llm provider name (e.g. "openai", "anthropic", "ollama").
    /// When set, the request goes through that provider instead of `endpoint`.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Per-request LLM timeout in seconds. Default: 30.
    pub api_timeout_secs: u64,

    /// Number of web results folded into the web context. Default: 3.
    pub search_max_results: usize,

    /// Web search results page URL.
    pub search_endpoint: String,

    /// Web search request timeout in seconds. Default: 10.
    pub search_timeout_secs: u64,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            provider_name: None,
            provider: None,
            api_timeout_secs: 30,
            search_max_results: 3,
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            search_timeout_secs: 10,
            download_timeout_secs: 120,
        }
    }
}

impl fmt::Debug for QaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QaConfig")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("search_max_results", &self.search_max_results)
            .field("search_endpoint", &self.search_endpoint)
            .field("search_timeout_secs", &self.search_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .finish()
    }
}

impl QaConfig {
    /// Create a new builder for `QaConfig`.
    pub fn builder() -> QaConfigBuilder {
        QaConfigBuilder {
            config: Self::default(),
        }
    }

    /// The configured credential, falling back to [`API_KEY_ENV`].
    ///
    /// Empty strings count as absent.
    pub fn resolved_api_key(&self) -> Option<String> {
        pick_api_key(self.api_key.clone(), std::env::var(API_KEY_ENV).ok())
    }
}

fn pick_api_key(explicit: Option<String>, from_env: Option<String>) -> Option<String> {
    let usable = |k: &String| !k.trim().is_empty();
    explicit.filter(usable).or_else(|| from_env.filter(usable))
}

/// Builder for [`QaConfig`].
#[derive(Debug)]
pub struct QaConfigBuilder {
    config: QaConfig,
}

impl QaConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn search_max_results(mut self, n: usize) -> Self {
        self.config.search_max_results = n.max(1);
        self
    }

    pub fn search_endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.search_endpoint = url.into();
        self
    }

    pub fn search_timeout_secs(mut self, secs: u64) -> Self {
        self.config.search_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<QaConfig, PdfQaError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(PdfQaError::InvalidConfig("Model must not be empty".into()));
        }
        for (name, url) in [("endpoint", &c.endpoint), ("search endpoint", &c.search_endpoint)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(PdfQaError::InvalidConfig(format!(
                    "{name} must be an HTTP/HTTPS URL, got '{url}'"
                )));
            }
        }
        if c.api_timeout_secs == 0 || c.search_timeout_secs == 0 {
            return Err(PdfQaError::InvalidConfig(
                "Timeouts must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_contract() {
        let c = QaConfig::default();
        assert_eq!(c.model, DEFAULT_MODEL);
        assert_eq!(c.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(c.api_timeout_secs, 30);
        assert_eq!(c.search_max_results, 3);
    }

    #[test]
    fn builder_clamps_result_count() {
        let c = QaConfig::builder().search_max_results(0).build().unwrap();
        assert_eq!(c.search_max_results, 1);
    }

    #[test]
    fn builder_rejects_bad_endpoint() {
        let err = QaConfig::builder().endpoint("ftp://x").build().unwrap_err();
        assert!(matches!(err, PdfQaError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_zero_timeout() {
        assert!(QaConfig::builder().api_timeout_secs(0).build().is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = QaConfig::builder().api_key("sk-secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn explicit_key_wins_over_env() {
        let c = QaConfig::builder().api_key("explicit").build().unwrap();
        assert_eq!(c.resolved_api_key().as_deref(), Some("explicit"));
    }

    #[test]
    fn blank_explicit_key_falls_through_to_env() {
        let key = pick_api_key(Some("   ".into()), Some("sk-from-env".into()));
        assert_eq!(key.as_deref(), Some("sk-from-env"));
    }

    #[test]
    fn explicit_key_beats_env() {
        let key = pick_api_key(Some("sk-explicit".into()), Some("sk-from-env".into()));
        assert_eq!(key.as_deref(), Some("sk-explicit"));
    }

    #[test]
    fn blank_keys_everywhere_mean_none() {
        assert_eq!(pick_api_key(Some("".into()), Some(" \t".into())), None);
        assert_eq!(pick_api_key(None, None), None);
    }
}
