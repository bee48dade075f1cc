//! The five user operations: upload, ask, ask with web, summarise, quiz.
//!
//! [`Assistant`] owns one [`DocumentStore`] and the two remote collaborators
//! (LLM backend, search provider). Each operation runs end to end before
//! returning; the only awaits are the extraction task and outbound HTTP.
//!
//! Hard failures (`Err(PdfQaError)`) stop an operation before any remote call
//! or session change. Remote failures come back inside `Ok(Answer)`.

use crate::config::QaConfig;
use crate::document::{Document, DocumentStore};
use crate::error::PdfQaError;
use crate::pipeline::context::{build_context, Task};
use crate::pipeline::extract::{extract_text_with, PageTextSource, PdfiumTextSource};
use crate::pipeline::input;
use crate::pipeline::llm::{generate_answer, Answer, ChatCompletionsClient, CompletionBackend, ProviderBackend};
use crate::pipeline::search::{search_web, DuckDuckGoSearch, SearchProvider};
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Question answering over the currently uploaded PDF.
///
/// # Example
/// ```rust,no_run
/// use edgequake_pdfqa::{Assistant, QaConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let assistant = Assistant::new(QaConfig::default())?;
/// assistant.upload_input("report.pdf").await?;
/// let answer = assistant.ask("What is the main finding?").await?;
/// println!("{answer}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Assistant {
    config: QaConfig,
    store: DocumentStore,
    pages: Arc<dyn PageTextSource>,
    search: Arc<dyn SearchProvider>,
    backend: Arc<dyn CompletionBackend>,
}

impl Assistant {
    /// Build with pdfium extraction, DuckDuckGo search and the backend
    /// selected by [`resolve_backend`].
    pub fn new(config: QaConfig) -> Result<Self, PdfQaError> {
        let backend = resolve_backend(&config)?;
        let search = Arc::new(DuckDuckGoSearch::from_config(&config)?);
        Ok(Self::with_parts(
            config,
            Arc::new(PdfiumTextSource),
            search,
            backend,
        ))
    }

    /// Build from explicit collaborators.
    pub fn with_parts(
        config: QaConfig,
        pages: Arc<dyn PageTextSource>,
        search: Arc<dyn SearchProvider>,
        backend: Arc<dyn CompletionBackend>,
    ) -> Self {
        Self {
            config,
            store: DocumentStore::new(),
            pages,
            search,
            backend,
        }
    }

    pub fn config(&self) -> &QaConfig {
        &self.config
    }

    /// The session slot. Clones of this assistant share it.
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Extract `bytes` and make the result the current document.
    ///
    /// On failure the previous document stays in place.
    pub async fn upload(
        &self,
        filename: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Arc<Document>, PdfQaError> {
        let filename = filename.into();
        info!("Uploading '{}' ({} bytes)", filename, bytes.len());

        let extracted = extract_text_with(Arc::clone(&self.pages), bytes).await?;
        Ok(self.store.set_document(filename, extracted.text).await)
    }

    /// Read a local path or URL and upload it.
    pub async fn upload_input(&self, input_str: &str) -> Result<Arc<Document>, PdfQaError> {
        let loaded = input::load_input(input_str, self.config.download_timeout_secs).await?;
        self.upload(loaded.filename, loaded.bytes).await
    }

    /// Answer `question` from the document alone.
    pub async fn ask(&self, question: &str) -> Result<Answer, PdfQaError> {
        let doc = self.current_document().await?;
        let context = build_context(Task::Qa, &doc.text, None);
        Ok(generate_answer(self.backend.as_ref(), Task::Qa, &context, Some(question)).await)
    }

    /// Answer `question` from the document plus web-search snippets.
    ///
    /// The question doubles as the search query. A failed search still
    /// produces an answer; the error text becomes the web section.
    pub async fn ask_with_web(&self, question: &str) -> Result<Answer, PdfQaError> {
        let doc = self.current_document().await?;
        let web = search_web(self.search.as_ref(), question, self.config.search_max_results).await;
        let context = build_context(Task::QaWithWeb, &doc.text, Some(&web));
        Ok(generate_answer(self.backend.as_ref(), Task::QaWithWeb, &context, Some(question)).await)
    }

    /// Summarise the document.
    pub async fn summarize(&self) -> Result<Answer, PdfQaError> {
        self.run_document_task(Task::Summarize).await
    }

    /// Generate a five-question multiple-choice quiz.
    pub async fn generate_quiz(&self) -> Result<Answer, PdfQaError> {
        self.run_document_task(Task::Quiz).await
    }

    /// Dispatch any [`Task`]; `question` is ignored by tasks that take none.
    pub async fn run(&self, task: Task, question: Option<&str>) -> Result<Answer, PdfQaError> {
        let question = question.unwrap_or_default();
        match task {
            Task::Qa => self.ask(question).await,
            Task::QaWithWeb => self.ask_with_web(question).await,
            Task::Summarize | Task::Quiz => self.run_document_task(task).await,
        }
    }

    async fn run_document_task(&self, task: Task) -> Result<Answer, PdfQaError> {
        let doc = self.current_document().await?;
        let context = build_context(task, &doc.text, None);
        Ok(generate_answer(self.backend.as_ref(), task, &context, None).await)
    }

    /// The uploaded document, or [`PdfQaError::NoDocument`] if there is none
    /// or it holds no text.
    async fn current_document(&self) -> Result<Arc<Document>, PdfQaError> {
        match self.store.get_document().await {
            Some(doc) if !doc.is_empty() => Ok(doc),
            Some(doc) => {
                debug!("'{}' has no extractable text", doc.filename);
                Err(PdfQaError::NoDocument)
            }
            None => Err(PdfQaError::NoDocument),
        }
    }
}

/// Resolve the LLM backend, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`): used as-is through
///    [`ProviderBackend`].
/// 2. **Named provider** (`config.provider_name`): created with
///    [`ProviderFactory::create_llm_provider`], which reads that provider's
///    own API key variable (`OPENAI_API_KEY`, …).
/// 3. **Chat-completions endpoint**: [`ChatCompletionsClient`] against
///    `config.endpoint` with the configured or `OPENROUTER_API_KEY` credential.
pub fn resolve_backend(config: &QaConfig) -> Result<Arc<dyn CompletionBackend>, PdfQaError> {
    let timeout = Duration::from_secs(config.api_timeout_secs);

    if let Some(ref provider) = config.provider {
        return Ok(Arc::new(ProviderBackend::new(Arc::clone(provider), timeout)));
    }

    if let Some(ref name) = config.provider_name {
        let provider = create_provider(name, &config.model)?;
        return Ok(Arc::new(ProviderBackend::new(provider, timeout)));
    }

    Ok(Arc::new(ChatCompletionsClient::from_config(config)?))
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, PdfQaError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        PdfQaError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::search::{SearchError, SearchSnippet};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct Pages(Result<Vec<Option<String>>, String>);

    impl PageTextSource for Pages {
        fn page_texts(&self, _bytes: &[u8]) -> Result<Vec<Option<String>>, PdfQaError> {
            self.0
                .clone()
                .map_err(|detail| PdfQaError::DocumentParse { detail })
        }
    }

    #[derive(Default)]
    struct CountingSearch {
        calls: AtomicUsize,
        hits: Vec<SearchSnippet>,
    }

    #[async_trait]
    impl SearchProvider for CountingSearch {
        async fn text(&self, _q: &str, max: usize) -> Result<Vec<SearchSnippet>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.hits.iter().take(max).cloned().collect())
        }
    }

    #[derive(Default)]
    struct EchoBackend {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CompletionBackend for EchoBackend {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, prompt: &str) -> Answer {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Answer::Text {
                content: "## Answer".into(),
            }
        }
    }

    struct Harness {
        assistant: Assistant,
        search: Arc<CountingSearch>,
        backend: Arc<EchoBackend>,
    }

    fn harness(pages: Result<Vec<Option<String>>, String>, hits: Vec<SearchSnippet>) -> Harness {
        let search = Arc::new(CountingSearch {
            hits,
            ..Default::default()
        });
        let backend = Arc::new(EchoBackend::default());
        let assistant = Assistant::with_parts(
            QaConfig::default(),
            Arc::new(Pages(pages)),
            search.clone(),
            backend.clone(),
        );
        Harness {
            assistant,
            search,
            backend,
        }
    }

    fn ok_pages() -> Result<Vec<Option<String>>, String> {
        Ok(vec![Some("Hello".into()), None])
    }

    #[tokio::test]
    async fn upload_stores_joined_text() {
        let h = harness(ok_pages(), vec![]);
        let doc = h.assistant.upload("two-pages.pdf", vec![]).await.unwrap();
        assert_eq!(doc.text, "Hello\n");
        assert_eq!(h.assistant.store().get_document().await.unwrap().filename, "two-pages.pdf");
    }

    #[tokio::test]
    async fn failed_upload_keeps_previous_document() {
        let good = harness(ok_pages(), vec![]);
        good.assistant.upload("first.pdf", vec![]).await.unwrap();

        let bad = Assistant {
            pages: Arc::new(Pages(Err("broken xref".into()))),
            ..good.assistant.clone()
        };
        let err = bad.upload("second.pdf", vec![]).await.unwrap_err();
        assert!(matches!(err, PdfQaError::DocumentParse { .. }));

        let doc = good.assistant.store().get_document().await.unwrap();
        assert_eq!(doc.filename, "first.pdf");
    }

    #[tokio::test]
    async fn every_task_needs_a_document() {
        let h = harness(ok_pages(), vec![]);
        for task in [Task::Qa, Task::QaWithWeb, Task::Summarize, Task::Quiz] {
            let err = h.assistant.run(task, Some("q")).await.unwrap_err();
            assert!(matches!(err, PdfQaError::NoDocument), "{task:?}");
        }
        assert!(h.backend.prompts.lock().unwrap().is_empty());
        assert_eq!(h.search.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn textless_document_counts_as_missing() {
        let h = harness(Ok(vec![None, None]), vec![]);
        h.assistant.upload("scan.pdf", vec![]).await.unwrap();
        let err = h.assistant.summarize().await.unwrap_err();
        assert!(matches!(err, PdfQaError::NoDocument));
        assert!(h.backend.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn summary_sends_six_thousand_chars() {
        let h = harness(Ok(vec![Some("s".repeat(9000))]), vec![]);
        h.assistant.upload("big.pdf", vec![]).await.unwrap();
        h.assistant.summarize().await.unwrap();

        let prompts = h.backend.prompts.lock().unwrap();
        assert!(prompts[0].contains(&"s".repeat(6000)));
        assert!(!prompts[0].contains(&"s".repeat(6001)));
        assert!(prompts[0].contains("## Summary heading"));
    }

    #[tokio::test]
    async fn ask_with_web_searches_once_and_merges() {
        let hits = vec![SearchSnippet {
            title: "Rust".into(),
            body: "A systems language".into(),
            href: "https://rust-lang.org".into(),
        }];
        let h = harness(ok_pages(), hits);
        h.assistant.upload("doc.pdf", vec![]).await.unwrap();
        let answer = h.assistant.ask_with_web("What is Rust?").await.unwrap();
        assert!(answer.is_ok());

        assert_eq!(h.search.calls.load(Ordering::SeqCst), 1);
        let prompts = h.backend.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Document Content:\nHello\n"));
        assert!(prompts[0].contains("Web Search Results:\n\n\nRust\nA systems language"));
        assert!(prompts[0].contains("Question: What is Rust?"));
    }

    #[test]
    fn prebuilt_provider_takes_precedence() {
        let config = QaConfig::builder()
            .provider(Arc::new(edgequake_llm::MockProvider::new()))
            .provider_name("openai")
            .api_key("k")
            .build()
            .unwrap();
        assert_eq!(resolve_backend(&config).unwrap().name(), "edgequake-llm");
    }

    #[tokio::test]
    async fn named_provider_is_built_by_the_factory() {
        let config = QaConfig::builder().provider_name("mock").build().unwrap();
        let backend = resolve_backend(&config).unwrap();
        assert_eq!(backend.name(), "edgequake-llm");
        assert!(backend.complete("hello").await.is_ok());
    }

    #[test]
    fn unknown_provider_name_is_not_configured() {
        let config = QaConfig::builder().provider_name("no-such-llm").build().unwrap();
        let err = resolve_backend(&config).err().unwrap();
        assert!(matches!(err, PdfQaError::ProviderNotConfigured { ref provider, .. } if provider == "no-such-llm"));
    }

    #[test]
    fn resolve_backend_falls_back_to_chat_completions() {
        let config = QaConfig::builder().api_key("k").build().unwrap();
        let backend = resolve_backend(&config).unwrap();
        assert_eq!(backend.name(), "chat-completions");
    }
}
