use async_trait::async_trait;
use linkcheck_core::{AppConfig, ClassificationResult, LlmProvider};

use crate::anthropic::AnthropicBackend;
use crate::error::LlmError;
use crate::openai::OpenAiBackend;
use crate::prompt::{build_prompt, parse_response, SYSTEM_PROMPT};

/// Produces a classification from a page's visible text.
#[async_trait]
pub trait PageClassifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` means the classifier has no opinion.
    async fn classify_page(&self, page_text: &str)
        -> Result<Option<ClassificationResult>, LlmError>;
}

/// A text-completion API.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    fn provider(&self) -> &'static str;

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError>;
}

/// Classifier that always abstains. Used when no provider is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopClassifier;

#[async_trait]
impl PageClassifier for NoopClassifier {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn classify_page(
        &self,
        _page_text: &str,
    ) -> Result<Option<ClassificationResult>, LlmError> {
        Ok(None)
    }
}

/// Classifier that prompts a [`CompletionBackend`] and parses its JSON reply.
pub struct LlmClassifier<B> {
    backend: B,
}

impl<B: CompletionBackend> LlmClassifier<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl<B: CompletionBackend> PageClassifier for LlmClassifier<B> {
    fn name(&self) -> &'static str {
        self.backend.provider()
    }

    async fn classify_page(
        &self,
        page_text: &str,
    ) -> Result<Option<ClassificationResult>, LlmError> {
        if page_text.trim().is_empty() {
            return Ok(None);
        }
        let reply = self
            .backend
            .complete(SYSTEM_PROMPT, &build_prompt(page_text))
            .await?;
        let parsed = parse_response(&reply);
        if parsed.is_none() {
            tracing::warn!(
                provider = self.backend.provider(),
                "could not parse a classification from the LLM reply"
            );
        }
        Ok(parsed)
    }
}

/// Explicit provider selection and credentials for the fallback classifier.
#[derive(Clone)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl LlmSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            provider: config.llm_provider,
            api_key: config.llm_api_key.clone(),
            model: config.llm_model.clone(),
            base_url: config.llm_base_url.clone(),
            timeout_secs: config.navigation_timeout_secs,
        }
    }
}

/// Build the classifier named by `settings.provider`.
///
/// # Errors
///
/// - [`LlmError::MissingApiKey`] when a real provider is selected without a key.
/// - [`LlmError::Http`] when the HTTP client cannot be constructed.
pub fn build_classifier(settings: &LlmSettings) -> Result<Box<dyn PageClassifier>, LlmError> {
    let key = |provider: &'static str| {
        settings
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(LlmError::MissingApiKey { provider })
    };

    let classifier: Box<dyn PageClassifier> = match settings.provider {
        LlmProvider::None => Box::new(NoopClassifier),
        LlmProvider::Anthropic => Box::new(LlmClassifier::new(AnthropicBackend::new(
            &key("anthropic")?,
            settings.model.as_deref(),
            settings.base_url.as_deref(),
            settings.timeout_secs,
        )?)),
        LlmProvider::OpenAi => Box::new(LlmClassifier::new(OpenAiBackend::new(
            &key("openai")?,
            settings.model.as_deref(),
            settings.base_url.as_deref(),
            settings.timeout_secs,
        )?)),
    };
    tracing::debug!(classifier = classifier.name(), "fallback classifier ready");
    Ok(classifier)
}
