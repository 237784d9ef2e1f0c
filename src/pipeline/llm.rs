//! Model interaction: one vision request per submission.
//!
//! Every workflow sends the same three-part request: a system text (possibly
//! empty), the first page of the CV as an inline image, and the task prompt
//! built by [`crate::prompts`]. The reply text is returned as-is; cleanup and
//! score extraction happen in later stages.
//!
//! There is no retry. A transport, quota or authentication failure is
//! reported once and the user resubmits. The optional fixed delay from
//! [`ScorerConfig::request_delay_ms`] is the only pacing applied.

use crate::config::ScorerConfig;
use crate::error::AtsError;
use crate::pipeline::encode::DocumentEnvelope;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

/// The seam between the workflows and the hosted model.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send `system_text`, the page image and `prompt`; return the reply text.
    async fn invoke(
        &self,
        system_text: &str,
        document: &DocumentEnvelope,
        prompt: &str,
    ) -> Result<String, AtsError>;
}

/// [`ModelClient`] backed by an `edgequake-llm` provider.
pub struct LlmModelClient {
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
    max_tokens: usize,
    request_delay: Duration,
}

impl LlmModelClient {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &ScorerConfig) -> Self {
        Self {
            provider,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            request_delay: Duration::from_millis(config.request_delay_ms),
        }
    }

    /// Resolve the provider named in `config` and wrap it.
    pub fn from_config(config: &ScorerConfig) -> Result<Self, AtsError> {
        let provider = resolve_provider(config)?;
        Ok(Self::new(provider, config))
    }

    fn options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        }
    }
}

impl std::fmt::Debug for LlmModelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmModelClient")
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_delay", &self.request_delay)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ModelClient for LlmModelClient {
    async fn invoke(
        &self,
        system_text: &str,
        document: &DocumentEnvelope,
        prompt: &str,
    ) -> Result<String, AtsError> {
        if !self.request_delay.is_zero() {
            debug!("Pausing {:?} before model call", self.request_delay);
            sleep(self.request_delay).await;
        }

        let messages = build_messages(system_text, document, prompt);
        let options = self.options();
        let start = Instant::now();

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| {
                warn!("Model call failed: {}", e);
                AtsError::ModelInvocation {
                    message: e.to_string(),
                }
            })?;

        info!(
            "Model replied: {} input tokens, {} output tokens, {:?}",
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        if response.content.trim().is_empty() {
            return Err(AtsError::ModelInvocation {
                message: "le modèle a renvoyé une réponse vide".into(),
            });
        }

        Ok(response.content)
    }
}

/// Assemble the request: system text, then the prompt with the page attached.
///
/// An empty system text is omitted; the résumé workflows carry all their
/// instructions in the prompt.
fn build_messages(system_text: &str, document: &DocumentEnvelope, prompt: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);
    if !system_text.trim().is_empty() {
        messages.push(ChatMessage::system(system_text));
    }
    messages.push(ChatMessage::user_with_images(
        prompt,
        vec![document.to_image_data()],
    ));
    messages
}

/// Resolve the LLM provider from the configuration.
///
/// 1. A pre-built provider in `config.provider` is used as-is.
/// 2. The provider name `"auto"` scans the environment via
///    [`ProviderFactory::from_env`].
/// 3. Otherwise the named provider (default `gemini`) is created with the
///    effective model; it reads its own API key from the environment.
pub fn resolve_provider(config: &ScorerConfig) -> Result<Arc<dyn LLMProvider>, AtsError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    let name = config.effective_provider();
    if name == "auto" {
        let (llm, _embedding) =
            ProviderFactory::from_env().map_err(|e| AtsError::ProviderNotConfigured {
                provider: "auto".to_string(),
                hint: format!(
                    "No LLM provider could be auto-detected from environment.\n\
                    Set GEMINI_API_KEY, OPENAI_API_KEY or ANTHROPIC_API_KEY.\n\
                    Error: {e}"
                ),
            })?;
        return Ok(llm);
    }

    let model = config.effective_model();
    debug!("Creating provider {} with model {}", name, model);
    ProviderFactory::create_llm_provider(name, model).map_err(|e| {
        AtsError::ProviderNotConfigured {
            provider: name.to_string(),
            hint: e.to_string(),
        }
    })
}
