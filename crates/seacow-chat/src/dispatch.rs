//! Provider dispatch with single-step model fallback.

use std::sync::Arc;

use reqwest::Client;
use seacow_core::{Error, Result};
use tracing::{info, warn};

use crate::config::LLMConfig;
use crate::providers::{ClaudeProvider, CompletionProvider, OpenAIProvider};
use crate::types::{ChatMessage, LLMProvider};

/// A reply together with the model that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub model: String,
    pub fell_back: bool,
}

/// Routes a conversation to the provider that serves the requested model.
pub struct ProviderDispatcher {
    config: Arc<LLMConfig>,
    openai: Arc<dyn CompletionProvider>,
    anthropic: Arc<dyn CompletionProvider>,
}

impl ProviderDispatcher {
    /// Build both providers on a shared long-timeout client.
    pub fn new(config: Arc<LLMConfig>, client: Client) -> Self {
        let openai = Arc::new(OpenAIProvider::new(client.clone(), &config));
        let anthropic = Arc::new(ClaudeProvider::new(client, &config));
        Self::with_providers(config, openai, anthropic)
    }

    /// Inject providers explicitly (tests, alternate transports).
    pub fn with_providers(
        config: Arc<LLMConfig>,
        openai: Arc<dyn CompletionProvider>,
        anthropic: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            config,
            openai,
            anthropic,
        }
    }

    pub fn config(&self) -> &LLMConfig {
        &self.config
    }

    fn provider_for(&self, model: &str) -> &Arc<dyn CompletionProvider> {
        match LLMConfig::provider_for(model) {
            LLMProvider::OpenAI => &self.openai,
            LLMProvider::Anthropic => &self.anthropic,
        }
    }

    /// Fail with a `Config` error when the provider for the first model in
    /// the chain has no API key. Makes no network call.
    pub fn ensure_configured(&self, model_override: Option<&str>) -> Result<()> {
        let chain = self.config.model_chain(model_override);
        let Some(model) = chain.first() else {
            return Err(Error::Internal("no model configured".into()));
        };
        let provider = LLMConfig::provider_for(model);
        if self.config.is_configured(provider) {
            Ok(())
        } else {
            Err(Error::Config(format!("{} not set", provider.api_key_var())))
        }
    }

    /// Try each model in the chain until one answers.
    ///
    /// A configuration error on the first step is returned immediately.
    /// If every step fails, the first failure is returned.
    pub async fn dispatch(
        &self,
        messages: &[ChatMessage],
        model_override: Option<&str>,
    ) -> Result<Completion> {
        let chain = self.config.model_chain(model_override);
        let mut first_err: Option<Error> = None;

        for (step, model) in chain.iter().enumerate() {
            let provider = self.provider_for(model);
            info!("Dispatching to {} model {}", provider.provider(), model);

            match provider.complete(messages, model).await {
                Ok(text) => {
                    return Ok(Completion {
                        text,
                        model: model.clone(),
                        fell_back: step > 0,
                    });
                }
                Err(e @ Error::Config(_)) if first_err.is_none() => return Err(e),
                Err(e) => {
                    warn!("Model {} failed: {}", model, e);
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
            }
        }

        Err(first_err.unwrap_or_else(|| Error::Internal("no model configured".into())))
    }
}
