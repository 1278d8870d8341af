//! LLM credentials, model registry and provider selection.

use seacow_core::{env_nonempty, mask_secret};
use serde::Serialize;
use tracing::{info, warn};

use crate::types::{ChatStatus, LLMProvider, ProviderStatus};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_FALLBACK_MODEL: &str = "gpt-4o";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: usize = 4096;

pub const OPENAI_MODELS: &[&str] = &[
    "gpt-4o-mini",
    "gpt-4o",
    "gpt-4.1",
    "gpt-4.1-mini",
    "gpt-5",
    "gpt-5-mini",
];
pub const ANTHROPIC_MODELS: &[&str] = &[
    "claude-sonnet-4-20250514",
    "claude-opus-4-20250514",
    "claude-3-7-sonnet-20250219",
    "claude-3-5-sonnet-20241022",
    "claude-3-5-haiku-20241022",
];

/// Model families that only accept the default temperature.
const FIXED_TEMPERATURE_PREFIXES: &[&str] = &["gpt-5", "o1", "o3", "o4"];

/// LLM configuration. Keys are never serialized.
#[derive(Debug, Clone, Serialize)]
pub struct LLMConfig {
    #[serde(skip)]
    pub openai_api_key: Option<String>,
    #[serde(skip)]
    pub anthropic_api_key: Option<String>,
    pub default_model: String,
    /// Retried once when the default model fails. `None` disables fallback.
    pub fallback_model: Option<String>,
    pub openai_base_url: String,
    pub anthropic_base_url: String,
    pub temperature: f64,
    pub max_tokens: usize,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            anthropic_api_key: None,
            default_model: DEFAULT_MODEL.into(),
            fallback_model: Some(DEFAULT_FALLBACK_MODEL.into()),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.into(),
            anthropic_base_url: DEFAULT_ANTHROPIC_BASE_URL.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl LLMConfig {
    /// Load config from env vars, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        // An explicitly empty SEACOW_FALLBACK_MODEL disables fallback.
        let fallback_model = match std::env::var("SEACOW_FALLBACK_MODEL") {
            Ok(v) if v.trim().is_empty() => None,
            Ok(v) => Some(v.trim().to_string()),
            Err(_) => defaults.fallback_model,
        };

        let config = Self {
            openai_api_key: env_nonempty("OPENAI_API_KEY"),
            anthropic_api_key: env_nonempty("ANTHROPIC_API_KEY"),
            default_model: env_nonempty("SEACOW_DEFAULT_MODEL").unwrap_or(defaults.default_model),
            fallback_model,
            openai_base_url: env_nonempty("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            anthropic_base_url: env_nonempty("ANTHROPIC_BASE_URL")
                .unwrap_or(defaults.anthropic_base_url),
            ..defaults
        };

        config.log_credentials();
        config
    }

    fn log_credentials(&self) {
        match &self.openai_api_key {
            Some(k) => info!("OPENAI_API_KEY detected: {}", mask_secret(k)),
            None => warn!("OPENAI_API_KEY not set"),
        }
        match &self.anthropic_api_key {
            Some(k) => info!("ANTHROPIC_API_KEY detected: {}", mask_secret(k)),
            None => info!("ANTHROPIC_API_KEY not set; Claude models unavailable"),
        }
    }

    /// Which provider family serves a model id.
    pub fn provider_for(model: &str) -> LLMProvider {
        if ANTHROPIC_MODELS.contains(&model) || model.starts_with("claude-") {
            LLMProvider::Anthropic
        } else {
            LLMProvider::OpenAI
        }
    }

    /// Whether the model accepts a caller-chosen temperature.
    pub fn accepts_temperature(model: &str) -> bool {
        !FIXED_TEMPERATURE_PREFIXES
            .iter()
            .any(|prefix| model.starts_with(prefix))
    }

    pub fn is_configured(&self, provider: LLMProvider) -> bool {
        match provider {
            LLMProvider::OpenAI => self.openai_api_key.is_some(),
            LLMProvider::Anthropic => self.anthropic_api_key.is_some(),
        }
    }

    /// Ordered models to try. Fallback only applies when the client did not
    /// pick a model.
    pub fn model_chain(&self, model_override: Option<&str>) -> Vec<String> {
        if let Some(model) = model_override.map(str::trim).filter(|m| !m.is_empty()) {
            return vec![model.to_string()];
        }

        let mut chain = vec![self.default_model.clone()];
        if let Some(fallback) = &self.fallback_model {
            if *fallback != self.default_model {
                chain.push(fallback.clone());
            }
        }
        chain
    }

    /// Models offered by configured providers.
    pub fn available_models(&self) -> Vec<String> {
        let mut models = Vec::new();
        if self.openai_api_key.is_some() {
            models.extend(OPENAI_MODELS.iter().map(|s| s.to_string()));
        }
        if self.anthropic_api_key.is_some() {
            models.extend(ANTHROPIC_MODELS.iter().map(|s| s.to_string()));
        }
        models
    }

    /// Build the public status (no API keys exposed).
    pub fn to_status(&self) -> ChatStatus {
        ChatStatus {
            providers: ProviderStatus {
                openai: self.openai_api_key.is_some(),
                anthropic: self.anthropic_api_key.is_some(),
            },
            default_model: self.default_model.clone(),
            fallback_model: self.fallback_model.clone(),
            available_models: self.available_models(),
        }
    }
}
