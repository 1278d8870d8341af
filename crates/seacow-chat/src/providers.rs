//! External LLM completion providers.
//!
//! Each provider turns a message list into a single reply string.
//! OpenAI takes the conversation as-is; Anthropic wants the system text
//! split out from the user/assistant turns.

use async_trait::async_trait;
use reqwest::{Client, Response};
use seacow_core::{Error, Result};
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::config::LLMConfig;
use crate::types::{ChatMessage, LLMProvider, Role};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// A chat-completion capability.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn provider(&self) -> LLMProvider;

    /// Send the conversation and return the trimmed reply text.
    async fn complete(&self, messages: &[ChatMessage], model: &str) -> Result<String>;
}

/// OpenAI Chat Completions.
pub struct OpenAIProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    temperature: f64,
}

impl OpenAIProvider {
    pub fn new(client: Client, config: &LLMConfig) -> Self {
        Self {
            client,
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            api_key: config.openai_api_key.clone(),
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAIProvider {
    fn provider(&self) -> LLMProvider {
        LLMProvider::OpenAI
    }

    async fn complete(&self, messages: &[ChatMessage], model: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config(format!("{} not set", LLMProvider::OpenAI.api_key_var())))?;

        let mut body = json!({
            "model": model,
            "messages": messages,
        });
        if LLMConfig::accepts_temperature(model) {
            body["temperature"] = json!(self.temperature);
        }

        let url = format!("{}/chat/completions", self.base_url);
        debug!("Requesting {} with model {} ({} messages)", url, model, messages.len());

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::provider("openai", format!("Request failed: {}", e)))?;

        let parsed = read_json(response, "openai").await?;
        let text = parsed["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .trim()
            .to_string();

        if text.is_empty() {
            return Err(Error::provider("openai", format!("Empty response from {}", model)));
        }
        Ok(text)
    }
}

/// Anthropic Messages API.
pub struct ClaudeProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    temperature: f64,
    max_tokens: usize,
}

impl ClaudeProvider {
    pub fn new(client: Client, config: &LLMConfig) -> Self {
        Self {
            client,
            base_url: config.anthropic_base_url.trim_end_matches('/').to_string(),
            api_key: config.anthropic_api_key.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Split a conversation into concatenated system text and the ordered
/// user/assistant turns.
pub fn split_system(messages: &[ChatMessage]) -> (Option<String>, Vec<Value>) {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();

    let turns = messages
        .iter()
        .filter(|m| matches!(m.role, Role::User | Role::Assistant))
        .map(|m| json!({"role": m.role, "content": m.content}))
        .collect();

    let system = if system.is_empty() {
        None
    } else {
        Some(system.join("\n\n"))
    };
    (system, turns)
}

#[async_trait]
impl CompletionProvider for ClaudeProvider {
    fn provider(&self) -> LLMProvider {
        LLMProvider::Anthropic
    }

    async fn complete(&self, messages: &[ChatMessage], model: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config(format!("{} not set", LLMProvider::Anthropic.api_key_var())))?;

        let (system, turns) = split_system(messages);

        let mut body = json!({
            "model": model,
            "messages": turns,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });
        if let Some(sys) = system {
            body["system"] = json!(sys);
        }

        let url = format!("{}/messages", self.base_url);
        debug!("Requesting Anthropic with model {}", model);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::provider("anthropic", format!("Request failed: {}", e)))?;

        let parsed = read_json(response, "anthropic").await?;

        // Concatenate every text-bearing content block.
        let text: String = parsed["content"]
            .as_array()
            .map(|blocks| {
                blocks
                    .iter()
                    .filter_map(|b| b["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();
        let text = text.trim().to_string();

        if text.is_empty() {
            return Err(Error::provider("anthropic", format!("Empty response from {}", model)));
        }
        Ok(text)
    }
}

/// Check the status and decode the body, keeping the provider's error message.
async fn read_json(response: Response, provider: &str) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or(body);
        error!("{} API error {}: {}", provider, status, message);
        return Err(Error::provider(provider, format!("API error {}: {}", status, message)));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| Error::provider(provider, format!("Malformed response: {}", e)))
}
