//! Chat types matching the `/api/chat` surface.

use serde::{Deserialize, Serialize};

/// Conversation role. Anything else is rejected at deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// LLM provider family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    OpenAI,
    Anthropic,
}

impl LLMProvider {
    /// Environment variable holding this provider's API key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            LLMProvider::OpenAI => "OPENAI_API_KEY",
            LLMProvider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
        }
    }
}

/// Chat message in conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Incoming chat request body.
///
/// `model`, `source` and `web` may also arrive as query parameters, which
/// take precedence over the body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default, alias = "modelOverride")]
    pub model: Option<String>,
    #[serde(default, alias = "dataSource")]
    pub source: Option<String>,
    #[serde(default, alias = "enableWeb")]
    pub web: Option<bool>,
}

/// Successful chat reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub text: String,
    /// Whether statistics or search results were merged into the prompt.
    #[serde(rename = "web")]
    pub used_web: bool,
}

/// Provider readiness and model info for `/api/chat/status`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatStatus {
    pub providers: ProviderStatus,
    #[serde(rename = "defaultModel")]
    pub default_model: String,
    #[serde(rename = "fallbackModel")]
    pub fallback_model: Option<String>,
    #[serde(rename = "availableModels")]
    pub available_models: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub openai: bool,
    pub anthropic: bool,
}
