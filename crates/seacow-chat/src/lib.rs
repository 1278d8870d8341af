//! Chat relay to external LLM providers (OpenAI/Anthropic).
//!
//! Provides the wire types shared with the HTTP layer, provider selection
//! by model name, and a dispatcher that falls back to a secondary model.

pub mod config;
pub mod dispatch;
pub mod providers;
pub mod types;

pub use config::LLMConfig;
pub use dispatch::{Completion, ProviderDispatcher};
pub use providers::{ClaudeProvider, CompletionProvider, OpenAIProvider};
pub use types::*;
