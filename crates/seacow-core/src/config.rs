//! Process configuration loaded from the environment.

use std::time::Duration;

use serde::Serialize;

/// Top-level Seacow configuration.
#[derive(Debug, Clone, Serialize)]
pub struct SeacowConfig {
    /// HTTP server port.
    pub port: u16,
    /// Bind address.
    pub host: String,
    /// Timeout for search and statistics calls.
    pub aux_timeout: Duration,
    /// Timeout for LLM calls. Long enough for slow reasoning models.
    pub llm_timeout: Duration,
}

impl Default for SeacowConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "0.0.0.0".into(),
            aux_timeout: Duration::from_secs(10),
            llm_timeout: Duration::from_secs(300),
        }
    }
}

impl SeacowConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = env_nonempty("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);
        let host = env_nonempty("SEACOW_HOST").unwrap_or(defaults.host);
        let aux_timeout = env_secs("SEACOW_AUX_TIMEOUT_SECS").unwrap_or(defaults.aux_timeout);
        let llm_timeout = env_secs("SEACOW_LLM_TIMEOUT_SECS").unwrap_or(defaults.llm_timeout);

        Self {
            port,
            host,
            aux_timeout,
            llm_timeout,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_secs(name: &str) -> Option<Duration> {
    env_nonempty(name)
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|s| *s > 0)
        .map(Duration::from_secs)
}

/// Read an env var, treating empty or whitespace-only values as unset.
pub fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Render a credential for logs: first 7 characters, then `***`.
pub fn mask_secret(secret: &str) -> String {
    let prefix: String = secret.chars().take(7).collect();
    format!("{}***", prefix)
}
