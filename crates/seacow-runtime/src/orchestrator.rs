//! Orchestrator: runs one chat request through the augmentation pipeline.

use std::sync::Arc;

use reqwest::Client;
use seacow_augment::{
    augment, latest_user_message, preprocess, Augmentation, SearchConfig, SourceRegistry,
    StatisticsConfig, StatisticsLookup, WebSearcher,
};
use seacow_chat::{ChatMessage, ChatReply, ChatRequest, LLMConfig, ProviderDispatcher};
use seacow_core::{Error, Result, SeacowConfig};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::types::{RuntimeStatus, StatisticsStatus};

/// Owns every collaborator a chat request needs. Shared read-only across requests.
pub struct Orchestrator {
    sources: SourceRegistry,
    statistics: StatisticsLookup,
    search: WebSearcher,
    dispatcher: ProviderDispatcher,
}

impl Orchestrator {
    /// Build all collaborators from configuration.
    ///
    /// Search and statistics share a short-timeout client; providers get a
    /// long-timeout one.
    pub fn from_config(
        config: &SeacowConfig,
        llm: LLMConfig,
        statistics: StatisticsConfig,
        search: SearchConfig,
    ) -> Result<Self> {
        let aux_client = Client::builder()
            .timeout(config.aux_timeout)
            .build()
            .map_err(|e| Error::Http(format!("Failed to build auxiliary client: {}", e)))?;
        let llm_client = Client::builder()
            .timeout(config.llm_timeout)
            .build()
            .map_err(|e| Error::Http(format!("Failed to build LLM client: {}", e)))?;

        info!(
            "Orchestrator initialized: default_model={}, fallback={:?}, web_search={}",
            llm.default_model,
            llm.fallback_model,
            search.is_configured()
        );

        Ok(Self::with_parts(
            SourceRegistry::builtin(),
            StatisticsLookup::new(aux_client.clone(), statistics),
            WebSearcher::new(aux_client, search),
            ProviderDispatcher::new(Arc::new(llm), llm_client),
        ))
    }

    /// Assemble from explicit parts (for testing).
    pub fn with_parts(
        sources: SourceRegistry,
        statistics: StatisticsLookup,
        search: WebSearcher,
        dispatcher: ProviderDispatcher,
    ) -> Self {
        Self {
            sources,
            statistics,
            search,
            dispatcher,
        }
    }

    /// Readiness of providers and auxiliary APIs. Never exposes keys.
    pub fn status(&self) -> RuntimeStatus {
        RuntimeStatus {
            chat: self.dispatcher.config().to_status(),
            web_search: self.search.config().is_configured(),
            statistics: StatisticsStatus {
                census: true,
                bls: true,
                bea: self.statistics.config().bea_api_key.is_some(),
            },
        }
    }

    /// Handle one chat request.
    #[tracing::instrument(name = "chat", skip(self, request), fields(request_id = %Uuid::new_v4()))]
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatReply> {
        let ChatRequest {
            mut messages,
            model,
            source,
            web,
        } = request;

        if messages.is_empty() {
            return Err(Error::Validation("messages[] required".into()));
        }

        let model = model.as_deref().map(str::trim).filter(|m| !m.is_empty());
        let source = source.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let web = web.unwrap_or(false);

        // Credentials are checked before any statistics or search call.
        if let Err(e) = self.dispatcher.ensure_configured(model) {
            error!("Chat rejected (model={:?}): {}", model, e);
            return Err(e);
        }

        info!(
            "Chat request: {} message(s), model={:?}, source={:?}, web={}",
            messages.len(),
            model,
            source,
            web
        );

        let used_web = if web {
            self.augment(&mut messages, source).await
        } else {
            false
        };

        let completion = match self.dispatcher.dispatch(&messages, model).await {
            Ok(completion) => completion,
            Err(e) => {
                error!("Chat failed (model={:?}): {}", model, e);
                return Err(e);
            }
        };

        info!(
            "Reply from {} ({} chars, fell_back={}, web={})",
            completion.model,
            completion.text.len(),
            completion.fell_back,
            used_web
        );
        Ok(ChatReply {
            text: completion.text,
            used_web,
        })
    }

    /// Statistics first, then web search, then just the Insights reminder.
    async fn augment(&self, messages: &mut Vec<ChatMessage>, source: Option<&str>) -> bool {
        let Some(raw) = latest_user_message(messages) else {
            debug!("No user message; skipping augmentation");
            return false;
        };
        let query = preprocess(raw, source, &self.sources);
        debug!("Prepared query: base={:?}, filtered={:?}", query.base, query.filtered);

        let augmentation = if query.base.is_empty() {
            Augmentation::Reminder
        } else if let Some(hit) = self.statistics.lookup(&query.base, source).await {
            Augmentation::Statistics(hit)
        } else {
            let results = self.search.search(&query, source).await;
            if results.is_empty() {
                info!("No statistics or search results for {:?}", query.base);
                Augmentation::Reminder
            } else {
                info!("Using {} search result(s)", results.len());
                Augmentation::Search(results)
            }
        };

        augment(messages, &augmentation)
    }
}
