//! Chat routes: `/api/chat` and `/api/chat/status`.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use seacow_chat::{ChatMessage, ChatReply, ChatRequest};
use seacow_runtime::RuntimeStatus;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat/status", get(get_status))
        .route("/chat", post(chat))
}

/// Query parameters; each one overrides the same field in the body.
#[derive(Debug, Default, Deserialize)]
pub struct ChatQuery {
    pub model: Option<String>,
    pub source: Option<String>,
    /// `1` enables augmentation, anything else disables it.
    pub web: Option<String>,
}

fn parse_flag(value: &str) -> bool {
    let value = value.trim();
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Parse the body leniently: a missing or unreadable body is an empty request,
/// which then fails validation for having no messages.
///
/// Fields are read one by one, so a badly typed option is dropped on its own
/// instead of taking the messages with it.
fn parse_body(body: &[u8]) -> ChatRequest {
    if body.iter().all(u8::is_ascii_whitespace) {
        return ChatRequest::default();
    }
    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(e) => {
            debug!("Unreadable chat body: {}", e);
            return ChatRequest::default();
        }
    };
    if let Ok(request) = serde_json::from_value::<ChatRequest>(value.clone()) {
        return request;
    }

    let messages: Vec<ChatMessage> = value
        .get("messages")
        .cloned()
        .map(serde_json::from_value)
        .transpose()
        .unwrap_or_else(|e| {
            debug!("Unreadable chat messages: {}", e);
            None
        })
        .unwrap_or_default();
    ChatRequest {
        messages,
        model: text_field(&value, "model", "modelOverride"),
        source: text_field(&value, "source", "dataSource"),
        web: flag_field(&value, "web", "enableWeb"),
    }
}

fn field<'a>(value: &'a Value, name: &str, alias: &str) -> Option<&'a Value> {
    value.get(name).or_else(|| value.get(alias))
}

fn text_field(value: &Value, name: &str, alias: &str) -> Option<String> {
    field(value, name, alias)?.as_str().map(str::to_string)
}

/// Accepts `true`/`false`, `1`/`0` and their string forms.
fn flag_field(value: &Value, name: &str, alias: &str) -> Option<bool> {
    match field(value, name, alias)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n == 1),
        Value::String(s) => Some(parse_flag(s)),
        _ => None,
    }
}

fn merge_query(mut request: ChatRequest, query: ChatQuery) -> ChatRequest {
    if query.model.is_some() {
        request.model = query.model;
    }
    if query.source.is_some() {
        request.source = query.source;
    }
    if let Some(web) = query.web {
        request.web = Some(parse_flag(&web));
    }
    request
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChatQuery>,
    body: Bytes,
) -> Result<Json<ChatReply>, ApiError> {
    let request = merge_query(parse_body(&body), query);
    let reply = state.orchestrator.chat(request).await?;
    Ok(Json(reply))
}

async fn get_status(State(state): State<Arc<AppState>>) -> Json<RuntimeStatus> {
    Json(state.orchestrator.status())
}
