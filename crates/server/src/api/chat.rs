//! Chat endpoints: run the tool loop for one user turn.

use super::ApiError;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use engine::{BridgeEngine, ObjectInfo, snapshot};
use runtime::{
    Agent, EmptyToolHost, GeoGebraHost, LoopOutcome, Message, Provider, Role, ToolCallRecord,
    ToolError, ToolLoop, ToolResult,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use storage::{SessionConfig, SessionId};
use tracing::{info, warn};
use uuid::Uuid;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/chat/message", post(send_message))
        .route("/api/chat/session/{session_id}", delete(delete_session))
        .route("/api/chat/agents", get(list_agents))
}

/// A message as the browser sends it.
#[derive(Debug, Deserialize)]
struct IncomingMessage {
    role: Role,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    messages: Vec<IncomingMessage>,
    /// Omitted (or sent with a blank key) to reuse the session's stored settings.
    #[serde(default)]
    config: Option<SessionConfig>,
    session_id: SessionId,
    #[serde(default)]
    agent_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct OutgoingMessage {
    id: String,
    role: Role,
    content: String,
    timestamp: DateTime<Utc>,
}

/// One dispatched tool call as reported to the browser.
#[derive(Debug, Serialize)]
struct ToolCallView {
    id: String,
    #[serde(rename = "type")]
    kind: &'static str,
    tool: String,
    parameters: Value,
    result: Value,
}

impl From<ToolCallRecord> for ToolCallView {
    fn from(record: ToolCallRecord) -> Self {
        let result = match record.result {
            ToolResult::Success { output, .. } => output,
            ToolResult::Failure {
                error: ToolError::Rejected { command, reason },
                ..
            } => json!({ "success": false, "command": command, "error": reason }),
            ToolResult::Failure { error, .. } => {
                json!({ "success": false, "error": error.to_string() })
            }
        };
        Self {
            id: record.call.id,
            kind: "geogebra",
            tool: record.call.name,
            parameters: record.call.input,
            result,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatResponse {
    message: OutgoingMessage,
    tool_calls: Vec<ToolCallView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    objects: Option<Vec<ObjectInfo>>,
    agent_id: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<String>,
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;
    let agent = state.agents.resolve(request.agent_id.as_deref())?;

    let history: Vec<Message> = request
        .messages
        .into_iter()
        .filter(|msg| matches!(msg.role, Role::User | Role::Assistant))
        .map(|msg| Message::text(msg.role, msg.content))
        .collect();
    if !matches!(history.last(), Some(last) if last.role == Role::User) {
        return Err(ApiError::BadRequest("messages must end with a user turn".into()));
    }

    let (config, fresh) = match request.config.filter(|c| !c.api_key.trim().is_empty()) {
        Some(config) => (config, true),
        None => {
            let stored = state.sessions.get(&request.session_id).await.ok_or_else(|| {
                ApiError::BadRequest("no provider settings for this session".into())
            })?;
            (stored, false)
        }
    };
    let backend = Provider::from_config(&config, state.http.clone())?;
    if fresh {
        state.sessions.put(request.session_id.clone(), config).await;
    }
    info!(
        session = %request.session_id,
        agent = agent.id,
        backend = %backend,
        turns = history.len(),
        "chat request"
    );

    let (outcome, objects) = run_agent(&state, agent, &backend, history).await?;

    let total = outcome.tool_calls.len();
    let failed = outcome.failed_calls();
    let notice = (failed > 0).then(|| format!("{failed} of {total} visualizations failed"));
    info!(
        session = %request.session_id,
        termination = ?outcome.termination,
        model_calls = outcome.model_calls,
        tool_calls = total,
        failed,
        "chat finished"
    );

    Ok(Json(ChatResponse {
        message: OutgoingMessage {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: outcome.reply,
            timestamp: Utc::now(),
        },
        tool_calls: outcome.tool_calls.into_iter().map(ToolCallView::from).collect(),
        objects,
        agent_id: agent.id,
        notice,
    }))
}

/// Run the loop with the host the agent and engine mode call for.
async fn run_agent(
    state: &AppState,
    agent: &Agent,
    backend: &Provider,
    history: Vec<Message>,
) -> Result<(LoopOutcome, Option<Vec<ObjectInfo>>), ApiError> {
    let config = &state.loop_config;

    if !agent.uses_tools {
        let outcome = ToolLoop::new(backend, &EmptyToolHost, config)
            .run(agent.system_prompt, history)
            .await?;
        return Ok((outcome, None));
    }

    let Some(pool) = &state.engines else {
        let host = GeoGebraHost::<BridgeEngine>::local();
        let outcome = ToolLoop::new(backend, &host, config)
            .run(agent.system_prompt, history)
            .await?;
        return Ok((outcome, None));
    };

    let engine = pool.acquire().await?;
    let host = GeoGebraHost::managed(&*engine);
    let outcome = ToolLoop::new(backend, &host, config)
        .run(agent.system_prompt, history)
        .await?;
    let objects = match snapshot(&*engine).await {
        Ok(objects) => Some(objects),
        Err(err) => {
            warn!(error = %err, "could not snapshot construction");
            None
        }
    };
    Ok((outcome, objects))
}

async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Json<Value> {
    let removed = state.sessions.delete(&SessionId::new(session_id.clone())).await;
    info!(session = %session_id, removed, "session deleted");
    Json(json!({ "success": true }))
}

async fn list_agents(State(state): State<Arc<AppState>>) -> Json<Value> {
    let agents: Vec<&Agent> = state.agents.list().collect();
    Json(json!({ "agents": agents }))
}
