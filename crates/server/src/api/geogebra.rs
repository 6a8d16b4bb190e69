//! Direct construction endpoints, bypassing the model.

use super::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use engine::{BridgeEngine, Engine, snapshot};
use runtime::ExecutionResult;
use runtime::GeoGebraHost;
use runtime::tools::catalog::{CLEAR_CONSTRUCTION, EVAL_COMMAND};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/geogebra/objects", get(objects))
        .route("/api/geogebra/clear", post(clear))
        .route("/api/geogebra/command", post(command))
        .route("/api/geogebra/export/png", get(export_png))
}

/// Run one catalog tool with the host matching the engine mode.
async fn run_tool(state: &AppState, tool: &str, input: Value) -> Result<ExecutionResult, ApiError> {
    let result = match &state.engines {
        None => GeoGebraHost::<BridgeEngine>::local().dispatch(tool, &input).await?,
        Some(pool) => {
            let engine = pool.acquire().await?;
            GeoGebraHost::managed(&*engine).dispatch(tool, &input).await?
        }
    };
    info!(tool, command = %result.command, success = result.success, "direct command");
    Ok(result)
}

async fn objects(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let objects = match &state.engines {
        None => Vec::new(),
        Some(pool) => {
            let engine = pool.acquire().await?;
            snapshot(&*engine).await?
        }
    };
    Ok(Json(json!({ "objects": objects })))
}

async fn clear(State(state): State<Arc<AppState>>) -> Result<Json<ExecutionResult>, ApiError> {
    run_tool(&state, CLEAR_CONSTRUCTION, json!({})).await.map(Json)
}

#[derive(Debug, Deserialize)]
struct CommandRequest {
    #[serde(default)]
    command: Option<String>,
}

async fn command(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CommandRequest>, JsonRejection>,
) -> Result<Json<ExecutionResult>, ApiError> {
    let Json(request) = payload?;
    let command = request
        .command
        .filter(|command| !command.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("command is required".into()))?;
    run_tool(&state, EVAL_COMMAND, json!({ "command": command }))
        .await
        .map(Json)
}

async fn export_png(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let Some(pool) = &state.engines else {
        return Err(ApiError::BadRequest(
            "PNG export needs a managed engine; in local mode export from the browser applet".into(),
        ));
    };
    let engine = pool.acquire().await?;
    let image = engine.export_png().await?;
    Ok(Json(json!({ "image": image })))
}
