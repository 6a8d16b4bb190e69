//! HTTP API, split by area.

mod chat;
mod geogebra;
mod settings;
mod ws;

use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use runtime::{ModelError, ToolError};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{error, warn};

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(chat::router())
        .merge(settings::router())
        .merge(geogebra::router())
        .merge(ws::router())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

const PROVIDER_FAILURE: &str =
    "Something went wrong while contacting the AI provider. Please check your configuration.";

/// Error returned by a handler, rendered as `{error, detail?}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// The LLM provider failed; the detail is logged and echoed.
    Provider(ModelError),
    /// The engine bridge could not serve the request.
    Unavailable(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            Self::Provider(err) => {
                error!(error = %err, "provider call failed");
                (
                    StatusCode::BAD_GATEWAY,
                    json!({ "error": PROVIDER_FAILURE, "detail": err.to_string() }),
                )
            }
            Self::Unavailable(message) => {
                warn!(%message, "engine unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({ "error": "GeoGebra engine unavailable", "detail": message }),
                )
            }
            Self::Internal(message) => {
                error!(%message, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<runtime::Error> for ApiError {
    fn from(err: runtime::Error) -> Self {
        match err {
            runtime::Error::Model(err) => Self::Provider(err),
            runtime::Error::Engine(err) => err.into(),
            runtime::Error::UnknownAgent(_) | runtime::Error::Storage(_) => {
                Self::BadRequest(err.to_string())
            }
            runtime::Error::Config(message) => Self::Internal(message),
        }
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        Self::Provider(err)
    }
}

impl From<engine::Error> for ApiError {
    fn from(err: engine::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl From<ToolError> for ApiError {
    fn from(err: ToolError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<storage::Error> for ApiError {
    fn from(err: storage::Error) -> Self {
        Self::BadRequest(err.to_string())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::call;
    use super::*;
    use axum::http::Method;

    #[tokio::test]
    async fn health_reports_ok() {
        let app = build_router(Arc::new(AppState::local()));
        let (status, body) = call(app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].is_string());
    }

    #[test]
    fn unknown_agent_maps_to_bad_request() {
        let response =
            ApiError::from(runtime::Error::UnknownAgent("nope".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn provider_failure_maps_to_bad_gateway() {
        let response =
            ApiError::from(runtime::Error::Model(ModelError::Auth("401".into()))).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
