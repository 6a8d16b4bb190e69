//! Provider settings endpoints.

use crate::state::AppState;
use axum::extract::Path;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use storage::{Provider, SessionConfig};
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/config/validate", post(validate))
        .route("/api/config/models/{provider}", get(models))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateRequest {
    provider: Option<Provider>,
    api_key: Option<String>,
    #[serde(default)]
    model: String,
    #[serde(rename = "baseURL")]
    base_url: Option<String>,
}

fn invalid(status: StatusCode, error: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "valid": false, "error": error.into() })))
}

async fn validate(
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return invalid(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    let (Some(provider), Some(api_key)) = (request.provider, request.api_key) else {
        return invalid(StatusCode::BAD_REQUEST, "provider and apiKey are required");
    };

    let mut config = SessionConfig::new(provider, api_key, request.model);
    config.base_url = request.base_url;

    match config.validate() {
        Ok(()) => (StatusCode::OK, Json(json!({ "valid": true }))),
        Err(err) => {
            debug!(%provider, error = %err, "settings rejected");
            invalid(StatusCode::OK, err.to_string())
        }
    }
}

async fn models(Path(provider): Path<String>) -> Json<Value> {
    let models = serde_json::from_value::<Provider>(Value::String(provider))
        .map(Provider::known_models)
        .unwrap_or_default();
    Json(json!({ "models": models }))
}
