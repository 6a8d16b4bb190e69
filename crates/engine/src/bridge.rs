//! HTTP bridge to a GeoGebra applet running in a headless browser.
//!
//! The bridge process owns the browser page and exposes the applet's
//! scripting API as JSON endpoints:
//!
//! | method | path                | body / response                  |
//! |--------|---------------------|----------------------------------|
//! | POST   | `/eval`             | `{command}` → [`CommandOutcome`] |
//! | GET    | `/objects`          | `{names: [..]}`                  |
//! | GET    | `/objects/{name}`   | [`ObjectInfo`], 404 when missing |
//! | POST   | `/reset`            | empty                            |
//! | GET    | `/export/png`       | `{image}` (base64)               |

use crate::{CommandOutcome, Engine, Error, ObjectInfo, Result};
use reqwest::{Response, StatusCode, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::debug;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct EvalRequest<'a> {
    command: &'a str,
}

#[derive(Debug, Deserialize)]
struct NamesResponse {
    names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    image: String,
}

/// Engine reached through the HTTP bridge.
#[derive(Debug, Clone)]
pub struct BridgeEngine {
    client: reqwest::Client,
    base_url: String,
}

impl BridgeEngine {
    /// Connect to a bridge with a dedicated client and the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Connect to a bridge reusing an existing client.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `{base}/objects/{name}` with `name` escaped as one path segment.
    fn object_url(&self, name: &str) -> Result<Url> {
        let invalid = |reason: String| Error::InvalidUrl {
            url: self.base_url.clone(),
            reason,
        };
        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("cannot be a base".to_string()))?
            .pop_if_empty()
            .push("objects")
            .push(name);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Bridge { status, body });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))
    }
}

impl Engine for BridgeEngine {
    async fn eval_command(&self, command: &str) -> Result<CommandOutcome> {
        debug!(bridge = %self.base_url, %command, "eval");
        let request = self
            .client
            .post(self.url("/eval"))
            .json(&EvalRequest { command });
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    async fn object_info(&self, name: &str) -> Result<Option<ObjectInfo>> {
        let response = self
            .client
            .get(self.object_url(name)?)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Bridge { status, body });
        }
        Self::decode(response).await.map(Some)
    }

    async fn object_names(&self) -> Result<Vec<String>> {
        let response = self.send(self.client.get(self.url("/objects"))).await?;
        let names: NamesResponse = Self::decode(response).await?;
        Ok(names.names)
    }

    async fn new_construction(&self) -> Result<()> {
        self.send(self.client.post(self.url("/reset"))).await?;
        Ok(())
    }

    async fn export_png(&self) -> Result<String> {
        let response = self.send(self.client.get(self.url("/export/png"))).await?;
        let image: ImageResponse = Self::decode(response).await?;
        Ok(image.image)
    }
}
