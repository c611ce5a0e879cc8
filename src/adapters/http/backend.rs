//! Shared HTTP plumbing: base URL, bearer auth, status and body mapping.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::domain::errors::{BackendError, BackendResult};
use crate::domain::models::{Args, BackendConfig};
use crate::infrastructure::logging::SecretScrubber;

/// Connection to the backend shared by the tool and chat clients.
#[derive(Debug, Clone)]
pub struct BackendHttp {
    http: Client,
    base_url: String,
    api_token: Option<String>,
    scrubber: SecretScrubber,
}

impl BackendHttp {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(4)
            .build()
            .context("Failed to build HTTP client")?;
        let scrubber = SecretScrubber::new().context("Failed to compile secret patterns")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            api_token: config
                .api_token
                .clone()
                .filter(|token| !token.trim().is_empty()),
            scrubber,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send, then map transport failures and non-2xx statuses.
    pub async fn send(&self, builder: RequestBuilder) -> BackendResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(
            status = status.as_u16(),
            body = %self.scrubber.scrub(&body),
            "backend returned error status"
        );
        Err(BackendError::Status {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }

    /// Decode a success body. An empty body decodes as `{}`.
    pub async fn json<T: DeserializeOwned>(&self, response: Response) -> BackendResult<T> {
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        let body = if body.trim().is_empty() { "{}" } else { body.as_str() };
        serde_json::from_str(body).map_err(|e| BackendError::Decode(e.to_string()))
    }
}

/// Operator-facing text for an error response: the JSON `error` (or
/// `message`) field when present, otherwise the raw body.
pub fn error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        ["error", "message"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str).map(str::to_string))
    });
    match from_json {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => format!("HTTP {status}"),
    }
}

/// Directive arguments as query pairs. Nulls are skipped; strings are sent
/// unquoted; arrays and objects as compact JSON.
pub fn query_pairs(args: &Args) -> Vec<(String, String)> {
    args.iter()
        .filter_map(|(key, value)| {
            let rendered = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), rendered))
        })
        .collect()
}
