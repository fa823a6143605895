//! Shared HTTP transport for OpenAI-compatible providers.
//!
//! `HttpProvider` wraps a `reqwest::Client` with pre-configured headers and
//! endpoint URL, and maps every way a call can go wrong onto
//! [`ModelError`] so the agent can decide whether to retry.

use anyhow::Result;
use dcore::{ModelError, Response};
use reqwest::{
    Client, Method,
    header::{self, HeaderMap, HeaderName, HeaderValue},
};
use serde::{Deserialize, Serialize};

/// Longest slice of an unparseable body kept in error messages.
const BODY_PREVIEW: usize = 200;

/// Shared HTTP transport for OpenAI-compatible providers.
///
/// Holds a `reqwest::Client`, pre-built headers (auth + content-type),
/// and the target endpoint URL.
#[derive(Clone)]
pub struct HttpProvider {
    client: Client,
    headers: HeaderMap,
    endpoint: String,
}

impl HttpProvider {
    /// Create a provider with Bearer token authentication.
    pub fn bearer(client: Client, key: &str, endpoint: &str) -> Result<Self> {
        let mut headers = json_headers();
        headers.insert(header::AUTHORIZATION, format!("Bearer {key}").parse()?);
        Ok(Self {
            client,
            headers,
            endpoint: endpoint.to_owned(),
        })
    }

    /// Create a provider without authentication (e.g. a local proxy).
    pub fn no_auth(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            headers: json_headers(),
            endpoint: endpoint.to_owned(),
        }
    }

    /// Add an extra header sent with every request.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        self.headers
            .insert(name.parse::<HeaderName>()?, value.parse::<HeaderValue>()?);
        Ok(self)
    }

    /// Send a non-streaming request and parse the completion.
    pub async fn send(&self, body: &impl Serialize) -> Result<Response, ModelError> {
        if let Ok(json) = serde_json::to_string(body) {
            tracing::trace!("request: {json}");
        }
        let response = self
            .client
            .request(Method::POST, &self.endpoint)
            .headers(self.headers.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;
        tracing::trace!("response ({status}): {text}");
        parse_response(status, &text)
    }

    /// Get the endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Get a reference to the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

/// In-band error body, returned by some providers even with a 200 status.
#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    message: String,
}

/// Classify an HTTP status and body into a completion or a [`ModelError`].
pub fn parse_response(status: u16, body: &str) -> Result<Response, ModelError> {
    if let Ok(ErrorBody { error }) = serde_json::from_str::<ErrorBody>(body) {
        let code = error
            .code
            .as_ref()
            .and_then(|c| c.as_u64())
            .and_then(|c| u16::try_from(c).ok())
            .unwrap_or(status);
        // An error body without an error status is the provider misbehaving.
        if (200..300).contains(&code) {
            return Err(ModelError::Malformed(format!(
                "error body on status {code}: {}",
                error.message
            )));
        }
        return Err(ModelError::Provider {
            status: code,
            message: error.message,
        });
    }

    if !(200..300).contains(&status) {
        return Err(ModelError::Provider {
            status,
            message: preview(body),
        });
    }

    let response: Response = serde_json::from_str(body)
        .map_err(|e| ModelError::Malformed(format!("{e}: {}", preview(body))))?;
    if response.choices.is_empty() {
        return Err(ModelError::Incomplete("response has no choices".into()));
    }
    Ok(response)
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW).collect()
}
