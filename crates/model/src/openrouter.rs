//! OpenRouter provider.

use crate::{HttpProvider, Request};
use anyhow::{Context, Result};
use dcore::{Model, ModelError, Response};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// OpenRouter chat completions endpoint.
pub const OPENROUTER_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Provider connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (supports `${ENV_VAR}` expansion in config files).
    pub api_key: String,
    /// Endpoint override, e.g. a self-hosted OpenAI-compatible proxy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// The OpenRouter model gateway.
///
/// One instance serves every agent: the model identifier travels with each
/// request, not with the provider.
#[derive(Clone)]
pub struct OpenRouter {
    http: HttpProvider,
}

impl OpenRouter {
    /// Create a provider from config, reusing the given client.
    pub fn new(client: Client, config: &ProviderConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            anyhow::bail!("provider api_key is empty");
        }
        let endpoint = config.base_url.as_deref().unwrap_or(OPENROUTER_ENDPOINT);
        let http = HttpProvider::bearer(client, &config.api_key, endpoint)
            .context("invalid provider api_key")?;
        Ok(Self { http })
    }

    /// The underlying transport.
    pub fn http(&self) -> &HttpProvider {
        &self.http
    }
}

impl Model for OpenRouter {
    async fn send(&self, request: &dcore::Request) -> Result<Response, ModelError> {
        let body = Request::from(request.clone());
        self.http.send(&body).await
    }
}
