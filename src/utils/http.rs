//! HTTP client utilities.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::client::{ClientError, Transport, TransportError};
use crate::config::HttpConfig;

/// Default user agent, `garx/<version>`
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client with sensible defaults.
///
/// No overall request timeout is set unless configured; callers bound a
/// search through its [`Context`](crate::client::Context).
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, ClientError> {
        Self::from_config(&HttpConfig::default())
    }

    pub fn from_config(config: &HttpConfig) -> Result<Self, ClientError> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90));

        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/atom+xml")
            .send()
            .await?;

        // Status is not checked: whatever body arrives goes to the decoder
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%status, "arXiv API returned non-success status");
        }

        let body = response.bytes().await?;
        tracing::debug!(%status, bytes = body.len(), "Received arXiv response");
        Ok(body.to_vec())
    }
}
