//! arXiv API client.
//!
//! A search goes through four stages, each in its own module:
//!
//! 1. [`RequestParams`] folds the first clause and every [`SearchOperator`]
//!    into a keyed parameter set.
//! 2. The parameters are form-encoded onto the endpoint URL.
//! 3. A [`Transport`] performs the GET under a caller-supplied [`Context`].
//! 4. [`decode_feed`] turns the body into a [`Feed`].
//!
//! ```rust,no_run
//! use garx::client::{Client, Context};
//! use garx::models::{with_and, with_max_results, with_sort_by, FieldPrefix, SortBy};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new()?;
//! let feed = client
//!     .search(
//!         &Context::background(),
//!         FieldPrefix::Author,
//!         "Feynman",
//!         [
//!             with_and(FieldPrefix::Title, "QED"),
//!             with_max_results(5),
//!             with_sort_by(SortBy::SubmittedDate),
//!         ],
//!     )
//!     .await?;
//! println!("{} of {} results", feed.entries.len(), feed.total_results);
//! # Ok(())
//! # }
//! ```

mod context;
mod decode;
mod query;

pub use context::{CancelHandle, Context};
pub use decode::{decode_feed, decode_feed_str, DecodeError, ARXIV_NS, ATOM_NS, OPENSEARCH_NS};
pub use query::{Clause, QueryExpression, RequestParams};

use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

use crate::config::Config;
use crate::models::{FieldPrefix, Feed, SearchOperator};
use crate::utils::HttpClient;

/// Query endpoint of the public arXiv API
pub const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";

/// Errors that can occur during a search
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Invalid endpoint or HTTP client settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request did not produce a body
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The body was not a well-formed arXiv feed
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::Config(format!("invalid endpoint URL: {}", err))
    }
}

/// Errors raised while fetching a response body
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request canceled")]
    Canceled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Network(err.to_string())
    }
}

/// Performs the HTTP GET for a search.
///
/// Implementations return the full response body regardless of status code.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError>;
}

/// arXiv search client.
///
/// Cheap to clone; clones share the underlying transport and its connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    endpoint: Url,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Client for the public endpoint over a default [`HttpClient`]
    pub fn new() -> Result<Self, ClientError> {
        Self::with_endpoint(ARXIV_API_URL)
    }

    pub fn with_endpoint(endpoint: &str) -> Result<Self, ClientError> {
        let transport = HttpClient::new()?;
        Self::with_transport(endpoint, Arc::new(transport))
    }

    /// Create with a custom transport (for testing or proxying)
    pub fn with_transport(
        endpoint: &str,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            endpoint: Url::parse(endpoint)?,
            transport,
        })
    }

    /// Build from loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let transport = HttpClient::from_config(&config.http)?;
        Self::with_transport(&config.endpoint, Arc::new(transport))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Request URL for a search, without sending it
    pub fn search_url<I>(&self, prefix: FieldPrefix, term: &str, ops: I) -> Url
    where
        I: IntoIterator<Item = SearchOperator>,
    {
        let mut params = RequestParams::new();
        params.search(prefix, term, ops);
        params.to_url(&self.endpoint)
    }

    /// Run one search: one request, one decode pass.
    ///
    /// Fails with [`ClientError::Transport`] when `ctx` ends first and with
    /// [`ClientError::Decode`] when the body is not a well-formed feed.
    pub async fn search<I>(
        &self,
        ctx: &Context,
        prefix: FieldPrefix,
        term: &str,
        ops: I,
    ) -> Result<Feed, ClientError>
    where
        I: IntoIterator<Item = SearchOperator>,
    {
        let url = self.search_url(prefix, term, ops);
        tracing::debug!(%url, "Querying arXiv");

        let body = ctx.run(self.transport.get(&url)).await?;
        let feed = decode_feed(body.as_slice())?;

        tracing::debug!(
            entries = feed.entries.len(),
            total_results = feed.total_results,
            start_index = feed.start_index,
            "Decoded arXiv feed"
        );
        Ok(feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{with_and, with_max_results, with_sort_order, SortOrder};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    const BODY: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom" xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">
  <title>ArXiv Query</title>
  <opensearch:totalResults>1</opensearch:totalResults>
  <entry><id>http://arxiv.org/abs/0001.0001v1</id><title>One</title></entry>
</feed>"#;

    /// Records requested URLs and answers with a fixed body
    #[derive(Debug, Default)]
    struct StaticTransport {
        body: String,
        urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Transport for StaticTransport {
        async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError> {
            self.urls.lock().unwrap().push(url.to_string());
            Ok(self.body.clone().into_bytes())
        }
    }

    /// Hangs on the first request, answers the ones after it
    #[derive(Debug, Default)]
    struct StallOnceTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transport for StallOnceTransport {
        async fn get(&self, _url: &Url) -> Result<Vec<u8>, TransportError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                std::future::pending::<()>().await;
            }
            Ok(BODY.as_bytes().to_vec())
        }
    }

    #[derive(Debug)]
    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn get(&self, _url: &Url) -> Result<Vec<u8>, TransportError> {
            Err(TransportError::Network("connection refused".to_string()))
        }
    }

    fn client_with(transport: Arc<dyn Transport>) -> Client {
        Client::with_transport(ARXIV_API_URL, transport).unwrap()
    }

    #[tokio::test]
    async fn test_search_sends_query_and_decodes() {
        let transport = Arc::new(StaticTransport {
            body: BODY.to_string(),
            ..Default::default()
        });
        let client = client_with(transport.clone());

        let feed = client
            .search(
                &Context::background(),
                FieldPrefix::Author,
                "Feynman",
                [
                    with_and(FieldPrefix::Title, "QED"),
                    with_max_results(5),
                    with_sort_order(SortOrder::Descending),
                ],
            )
            .await
            .unwrap();

        assert_eq!(feed.title, "ArXiv Query");
        assert_eq!(feed.total_results, 1);
        assert_eq!(feed.entries[0].title, "One");

        let urls = transport.urls.lock().unwrap();
        assert_eq!(
            urls.as_slice(),
            ["http://export.arxiv.org/api/query?max_results=5&search_query=au%3AFeynman+AND+ti%3AQED&sortOrder=descending"]
        );
    }

    #[tokio::test]
    async fn test_non_feed_body_is_decode_error() {
        let client = client_with(Arc::new(StaticTransport {
            body: "<html><body>Bad Gateway</body></html>".to_string(),
            ..Default::default()
        }));

        let err = client
            .search(&Context::background(), FieldPrefix::Title, "x", [])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn test_network_failure_is_transport_error() {
        let client = client_with(Arc::new(FailingTransport));
        let err = client
            .search(&Context::background(), FieldPrefix::Title, "x", [])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Transport(TransportError::Network(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_then_search_again() {
        let client = client_with(Arc::new(StallOnceTransport::default()));

        let (ctx, handle) = Context::with_cancel();
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.cancel();
        });

        let err = client
            .search(&ctx, FieldPrefix::Author, "Feynman", [])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport(TransportError::Canceled)));
        canceller.await.unwrap();

        // The abandoned request left nothing behind; the same client still works
        let feed = client
            .search(&Context::background(), FieldPrefix::Author, "Feynman", [])
            .await
            .unwrap();
        assert_eq!(feed.entries.len(), 1);
    }

    #[tokio::test]
    async fn test_canceled_context_never_reaches_transport() {
        let transport = Arc::new(StaticTransport {
            body: BODY.to_string(),
            ..Default::default()
        });
        let client = client_with(transport.clone());

        let (ctx, handle) = Context::with_cancel();
        handle.cancel();

        let err = client
            .search(&ctx, FieldPrefix::Title, "x", [])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport(TransportError::Canceled)));
        assert!(transport.urls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deadline_is_transport_error() {
        let client = client_with(Arc::new(StallOnceTransport::default()));
        let ctx = Context::background().with_timeout(Duration::from_millis(20));

        let err = client
            .search(&ctx, FieldPrefix::Title, "x", [])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Transport(TransportError::DeadlineExceeded)
        ));
    }

    #[test]
    fn test_invalid_endpoint_is_config_error() {
        let err = Client::with_transport("not a url", Arc::new(FailingTransport)).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
