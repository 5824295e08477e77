//! Utility modules supporting the client.
//!
//! - [`HttpClient`]: reqwest-backed [`Transport`](crate::client::Transport)
//!
//! # HTTP Client
//!
//! ```rust,no_run
//! use garx::client::{Client, Context};
//! use garx::config::HttpConfig;
//! use garx::models::FieldPrefix;
//! use garx::utils::HttpClient;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let http = HttpClient::from_config(&HttpConfig {
//!     timeout_secs: Some(20),
//!     ..Default::default()
//! })?;
//! let client = Client::with_transport("http://export.arxiv.org/api/query", Arc::new(http))?;
//! let feed = client
//!     .search(&Context::background(), FieldPrefix::SubjectCategory, "hep-th", [])
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod http;

pub use http::{HttpClient, DEFAULT_USER_AGENT};
