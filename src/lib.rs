//! # garx
//!
//! Client for the arXiv query API: builds boolean `search_query` expressions,
//! sends them, and decodes the Atom response (with its OpenSearch and arXiv
//! extension namespaces) into plain Rust values.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Field prefixes, search operators and decoded feed types
//! - [`client`]: Query assembly, transport, cancellation and feed decoding
//! - [`utils`]: reqwest-backed HTTP transport
//! - [`config`]: Configuration management
//! - [`ui`]: Terminal rendering used by the `garx` binary

pub mod client;
pub mod config;
pub mod models;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use client::{Client, ClientError, Context};
pub use models::{Entry, Feed, FieldPrefix, SearchOperator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
