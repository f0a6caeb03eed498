#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! HTTP GET client for graph database management endpoints
//!
//! A small hyper-based client tuned for fetching JSON documents from a
//! database server's management API:
//! - TLS via rustls (HTTPS only unless insecure HTTP is explicitly allowed)
//! - Connection pooling
//! - Per-request timeout
//! - User-Agent header injection
//! - Transparent response decompression (gzip, brotli, deflate)
//! - Body size limits applied to decompressed bytes
//!
//! Requests are sent once; redirects are returned as-is.
//!
//! # Example
//!
//! ```ignore
//! use gdm_http::HttpClient;
//! use std::time::Duration;
//!
//! let client = HttpClient::builder()
//!     .timeout(Duration::from_secs(10))
//!     .user_agent("gdm/1.0")
//!     .build()?;
//!
//! let doc: serde_json::Value = client
//!     .get("https://db.example.com/db/manage/")
//!     .send()
//!     .await?
//!     .json()
//!     .await?;
//! ```

mod builder;
mod client;
mod config;
mod error;
mod layers;
mod request;
mod response;
pub mod security;
mod tls;

pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{DEFAULT_USER_AGENT, HttpClientConfig, TlsRootConfig, TransportSecurity};
pub use error::{HttpError, InvalidUriKind};
pub use layers::{UserAgentLayer, UserAgentService};
pub use request::RequestBuilder;
pub use response::{HttpResponse, ResponseBody};
