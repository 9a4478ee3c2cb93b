//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! This crate provides a production-ready `HttpClient` implementation using
//! `reqwest`, with connection pooling and TLS enabled by default.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::ReqwestHttpClient;
//! use std::sync::Arc;
//!
//! let http_client = Arc::new(ReqwestHttpClient::new());
//! // Hand to the storage client as Arc<dyn HttpClient>.
//! ```

mod http;

pub use http::ReqwestHttpClient;
