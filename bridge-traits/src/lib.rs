//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host
//! environment.
//!
//! ## Overview
//!
//! This crate defines the contract between the LMS data core and the
//! transport it runs on. The core never talks to the network directly; it
//! goes through the [`HttpClient`](http::HttpClient) seam so that tests can
//! substitute a mock wire and hosts can supply their own client (connection
//! pooling, proxies, TLS policy).
//!
//! ## Fail-Fast Strategy
//!
//! The remote backend is an optional capability: a host that runs purely
//! offline simply provides no client, and the persistence layer degrades to
//! local-only operation. When a client *is* provided, transport errors
//! surface as [`BridgeError`](error::BridgeError) and are classified by the
//! layers above.

pub mod error;
pub mod http;

pub use error::{BridgeError, Result};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
