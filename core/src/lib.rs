//! Blocking client core for the Dify HTTP/JSON API.
//!
//! # Overview
//! A [`Client`] is resolved once from a [`ClientConfig`] and then dispatches
//! prepared [`HttpRequest`]s over a pluggable [`Transport`]. Responses are
//! normalized: successful bodies decode into the caller's type, failures
//! become an [`ApiError`] whose `Response` variant carries either the API's
//! structured `{code, message}` or, when the body is not structured, the
//! status line alone.
//!
//! # Design
//! - Construction never fails; bad hosts or secrets surface on first use.
//! - `Client` is immutable and `Send + Sync`; concurrency is up to the caller.
//! - No retries, caching, or token refresh. Timeouts belong to the transport.
//! - Endpoint accessors ([`Api`]) borrow the client and delegate to it.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use api::Api;
pub use client::{decode_response, discard_response, Client};
pub use config::ClientConfig;
pub use error::{ApiError, ResponseError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, ResponseBody};
pub use transport::{HttpClient, Transport, UreqTransport};
pub use types::ErrorBody;
