//! Request dispatch and response decoding.
//!
//! # Design
//! `Client` is immutable once built: a normalized host, the resolved secret,
//! and an `HttpClient` handle on the transport. It is `Send + Sync` and can be
//! shared across threads; every call is an independent, blocking exchange.
//!
//! Decoding follows the status code:
//! - outside 200..=299: the body is read and parsed as an [`ErrorBody`];
//!   when that fails the error degrades to the status line,
//! - 204: success with no payload, nothing is decoded,
//! - other 2xx: the body is decoded into the caller's type, if any.
//!
//! The response body is owned by the `HttpResponse` and released when it is
//! dropped at the end of decoding, whichever branch returns.

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::api::Api;
use crate::config::{redact, ClientConfig};
use crate::error::{ApiError, ResponseError, TransportError};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::HttpClient;
use crate::types::ErrorBody;

const NO_CONTENT: u16 = 204;

/// Blocking client for the API.
#[derive(Clone)]
pub struct Client {
    host: String,
    secret: String,
    http: HttpClient,
}

impl Client {
    /// Equivalent to [`Client::with_config`] with only `host` and the
    /// default secret set.
    pub fn new(host: impl Into<String>, secret: impl Into<String>) -> Self {
        Self::with_config(ClientConfig::new(host).with_secret(secret))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            host: config.normalized_host().to_string(),
            secret: config.resolved_secret().to_string(),
            http: config.http_client(),
        }
    }

    /// Base URL without its trailing slash.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.http.timeout()
    }

    /// Accessor for the API's endpoints. Borrows this client; nothing is
    /// copied or re-resolved.
    pub fn api(&self) -> Api<'_> {
        Api::new(self)
    }

    #[deprecated(note = "use `Client::api` instead")]
    pub fn get_api(&self) -> Api<'_> {
        self.api()
    }

    /// Send `request` over the transport without looking at the status.
    pub fn send_request(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!(method = %request.method, url = %request.url, "dispatching request");
        let response = self.http.execute(request)?;
        debug!(status = response.status, "received response");
        Ok(response)
    }

    /// Send `request` and decode a successful body into `T`.
    ///
    /// Returns `Ok(None)` for `204 No Content`.
    pub fn send_json_request<T: DeserializeOwned>(
        &self,
        request: HttpRequest,
    ) -> Result<Option<T>, ApiError> {
        let response = self.send_request(request)?;
        decode_response(response)
    }

    /// Send `request` when the caller has no use for a success body.
    pub fn send_and_discard(&self, request: HttpRequest) -> Result<(), ApiError> {
        let response = self.send_request(request)?;
        discard_response(response)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("host", &self.host)
            .field("secret", &redact(&self.secret))
            .field("http", &self.http)
            .finish()
    }
}

/// Decode a raw response into `T`, or into a normalized error.
pub fn decode_response<T: DeserializeOwned>(
    mut response: HttpResponse,
) -> Result<Option<T>, ApiError> {
    check_status(&mut response)?;
    if response.status == NO_CONTENT {
        return Ok(None);
    }
    // First JSON value only; anything after it is left unread.
    let mut de = serde_json::Deserializer::from_reader(&mut response.body);
    let value = T::deserialize(&mut de).map_err(ApiError::Deserialization)?;
    Ok(Some(value))
}

/// Check the status of a raw response and drop its body unread.
pub fn discard_response(mut response: HttpResponse) -> Result<(), ApiError> {
    check_status(&mut response)?;
    Ok(())
}

/// Map a non-2xx response to a `ResponseError`, reading its body.
fn check_status(response: &mut HttpResponse) -> Result<(), ResponseError> {
    if response.is_success() {
        return Ok(());
    }
    let status = response.status;

    let bytes = match response.body.read_to_vec() {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(status, error = %err, "failed to read error body");
            return Err(degraded(status));
        }
    };

    // A literal `null` is an error object with every field unset.
    match serde_json::from_slice::<Option<ErrorBody>>(&bytes) {
        Ok(body) => {
            let body = body.unwrap_or_default();
            Err(ResponseError::Structured {
                status,
                code: body.code,
                message: body.message,
                body_status: body.status,
            })
        }
        Err(err) => {
            warn!(status, error = %err, "error body is not structured");
            Err(degraded(status))
        }
    }
}

fn degraded(status: u16) -> ResponseError {
    ResponseError::Degraded {
        status,
        reason: reason_phrase(status),
    }
}

/// Standard reason phrase for `status`, or `""` when there is none.
pub fn reason_phrase(status: u16) -> &'static str {
    ureq::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or_default()
}
