//! Pluggable network transport.
//!
//! # Design
//! `Transport` is the only seam that performs I/O. The client owns one as an
//! `Arc<dyn Transport>` and shares it across every call, so implementations
//! must be safe to use from several threads at once. `UreqTransport` is the
//! default; tests and callers with special needs supply their own.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse, ResponseBody};

/// Executes a single HTTP exchange.
///
/// Implementations must return non-2xx responses as `Ok` data; only failures
/// that prevent a response from existing are `Err`. A request's `timeout`,
/// when set, bounds the whole exchange.
pub trait Transport: Send + Sync + fmt::Debug {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a `ureq` agent.
///
/// Status codes are never turned into errors so the client can interpret
/// them itself.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    fn run<B: ureq::AsSendBody>(
        &self,
        request: ureq::http::Request<B>,
        timeout: Option<Duration>,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        match timeout {
            Some(timeout) => {
                let request = self
                    .agent
                    .configure_request(request)
                    .timeout_global(Some(timeout))
                    .build();
                self.agent.run(request)
            }
            None => self.agent.run(request),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = ureq::http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let invalid = |e: ureq::http::Error| TransportError::InvalidRequest(e.to_string());
        let response = match request.body {
            Some(body) => self.run(builder.body(body).map_err(invalid)?, request.timeout)?,
            None => self.run(builder.body(()).map_err(invalid)?, request.timeout)?,
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        // Streamed without ureq's in-memory size cap; dropping it closes the body.
        let body = ResponseBody::new(response.into_body().into_reader());

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// The client's handle on its transport plus the configured timeout.
///
/// Cloning is cheap; clones share the same transport.
#[derive(Debug, Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    timeout: Option<Duration>,
}

impl HttpClient {
    /// A zero timeout is treated as unset.
    pub fn new(transport: Arc<dyn Transport>, timeout: Option<Duration>) -> Self {
        Self {
            transport,
            timeout: timeout.filter(|t| !t.is_zero()),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Send `request`, applying the configured timeout unless the request
    /// already carries one.
    pub fn execute(&self, mut request: HttpRequest) -> Result<HttpResponse, TransportError> {
        if request.timeout.is_none() {
            request.timeout = self.timeout;
        }
        self.transport.send(request)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(Arc::new(UreqTransport::new()), None)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::http::HttpMethod;

    /// Records the timeout of every request it sees.
    #[derive(Debug, Default)]
    struct Recorder {
        seen: Mutex<Vec<Option<Duration>>>,
    }

    impl Transport for Recorder {
        fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request.timeout);
            Ok(HttpResponse::new(204, ""))
        }
    }

    fn request() -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, "http://localhost:3000/v1/ping")
    }

    #[test]
    fn configured_timeout_is_stamped_on_requests() {
        let recorder = Arc::new(Recorder::default());
        let client = HttpClient::new(recorder.clone(), Some(Duration::from_secs(5)));
        client.execute(request()).unwrap();
        assert_eq!(*recorder.seen.lock().unwrap(), vec![Some(Duration::from_secs(5))]);
    }

    #[test]
    fn request_timeout_wins_over_configured_timeout() {
        let recorder = Arc::new(Recorder::default());
        let client = HttpClient::new(recorder.clone(), Some(Duration::from_secs(5)));
        let mut req = request();
        req.timeout = Some(Duration::from_millis(250));
        client.execute(req).unwrap();
        assert_eq!(*recorder.seen.lock().unwrap(), vec![Some(Duration::from_millis(250))]);
    }

    #[test]
    fn zero_timeout_means_transport_default() {
        let recorder = Arc::new(Recorder::default());
        let client = HttpClient::new(recorder.clone(), Some(Duration::ZERO));
        assert_eq!(client.timeout(), None);
        client.execute(request()).unwrap();
        assert_eq!(*recorder.seen.lock().unwrap(), vec![None]);
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        let transport = UreqTransport::new();
        let mut req = HttpRequest::new(HttpMethod::Get, "http://127.0.0.1:1/unreachable");
        req.timeout = Some(Duration::from_secs(2));
        assert!(transport.send(req).is_err());
    }
}
