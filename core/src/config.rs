//! Client configuration.
//!
//! # Design
//! `ClientConfig` enumerates every option the client understands. Nothing is
//! validated here: an empty host or secret is accepted and left for the
//! remote service to reject. Turning a config into a `Client` is a pure
//! function and cannot fail.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::transport::{HttpClient, Transport, UreqTransport};

/// Options used to build a [`Client`](crate::Client).
///
/// When both `default_secret` and `legacy_secret` are set, `default_secret`
/// wins. The two are never combined.
#[derive(Clone, Default)]
pub struct ClientConfig {
    /// Base URL of the API. A single trailing `/` is stripped.
    pub host: String,
    pub default_secret: String,
    /// Older name for the same credential, read only when `default_secret`
    /// is empty.
    #[deprecated(note = "use `default_secret` instead")]
    pub legacy_secret: String,
    /// `None` or zero keeps the transport's own default.
    pub timeout: Option<Duration>,
    /// Replaces the default `ureq` transport entirely.
    pub transport: Option<Arc<dyn Transport>>,
}

#[allow(deprecated)]
impl ClientConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.default_secret = secret.into();
        self
    }

    #[deprecated(note = "use `with_secret` instead")]
    pub fn with_legacy_secret(mut self, secret: impl Into<String>) -> Self {
        self.legacy_secret = secret.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// The credential the client will use.
    pub fn resolved_secret(&self) -> &str {
        if self.default_secret.is_empty() {
            &self.legacy_secret
        } else {
            &self.default_secret
        }
    }

    /// Host with exactly one trailing `/` removed.
    pub fn normalized_host(&self) -> &str {
        self.host.strip_suffix('/').unwrap_or(&self.host)
    }

    /// Build the HTTP handle from the transport and timeout settings. The
    /// two are independent: a custom transport still gets the timeout.
    pub(crate) fn http_client(&self) -> HttpClient {
        let transport: Arc<dyn Transport> = match &self.transport {
            Some(transport) => Arc::clone(transport),
            None => Arc::new(UreqTransport::new()),
        };
        HttpClient::new(transport, self.timeout)
    }
}

#[allow(deprecated)]
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("default_secret", &redact(&self.default_secret))
            .field("legacy_secret", &redact(&self.legacy_secret))
            .field("timeout", &self.timeout)
            .field("transport", &self.transport)
            .finish()
    }
}

pub(crate) fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        "<redacted>"
    }
}
