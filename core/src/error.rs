//! Error types for the API client.
//!
//! # Design
//! Failures are split by where they happen. `TransportError` covers
//! everything before a response exists. `ResponseError` is the normalized
//! shape of a non-2xx response: structured when the body carries the API's
//! error object, degraded to the status line when it does not. A 2xx body
//! that does not match the caller's type is a `Deserialization` error and is
//! never folded into `ResponseError`.

use thiserror::Error;

/// Failures raised by a [`Transport`](crate::transport::Transport) before
/// any response is received.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, reset, or host not resolvable
    #[error("connection error: {0}")]
    Connection(String),
    /// The request exceeded its timeout
    #[error("request timeout")]
    Timeout,
    /// The request could not be turned into a valid HTTP message
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// I/O failure while talking to the remote
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Anything else the transport reports
    #[error("{0}")]
    Other(String),
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        use std::io::ErrorKind;

        match err {
            ureq::Error::Timeout(_) => TransportError::Timeout,
            ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => {
                TransportError::Connection(err.to_string())
            }
            ureq::Error::BadUri(uri) => TransportError::InvalidRequest(uri),
            ureq::Error::Http(http_err) => TransportError::InvalidRequest(http_err.to_string()),
            ureq::Error::Io(io_err) => match io_err.kind() {
                ErrorKind::TimedOut => TransportError::Timeout,
                ErrorKind::ConnectionRefused
                | ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::NotConnected => TransportError::Connection(io_err.to_string()),
                _ => TransportError::Io(io_err),
            },
            other => TransportError::Other(other.to_string()),
        }
    }
}

/// Normalized error for a response whose status is outside 200..=299.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    /// The body decoded as the API's `{code, message, status}` object.
    #[error(
        "HTTP response error: [{}] {}",
        .code.as_deref().unwrap_or_default(),
        .message.as_deref().unwrap_or_default()
    )]
    Structured {
        status: u16,
        code: Option<String>,
        message: Option<String>,
        body_status: Option<i64>,
    },

    /// The body was not a structured error; only the status line is kept.
    #[error("HTTP response error: status {status} {reason}")]
    Degraded { status: u16, reason: &'static str },
}

impl ResponseError {
    /// HTTP status reported by the transport.
    pub fn status(&self) -> u16 {
        match self {
            ResponseError::Structured { status, .. } | ResponseError::Degraded { status, .. } => {
                *status
            }
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            ResponseError::Structured { code, .. } => code.as_deref(),
            ResponseError::Degraded { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ResponseError::Structured { message, .. } => message.as_deref(),
            ResponseError::Degraded { .. } => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ResponseError::Degraded { .. })
    }
}

/// Errors returned by `Client` dispatch methods.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Response(#[from] ResponseError),

    /// A 2xx body did not match the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),
}

impl ApiError {
    /// The normalized response error, if this is one.
    pub fn as_response(&self) -> Option<&ResponseError> {
        match self {
            ApiError::Response(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_display() {
        let err = ResponseError::Structured {
            status: 400,
            code: Some("E1".to_string()),
            message: Some("bad".to_string()),
            body_status: Some(400),
        };
        assert_eq!(err.to_string(), "HTTP response error: [E1] bad");
        assert_eq!(err.code(), Some("E1"));
        assert_eq!(err.message(), Some("bad"));
        assert!(!err.is_degraded());
    }

    #[test]
    fn structured_display_with_missing_fields() {
        let err = ResponseError::Structured {
            status: 409,
            code: None,
            message: None,
            body_status: None,
        };
        assert_eq!(err.to_string(), "HTTP response error: [] ");
        assert_eq!(err.status(), 409);
    }

    #[test]
    fn degraded_display() {
        let err = ResponseError::Degraded {
            status: 500,
            reason: "Internal Server Error",
        };
        assert_eq!(
            err.to_string(),
            "HTTP response error: status 500 Internal Server Error"
        );
        assert!(err.code().is_none());
        assert!(err.message().is_none());
        assert!(err.is_degraded());
    }

    #[test]
    fn transport_errors_display() {
        assert_eq!(TransportError::Timeout.to_string(), "request timeout");
        assert_eq!(
            TransportError::Connection("refused".to_string()).to_string(),
            "connection error: refused"
        );
    }

    #[test]
    fn api_error_is_transparent_over_causes() {
        let err: ApiError = TransportError::Timeout.into();
        assert_eq!(err.to_string(), "request timeout");
        assert!(err.as_response().is_none());

        let err: ApiError = ResponseError::Degraded {
            status: 404,
            reason: "Not Found",
        }
        .into();
        assert_eq!(err.as_response().map(ResponseError::status), Some(404));
    }
}
