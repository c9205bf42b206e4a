use super::transport::{RequestSpec, TransportError};
use thiserror::Error;

/// Problems detected while constructing a client.
/// None of these ever involve the network.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("either an auth token or an email and auth key must be provided")]
    MissingCredentials,

    #[error("an account ID must be provided")]
    MissingAccountId,

    #[error("no transport available: inject one or install a default transport")]
    NoTransport,

    /// A credential contained bytes that cannot be sent within an HTTP header.
    #[error("credential for header `{header}` is not a valid header value")]
    InvalidHeaderValue { header: &'static str },

    #[error("invalid API base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Failures from a single API call.
///
/// Once a request has been built, errors carry it so the caller can tell
/// which call went wrong. Secret material within it is redacted on `Debug`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API responded with a non-2xx status.
    #[error("error with API call {} {}: status {status}", .request.method, .request.url)]
    Status {
        status: reqwest::StatusCode,
        request: RequestSpec,
    },

    /// The API responded successfully, but not with JSON we could parse.
    #[error("malformed response body from {} {}: {source}", .request.method, .request.url)]
    MalformedBody {
        request: RequestSpec,
        #[source]
        source: serde_json::Error,
    },

    /// The transport never produced a response.
    #[error("transport failed for {} {}: {source}", .request.method, .request.url)]
    Transport {
        request: RequestSpec,
        #[source]
        source: TransportError,
    },

    /// A script or secret name could not be placed into the URL.
    #[error("unable to build request URL from `{base}`: {reason}")]
    InvalidUrl { base: String, reason: String },
}

impl ApiError {
    /// The request this error originated from, if one was built.
    pub fn request(&self) -> Option<&RequestSpec> {
        match self {
            ApiError::Status { request, .. }
            | ApiError::MalformedBody { request, .. }
            | ApiError::Transport { request, .. } => Some(request),
            ApiError::InvalidUrl { .. } => None,
        }
    }

    /// The HTTP status, if the API responded at all.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
