use async_trait::async_trait;
use reqwest::{header::HeaderMap, Method, StatusCode};
use std::{
    fmt,
    sync::{Arc, OnceLock},
};
use url::Url;

/// Whatever went wrong within a transport before a response arrived.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A transport shared between clients and their clones.
pub type SharedTransport = Arc<dyn Transport>;

/// The process-wide fallback transport.
/// Clients only consult this when no transport was given to them directly.
static DEFAULT_TRANSPORT: OnceLock<SharedTransport> = OnceLock::new();

/// A single HTTP request, built fresh for every API call.
#[derive(Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

// Request bodies can carry secret values, so we only ever print their length.
// Credential headers are marked sensitive and redact themselves.
impl fmt::Debug for RequestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSpec")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers)
            .field(
                "body",
                &self.body.as_ref().map(|body| format!("<{} bytes>", body.len())),
            )
            .finish()
    }
}

/// What a transport hands back: a status and the raw body.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Performs exactly one HTTP round trip.
///
/// Implementations must not retry, and must not interpret the status:
/// a 404 is still a successfully delivered response as far as they are concerned.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn send(&self, request: &RequestSpec) -> Result<TransportResponse, TransportError>;
}

/// The default transport, backed by `reqwest`.
///
/// Timeouts (if any) are whatever the wrapped client was built with.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &RequestSpec) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        Ok(TransportResponse { status, body })
    }
}

/// Installs the process-wide fallback transport.
///
/// Only the first installation takes effect; returns whether this call was it.
pub fn install_default_transport(transport: SharedTransport) -> bool {
    DEFAULT_TRANSPORT.set(transport).is_ok()
}

/// The process-wide fallback transport, if one was installed.
pub fn default_transport() -> Option<SharedTransport> {
    DEFAULT_TRANSPORT.get().cloned()
}

/// Picks the transport a client will own.
///
/// An explicitly injected transport always wins. The ambient one is only a fallback.
pub(crate) fn resolve_transport(
    injected: Option<SharedTransport>,
    ambient: Option<SharedTransport>,
) -> Option<SharedTransport> {
    injected.or(ambient)
}
