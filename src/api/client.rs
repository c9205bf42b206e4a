use super::{
    auth::{AuthHeaders, Credentials},
    error::{ApiError, ConfigurationError},
    transport::{self, RequestSpec, SharedTransport, Transport},
};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// The root of every account-scoped endpoint within Cloudflare's v4 API.
pub const CF_V4_BASE: &str = "https://api.cloudflare.com/client/v4/accounts";

/// Everything a request needs that does not change between calls.
#[derive(Debug)]
pub(crate) struct BaseContext {
    pub account_id: String,
    pub base_url: Url,
    pub headers: AuthHeaders,
}

/// A handle to the Workers secrets API for a single account.
///
/// Cloning is cheap, and clones share their credentials and transport.
/// Each call performs exactly one HTTP request.
#[derive(Debug, Clone)]
pub struct WorkersSecretsClient {
    pub(crate) context: Arc<BaseContext>,
    pub(crate) transport: SharedTransport,
}

/// Loosely-specified construction input, mirroring how credentials usually arrive
/// (e.g. a handful of optional environment variables).
#[derive(Debug, Default)]
pub struct WorkersSecretsParams {
    pub account_id: String,
    pub email: Option<String>,
    pub auth_key: Option<String>,
    pub auth_token: Option<String>,
    pub transport: Option<SharedTransport>,
}

impl WorkersSecretsParams {
    /// Builds a client, failing fast on missing credentials or a missing transport.
    pub fn build(self) -> Result<WorkersSecretsClient, ConfigurationError> {
        let mut builder = WorkersSecretsClient::builder().account_id(self.account_id);
        builder.email = self.email;
        builder.auth_key = self.auth_key;
        builder.auth_token = self.auth_token;
        builder.transport = self.transport;
        builder.build()
    }
}

/// Fluent construction for [`WorkersSecretsClient`].
#[derive(Debug, Default)]
pub struct WorkersSecretsClientBuilder {
    account_id: Option<String>,
    email: Option<String>,
    auth_key: Option<String>,
    auth_token: Option<String>,
    credentials: Option<Credentials>,
    base_url: Option<String>,
    transport: Option<SharedTransport>,
}

impl WorkersSecretsClientBuilder {
    pub fn account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn auth_token(mut self, auth_token: impl Into<String>) -> Self {
        self.auth_token = Some(auth_token.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn auth_key(mut self, auth_key: impl Into<String>) -> Self {
        self.auth_key = Some(auth_key.into());
        self
    }

    /// Uses already-resolved credentials, ignoring any loose token/email/key.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Overrides [`CF_V4_BASE`], mostly useful for pointing at a mock server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn shared_transport(mut self, transport: SharedTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<WorkersSecretsClient, ConfigurationError> {
        // Our transport comes first, then our credentials.
        let transport =
            transport::resolve_transport(self.transport, transport::default_transport())
                .ok_or(ConfigurationError::NoTransport)?;

        let credentials = match self.credentials {
            Some(credentials) => credentials,
            None => Credentials::from_parts(
                self.email.as_deref(),
                self.auth_key.as_deref(),
                self.auth_token.as_deref(),
            )?,
        };
        let headers = AuthHeaders::resolve(&credentials)?;

        let account_id = self
            .account_id
            .filter(|id| !id.is_empty())
            .ok_or(ConfigurationError::MissingAccountId)?;

        let base_url = self.base_url.as_deref().unwrap_or(CF_V4_BASE);
        let base_url = parse_base_url(base_url)?;

        tracing::debug!(%account_id, base_url = %base_url, "built Workers secrets client");
        Ok(WorkersSecretsClient {
            context: Arc::new(BaseContext {
                account_id,
                base_url,
                headers,
            }),
            transport,
        })
    }
}

impl WorkersSecretsClient {
    pub fn builder() -> WorkersSecretsClientBuilder {
        WorkersSecretsClientBuilder::default()
    }

    pub fn account_id(&self) -> &str {
        &self.context.account_id
    }

    /// Creates the URL for the given path segments beneath this account.
    /// Segments are percent-encoded, so a `/` within a name cannot escape its segment.
    ///
    /// `url` silently drops `.` and `..` segments, which would retarget the request,
    /// so those (and empty names) are rejected outright.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let invalid = |reason: String| ApiError::InvalidUrl {
            base: self.context.base_url.to_string(),
            reason,
        };

        let account_id = self.context.account_id.as_str();
        if let Some(name) = std::iter::once(&account_id)
            .chain(segments)
            .find(|name| matches!(**name, "" | "." | ".."))
        {
            return Err(invalid(format!("`{name}` is not a usable path segment")));
        }

        let mut url = self.context.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| invalid("URL cannot have path segments".to_string()))?
            .pop_if_empty()
            .push(account_id)
            .extend(segments);
        Ok(url)
    }

    /// Assembles a request carrying this client's auth headers.
    pub(crate) fn request(&self, method: Method, url: Url, body: Option<Vec<u8>>) -> RequestSpec {
        RequestSpec {
            method,
            url,
            headers: self.context.headers.as_header_map().clone(),
            body,
        }
    }

    /// Sends a request with this client's transport.
    pub(crate) async fn call(&self, request: RequestSpec) -> Result<Value, ApiError> {
        fetch_api_call(self.transport.as_ref(), request).await
    }
}

/// Performs one API call and parses its JSON response.
///
/// We (deliberately simply) treat any non-2xx status as failure,
/// and never look at the body of a failed response.
pub async fn fetch_api_call(
    transport: &dyn Transport,
    request: RequestSpec,
) -> Result<Value, ApiError> {
    let response = match transport.send(&request).await {
        Ok(response) => response,
        Err(source) => {
            tracing::debug!(method = %request.method, url = %request.url, "transport failed");
            return Err(ApiError::Transport { request, source });
        }
    };

    tracing::debug!(
        method = %request.method,
        url = %request.url,
        status = response.status.as_u16(),
        "API call completed"
    );

    if !response.is_success() {
        return Err(ApiError::Status {
            status: response.status,
            request,
        });
    }

    serde_json::from_slice(&response.body)
        .map_err(|source| ApiError::MalformedBody { request, source })
}

fn parse_base_url(base_url: &str) -> Result<Url, ConfigurationError> {
    let invalid = |reason: String| ConfigurationError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };

    let url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot have path segments".to_string()));
    }
    Ok(url)
}
