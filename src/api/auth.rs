use super::error::ConfigurationError;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};

const X_AUTH_EMAIL: &str = "x-auth-email";
const X_AUTH_KEY: &str = "x-auth-key";

/// The two ways Cloudflare lets us authenticate.
/// Exactly one is chosen when the client is constructed.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// An API token, sent as `Authorization: Bearer <token>`.
    BearerToken(String),
    /// A legacy global API key, sent alongside the account's email.
    EmailKey { email: String, auth_key: String },
}

impl Credentials {
    /// Chooses a scheme from loosely-specified credentials.
    ///
    /// A token takes precedence over everything else. Empty strings count as absent.
    pub fn from_parts(
        email: Option<&str>,
        auth_key: Option<&str>,
        auth_token: Option<&str>,
    ) -> Result<Self, ConfigurationError> {
        fn present(value: Option<&str>) -> Option<&str> {
            value.filter(|v| !v.is_empty())
        }

        if let Some(token) = present(auth_token) {
            return Ok(Credentials::BearerToken(token.to_string()));
        }

        match (present(email), present(auth_key)) {
            (Some(email), Some(auth_key)) => Ok(Credentials::EmailKey {
                email: email.to_string(),
                auth_key: auth_key.to_string(),
            }),
            _ => Err(ConfigurationError::MissingCredentials),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::BearerToken(_) => f.write_str("BearerToken(<redacted>)"),
            Credentials::EmailKey { email, .. } => f
                .debug_struct("EmailKey")
                .field("email", email)
                .field("auth_key", &"<redacted>")
                .finish(),
        }
    }
}

/// Headers sent with every request a client makes.
#[derive(Debug, Clone)]
pub struct AuthHeaders(HeaderMap);

impl AuthHeaders {
    /// Formats credentials into headers. This never touches the network.
    pub fn resolve(credentials: &Credentials) -> Result<Self, ConfigurationError> {
        let mut headers = HeaderMap::new();

        match credentials {
            Credentials::BearerToken(token) => {
                headers.insert(
                    header::AUTHORIZATION,
                    sensitive("authorization", &format!("Bearer {token}"))?,
                );
            }
            Credentials::EmailKey { email, auth_key } => {
                headers.insert(
                    HeaderName::from_static(X_AUTH_EMAIL),
                    sensitive("x-auth-email", email)?,
                );
                headers.insert(
                    HeaderName::from_static(X_AUTH_KEY),
                    sensitive("x-auth-key", auth_key)?,
                );
            }
        }

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Ok(Self(headers))
    }

    pub fn as_header_map(&self) -> &HeaderMap {
        &self.0
    }
}

/// Resolves headers straight from loosely-specified credentials.
pub fn auth_headers(
    email: Option<&str>,
    auth_key: Option<&str>,
    auth_token: Option<&str>,
) -> Result<AuthHeaders, ConfigurationError> {
    let credentials = Credentials::from_parts(email, auth_key, auth_token)?;
    AuthHeaders::resolve(&credentials)
}

/// Builds a header value that `Debug` output will never print.
fn sensitive(header: &'static str, value: &str) -> Result<HeaderValue, ConfigurationError> {
    let mut value = HeaderValue::from_str(value)
        .map_err(|_| ConfigurationError::InvalidHeaderValue { header })?;
    value.set_sensitive(true);
    Ok(value)
}
