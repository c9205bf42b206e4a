mod auth;
mod client;
mod error;
mod secrets;
mod transport;

pub use auth::{auth_headers, AuthHeaders, Credentials};
pub use client::{
    fetch_api_call, WorkersSecretsClient, WorkersSecretsClientBuilder, WorkersSecretsParams,
    CF_V4_BASE,
};
pub use error::{ApiError, ConfigurationError};
pub use secrets::{CreateSecretParams, DeleteSecretParams, ListSecretsParams};
pub use transport::{
    default_transport, install_default_transport, ReqwestTransport, RequestSpec, SharedTransport,
    Transport, TransportError, TransportResponse,
};
