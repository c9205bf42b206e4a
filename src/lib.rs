//! A small client for Cloudflare's Workers secrets API.
//!
//! Secrets belong to a Worker script within an account. We can create, delete, and list them:
//!
//! ```no_run
//! use workers_secrets::{ListSecretsParams, ReqwestTransport, WorkersSecretsClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = WorkersSecretsClient::builder()
//!     .account_id("CF_ACCOUNT_ID")
//!     .auth_token("CF_AUTH_TOKEN")
//!     .transport(ReqwestTransport::default())
//!     .build()?;
//!
//! let secrets = client
//!     .list_secrets(ListSecretsParams { script_name: "my-worker" })
//!     .await?;
//! println!("{secrets}");
//! # Ok(())
//! # }
//! ```

pub mod api;

pub use api::*;
