mod storage;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, IsTerminal, Read};
use workers_secrets::{
    ConfigurationError, CreateSecretParams, Credentials, DeleteSecretParams, ListSecretsParams,
    ReqwestTransport, WorkersSecretsClient, CF_V4_BASE,
};

/// Manage secrets bound to Cloudflare Workers scripts.
#[derive(Parser, Debug)]
#[command(name = "workers-secrets", version)]
pub struct Cli {
    /// Cloudflare account ID
    #[arg(long, env = "CF_ACCOUNT_ID", global = true, hide_env_values = true)]
    pub account_id: Option<String>,

    /// Email address for legacy API key authentication
    #[arg(long, env = "CF_EMAIL", global = true)]
    pub email: Option<String>,

    /// Legacy global API key (requires --email)
    #[arg(long, env = "CF_AUTH_KEY", global = true, hide_env_values = true)]
    pub auth_key: Option<String>,

    /// API token, preferred over email and key
    #[arg(long, env = "CF_AUTH_TOKEN", global = true, hide_env_values = true)]
    pub auth_token: Option<String>,

    /// API base URL
    #[arg(long, env = "CF_API_BASE_URL", global = true, default_value = CF_V4_BASE)]
    pub base_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the secrets bound to a script
    List { script: String },

    /// Create or replace a secret
    Put {
        script: String,
        name: String,
        /// Secret value; read from stdin when omitted
        #[arg(long)]
        value: Option<String>,
    },

    /// Delete a secret
    Delete { script: String, name: String },

    /// Save --auth-token to the system keyring for this account
    StoreToken,

    /// Remove this account's token from the system keyring
    ForgetToken,
}

impl Cli {
    fn account_id(&self) -> Result<&str> {
        match self.account_id.as_deref() {
            Some(id) if !id.is_empty() => Ok(id),
            _ => bail!("an account ID is required (--account-id or CF_ACCOUNT_ID)"),
        }
    }

    /// Works out which credentials to use.
    ///
    /// Whatever was given on the command line (or environment) wins.
    /// Failing that, we'll fall back to a token from the keyring.
    fn credentials(&self, account_id: &str) -> Result<Credentials> {
        credentials_or_stored(
            Credentials::from_parts(
                self.email.as_deref(),
                self.auth_key.as_deref(),
                self.auth_token.as_deref(),
            ),
            || storage::stored_token(account_id).context("unable to read the system keyring"),
        )
    }

    fn client(&self) -> Result<WorkersSecretsClient> {
        let account_id = self.account_id()?;
        let client = WorkersSecretsClient::builder()
            .account_id(account_id)
            .credentials(self.credentials(account_id)?)
            .base_url(self.base_url.as_str())
            .transport(ReqwestTransport::default())
            .build()?;
        Ok(client)
    }
}

/// Falls back to a stored token only when no credentials were given at all.
/// Invalid credentials that were given are reported as-is, without consulting storage.
fn credentials_or_stored(
    given: Result<Credentials, ConfigurationError>,
    stored_token: impl FnOnce() -> Result<Option<String>>,
) -> Result<Credentials> {
    match given {
        Ok(credentials) => Ok(credentials),
        Err(ConfigurationError::MissingCredentials) => match stored_token()? {
            Some(token) => {
                tracing::debug!("using API token from keyring");
                Ok(Credentials::BearerToken(token))
            }
            None => Err(ConfigurationError::MissingCredentials.into()),
        },
        Err(err) => Err(err.into()),
    }
}

/// Runs a single command, printing whatever the API responds with.
pub async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::List { script } => {
            let result = cli
                .client()?
                .list_secrets(ListSecretsParams {
                    script_name: script,
                })
                .await
                .with_context(|| format!("unable to list secrets for `{script}`"))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Put {
            script,
            name,
            value,
        } => {
            let value = match value {
                Some(value) => value.clone(),
                None => read_secret_value()?,
            };
            let result = cli
                .client()?
                .create_secret(CreateSecretParams {
                    script_name: script,
                    secret_name: name,
                    secret_value: &value,
                })
                .await
                .with_context(|| format!("unable to put secret `{name}` on `{script}`"))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Delete { script, name } => {
            let result = cli
                .client()?
                .delete_secret(DeleteSecretParams {
                    script_name: script,
                    secret_name: name,
                })
                .await
                .with_context(|| format!("unable to delete secret `{name}` from `{script}`"))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::StoreToken => {
            let account_id = cli.account_id()?;
            let Some(token) = cli.auth_token.as_deref().filter(|t| !t.is_empty()) else {
                bail!("an API token is required (--auth-token or CF_AUTH_TOKEN)");
            };
            storage::store_token(account_id, token)
                .context("unable to update the system keyring")?;
            eprintln!("Stored API token for account {account_id}.");
        }
        Commands::ForgetToken => {
            let account_id = cli.account_id()?;
            let removed = storage::forget_token(account_id)
                .context("unable to update the system keyring")?;
            if removed {
                eprintln!("Removed API token for account {account_id}.");
            } else {
                eprintln!("No API token was stored for account {account_id}.");
            }
        }
    }
    Ok(())
}

/// Reads a secret value from stdin.
fn read_secret_value() -> Result<String> {
    let mut stdin = io::stdin().lock();
    if stdin.is_terminal() {
        eprintln!("Enter the secret value, then press Ctrl-D:");
    }

    let mut value = String::new();
    stdin
        .read_to_string(&mut value)
        .context("unable to read secret value from stdin")?;
    trim_secret_value(value)
}

/// Drops a single trailing newline, as left behind by `echo` or an interactive prompt.
fn trim_secret_value(mut value: String) -> Result<String> {
    if value.ends_with('\n') {
        value.pop();
        if value.ends_with('\r') {
            value.pop();
        }
    }
    if value.is_empty() {
        bail!("refusing to store an empty secret value");
    }
    Ok(value)
}
