use keyring::Entry;

/// The keyring service all of our entries live under.
const KEYRING_SERVICE: &str = "workers-secrets";

/// The keyring entry holding a Cloudflare API token.
/// Tokens are scoped per account, so the account ID is our "user".
fn token_entry(account_id: &str) -> keyring::Result<Entry> {
    Entry::new(KEYRING_SERVICE, &format!("API token for {account_id}"))
}

/// Retrieves a previously stored API token, if there is one.
///
/// A missing entry is not an error. Anything else the keyring complains about is.
pub fn stored_token(account_id: &str) -> keyring::Result<Option<String>> {
    match token_entry(account_id)?.get_password() {
        Ok(token) => Ok(Some(token)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Persists an API token for later invocations.
pub fn store_token(account_id: &str, token: &str) -> keyring::Result<()> {
    token_entry(account_id)?.set_password(token)
}

/// Removes a stored API token. Returns whether there was one to remove.
pub fn forget_token(account_id: &str) -> keyring::Result<bool> {
    match token_entry(account_id)?.delete_password() {
        Ok(()) => Ok(true),
        Err(keyring::Error::NoEntry) => Ok(false),
        Err(err) => Err(err),
    }
}
