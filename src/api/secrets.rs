use super::{client::WorkersSecretsClient, error::ApiError};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

// Endpoint shapes follow cloudflare-rs:
// https://github.com/cloudflare/cloudflare-rs/tree/master/cloudflare/src/endpoints/workers

#[derive(Debug, Clone, Copy)]
pub struct CreateSecretParams<'a> {
    pub script_name: &'a str,
    pub secret_name: &'a str,
    pub secret_value: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteSecretParams<'a> {
    pub script_name: &'a str,
    pub secret_name: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub struct ListSecretsParams<'a> {
    pub script_name: &'a str,
}

/// The body Cloudflare expects when creating a secret.
#[derive(Serialize)]
struct SecretBody<'a> {
    name: &'a str,
    text: &'a str,
}

impl WorkersSecretsClient {
    /// Creates (or replaces) a secret on the given script.
    #[tracing::instrument(level = "debug", skip_all, fields(script = params.script_name, secret = params.secret_name))]
    pub async fn create_secret(&self, params: CreateSecretParams<'_>) -> Result<Value, ApiError> {
        let url = self.endpoint(&["workers", "scripts", params.script_name, "secrets"])?;
        let body = serde_json::to_vec(&SecretBody {
            name: params.secret_name,
            text: params.secret_value,
        })
        .expect("should be able to serialize secret body");

        self.call(self.request(Method::PUT, url, Some(body))).await
    }

    /// Deletes a secret from the given script.
    #[tracing::instrument(level = "debug", skip_all, fields(script = params.script_name, secret = params.secret_name))]
    pub async fn delete_secret(&self, params: DeleteSecretParams<'_>) -> Result<Value, ApiError> {
        let url = self.endpoint(&[
            "workers",
            "scripts",
            params.script_name,
            "secrets",
            params.secret_name,
        ])?;

        self.call(self.request(Method::DELETE, url, None)).await
    }

    /// Lists the secrets bound to the given script. Values are never returned by Cloudflare.
    #[tracing::instrument(level = "debug", skip_all, fields(script = params.script_name))]
    pub async fn list_secrets(&self, params: ListSecretsParams<'_>) -> Result<Value, ApiError> {
        let url = self.endpoint(&["workers", "scripts", params.script_name, "secrets"])?;

        self.call(self.request(Method::GET, url, None)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::testing::StubTransport;
    use reqwest::{header, StatusCode};
    use serde_json::json;
    use std::sync::Arc;

    const ACCOUNT_ID: &str = "CF_ACCOUNT_ID";
    const AUTH_TOKEN: &str = "CF_AUTH_TOKEN";
    const SCRIPT_NAME: &str = "anonymitybot-com";
    const SECRET_NAME: &str = "ROTATIONAL_PEPPER";

    fn client_with(transport: Arc<StubTransport>) -> WorkersSecretsClient {
        WorkersSecretsClient::builder()
            .account_id(ACCOUNT_ID)
            .auth_token(AUTH_TOKEN)
            .shared_transport(transport)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn create_secret_puts_json_body() {
        let transport = StubTransport::new(StatusCode::OK, r#"{"success":true}"#);
        let client = client_with(transport.clone());

        let result = client
            .create_secret(CreateSecretParams {
                script_name: SCRIPT_NAME,
                secret_name: SECRET_NAME,
                secret_value: "witch collapse practice feed shame",
            })
            .await
            .unwrap();
        assert_eq!(result, json!({ "success": true }));

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, Method::PUT);
        assert_eq!(
            request.url.as_str(),
            "https://api.cloudflare.com/client/v4/accounts/CF_ACCOUNT_ID/workers/scripts/anonymitybot-com/secrets"
        );
        assert_eq!(request.headers[header::AUTHORIZATION], "Bearer CF_AUTH_TOKEN");
        assert_eq!(request.headers[header::CONTENT_TYPE], "application/json");

        let body: serde_json::Value =
            serde_json::from_slice(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({ "name": SECRET_NAME, "text": "witch collapse practice feed shame" })
        );
    }

    #[tokio::test]
    async fn delete_secret_sends_no_body() {
        let transport = StubTransport::new(StatusCode::OK, r#"{"success":true}"#);
        let client = client_with(transport.clone());

        client
            .delete_secret(DeleteSecretParams {
                script_name: "s",
                secret_name: "N",
            })
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::DELETE);
        assert!(requests[0].url.as_str().ends_with("/s/secrets/N"));
        assert!(requests[0].body.is_none());
    }

    #[tokio::test]
    async fn list_secrets_passes_result_through() {
        let body = r#"{"success":true,"result":[{"name":"A","type":"secret_text"}]}"#;
        let transport = StubTransport::new(StatusCode::OK, body);
        let client = client_with(transport.clone());

        let result = client
            .list_secrets(ListSecretsParams { script_name: "s" })
            .await
            .unwrap();

        assert_eq!(result, serde_json::from_str::<Value>(body).unwrap());
        let requests = transport.requests();
        assert_eq!(requests[0].method, Method::GET);
        assert!(requests[0].url.as_str().ends_with("/s/secrets"));
        assert!(requests[0].body.is_none());
    }

    #[tokio::test]
    async fn failed_status_rejects_every_operation() {
        let transport = StubTransport::new(StatusCode::NOT_FOUND, "");
        let client = client_with(transport.clone());

        let create = client
            .create_secret(CreateSecretParams {
                script_name: "s",
                secret_name: "N",
                secret_value: "V",
            })
            .await
            .unwrap_err();
        let delete = client
            .delete_secret(DeleteSecretParams {
                script_name: "s",
                secret_name: "N",
            })
            .await
            .unwrap_err();
        let list = client
            .list_secrets(ListSecretsParams { script_name: "s" })
            .await
            .unwrap_err();

        let cases = [
            (create, "/s/secrets"),
            (delete, "/s/secrets/N"),
            (list, "/s/secrets"),
        ];
        for (err, suffix) in cases {
            assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
            assert!(err.request().unwrap().url.as_str().ends_with(suffix));
            assert!(err.to_string().contains(suffix));
        }
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn failed_create_does_not_leak_secret_value() {
        let transport = StubTransport::new(StatusCode::BAD_REQUEST, "");
        let client = client_with(transport);

        let err = client
            .create_secret(CreateSecretParams {
                script_name: "s",
                secret_name: "N",
                secret_value: "hunter2",
            })
            .await
            .unwrap_err();

        assert!(!format!("{err:?}").contains("hunter2"));
        assert!(!format!("{err:?}").contains(AUTH_TOKEN));
        assert!(!err.to_string().contains("hunter2"));
    }

    #[tokio::test]
    async fn concurrent_calls_are_independent() {
        let transport = StubTransport::new(StatusCode::OK, r#"{"success":true}"#);
        let client = client_with(transport.clone());

        let first = client.clone();
        let second = client.clone();
        let (a, b) = tokio::join!(
            first.list_secrets(ListSecretsParams { script_name: "a" }),
            second.list_secrets(ListSecretsParams { script_name: "b" }),
        );

        assert_eq!(a.unwrap(), json!({ "success": true }));
        assert_eq!(b.unwrap(), json!({ "success": true }));

        let mut paths: Vec<String> = transport
            .requests()
            .iter()
            .map(|request| request.url.path().to_string())
            .collect();
        paths.sort();
        assert_eq!(
            paths,
            [
                "/client/v4/accounts/CF_ACCOUNT_ID/workers/scripts/a/secrets",
                "/client/v4/accounts/CF_ACCOUNT_ID/workers/scripts/b/secrets",
            ]
        );
    }

    #[tokio::test]
    async fn concurrent_calls_settle_on_their_own() {
        let healthy = StubTransport::new(StatusCode::OK, r#"{"success":true}"#);
        let forbidden = StubTransport::new(StatusCode::FORBIDDEN, "");
        let first = client_with(healthy.clone());
        let second = client_with(forbidden.clone());

        let (ok, err) = tokio::join!(
            first.list_secrets(ListSecretsParams { script_name: "a" }),
            second.list_secrets(ListSecretsParams { script_name: "b" }),
        );

        assert_eq!(ok.unwrap(), json!({ "success": true }));
        let err = err.unwrap_err();
        assert!(matches!(err, ApiError::Status { .. }));
        assert!(err.request().unwrap().url.as_str().ends_with("/b/secrets"));
        assert_eq!(healthy.requests().len(), 1);
        assert_eq!(forbidden.requests().len(), 1);
    }

    #[tokio::test]
    async fn dot_segments_are_rejected_before_sending() {
        let transport = StubTransport::new(StatusCode::OK, r#"{"success":true}"#);
        let client = client_with(transport.clone());

        for secret_name in ["", ".", ".."] {
            let err = client
                .delete_secret(DeleteSecretParams {
                    script_name: "s",
                    secret_name,
                })
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::InvalidUrl { .. }));
        }

        for script_name in ["", ".", ".."] {
            let err = client
                .list_secrets(ListSecretsParams { script_name })
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::InvalidUrl { .. }));

            let err = client
                .create_secret(CreateSecretParams {
                    script_name,
                    secret_name: "N",
                    secret_value: "V",
                })
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::InvalidUrl { .. }));
        }

        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn dotted_names_that_are_not_dot_segments_still_work() {
        let transport = StubTransport::new(StatusCode::OK, r#"{"success":true}"#);
        let client = client_with(transport.clone());

        client
            .delete_secret(DeleteSecretParams {
                script_name: "my.worker",
                secret_name: "...",
            })
            .await
            .unwrap();

        assert!(transport.requests()[0]
            .url
            .as_str()
            .ends_with("/my.worker/secrets/..."));
    }
}
