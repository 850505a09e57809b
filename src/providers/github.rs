//! GitHub Actions repository secrets as the secret consumer.

use crate::constants;
use crate::error::ConsumerError;
use crate::providers::{EncryptionKey, SecretStore};
use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Method, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct PublicKeyResponse {
    key_id: String,
    key: String,
}

#[derive(Debug, Serialize)]
struct SecretBody<'a> {
    encrypted_value: &'a str,
    key_id: &'a str,
}

pub struct GithubSecrets {
    http: reqwest::Client,
    base_url: String,
}

impl GithubSecrets {
    pub fn new(base_url: &str, token: &str) -> Result<Self, ConsumerError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ConsumerError::new("configure client", "github", "token contains invalid characters"))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(constants::GITHUB_API_VERSION),
        );

        let http = reqwest::Client::builder()
            .user_agent(constants::USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(constants::GITHUB_TIMEOUT_SECS))
            .build()
            .map_err(|e| ConsumerError::new("configure client", "github", e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        operation: &'static str,
        consumer: &str,
    ) -> Result<Response, ConsumerError> {
        let url = self.url(path);
        debug!(method = %method, url = %url, "fetch");
        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ConsumerError::new(operation, consumer, e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ConsumerError::new(
                operation,
                consumer,
                format!("{}: {}", status, text.trim()),
            ));
        }
        Ok(response)
    }
}

#[async_trait]
impl SecretStore for GithubSecrets {
    async fn encryption_key(&self, consumer: &str) -> Result<EncryptionKey, ConsumerError> {
        const OPERATION: &str = "fetch public key";
        let response = self
            .send::<()>(
                Method::GET,
                &format!("repos/{}/actions/secrets/public-key", consumer),
                None,
                OPERATION,
                consumer,
            )
            .await?;
        let key: PublicKeyResponse = response
            .json()
            .await
            .map_err(|e| ConsumerError::new(OPERATION, consumer, e.to_string()))?;
        Ok(EncryptionKey {
            key_id: key.key_id,
            key: key.key,
        })
    }

    async fn upsert_secret(
        &self,
        consumer: &str,
        name: &str,
        encrypted_value: &str,
        key_id: &str,
    ) -> Result<(), ConsumerError> {
        let body = SecretBody {
            encrypted_value,
            key_id,
        };
        self.send(
            Method::PUT,
            &format!("repos/{}/actions/secrets/{}", consumer, name),
            Some(&body),
            "upsert secret",
            consumer,
        )
        .await?;
        Ok(())
    }
}
