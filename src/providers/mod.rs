//! Interfaces to the credential provider and the secret consumers.
//!
//! - `aws` — IAM access keys
//! - `github` — GitHub Actions repository secrets

use crate::error::{ConsumerError, ProviderError};
use crate::models::credential::{ListedCredential, NewCredential};
use async_trait::async_trait;
use std::sync::Arc;

pub mod aws;
pub mod github;

/// Credential provider session for one profile.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn list_credentials(&self, user: &str) -> Result<Vec<ListedCredential>, ProviderError>;
    async fn create_credential(&self, user: &str) -> Result<NewCredential, ProviderError>;
    async fn delete_credential(&self, user: &str, id: &str) -> Result<(), ProviderError>;
}

/// Opens a provider session for a named profile.
#[async_trait]
pub trait ProviderConnector: Send + Sync {
    async fn connect(&self, profile: &str) -> Result<Arc<dyn CredentialProvider>, ProviderError>;
}

/// Public key a consumer uses to receive sealed secrets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionKey {
    pub key_id: String,
    /// Base64-encoded X25519 public key.
    pub key: String,
}

/// Secret store of the consumers.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn encryption_key(&self, consumer: &str) -> Result<EncryptionKey, ConsumerError>;
    async fn upsert_secret(
        &self,
        consumer: &str,
        name: &str,
        encrypted_value: &str,
        key_id: &str,
    ) -> Result<(), ConsumerError>;
}
