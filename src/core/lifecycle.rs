//! Credential lifecycle for one identity: read, create once, retire.

use crate::error::ProviderError;
use crate::models::credential::{CredentialInfo, CredentialSecret, CredentialStatus};
use crate::models::profile::Profile;
use crate::providers::CredentialProvider;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

pub struct CredentialLifecycle {
    profile: String,
    user: String,
    provider: Arc<dyn CredentialProvider>,
    replacement: OnceCell<CredentialSecret>,
}

impl CredentialLifecycle {
    pub fn new(profile: &Profile, provider: Arc<dyn CredentialProvider>) -> Self {
        Self {
            profile: profile.name.clone(),
            user: profile.identity_user.clone(),
            provider,
            replacement: OnceCell::new(),
        }
    }

    /// First credential the provider reports as active, if any.
    ///
    /// Further active credentials are reported and ignored.
    pub async fn current_active(&self) -> Result<Option<CredentialInfo>, ProviderError> {
        let listed = self.provider.list_credentials(&self.user).await?;
        debug!(
            keys = ?listed.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
            "listed access keys"
        );

        let mut active = listed
            .into_iter()
            .filter(|c| c.status == CredentialStatus::Active);
        let Some(first) = active.next() else {
            return Ok(None);
        };
        let ignored: Vec<String> = active.map(|c| c.id).collect();
        if !ignored.is_empty() {
            warn!(
                profile = %self.profile,
                selected = %first.id,
                ignored = ?ignored,
                "more than one active access key; only the first is managed"
            );
        }
        Ok(Some(CredentialInfo {
            owner: self.user.clone(),
            id: first.id,
            created_at: first.created_at,
        }))
    }

    /// Create the replacement credential. Only the first call reaches the provider.
    pub async fn create_replacement(&self) -> Result<&CredentialSecret, ProviderError> {
        self.replacement
            .get_or_try_init(|| async {
                let created = self.provider.create_credential(&self.user).await?;
                info!(access_key_id = %created.id, "access key created");
                Ok(CredentialSecret::new(
                    CredentialInfo {
                        owner: self.user.clone(),
                        id: created.id,
                        created_at: created.created_at,
                    },
                    created.secret_value,
                ))
            })
            .await
    }

    /// The replacement created by this instance, if any.
    #[cfg(test)]
    fn replacement(&self) -> Option<&CredentialSecret> {
        self.replacement.get()
    }

    /// Delete a credential and wait for the provider to confirm.
    pub async fn retire(&self, id: &str) -> Result<(), ProviderError> {
        self.provider.delete_credential(&self.user, id).await?;
        info!(access_key_id = %id, "access key deleted");
        Ok(())
    }
}
