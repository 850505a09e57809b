//! AWS IAM access keys as the credential provider.
//!
//! Each profile name doubles as the shared-config profile used to
//! authenticate, so every profile gets its own IAM client.

use crate::constants;
use crate::error::ProviderError;
use crate::models::credential::{CredentialStatus, ListedCredential, NewCredential};
use crate::providers::{CredentialProvider, ProviderConnector};
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_iam::error::DisplayErrorContext;
use aws_sdk_iam::primitives::DateTime as AwsDateTime;
use aws_sdk_iam::types::StatusType;
use aws_sdk_iam::Client;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use tracing::{debug, trace};
use zeroize::Zeroizing;

/// Opens one IAM session per profile.
#[derive(Debug, Clone, Default)]
pub struct IamConnector {
    /// Region override; otherwise the default chain, then `us-east-1`.
    pub region: Option<String>,
}

#[async_trait]
impl ProviderConnector for IamConnector {
    async fn connect(&self, profile: &str) -> Result<Arc<dyn CredentialProvider>, ProviderError> {
        let region = RegionProviderChain::first_try(self.region.clone().map(aws_config::Region::new))
            .or_default_provider()
            .or_else(constants::DEFAULT_AWS_REGION);
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .profile_name(profile)
            .region(region)
            .load()
            .await;
        debug!(profile = %profile, region = ?sdk_config.region(), "initialized IAM client");
        Ok(Arc::new(IamProvider {
            client: Client::new(&sdk_config),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct IamProvider {
    client: Client,
}

#[async_trait]
impl CredentialProvider for IamProvider {
    async fn list_credentials(&self, user: &str) -> Result<Vec<ListedCredential>, ProviderError> {
        let output = self
            .client
            .list_access_keys()
            .user_name(user)
            .send()
            .await
            .map_err(|e| ProviderError::new("ListAccessKeys", user, DisplayErrorContext(&e).to_string()))?;

        let mut keys = Vec::new();
        for meta in output.access_key_metadata() {
            let Some(id) = meta.access_key_id() else {
                continue;
            };
            let status = match meta.status() {
                Some(StatusType::Active) => CredentialStatus::Active,
                _ => CredentialStatus::Inactive,
            };
            let Some(created_at) = meta.create_date().and_then(to_chrono) else {
                continue;
            };
            trace!(access_key_id = %id, created_at = %created_at, ?status, "access key");
            keys.push(ListedCredential {
                id: id.to_string(),
                status,
                created_at,
            });
        }
        Ok(keys)
    }

    async fn create_credential(&self, user: &str) -> Result<NewCredential, ProviderError> {
        let output = self
            .client
            .create_access_key()
            .user_name(user)
            .send()
            .await
            .map_err(|e| ProviderError::new("CreateAccessKey", user, DisplayErrorContext(&e).to_string()))?;

        let key = output
            .access_key()
            .ok_or_else(|| ProviderError::new("CreateAccessKey", user, "response carried no access key"))?;
        Ok(NewCredential {
            id: key.access_key_id().to_string(),
            secret_value: Zeroizing::new(key.secret_access_key().to_string()),
            created_at: key.create_date().and_then(to_chrono).unwrap_or_else(Utc::now),
        })
    }

    async fn delete_credential(&self, user: &str, id: &str) -> Result<(), ProviderError> {
        self.client
            .delete_access_key()
            .user_name(user)
            .access_key_id(id)
            .send()
            .await
            .map_err(|e| ProviderError::new("DeleteAccessKey", user, DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }
}

fn to_chrono(dt: &AwsDateTime) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(dt.secs(), dt.subsec_nanos()).single()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_chrono() {
        let dt = AwsDateTime::from_secs(1_700_000_000);
        let converted = to_chrono(&dt).unwrap();
        assert_eq!(converted.timestamp(), 1_700_000_000);
    }
}
