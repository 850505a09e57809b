use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use zeroize::Zeroizing;

/// Status reported by the provider for one credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStatus {
    Active,
    Inactive,
}

/// One credential as listed by the provider.
#[derive(Debug, Clone)]
pub struct ListedCredential {
    pub id: String,
    pub status: CredentialStatus,
    pub created_at: DateTime<Utc>,
}

/// Freshly minted credential as returned by the provider.
pub struct NewCredential {
    pub id: String,
    pub secret_value: Zeroizing<String>,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for NewCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewCredential")
            .field("id", &self.id)
            .field("secret_value", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Descriptor of the currently active credential for an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialInfo {
    pub owner: String,
    pub id: String,
    pub created_at: DateTime<Utc>,
}

/// A replacement credential, holding the plaintext secret in memory only.
pub struct CredentialSecret {
    pub info: CredentialInfo,
    secret_value: Zeroizing<String>,
}

impl CredentialSecret {
    pub fn new(info: CredentialInfo, secret_value: Zeroizing<String>) -> Self {
        Self { info, secret_value }
    }

    pub fn id(&self) -> &str {
        &self.info.id
    }

    pub fn secret_value(&self) -> &str {
        &self.secret_value
    }
}

impl fmt::Debug for CredentialSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSecret")
            .field("info", &self.info)
            .field("secret_value", &"[REDACTED]")
            .finish()
    }
}
