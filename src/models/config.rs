//! Rotation configuration file model.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw configuration file as written by the operator.
///
/// Both sections are optional here so that their absence can be reported
/// as a configuration error rather than a parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub profiles: Option<IndexMap<String, ProfileEntry>>,
    #[serde(default)]
    pub repositories: Option<IndexMap<String, Vec<RepositoryEntry>>>,
}

/// A profile as written. Values are kept untyped so that a wrong type
/// invalidates only this profile, not the whole file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileEntry {
    /// IAM user that holds the access keys.
    #[serde(default)]
    pub user: Option<Value>,

    /// Number of hours an access key may live before it is rotated.
    #[serde(default)]
    pub max_age: Option<Value>,
}

impl ProfileEntry {
    /// The user, when it is a string.
    pub fn user_name(&self) -> Option<&str> {
        self.user.as_ref().and_then(Value::as_str)
    }

    /// The max age, when it is a number.
    pub fn max_age_hours(&self) -> Option<f64> {
        self.max_age.as_ref().and_then(Value::as_f64)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryEntry {
    /// Profile whose keys are delivered to this repository.
    pub profile: String,

    /// Secret name receiving the access key id.
    pub access_key: String,

    /// Secret name receiving the secret access key.
    pub secret_access_key: String,
}
