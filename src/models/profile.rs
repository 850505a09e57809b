use crate::constants;
use crate::error::RotateError;
use crate::models::config::ProfileEntry;
use chrono::Duration;
use serde::Serialize;
use serde_json::Value;

/// A validated profile: one identity whose credential is managed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub name: String,
    pub identity_user: String,
    pub max_age_hours: f64,
}

impl Profile {
    /// Validate a raw profile entry.
    pub fn validate(name: &str, entry: &ProfileEntry) -> Result<Self, RotateError> {
        let user = match &entry.user {
            None | Some(Value::Null) => {
                return Err(RotateError::ProfileValidation("missing user".into()))
            }
            Some(Value::String(user)) if !user.trim().is_empty() => user.trim().to_string(),
            Some(other) => {
                return Err(RotateError::ProfileValidation(format!(
                    "invalid user {}",
                    other
                )))
            }
        };

        let max_age = match &entry.max_age {
            None | Some(Value::Null) => {
                return Err(RotateError::ProfileValidation("missing max age".into()))
            }
            Some(value) => match value.as_f64() {
                Some(hours)
                    if hours.is_finite()
                        && (constants::MIN_MAX_AGE_HOURS..=constants::MAX_MAX_AGE_HOURS)
                            .contains(&hours) =>
                {
                    hours
                }
                _ => {
                    return Err(RotateError::ProfileValidation(format!(
                        "invalid max age {}",
                        value
                    )))
                }
            },
        };

        Ok(Self {
            name: name.to_string(),
            identity_user: user,
            max_age_hours: max_age,
        })
    }

    pub fn max_age(&self) -> Duration {
        Duration::milliseconds((self.max_age_hours * constants::ONE_HOUR_MS as f64) as i64)
    }
}

/// Delivery of one profile's credential into one consumer repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsumerMapping {
    pub profile_name: String,
    pub consumer_repo: String,
    pub access_key_secret_name: String,
    pub secret_key_secret_name: String,
}
