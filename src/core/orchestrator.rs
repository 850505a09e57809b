//! Per-profile rotation: decide, create once, fan out to consumers, retire.

use crate::core::config::RotateConfig;
use crate::core::lifecycle::CredentialLifecycle;
use crate::core::policy::{self, Decision, RotateReason};
use crate::core::sink::{KeyCache, SecretSink};
use crate::error::{ConfigError, ConsumerError, RotateError};
use crate::models::config::ProfileEntry;
use crate::models::credential::{CredentialInfo, CredentialSecret};
use crate::models::profile::{ConsumerMapping, Profile};
use crate::providers::{ProviderConnector, SecretStore};
use chrono::{Duration, Utc};
use tracing::{debug, error, info, info_span, warn, Instrument};

#[derive(Debug, Clone, Copy, Default)]
pub struct RotateOptions {
    /// Perform mutations. Without it the run is a dry run.
    pub commit: bool,
    /// Rotate even when the current key is younger than its max age.
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RotationOutcome {
    SkippedTooYoung {
        access_key_id: String,
        remaining: Duration,
    },
    SkippedInvalidProfile {
        reason: String,
    },
    SkippedNoConsumers,
    Rotated {
        new_access_key_id: String,
        retired: Option<String>,
        consumers: usize,
    },
    RotatedDryRun {
        retiring: Option<String>,
        consumers: usize,
    },
}

#[derive(Debug)]
pub struct ProfileReport {
    pub profile: String,
    pub result: Result<RotationOutcome, RotateError>,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub profiles: Vec<ProfileReport>,
}

impl RunReport {
    /// Whether any profile hit a provider or consumer error.
    pub fn has_failures(&self) -> bool {
        self.profiles
            .iter()
            .any(|p| matches!(&p.result, Err(e) if e.is_hard()))
    }
}

pub struct RotationOrchestrator<'a> {
    config: &'a RotateConfig,
    connector: &'a dyn ProviderConnector,
    store: &'a dyn SecretStore,
    keys: KeyCache,
    options: RotateOptions,
}

impl<'a> RotationOrchestrator<'a> {
    pub fn new(
        config: &'a RotateConfig,
        connector: &'a dyn ProviderConnector,
        store: &'a dyn SecretStore,
        options: RotateOptions,
    ) -> Self {
        Self {
            config,
            connector,
            store,
            keys: KeyCache::new(),
            options,
        }
    }

    /// Process the selected profile, or every profile in file order.
    ///
    /// Only an unknown selected profile fails the whole run; per-profile
    /// errors are collected in the report.
    pub async fn run(&self, only: Option<&str>) -> Result<RunReport, ConfigError> {
        let selected = self.config.select(only)?;
        let mut report = RunReport::default();

        for (name, entry) in selected {
            let span = info_span!(
                "profile",
                profile = %name,
                user = %entry.user_name().unwrap_or("-")
            );
            let result = self.rotate_profile(name, entry).instrument(span).await;
            if let Err(err) = &result {
                error!(profile = %name, error = %err, "profile rotation failed");
            }
            report.profiles.push(ProfileReport {
                profile: name.to_string(),
                result,
            });
        }

        Ok(report)
    }

    async fn rotate_profile(
        &self,
        name: &str,
        entry: &ProfileEntry,
    ) -> Result<RotationOutcome, RotateError> {
        let profile = match Profile::validate(name, entry) {
            Ok(profile) => profile,
            Err(err) => {
                error!(max_age = ?entry.max_age, error = %err, "skipping profile");
                return Ok(RotationOutcome::SkippedInvalidProfile {
                    reason: err.to_string(),
                });
            }
        };

        info!("rotating profile");
        let provider = self.connector.connect(&profile.name).await?;
        let lifecycle = CredentialLifecycle::new(&profile, provider);
        let current = lifecycle.current_active().await?;

        let decision = policy::decide(
            current.as_ref(),
            profile.max_age(),
            self.options.force,
            Utc::now(),
        );
        match (decision, current.as_ref()) {
            (Decision::Skip { remaining }, Some(current)) => {
                info!(
                    last_rotated = %current.created_at.to_rfc3339(),
                    remaining_minutes = remaining.num_minutes(),
                    "rotated less than {} hours ago",
                    profile.max_age_hours
                );
                return Ok(RotationOutcome::SkippedTooYoung {
                    access_key_id: current.id.clone(),
                    remaining,
                });
            }
            (Decision::Rotate(RotateReason::Forced), Some(current)) => info!(
                age_minutes = (Utc::now() - current.created_at).num_minutes(),
                "forced rotation"
            ),
            (Decision::Rotate(RotateReason::Expired), Some(current)) => info!(
                last_rotated = %current.created_at.to_rfc3339(),
                "access key expired"
            ),
            _ => info!("no active access key"),
        }

        let mappings = self.config.mappings_for(&profile.name);
        if mappings.is_empty() {
            warn!("no repositories found");
            return Ok(RotationOutcome::SkippedNoConsumers);
        }

        if !self.options.commit {
            return Ok(self.plan(current.as_ref(), &mappings));
        }
        self.commit(&lifecycle, current.as_ref(), &mappings).await
    }

    fn plan(&self, current: Option<&CredentialInfo>, mappings: &[&ConsumerMapping]) -> RotationOutcome {
        info!("would create new access key");
        for mapping in mappings {
            info!(
                repo = %mapping.consumer_repo,
                access_key = %mapping.access_key_secret_name,
                secret_access_key = %mapping.secret_key_secret_name,
                "would set secrets"
            );
        }
        if let Some(current) = current {
            warn!(access_key_id = %current.id, "would remove old access key");
        }
        warn!("dry run done, use --commit to rotate");
        RotationOutcome::RotatedDryRun {
            retiring: current.map(|c| c.id.clone()),
            consumers: mappings.len(),
        }
    }

    async fn commit(
        &self,
        lifecycle: &CredentialLifecycle,
        current: Option<&CredentialInfo>,
        mappings: &[&ConsumerMapping],
    ) -> Result<RotationOutcome, RotateError> {
        // Validate access to every repository before minting anything.
        for mapping in mappings {
            SecretSink::new(&mapping.consumer_repo, self.store, &self.keys)
                .encryption_key()
                .await?;
        }

        info!("creating new access key");
        let replacement = lifecycle.create_replacement().await?;

        if let Err(err) = self.propagate(replacement, mappings).await {
            warn!(
                new_access_key_id = %replacement.id(),
                retained_access_key_id = ?current.map(|c| c.id.as_str()),
                "propagation failed, previous access key retained"
            );
            return Err(err.into());
        }

        let retired = match current {
            Some(old) => {
                warn!(access_key_id = %old.id, "removing old access key");
                lifecycle.retire(&old.id).await?;
                Some(old.id.clone())
            }
            None => None,
        };

        Ok(RotationOutcome::Rotated {
            new_access_key_id: replacement.id().to_string(),
            retired,
            consumers: mappings.len(),
        })
    }

    async fn propagate(
        &self,
        replacement: &CredentialSecret,
        mappings: &[&ConsumerMapping],
    ) -> Result<(), ConsumerError> {
        for mapping in mappings {
            debug!(repo = %mapping.consumer_repo, "setting secrets");
            let sink = SecretSink::new(&mapping.consumer_repo, self.store, &self.keys);
            sink.publish(&mapping.access_key_secret_name, replacement.id())
                .await?;
            sink.publish(&mapping.secret_key_secret_name, replacement.secret_value())
                .await?;
        }
        Ok(())
    }
}
