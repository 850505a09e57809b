//! Configuration loading and profile/consumer resolution.

use crate::error::ConfigError;
use crate::models::config::{ConfigFile, ProfileEntry};
use crate::models::profile::ConsumerMapping;
use indexmap::IndexMap;
use std::fs;
use std::path::Path;

/// Resolved configuration, immutable for the run.
#[derive(Debug, Clone)]
pub struct RotateConfig {
    pub profiles: IndexMap<String, ProfileEntry>,
    pub mappings: Vec<ConsumerMapping>,
}

/// Load a configuration file. `.toml` files are parsed as TOML, anything else as JSON.
pub fn load(path: &Path) -> Result<RotateConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
    let file: ConfigFile = if is_toml {
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    } else {
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    };
    RotateConfig::from_file(file)
}

impl RotateConfig {
    pub fn from_file(file: ConfigFile) -> Result<Self, ConfigError> {
        let profiles = file.profiles.ok_or(ConfigError::MissingSection("profiles"))?;
        let repositories = file
            .repositories
            .ok_or(ConfigError::MissingSection("repositories"))?;

        let mappings = repositories
            .into_iter()
            .flat_map(|(repo, entries)| {
                entries.into_iter().map(move |entry| ConsumerMapping {
                    profile_name: entry.profile,
                    consumer_repo: repo.clone(),
                    access_key_secret_name: entry.access_key,
                    secret_key_secret_name: entry.secret_access_key,
                })
            })
            .collect();

        Ok(Self { profiles, mappings })
    }

    /// Mappings delivering the given profile, in file order.
    pub fn mappings_for(&self, profile: &str) -> Vec<&ConsumerMapping> {
        self.mappings
            .iter()
            .filter(|m| m.profile_name == profile)
            .collect()
    }

    /// Mappings that reference a profile which is not configured.
    pub fn orphan_mappings(&self) -> Vec<&ConsumerMapping> {
        self.mappings
            .iter()
            .filter(|m| !self.profiles.contains_key(&m.profile_name))
            .collect()
    }

    /// Resolve the profiles to process: one selected profile, or all in file order.
    pub fn select(&self, only: Option<&str>) -> Result<Vec<(&str, &ProfileEntry)>, ConfigError> {
        match only {
            Some(name) => {
                let (key, entry) = self
                    .profiles
                    .get_key_value(name)
                    .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))?;
                Ok(vec![(key.as_str(), entry)])
            }
            None => Ok(self
                .profiles
                .iter()
                .map(|(k, v)| (k.as_str(), v))
                .collect()),
        }
    }
}
