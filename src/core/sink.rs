//! Secret sink for one consumer, with a run-scoped encryption key cache.

use crate::core::seal;
use crate::error::ConsumerError;
use crate::providers::{EncryptionKey, SecretStore};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info};

/// Encryption keys per consumer, fetched at most once per run.
#[derive(Debug, Default)]
pub struct KeyCache {
    keys: Mutex<HashMap<String, EncryptionKey>>,
}

impl KeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, consumer: &str) -> Option<EncryptionKey> {
        self.keys
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(consumer)
            .cloned()
    }

    fn insert(&self, consumer: &str, key: EncryptionKey) {
        self.keys
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(consumer.to_string(), key);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.keys
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct SecretSink<'a> {
    consumer: &'a str,
    store: &'a dyn SecretStore,
    cache: &'a KeyCache,
}

impl<'a> SecretSink<'a> {
    pub fn new(consumer: &'a str, store: &'a dyn SecretStore, cache: &'a KeyCache) -> Self {
        Self {
            consumer,
            store,
            cache,
        }
    }

    /// The consumer's encryption key, from cache or fetched on first use.
    pub async fn encryption_key(&self) -> Result<EncryptionKey, ConsumerError> {
        if let Some(key) = self.cache.get(self.consumer) {
            return Ok(key);
        }
        debug!(consumer = %self.consumer, "fetching encryption key");
        let key = self.store.encryption_key(self.consumer).await?;
        self.cache.insert(self.consumer, key.clone());
        Ok(key)
    }

    /// Seal `value` for the consumer and upsert it under `secret_name`.
    pub async fn publish(&self, secret_name: &str, value: &str) -> Result<(), ConsumerError> {
        let key = self.encryption_key().await?;
        let encrypted = seal::seal_base64(&key.key, value.as_bytes())
            .map_err(|e| ConsumerError::new("seal secret", self.consumer, e.to_string()))?;
        self.store
            .upsert_secret(self.consumer, secret_name, &encrypted, &key.key_id)
            .await?;
        info!(consumer = %self.consumer, secret = %secret_name, "secret updated");
        Ok(())
    }
}
