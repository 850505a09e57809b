//! In-memory provider and store fakes that record every call.

use crate::error::{ConsumerError, ProviderError};
use crate::models::credential::{CredentialStatus, ListedCredential, NewCredential};
use crate::providers::{
    CredentialProvider, EncryptionKey, ProviderConnector, SecretStore,
};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use crypto_box::aead::OsRng;
use crypto_box::SecretKey;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use zeroize::Zeroizing;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    List(String),
    Create(String),
    Delete(String, String),
    KeyFetch(String),
    Upsert { consumer: String, name: String },
}

/// Ordered record of calls shared by the fakes.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Event>>>);

impl Journal {
    fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}

#[derive(Default)]
struct ProviderState {
    keys: Vec<ListedCredential>,
    secrets: HashMap<String, String>,
    created: usize,
    fail_list: bool,
    fail_create: bool,
    fail_delete: bool,
}

pub struct FakeProvider {
    journal: Journal,
    state: Mutex<ProviderState>,
}

impl FakeProvider {
    pub fn new(journal: Journal) -> Arc<Self> {
        Arc::new(Self {
            journal,
            state: Mutex::new(ProviderState::default()),
        })
    }

    pub fn seed(&self, key: ListedCredential) {
        self.state.lock().unwrap().keys.push(key);
    }

    pub fn secret_of(&self, id: &str) -> String {
        self.state.lock().unwrap().secrets[id].clone()
    }

    pub fn fail_list(&self, fail: bool) {
        self.state.lock().unwrap().fail_list = fail;
    }

    pub fn fail_create(&self, fail: bool) {
        self.state.lock().unwrap().fail_create = fail;
    }

    pub fn fail_delete(&self, fail: bool) {
        self.state.lock().unwrap().fail_delete = fail;
    }
}

#[async_trait]
impl CredentialProvider for FakeProvider {
    async fn list_credentials(&self, user: &str) -> Result<Vec<ListedCredential>, ProviderError> {
        self.journal.push(Event::List(user.to_string()));
        let state = self.state.lock().unwrap();
        if state.fail_list {
            return Err(ProviderError::new("ListAccessKeys", user, "access denied"));
        }
        Ok(state.keys.clone())
    }

    async fn create_credential(&self, user: &str) -> Result<NewCredential, ProviderError> {
        self.journal.push(Event::Create(user.to_string()));
        let mut state = self.state.lock().unwrap();
        if state.fail_create {
            return Err(ProviderError::new("CreateAccessKey", user, "limit exceeded"));
        }
        state.created += 1;
        let id = format!("AKIANEW{}", state.created);
        let secret = format!("secret-{}", state.created);
        let created_at = Utc::now();
        state.keys.push(ListedCredential {
            id: id.clone(),
            status: CredentialStatus::Active,
            created_at,
        });
        state.secrets.insert(id.clone(), secret.clone());
        Ok(NewCredential {
            id,
            secret_value: Zeroizing::new(secret),
            created_at,
        })
    }

    async fn delete_credential(&self, user: &str, id: &str) -> Result<(), ProviderError> {
        self.journal
            .push(Event::Delete(user.to_string(), id.to_string()));
        let mut state = self.state.lock().unwrap();
        if state.fail_delete {
            return Err(ProviderError::new("DeleteAccessKey", user, "throttled"));
        }
        state.keys.retain(|k| k.id != id);
        Ok(())
    }
}

pub struct FakeConnector {
    provider: Arc<FakeProvider>,
}

impl FakeConnector {
    pub fn new(provider: Arc<FakeProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ProviderConnector for FakeConnector {
    async fn connect(&self, _profile: &str) -> Result<Arc<dyn CredentialProvider>, ProviderError> {
        Ok(self.provider.clone())
    }
}

#[derive(Default)]
struct StoreState {
    keys: HashMap<String, SecretKey>,
    secrets: HashMap<(String, String), String>,
    fail_key_fetch: HashSet<String>,
    fail_upsert: HashSet<String>,
}

/// Secret store holding a real key pair per consumer.
pub struct FakeStore {
    journal: Journal,
    state: Mutex<StoreState>,
}

impl FakeStore {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            state: Mutex::new(StoreState::default()),
        }
    }

    pub fn fail_key_fetch(&self, consumer: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_key_fetch
            .insert(consumer.to_string());
    }

    pub fn fail_upsert(&self, consumer: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_upsert
            .insert(consumer.to_string());
    }

    pub fn stored(&self, consumer: &str, name: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .secrets
            .get(&(consumer.to_string(), name.to_string()))
            .cloned()
    }

    /// Decrypt a stored value with the consumer's secret key.
    pub fn open(&self, consumer: &str, encrypted: &str) -> String {
        let state = self.state.lock().unwrap();
        let sealed = STANDARD.decode(encrypted).unwrap();
        let plain = state.keys[consumer].unseal(&sealed).unwrap();
        String::from_utf8(plain).unwrap()
    }
}

#[async_trait]
impl SecretStore for FakeStore {
    async fn encryption_key(&self, consumer: &str) -> Result<EncryptionKey, ConsumerError> {
        self.journal.push(Event::KeyFetch(consumer.to_string()));
        let mut state = self.state.lock().unwrap();
        if state.fail_key_fetch.contains(consumer) {
            return Err(ConsumerError::new("fetch public key", consumer, "404 Not Found"));
        }
        let secret = state
            .keys
            .entry(consumer.to_string())
            .or_insert_with(|| SecretKey::generate(&mut OsRng));
        Ok(EncryptionKey {
            key_id: format!("key-{}", consumer),
            key: STANDARD.encode(secret.public_key().as_bytes()),
        })
    }

    async fn upsert_secret(
        &self,
        consumer: &str,
        name: &str,
        encrypted_value: &str,
        key_id: &str,
    ) -> Result<(), ConsumerError> {
        self.journal.push(Event::Upsert {
            consumer: consumer.to_string(),
            name: name.to_string(),
        });
        let mut state = self.state.lock().unwrap();
        if state.fail_upsert.contains(consumer) {
            return Err(ConsumerError::new("upsert secret", consumer, "500 Internal Server Error"));
        }
        assert_eq!(key_id, format!("key-{}", consumer));
        state.secrets.insert(
            (consumer.to_string(), name.to_string()),
            encrypted_value.to_string(),
        );
        Ok(())
    }
}
