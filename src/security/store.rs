use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::security::vault::{CryptoVault, EncryptedBlob};
use crate::storage::StorageBackend;

/// Fixed application prefix applied to every persisted key so the portal
/// never collides with unrelated data sharing the same storage origin.
pub const APP_KEY_PREFIX: &str = "mp_";

/// Key-prefixed persistent store. Sensitive records go through the
/// [`CryptoVault`]; non-sensitive records are persisted as plain JSON.
///
/// Failures never escape this boundary: writes report `false`, reads
/// report `None`. A caller cannot distinguish a value that was never
/// written from one that was corrupted — absence and corruption are
/// deliberately the same observation (fail-closed).
#[derive(Clone)]
pub struct SecureRecordStore {
    backend: Arc<dyn StorageBackend>,
    vault: CryptoVault,
}

impl SecureRecordStore {
    pub fn new(backend: Arc<dyn StorageBackend>, vault: CryptoVault) -> Self {
        Self { backend, vault }
    }

    pub fn vault(&self) -> &CryptoVault {
        &self.vault
    }

    /// Encrypt then persist a value. Returns false on serialization or
    /// storage failure.
    pub fn set_secure<T: Serialize>(&self, key: &str, value: &T) -> bool {
        let blob = match self.vault.encrypt(value) {
            Ok(blob) => blob,
            Err(err) => {
                tracing::debug!(key, %err, "secure write dropped");
                return false;
            }
        };
        let payload = match serde_json::to_string(&blob) {
            Ok(payload) => payload,
            Err(_) => return false,
        };
        self.backend.set_item(&self.prefixed(key), &payload)
    }

    /// Read and decrypt a value. Missing key, malformed payload and
    /// decryption failure are all `None`.
    pub fn get_secure<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let payload = self.backend.get_item(&self.prefixed(key))?;
        let blob: EncryptedBlob = serde_json::from_str(&payload).ok()?;
        match self.vault.decrypt(&blob) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::debug!(key, "secure read failed, treating as absent");
                None
            }
        }
    }

    /// Persist a non-sensitive value as plain JSON.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> bool {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(_) => return false,
        };
        self.backend.set_item(&self.prefixed(key), &payload)
    }

    /// Read a non-sensitive value. Same null-on-failure contract as the
    /// secure path.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let payload = self.backend.get_item(&self.prefixed(key))?;
        serde_json::from_str(&payload).ok()
    }

    pub fn remove(&self, key: &str) {
        self.backend.remove_item(&self.prefixed(key));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.backend.get_item(&self.prefixed(key)).is_some()
    }

    /// Remove every key carrying the application prefix, leaving foreign
    /// data in the shared backend untouched.
    pub fn clear_prefixed(&self) {
        for key in self.backend.keys() {
            if key.starts_with(APP_KEY_PREFIX) {
                self.backend.remove_item(&key);
            }
        }
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{APP_KEY_PREFIX}{key}")
    }
}
