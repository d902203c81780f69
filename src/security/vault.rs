use std::sync::{Arc, Mutex};

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tab-scoped slot holding the symmetric key for the current browsing
/// session. The slot starts empty and is filled at most once; concurrent
/// callers racing on first use all observe the key written by the winner.
#[derive(Debug, Default)]
pub struct KeySlot {
    slot: Mutex<Option<[u8; 32]>>,
}

impl KeySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare-and-set: returns the stored key, generating one only if the
    /// slot is still empty.
    fn get_or_init(&self) -> [u8; 32] {
        let mut slot = self.slot.lock().unwrap();
        match *slot {
            Some(key) => key,
            None => {
                let key: [u8; 32] = Aes256Gcm::generate_key(&mut OsRng).into();
                *slot = Some(key);
                key
            }
        }
    }

    fn replace(&self) -> [u8; 32] {
        let key: [u8; 32] = Aes256Gcm::generate_key(&mut OsRng).into();
        *self.slot.lock().unwrap() = Some(key);
        key
    }
}

#[derive(Debug, Error)]
pub enum VaultError {
    /// Tampered ciphertext, wrong key, or a malformed blob. Callers treat
    /// this as "value absent", never as a crash.
    #[error("decryption failed")]
    Decryption,
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Authenticated ciphertext plus the nonce it was sealed with, both
/// base64-encoded for JSON transport. A blob decrypts only under the key
/// that produced it; rotating the key strands every prior blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedBlob {
    pub ciphertext: String,
    pub nonce: String,
}

/// AES-256-GCM vault over the per-session [`KeySlot`].
#[derive(Debug, Clone)]
pub struct CryptoVault {
    slot: Arc<KeySlot>,
}

impl CryptoVault {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(KeySlot::new()),
        }
    }

    /// Build a vault over an existing slot so several components share one
    /// session key.
    pub fn with_slot(slot: Arc<KeySlot>) -> Self {
        Self { slot }
    }

    /// Returns the session key, generating and storing it on first use.
    /// Idempotent: every call in the same session yields the same bytes.
    pub fn get_or_create_key(&self) -> [u8; 32] {
        self.slot.get_or_init()
    }

    /// Replace the session key. Blobs sealed under the previous key become
    /// undecryptable; there is deliberately no re-encryption path.
    pub fn rotate_key(&self) {
        self.slot.replace();
        tracing::debug!("session key rotated");
    }

    /// Serialize and seal a value under the session key with a fresh
    /// random 96-bit nonce.
    pub fn encrypt<T: Serialize>(&self, value: &T) -> Result<EncryptedBlob, VaultError> {
        let plaintext = serde_json::to_vec(value)?;
        let cipher = self.cipher();

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_slice())
            .map_err(|_| VaultError::Decryption)?;

        Ok(EncryptedBlob {
            ciphertext: STANDARD.encode(ciphertext),
            nonce: STANDARD.encode(nonce),
        })
    }

    /// Authenticate, decrypt and deserialize a blob. Any tampering, key
    /// mismatch or malformed field maps to [`VaultError::Decryption`].
    pub fn decrypt<T: DeserializeOwned>(&self, blob: &EncryptedBlob) -> Result<T, VaultError> {
        let ciphertext = STANDARD
            .decode(&blob.ciphertext)
            .map_err(|_| VaultError::Decryption)?;
        let nonce_bytes = STANDARD
            .decode(&blob.nonce)
            .map_err(|_| VaultError::Decryption)?;

        if nonce_bytes.len() != 12 {
            return Err(VaultError::Decryption);
        }

        let cipher = self.cipher();
        let plaintext = cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_slice())
            .map_err(|_| VaultError::Decryption)?;

        serde_json::from_slice(&plaintext).map_err(|_| VaultError::Decryption)
    }

    fn cipher(&self) -> Aes256Gcm {
        let key_bytes = self.get_or_create_key();
        let key = Key::<Aes256Gcm>::from_slice(&key_bytes);
        Aes256Gcm::new(key)
    }
}

impl Default for CryptoVault {
    fn default() -> Self {
        Self::new()
    }
}
