use serde::{Deserialize, Serialize};

use crate::auth::permissions::{Permission, Role};
use crate::security::store::SecureRecordStore;

const CATALOG_KEY: &str = "identities";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Inactive,
    Suspended,
}

/// A stored credential record. Usernames are unique and compared
/// case-sensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub permissions: Vec<Permission>,
    pub status: AccountStatus,
    /// Reference credential, compared verbatim at login. Deployments must
    /// replace this comparison with a server-verified exchange.
    pub credential: String,
    /// Set by an administrator to force a password change at next login.
    pub force_password_change: bool,
}

/// The logged-in snapshot cached for the duration of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub permissions: Vec<Permission>,
}

impl From<&Identity> for SessionIdentity {
    fn from(identity: &Identity) -> Self {
        Self {
            username: identity.username.clone(),
            display_name: identity.display_name.clone(),
            role: identity.role,
            permissions: identity.permissions.clone(),
        }
    }
}

/// The locally-replicated identity catalog, persisted through the secure
/// path because it carries credentials. The admin CRUD screens edit it;
/// the coordinator reads it at login.
#[derive(Clone)]
pub struct IdentityCatalog {
    store: SecureRecordStore,
}

impl IdentityCatalog {
    pub fn new(store: SecureRecordStore) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Vec<Identity> {
        self.store.get_secure(CATALOG_KEY).unwrap_or_default()
    }

    pub fn find(&self, username: &str) -> Option<Identity> {
        self.list()
            .into_iter()
            .find(|identity| identity.username == username)
    }

    /// Insert or replace the identity with the same username.
    pub fn upsert(&self, identity: Identity) -> bool {
        let mut identities = self.list();
        match identities
            .iter_mut()
            .find(|existing| existing.username == identity.username)
        {
            Some(existing) => *existing = identity,
            None => identities.push(identity),
        }
        self.store.set_secure(CATALOG_KEY, &identities)
    }

    /// Remove by username. Returns false when no such identity exists or
    /// the catalog could not be persisted.
    pub fn remove(&self, username: &str) -> bool {
        let mut identities = self.list();
        let before = identities.len();
        identities.retain(|identity| identity.username != username);
        if identities.len() == before {
            return false;
        }
        self.store.set_secure(CATALOG_KEY, &identities)
    }
}
