use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::security::store::SecureRecordStore;

const AUDIT_LOG_KEY: &str = "audit_log";

/// Actor recorded when no identity is established.
pub const ANONYMOUS_ACTOR: &str = "anonymous";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditCategory {
    Authentication,
    Authorization,
    Account,
    Session,
    Storage,
}

/// One durable audit record. Entries are append-only: nothing in this
/// crate mutates or deletes them once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub actor: String,
    pub action: String,
    pub category: AuditCategory,
    pub description: String,
}

/// Append-only audit trail persisted through the record store's plain
/// path. The trail is the portal's only durable side channel besides the
/// encrypted records themselves.
#[derive(Clone)]
pub struct AuditTrail {
    store: SecureRecordStore,
}

impl AuditTrail {
    pub fn new(store: SecureRecordStore) -> Self {
        Self { store }
    }

    /// Append an entry. A storage failure drops the entry silently — the
    /// trail never blocks the operation it describes.
    pub fn append(
        &self,
        actor: &str,
        action: &str,
        category: AuditCategory,
        description: impl Into<String>,
    ) -> AuditEntry {
        self.append_at(actor, action, category, description, Utc::now())
    }

    pub fn append_at(
        &self,
        actor: &str,
        action: &str,
        category: AuditCategory,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> AuditEntry {
        let entry = AuditEntry {
            id: Uuid::new_v4(),
            timestamp: now,
            actor: actor.to_string(),
            action: action.to_string(),
            category,
            description: description.into(),
        };

        let mut entries = self.load();
        entries.push(entry.clone());
        if !self.store.set(AUDIT_LOG_KEY, &entries) {
            tracing::warn!(action, "audit entry could not be persisted");
        }
        entry
    }

    /// The most recent `limit` entries, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let entries = self.load();
        let skip = entries.len().saturating_sub(limit);
        entries.into_iter().skip(skip).collect()
    }

    /// Entries whose timestamp falls inside `[start, end]`.
    pub fn entries_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<AuditEntry> {
        self.load()
            .into_iter()
            .filter(|entry| entry.timestamp >= start && entry.timestamp <= end)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.load().is_empty()
    }

    fn load(&self) -> Vec<AuditEntry> {
        self.store.get(AUDIT_LOG_KEY).unwrap_or_default()
    }
}
