//! Access-control core for the member administration portal.
//!
//! This crate carries the portal's authentication, permission gating,
//! idle-session lifecycle and encrypted local persistence. The
//! surrounding views (calendar, member/event/camp CRUD screens) are
//! collaborators: they call [`auth::AuthCoordinator`] to sign users in
//! and out, ask [`auth::permissions::PermissionRegistry`] what to render
//! or enable, and read and write records through
//! [`security::SecureRecordStore`].

pub mod auth;
pub mod security;
pub mod storage;
pub mod view;

pub use auth::{
    AuthConfig, AuthCoordinator, AuthError, AuthSession, LoginOutcome,
    identity::{AccountStatus, Identity, IdentityCatalog, SessionIdentity},
    permissions::{Action, Module, Permission, PermissionRegistry, Role},
};
pub use security::{
    AuditCategory, AuditEntry, AuditTrail, CryptoVault, CsrfRegistry, EncryptedBlob, InputKind,
    RateLimiter, SecureRecordStore, SessionClock, SessionClockConfig, SessionPhase, VaultError,
};
pub use storage::{FileBackend, MemoryBackend, StorageBackend};
pub use view::{apply_visibility, GatedView, Requirement, ViewDecision, ViewOutcome};
