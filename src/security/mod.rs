//! Security primitives for the member administration portal:
//!
//! - Authenticated encryption over a per-session key (`vault`)
//! - Key-prefixed persistent storage with an encrypted path (`store`)
//! - Input, password and CSRF validation (`validate`)
//! - Sliding-window login throttling (`rate_limit`)
//! - Idle-session warning and expiry (`session`)
//! - Append-only audit trail (`audit`)

pub mod audit;
pub mod rate_limit;
pub mod session;
pub mod store;
pub mod validate;
pub mod vault;

pub use audit::{AuditCategory, AuditEntry, AuditTrail, ANONYMOUS_ACTOR};
pub use rate_limit::RateLimiter;
pub use session::{SessionClock, SessionClockConfig, SessionPhase};
pub use store::{SecureRecordStore, APP_KEY_PREFIX};
pub use validate::{
    generate_csrf_token, password_report, validate_csrf_token, validate_input, validate_password,
    CsrfRegistry, InputKind, PasswordPolicyViolation, PasswordReport, CSRF_TOKEN_LEN,
};
pub use vault::{CryptoVault, EncryptedBlob, KeySlot, VaultError};
