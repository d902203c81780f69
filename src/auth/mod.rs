//! Login/logout/password-change orchestration.
//!
//! [`AuthCoordinator`] is the entry point the portal's views call into.
//! It validates credentials against the locally-replicated catalog, owns
//! the session snapshot, wires the permission registry and idle clock
//! together, and leaves an audit trail behind every transition.

pub mod identity;
pub mod permissions;

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::security::audit::{AuditCategory, AuditTrail, ANONYMOUS_ACTOR};
use crate::security::rate_limit::RateLimiter;
use crate::security::session::{SessionClock, SessionClockConfig, SessionPhase};
use crate::security::store::SecureRecordStore;
use crate::security::validate::{self, PasswordPolicyViolation};
use crate::security::vault::CryptoVault;
use crate::storage::StorageBackend;

use identity::{AccountStatus, Identity, IdentityCatalog, SessionIdentity};
use permissions::PermissionRegistry;

const AUTHENTICATED_KEY: &str = "session_authenticated";
const SESSION_IDENTITY_KEY: &str = "session_identity";

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Login attempts allowed per username inside the window.
    pub max_login_attempts: usize,
    pub login_window: Duration,
    pub session: SessionClockConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            max_login_attempts: 5,
            login_window: Duration::seconds(60),
            session: SessionClockConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown user and wrong password are deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account is not active")]
    AccountInactive,
    #[error("too many login attempts")]
    RateLimited,
    #[error("no authenticated identity")]
    NotAuthenticated,
    #[error("current password does not match")]
    Reauthentication,
    #[error(transparent)]
    WeakPassword(#[from] PasswordPolicyViolation),
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// When set, no session was established: the caller must route to the
    /// change-password flow and the user logs in again afterwards.
    pub force_password_change: bool,
    pub identity: SessionIdentity,
}

/// The one owned snapshot of "who is signed in". Constructed per login,
/// replaced atomically on logout or re-login.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub identity: SessionIdentity,
    pub logged_in_at: DateTime<Utc>,
}

enum AuthState {
    Anonymous,
    Authenticated(AuthSession),
    PendingPasswordChange { username: String },
}

type SessionHook = Arc<dyn Fn() + Send + Sync>;

pub struct AuthCoordinator {
    store: SecureRecordStore,
    catalog: IdentityCatalog,
    audit: AuditTrail,
    limiter: RateLimiter,
    registry: Arc<PermissionRegistry>,
    state: Arc<Mutex<AuthState>>,
    clock: Mutex<Option<Arc<SessionClock>>>,
    warning_hook: Mutex<Option<SessionHook>>,
    expiry_hook: Mutex<Option<SessionHook>>,
    config: AuthConfig,
}

impl AuthCoordinator {
    pub fn new(backend: Arc<dyn StorageBackend>, config: AuthConfig) -> Self {
        Self::with_store(SecureRecordStore::new(backend, CryptoVault::new()), config)
    }

    /// Build over an existing store so collaborators (and tests) can share
    /// the same backend and session key.
    pub fn with_store(store: SecureRecordStore, config: AuthConfig) -> Self {
        Self {
            catalog: IdentityCatalog::new(store.clone()),
            audit: AuditTrail::new(store.clone()),
            store,
            limiter: RateLimiter::new(),
            registry: Arc::new(PermissionRegistry::new()),
            state: Arc::new(Mutex::new(AuthState::Anonymous)),
            clock: Mutex::new(None),
            warning_hook: Mutex::new(None),
            expiry_hook: Mutex::new(None),
            config,
        }
    }

    pub fn store(&self) -> &SecureRecordStore {
        &self.store
    }

    pub fn catalog(&self) -> &IdentityCatalog {
        &self.catalog
    }

    pub fn audit(&self) -> &AuditTrail {
        &self.audit
    }

    pub fn registry(&self) -> &PermissionRegistry {
        &self.registry
    }

    /// Install the warning affordance raised when the idle clock enters
    /// its warning window. Must be set before login to take effect for
    /// that session.
    pub fn on_session_warning(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.warning_hook.lock().unwrap() = Some(Arc::new(hook));
    }

    /// Install a hook fired after an idle timeout has torn the session down.
    pub fn on_session_expired(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.expiry_hook.lock().unwrap() = Some(Arc::new(hook));
    }

    pub fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        self.login_at(username, password, Utc::now())
    }

    pub fn login_at(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginOutcome, AuthError> {
        if !self.limiter.check_at(
            username,
            self.config.max_login_attempts,
            self.config.login_window,
            now,
        ) {
            self.audit.append_at(
                ANONYMOUS_ACTOR,
                "login_rate_limited",
                AuditCategory::Authentication,
                format!("throttled login attempts for {username:?}"),
                now,
            );
            return Err(AuthError::RateLimited);
        }

        let identity = match self.catalog.find(username) {
            Some(identity) if identity.credential == password => identity,
            _ => {
                self.audit.append_at(
                    ANONYMOUS_ACTOR,
                    "login_failure",
                    AuditCategory::Authentication,
                    format!("rejected login for {username:?}"),
                    now,
                );
                return Err(AuthError::InvalidCredentials);
            }
        };

        if identity.status != AccountStatus::Active {
            self.audit.append_at(
                ANONYMOUS_ACTOR,
                "login_inactive_account",
                AuditCategory::Authentication,
                format!("login for disabled account {username:?}"),
                now,
            );
            return Err(AuthError::AccountInactive);
        }

        let snapshot = SessionIdentity::from(&identity);

        if identity.force_password_change {
            *self.state.lock().unwrap() = AuthState::PendingPasswordChange {
                username: identity.username.clone(),
            };
            self.audit.append_at(
                &identity.username,
                "login_password_change_required",
                AuditCategory::Authentication,
                "credentials accepted, password change pending",
                now,
            );
            return Ok(LoginOutcome {
                force_password_change: true,
                identity: snapshot,
            });
        }

        self.establish_session(snapshot.clone(), now);
        self.audit.append_at(
            &snapshot.username,
            "login_success",
            AuditCategory::Authentication,
            format!("signed in as {}", snapshot.display_name),
            now,
        );
        tracing::debug!(username = %snapshot.username, "login established");

        Ok(LoginOutcome {
            force_password_change: false,
            identity: snapshot,
        })
    }

    pub fn logout(&self) {
        self.logout_at(Utc::now());
    }

    pub fn logout_at(&self, now: DateTime<Utc>) {
        // Audit first, while the identity is still known.
        let actor = self.current_actor();
        self.audit.append_at(
            &actor,
            "logout",
            AuditCategory::Authentication,
            "signed out",
            now,
        );

        Self::clear_session_state(&self.state, &self.registry, &self.store);
        if let Some(clock) = self.clock.lock().unwrap().take() {
            clock.stop();
        }
        tracing::debug!(%actor, "logout complete");
    }

    pub fn change_password(&self, current: &str, new: &str) -> Result<(), AuthError> {
        self.change_password_at(current, new, Utc::now())
    }

    pub fn change_password_at(
        &self,
        current: &str,
        new: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let username = match &*self.state.lock().unwrap() {
            AuthState::Authenticated(session) => session.identity.username.clone(),
            AuthState::PendingPasswordChange { username } => username.clone(),
            AuthState::Anonymous => return Err(AuthError::NotAuthenticated),
        };

        let mut identity = self
            .catalog
            .find(&username)
            .ok_or(AuthError::NotAuthenticated)?;

        if identity.credential != current {
            self.audit.append_at(
                &username,
                "password_change_rejected",
                AuditCategory::Account,
                "current credential mismatch",
                now,
            );
            return Err(AuthError::Reauthentication);
        }

        validate::validate_password(new)?;

        identity.credential = new.to_string();
        identity.force_password_change = false;
        self.catalog.upsert(identity);
        self.audit.append_at(
            &username,
            "password_changed",
            AuditCategory::Account,
            "credential updated",
            now,
        );

        // A forced change never establishes the session; the user signs in
        // again with the new credential.
        let mut state = self.state.lock().unwrap();
        if matches!(&*state, AuthState::PendingPasswordChange { .. }) {
            *state = AuthState::Anonymous;
        }
        Ok(())
    }

    /// Rebuild the session from the persisted flag and snapshot, as on a
    /// page reload. Fails closed: a flag without a decryptable snapshot
    /// clears both and reports false.
    pub fn try_restore(&self) -> bool {
        self.try_restore_at(Utc::now())
    }

    pub fn try_restore_at(&self, now: DateTime<Utc>) -> bool {
        if !matches!(&*self.state.lock().unwrap(), AuthState::Anonymous) {
            return false;
        }

        let flagged = self.store.get::<bool>(AUTHENTICATED_KEY).unwrap_or(false);
        if !flagged {
            return false;
        }

        match self.store.get_secure::<SessionIdentity>(SESSION_IDENTITY_KEY) {
            Some(snapshot) => {
                let username = snapshot.username.clone();
                self.establish_session(snapshot, now);
                self.audit.append_at(
                    &username,
                    "session_restored",
                    AuditCategory::Session,
                    "snapshot restored from storage",
                    now,
                );
                true
            }
            None => {
                self.store.remove(AUTHENTICATED_KEY);
                self.store.remove(SESSION_IDENTITY_KEY);
                false
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(&*self.state.lock().unwrap(), AuthState::Authenticated(_))
    }

    pub fn is_pending_password_change(&self) -> bool {
        matches!(
            &*self.state.lock().unwrap(),
            AuthState::PendingPasswordChange { .. }
        )
    }

    pub fn current_identity(&self) -> Option<SessionIdentity> {
        match &*self.state.lock().unwrap() {
            AuthState::Authenticated(session) => Some(session.identity.clone()),
            _ => None,
        }
    }

    /// Forward a tracked user interaction to the idle clock.
    pub fn record_activity(&self, now: DateTime<Utc>) {
        if let Some(clock) = self.current_clock() {
            clock.record_activity(now);
        }
    }

    /// "Stay signed in" from the warning affordance.
    pub fn extend_session(&self, now: DateTime<Utc>) {
        if let Some(clock) = self.current_clock() {
            clock.extend(now);
        }
    }

    /// Run one idle check. Hosts without a tokio runtime call this on
    /// their own cadence; otherwise the spawned ticker covers it.
    pub fn poll_session(&self, now: DateTime<Utc>) {
        // The slot lock is released before polling so hooks fired by the
        // poll may call back into the coordinator.
        if let Some(clock) = self.current_clock() {
            clock.poll(now);
        }
    }

    pub fn session_phase(&self) -> Option<SessionPhase> {
        self.current_clock().map(|clock| clock.phase())
    }

    fn current_clock(&self) -> Option<Arc<SessionClock>> {
        self.clock.lock().unwrap().clone()
    }

    /// Admin CRUD surface over the identity catalog; writes are audited.
    pub fn save_identity(&self, identity: Identity) -> bool {
        let username = identity.username.clone();
        let saved = self.catalog.upsert(identity);
        if saved {
            self.audit.append(
                &self.current_actor(),
                "identity_saved",
                AuditCategory::Account,
                format!("identity {username:?} saved"),
            );
        }
        saved
    }

    pub fn delete_identity(&self, username: &str) -> bool {
        let removed = self.catalog.remove(username);
        if removed {
            self.audit.append(
                &self.current_actor(),
                "identity_removed",
                AuditCategory::Account,
                format!("identity {username:?} removed"),
            );
        }
        removed
    }

    fn current_actor(&self) -> String {
        match &*self.state.lock().unwrap() {
            AuthState::Authenticated(session) => session.identity.username.clone(),
            _ => ANONYMOUS_ACTOR.to_string(),
        }
    }

    fn establish_session(&self, snapshot: SessionIdentity, now: DateTime<Utc>) {
        // The registry is fully populated before login returns, so a
        // check made immediately after observes this identity's set.
        self.registry
            .load(snapshot.role, snapshot.permissions.iter().cloned());
        self.store.set(AUTHENTICATED_KEY, &true);
        self.store.set_secure(SESSION_IDENTITY_KEY, &snapshot);

        let username = snapshot.username.clone();
        *self.state.lock().unwrap() = AuthState::Authenticated(AuthSession {
            identity: snapshot,
            logged_in_at: now,
        });
        self.start_clock(username, now);
    }

    fn start_clock(&self, username: String, now: DateTime<Utc>) {
        if let Some(previous) = self.clock.lock().unwrap().take() {
            previous.stop();
        }

        let warning_hook = self.warning_hook.lock().unwrap().clone();
        let on_warning = move || {
            tracing::debug!("session idle warning raised");
            if let Some(hook) = &warning_hook {
                hook();
            }
        };

        let state = Arc::clone(&self.state);
        let registry = Arc::clone(&self.registry);
        let store = self.store.clone();
        let audit = self.audit.clone();
        let expiry_hook = self.expiry_hook.lock().unwrap().clone();
        let on_expiry = move || {
            // Same ordering as logout: audit while the actor is known.
            audit.append(
                &username,
                "session_expired",
                AuditCategory::Session,
                "idle timeout reached",
            );
            Self::clear_session_state(&state, &registry, &store);
            if let Some(hook) = &expiry_hook {
                hook();
            }
        };

        let clock = SessionClock::new(self.config.session.clone(), now, on_warning, on_expiry);
        clock.start_ticker();
        *self.clock.lock().unwrap() = Some(Arc::new(clock));
    }

    fn clear_session_state(
        state: &Mutex<AuthState>,
        registry: &PermissionRegistry,
        store: &SecureRecordStore,
    ) {
        *state.lock().unwrap() = AuthState::Anonymous;
        registry.clear();
        store.remove(AUTHENTICATED_KEY);
        store.remove(SESSION_IDENTITY_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::permissions::{Action, Module, Permission, Role};
    use crate::storage::MemoryBackend;

    fn seeded_coordinator() -> AuthCoordinator {
        let coordinator = AuthCoordinator::new(MemoryBackend::shared(), AuthConfig::default());

        coordinator.catalog().upsert(Identity {
            username: "ada".to_string(),
            display_name: "Ada Lovelace".to_string(),
            role: Role::MemberAdmin,
            permissions: vec![
                Permission::for_action(Module::Members, Action::View),
                Permission::for_action(Module::Members, Action::Edit),
            ],
            status: AccountStatus::Active,
            credential: "Secret12".to_string(),
            force_password_change: false,
        });
        coordinator.catalog().upsert(Identity {
            username: "grace".to_string(),
            display_name: "Grace Hopper".to_string(),
            role: Role::EventAdmin,
            permissions: vec![Permission::for_action(Module::Events, Action::View)],
            status: AccountStatus::Suspended,
            credential: "Secret12".to_string(),
            force_password_change: false,
        });
        coordinator.catalog().upsert(Identity {
            username: "lin".to_string(),
            display_name: "Lin Chen".to_string(),
            role: Role::CampAdmin,
            permissions: vec![Permission::for_action(Module::Camps, Action::View)],
            status: AccountStatus::Active,
            credential: "Initial1".to_string(),
            force_password_change: true,
        });

        coordinator
    }

    #[test]
    fn test_login_success_populates_everything() {
        let coordinator = seeded_coordinator();

        let outcome = coordinator.login("ada", "Secret12").unwrap();
        assert!(!outcome.force_password_change);
        assert!(coordinator.is_authenticated());

        // Permission checks immediately after login observe the new set.
        let registry = coordinator.registry();
        assert!(registry.has_permission(&Permission::for_action(Module::Members, Action::Edit)));
        assert!(!registry.has_permission(&Permission::for_action(Module::Events, Action::View)));
        assert_eq!(coordinator.session_phase(), Some(SessionPhase::Active));

        let entries = coordinator.audit().recent(1);
        assert_eq!(entries[0].action, "login_success");
        assert_eq!(entries[0].actor, "ada");
    }

    #[test]
    fn test_invalid_credentials_leave_no_state() {
        let coordinator = seeded_coordinator();

        // Wrong password and unknown user fail identically.
        assert!(matches!(
            coordinator.login("ada", "WrongPw1"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            coordinator.login("nobody", "Secret12"),
            Err(AuthError::InvalidCredentials)
        ));

        assert!(!coordinator.is_authenticated());
        assert!(!coordinator
            .registry()
            .has_permission(&Permission::for_action(Module::Members, Action::View)));
        assert_eq!(coordinator.store().get::<bool>("session_authenticated"), None);
        assert_eq!(coordinator.audit().recent(1)[0].actor, "anonymous");
    }

    #[test]
    fn test_inactive_account_is_distinguished() {
        let coordinator = seeded_coordinator();
        let result = coordinator.login("grace", "Secret12");
        assert!(matches!(result, Err(AuthError::AccountInactive)));
        assert!(!coordinator.is_authenticated());
    }

    #[test]
    fn test_forced_password_change_establishes_no_session() {
        let coordinator = seeded_coordinator();

        let outcome = coordinator.login("lin", "Initial1").unwrap();
        assert!(outcome.force_password_change);
        assert!(!coordinator.is_authenticated());
        assert!(coordinator.is_pending_password_change());
        assert!(!coordinator.registry().can_access_module(Module::Camps));
        assert_eq!(coordinator.session_phase(), None);
    }

    #[test]
    fn test_login_rate_limit() {
        let coordinator = seeded_coordinator();
        let start = Utc::now();

        for i in 0..5 {
            let at = start + Duration::milliseconds(i * 10);
            assert!(matches!(
                coordinator.login_at("ada", "WrongPw1", at),
                Err(AuthError::InvalidCredentials)
            ));
        }

        // Even the correct password is throttled inside the window.
        let throttled = coordinator.login_at("ada", "Secret12", start + Duration::seconds(1));
        assert!(matches!(throttled, Err(AuthError::RateLimited)));

        // The window slides clear and login succeeds again.
        let later = coordinator.login_at("ada", "Secret12", start + Duration::seconds(61));
        assert!(later.is_ok());
    }

    #[test]
    fn test_logout_clears_everything_and_audits_first() {
        let coordinator = seeded_coordinator();
        coordinator.login("ada", "Secret12").unwrap();
        coordinator.logout();

        assert!(!coordinator.is_authenticated());
        assert!(!coordinator
            .registry()
            .has_permission(&Permission::for_action(Module::Members, Action::View)));
        assert_eq!(coordinator.store().get::<bool>("session_authenticated"), None);
        assert_eq!(coordinator.session_phase(), None);

        // Actor recorded as the signed-in user proves the entry was
        // written before the identity was cleared.
        let entries = coordinator.audit().recent(1);
        assert_eq!(entries[0].action, "logout");
        assert_eq!(entries[0].actor, "ada");
    }

    #[test]
    fn test_logout_is_safe_when_anonymous() {
        let coordinator = seeded_coordinator();
        coordinator.logout();
        assert_eq!(coordinator.audit().recent(1)[0].actor, "anonymous");
    }

    #[test]
    fn test_change_password_requires_identity() {
        let coordinator = seeded_coordinator();
        assert!(matches!(
            coordinator.change_password("Secret12", "Another1A"),
            Err(AuthError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_change_password_rejects_mismatch_and_weakness() {
        let coordinator = seeded_coordinator();
        coordinator.login("ada", "Secret12").unwrap();

        assert!(matches!(
            coordinator.change_password("WrongPw1", "Another1A"),
            Err(AuthError::Reauthentication)
        ));
        assert!(matches!(
            coordinator.change_password("Secret12", "weak"),
            Err(AuthError::WeakPassword(_))
        ));

        // Catalog untouched by the failed attempts.
        assert_eq!(coordinator.catalog().find("ada").unwrap().credential, "Secret12");
    }

    #[test]
    fn test_change_password_success() {
        let coordinator = seeded_coordinator();
        coordinator.login("ada", "Secret12").unwrap();
        coordinator.change_password("Secret12", "Another1A").unwrap();

        let stored = coordinator.catalog().find("ada").unwrap();
        assert_eq!(stored.credential, "Another1A");
        assert!(coordinator.is_authenticated());
        assert_eq!(coordinator.audit().recent(1)[0].action, "password_changed");
    }

    #[test]
    fn test_forced_change_flow_returns_to_login() {
        let coordinator = seeded_coordinator();

        coordinator.login("lin", "Initial1").unwrap();
        coordinator.change_password("Initial1", "Fresh2Start").unwrap();

        // The forced flow ends anonymous; the new credential signs in and
        // the flag is gone.
        assert!(!coordinator.is_pending_password_change());
        assert!(!coordinator.is_authenticated());

        let outcome = coordinator.login("lin", "Fresh2Start").unwrap();
        assert!(!outcome.force_password_change);
        assert!(coordinator.is_authenticated());
    }

    #[test]
    fn test_session_expiry_tears_down_session() {
        let coordinator = seeded_coordinator();
        let start = Utc::now();

        coordinator.login_at("ada", "Secret12", start).unwrap();
        coordinator.poll_session(start + Duration::milliseconds(1_800_001));

        assert!(!coordinator.is_authenticated());
        assert!(!coordinator.registry().can_access_module(Module::Members));
        assert_eq!(coordinator.store().get::<bool>("session_authenticated"), None);

        let actions: Vec<String> = coordinator
            .audit()
            .recent(10)
            .into_iter()
            .map(|entry| entry.action)
            .collect();
        assert!(actions.contains(&"session_expired".to_string()));
    }

    #[test]
    fn test_activity_defers_expiry() {
        let coordinator = seeded_coordinator();
        let start = Utc::now();

        coordinator.login_at("ada", "Secret12", start).unwrap();
        coordinator.record_activity(start + Duration::seconds(1700));
        coordinator.poll_session(start + Duration::milliseconds(1_800_001));

        assert!(coordinator.is_authenticated());
        assert_eq!(coordinator.session_phase(), Some(SessionPhase::Active));
    }

    #[test]
    fn test_warning_hook_fires() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let coordinator = seeded_coordinator();
        let warned = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&warned);
        coordinator.on_session_warning(move || flag.store(true, Ordering::SeqCst));

        let start = Utc::now();
        coordinator.login_at("ada", "Secret12", start).unwrap();
        coordinator.poll_session(start + Duration::milliseconds(1_500_001));

        assert!(warned.load(Ordering::SeqCst));
        assert_eq!(coordinator.session_phase(), Some(SessionPhase::Warning));
        assert!(coordinator.is_authenticated());
    }

    #[test]
    fn test_restore_round_trip_with_shared_store() {
        let coordinator = seeded_coordinator();
        coordinator.login("ada", "Secret12").unwrap();

        // A second coordinator over the same store and session key sees
        // the persisted snapshot.
        let restored =
            AuthCoordinator::with_store(coordinator.store().clone(), AuthConfig::default());
        assert!(restored.try_restore());
        assert!(restored.is_authenticated());
        assert!(restored
            .registry()
            .has_permission(&Permission::for_action(Module::Members, Action::View)));
    }

    #[test]
    fn test_restore_fails_closed_without_key() {
        let backend = MemoryBackend::shared();
        let coordinator = AuthCoordinator::new(backend.clone(), AuthConfig::default());

        coordinator.catalog().upsert(Identity {
            username: "ada".to_string(),
            display_name: "Ada Lovelace".to_string(),
            role: Role::MemberAdmin,
            permissions: Vec::new(),
            status: AccountStatus::Active,
            credential: "Secret12".to_string(),
            force_password_change: false,
        });
        coordinator.login("ada", "Secret12").unwrap();

        // A new process gets a fresh session key: the snapshot no longer
        // decrypts, so restore clears the stale flag and denies.
        let fresh = AuthCoordinator::new(backend, AuthConfig::default());
        assert!(!fresh.try_restore());
        assert!(!fresh.is_authenticated());
        assert_eq!(fresh.store().get::<bool>("session_authenticated"), None);
    }

    #[test]
    fn test_identity_admin_surface_is_audited() {
        let coordinator = seeded_coordinator();
        coordinator.login("ada", "Secret12").unwrap();

        assert!(coordinator.delete_identity("grace"));
        let entries = coordinator.audit().recent(1);
        assert_eq!(entries[0].action, "identity_removed");
        assert_eq!(entries[0].actor, "ada");
        assert!(coordinator.catalog().find("grace").is_none());
    }
}
