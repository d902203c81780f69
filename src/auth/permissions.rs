use std::collections::HashSet;
use std::fmt;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Portal modules gated by permissions. A closed enum: a typo in a module
/// name is a compile error, not a check that silently fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    Members,
    Events,
    Camps,
    Calendar,
    Reports,
    Settings,
}

impl Module {
    pub const ALL: [Module; 6] = [
        Module::Members,
        Module::Events,
        Module::Camps,
        Module::Calendar,
        Module::Reports,
        Module::Settings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Members => "members",
            Module::Events => "events",
            Module::Camps => "camps",
            Module::Calendar => "calendar",
            Module::Reports => "reports",
            Module::Settings => "settings",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
    Export,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Export => "export",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid permission string: {value:?}")]
pub struct PermissionParseError {
    pub value: String,
}

/// A capability token of the form `module.action`, validated at
/// construction so malformed strings cannot circulate and silently fail
/// checks open or closed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Permission(String);

impl Permission {
    pub fn new(value: &str) -> Result<Self, PermissionParseError> {
        let mut parts = value.split('.');
        let well_formed = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(module), Some(action), None)
                if Self::is_segment(module) && Self::is_segment(action)
        );
        if well_formed {
            Ok(Self(value.to_string()))
        } else {
            Err(PermissionParseError {
                value: value.to_string(),
            })
        }
    }

    pub fn for_action(module: Module, action: Action) -> Self {
        Self(format!("{}.{}", module.as_str(), action.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_segment(segment: &str) -> bool {
        !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == '_')
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Permission {
    type Error = PermissionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Permission::new(&value)
    }
}

impl From<Permission> for String {
    fn from(permission: Permission) -> Self {
        permission.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Passes every permission check unconditionally.
    SuperAdmin,
    MemberAdmin,
    EventAdmin,
    CampAdmin,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::MemberAdmin => "member_admin",
            Role::EventAdmin => "event_admin",
            Role::CampAdmin => "camp_admin",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed table resolving a module to the permissions that open it; any
/// one held permission grants access.
fn module_requirements(module: Module) -> Vec<Permission> {
    let pairs: &[(Module, Action)] = match module {
        Module::Members => &[(Module::Members, Action::View)],
        Module::Events => &[(Module::Events, Action::View)],
        Module::Camps => &[(Module::Camps, Action::View)],
        // The calendar renders events and camps, so either grant opens it.
        Module::Calendar => &[(Module::Events, Action::View), (Module::Camps, Action::View)],
        Module::Reports => &[(Module::Reports, Action::View), (Module::Reports, Action::Export)],
        Module::Settings => &[(Module::Settings, Action::View), (Module::Settings, Action::Edit)],
    };
    pairs
        .iter()
        .map(|(m, a)| Permission::for_action(*m, *a))
        .collect()
}

#[derive(Debug, Default)]
struct RegistryState {
    role: Option<Role>,
    permissions: HashSet<Permission>,
}

/// Holds the authenticated identity's role and permission set.
///
/// Rebuilt in full on every login and cleared on logout, so permissions
/// from a previous session can never leak into the next one.
#[derive(Debug, Default)]
pub struct PermissionRegistry {
    state: RwLock<RegistryState>,
}

impl PermissionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the registry contents with this identity's role and set.
    pub fn load(&self, role: Role, permissions: impl IntoIterator<Item = Permission>) {
        let mut state = self.state.write().unwrap();
        state.role = Some(role);
        state.permissions = permissions.into_iter().collect();
    }

    /// Empty the registry. Every subsequent check denies.
    pub fn clear(&self) {
        let mut state = self.state.write().unwrap();
        state.role = None;
        state.permissions.clear();
    }

    pub fn role(&self) -> Option<Role> {
        self.state.read().unwrap().role
    }

    pub fn has_permission(&self, permission: &Permission) -> bool {
        let state = self.state.read().unwrap();
        match state.role {
            Some(Role::SuperAdmin) => true,
            Some(_) => state.permissions.contains(permission),
            None => false,
        }
    }

    pub fn has_any(&self, permissions: &[Permission]) -> bool {
        permissions.iter().any(|p| self.has_permission(p))
    }

    pub fn has_all(&self, permissions: &[Permission]) -> bool {
        permissions.iter().all(|p| self.has_permission(p))
    }

    pub fn can_access_module(&self, module: Module) -> bool {
        self.has_any(&module_requirements(module))
    }

    pub fn can_perform_action(&self, module: Module, action: Action) -> bool {
        self.has_permission(&Permission::for_action(module, action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perms(specs: &[(Module, Action)]) -> Vec<Permission> {
        specs
            .iter()
            .map(|(m, a)| Permission::for_action(*m, *a))
            .collect()
    }

    #[test]
    fn test_permission_parsing() {
        assert!(Permission::new("members.view").is_ok());
        assert!(Permission::new("camp_admin.edit_all").is_ok());

        assert!(Permission::new("members").is_err());
        assert!(Permission::new("members.view.extra").is_err());
        assert!(Permission::new("Members.View").is_err());
        assert!(Permission::new("members.").is_err());
    }

    #[test]
    fn test_membership_checks() {
        let registry = PermissionRegistry::new();
        registry.load(
            Role::MemberAdmin,
            perms(&[(Module::Members, Action::View), (Module::Members, Action::Edit)]),
        );

        assert!(registry.has_permission(&Permission::for_action(Module::Members, Action::View)));
        assert!(!registry.has_permission(&Permission::for_action(Module::Events, Action::View)));
    }

    #[test]
    fn test_super_admin_overrides_everything() {
        let registry = PermissionRegistry::new();
        registry.load(Role::SuperAdmin, Vec::new());

        for module in Module::ALL {
            assert!(registry.can_access_module(module));
            assert!(registry.can_perform_action(module, Action::Delete));
        }
    }

    #[test]
    fn test_quantifiers() {
        let registry = PermissionRegistry::new();
        registry.load(Role::EventAdmin, perms(&[(Module::Events, Action::View)]));

        let both = perms(&[(Module::Events, Action::View), (Module::Events, Action::Edit)]);
        assert!(registry.has_any(&both));
        assert!(!registry.has_all(&both));
        assert!(!registry.has_any(&[]));
        assert!(registry.has_all(&[]));
    }

    #[test]
    fn test_module_table() {
        let registry = PermissionRegistry::new();
        registry.load(Role::CampAdmin, perms(&[(Module::Camps, Action::View)]));

        assert!(registry.can_access_module(Module::Camps));
        // Camps access opens the calendar too.
        assert!(registry.can_access_module(Module::Calendar));
        assert!(!registry.can_access_module(Module::Members));
        assert!(!registry.can_access_module(Module::Settings));
    }

    #[test]
    fn test_composite_action_check() {
        let registry = PermissionRegistry::new();
        registry.load(Role::MemberAdmin, perms(&[(Module::Members, Action::Edit)]));

        assert!(registry.can_perform_action(Module::Members, Action::Edit));
        assert!(!registry.can_perform_action(Module::Members, Action::Delete));
    }

    #[test]
    fn test_reload_replaces_previous_set() {
        let registry = PermissionRegistry::new();
        registry.load(Role::MemberAdmin, perms(&[(Module::Members, Action::View)]));
        registry.load(Role::EventAdmin, perms(&[(Module::Events, Action::View)]));

        // The first identity's grant must not survive the reload.
        assert!(!registry.has_permission(&Permission::for_action(Module::Members, Action::View)));
        assert!(registry.has_permission(&Permission::for_action(Module::Events, Action::View)));
    }

    #[test]
    fn test_clear_denies_everything() {
        let registry = PermissionRegistry::new();
        registry.load(Role::SuperAdmin, Vec::new());
        registry.clear();

        assert_eq!(registry.role(), None);
        assert!(!registry.can_access_module(Module::Members));
        assert!(!registry.has_permission(&Permission::for_action(Module::Members, Action::View)));
    }
}
