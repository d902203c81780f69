//! Permission-driven visibility decisions for declared view nodes.
//!
//! The portal declares which of its elements are permission-gated; this
//! module answers, per node, whether it renders, hides, or stays visible
//! but disabled with a reason for assistive display. A deliberate,
//! caller-invoked pass over a known node set — nothing here observes or
//! patches a document tree.

use crate::auth::permissions::{Action, Module, Permission, PermissionRegistry, Role};

/// What a gated node demands before it is shown or enabled.
#[derive(Debug, Clone)]
pub enum Requirement {
    Permission(Permission),
    /// Any of the listed roles. The top-level administrative role passes
    /// regardless of the list.
    AnyRole(Vec<Role>),
    Action(Module, Action),
}

/// A declared permission-gated view node.
#[derive(Debug, Clone)]
pub struct GatedView {
    pub id: String,
    pub requirement: Requirement,
    /// Action-bound controls are disabled rather than hidden when the
    /// check fails, so the rejection reason can be surfaced.
    pub action_bound: bool,
}

impl GatedView {
    /// A node that disappears entirely when the requirement fails.
    pub fn section(id: impl Into<String>, requirement: Requirement) -> Self {
        Self {
            id: id.into(),
            requirement,
            action_bound: false,
        }
    }

    /// An action-bound control that stays visible but disabled.
    pub fn control(id: impl Into<String>, requirement: Requirement) -> Self {
        Self {
            id: id.into(),
            requirement,
            action_bound: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewOutcome {
    Visible,
    Hidden,
    Disabled { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewDecision {
    pub id: String,
    pub outcome: ViewOutcome,
}

/// Evaluate every declared node against the registry.
pub fn apply_visibility(registry: &PermissionRegistry, views: &[GatedView]) -> Vec<ViewDecision> {
    views
        .iter()
        .map(|view| {
            let outcome = if requirement_met(registry, &view.requirement) {
                ViewOutcome::Visible
            } else if view.action_bound {
                ViewOutcome::Disabled {
                    reason: rejection_reason(&view.requirement),
                }
            } else {
                ViewOutcome::Hidden
            };
            ViewDecision {
                id: view.id.clone(),
                outcome,
            }
        })
        .collect()
}

fn requirement_met(registry: &PermissionRegistry, requirement: &Requirement) -> bool {
    match requirement {
        Requirement::Permission(permission) => registry.has_permission(permission),
        Requirement::AnyRole(roles) => match registry.role() {
            Some(Role::SuperAdmin) => true,
            Some(role) => roles.contains(&role),
            None => false,
        },
        Requirement::Action(module, action) => registry.can_perform_action(*module, *action),
    }
}

fn rejection_reason(requirement: &Requirement) -> String {
    match requirement {
        Requirement::Permission(permission) => {
            format!("requires permission {permission}")
        }
        Requirement::AnyRole(roles) => {
            let names: Vec<&str> = roles.iter().map(Role::as_str).collect();
            format!("requires one of roles: {}", names.join(", "))
        }
        Requirement::Action(module, action) => {
            format!("requires permission {module}.{action}")
        }
    }
}
