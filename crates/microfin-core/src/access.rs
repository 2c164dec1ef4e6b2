//! # Access Guard
//!
//! The predicate evaluated for every protected view and navigation item.
//!
//! An [`AccessRequirement`] has two optional filters that compose with AND:
//!
//! 1. **Role allow-list**: the session's role must be a member.
//! 2. **Permission**: the session must hold the permission.
//!
//! A missing filter is vacuously satisfied. The super-administrator bypasses
//! the permission filter; whether it also bypasses role allow-lists is set by
//! [`SuperAdminScope`].
//!
//! The guard is stateless and never fails: absent session data is a denial.

use crate::session::{Session, SessionState};
use crate::types::{Permission, Role};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// REQUIREMENT
// =============================================================================

/// What a view or navigation item demands of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequirement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<Permission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<BTreeSet<Role>>,
}

impl AccessRequirement {
    /// No requirement at all.
    #[must_use]
    pub fn open() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn permission(permission: Permission) -> Self {
        Self {
            permission: Some(permission),
            roles: None,
        }
    }

    #[must_use]
    pub fn roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            permission: None,
            roles: Some(roles.into_iter().collect()),
        }
    }

    /// Add a role allow-list to an existing requirement.
    #[must_use]
    pub fn and_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles = Some(roles.into_iter().collect());
        self
    }

    /// True when neither filter is present.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.permission.is_none() && self.roles.is_none()
    }
}

/// A requirement as page collaborators spell it: plain strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRequirement {
    #[serde(default)]
    pub permission: Option<String>,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
}

/// Outcome of resolving a [`RawRequirement`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequirement {
    /// `None` when the requirement names a permission nobody can hold.
    pub requirement: Option<AccessRequirement>,
    /// Unrecognised keys.
    pub rejected: Vec<String>,
}

impl RawRequirement {
    /// Parse into the closed vocabularies.
    ///
    /// An unknown permission makes the requirement unsatisfiable. Unknown
    /// role names are dropped from the allow-list, so an allow-list made only
    /// of unknown names admits nobody.
    #[must_use]
    pub fn resolve(&self) -> ResolvedRequirement {
        let mut rejected = Vec::new();

        let permission = match self.permission.as_deref() {
            Some(key) => match key.parse::<Permission>() {
                Ok(permission) => Some(permission),
                Err(_) => {
                    rejected.push(key.to_string());
                    return ResolvedRequirement {
                        requirement: None,
                        rejected,
                    };
                }
            },
            None => None,
        };

        let roles = self.roles.as_ref().map(|names| {
            names
                .iter()
                .filter_map(|name| match name.parse::<Role>() {
                    Ok(role) => Some(role),
                    Err(_) => {
                        rejected.push(name.clone());
                        None
                    }
                })
                .collect::<BTreeSet<Role>>()
        });

        ResolvedRequirement {
            requirement: Some(AccessRequirement { permission, roles }),
            rejected,
        }
    }
}

// =============================================================================
// POLICY
// =============================================================================

/// How far the super-administrator bypass reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuperAdminScope {
    /// Bypass permission checks only; role allow-lists still apply.
    #[default]
    PermissionsOnly,
    /// Bypass permission checks and role allow-lists.
    Everything,
}

// =============================================================================
// GUARD
// =============================================================================

/// Requirement plus the injected session state it is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct AccessContext<'a> {
    pub requirement: &'a AccessRequirement,
    pub state: &'a SessionState,
}

impl<'a> AccessContext<'a> {
    #[must_use]
    pub fn new(requirement: &'a AccessRequirement, state: &'a SessionState) -> Self {
        Self { requirement, state }
    }
}

/// Evaluates access requirements. Holds only policy, never decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessGuard {
    super_admin_scope: SuperAdminScope,
}

impl AccessGuard {
    /// Guard with the default scope (`PermissionsOnly`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_scope(super_admin_scope: SuperAdminScope) -> Self {
        Self { super_admin_scope }
    }

    #[must_use]
    pub fn scope(&self) -> SuperAdminScope {
        self.super_admin_scope
    }

    /// Decide whether the context's session satisfies its requirement.
    #[must_use]
    pub fn is_allowed(&self, ctx: &AccessContext<'_>) -> bool {
        self.allows(ctx.requirement, ctx.state)
    }

    /// Evaluate a resolved raw requirement; unsatisfiable ones deny.
    #[must_use]
    pub fn allows_resolved(&self, resolved: &ResolvedRequirement, state: &SessionState) -> bool {
        resolved
            .requirement
            .as_ref()
            .is_some_and(|requirement| self.allows(requirement, state))
    }

    /// Same as [`AccessGuard::is_allowed`] without building a context.
    #[must_use]
    pub fn allows(&self, requirement: &AccessRequirement, state: &SessionState) -> bool {
        if requirement.is_open() {
            return true;
        }
        match state {
            SessionState::Uninitialized => false,
            SessionState::Ready(session) => {
                self.role_filter_passes(requirement, session)
                    && self.permission_filter_passes(requirement, session)
            }
        }
    }

    fn role_filter_passes(&self, requirement: &AccessRequirement, session: &Session) -> bool {
        let Some(allowed) = &requirement.roles else {
            return true;
        };
        if self.super_admin_scope == SuperAdminScope::Everything && session.is_super_admin() {
            return true;
        }
        session.role.is_some_and(|role| allowed.contains(&role))
    }

    fn permission_filter_passes(&self, requirement: &AccessRequirement, session: &Session) -> bool {
        match requirement.permission {
            None => true,
            Some(permission) => session.is_super_admin() || session.has_permission(permission),
        }
    }
}

/// Evaluate with the default guard.
#[must_use]
pub fn is_allowed(ctx: &AccessContext<'_>) -> bool {
    AccessGuard::new().is_allowed(ctx)
}

// =============================================================================
// TESTS
// =============================================================================
