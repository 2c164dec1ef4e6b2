//! # Session State
//!
//! The authorization facts of the signed-in user, as supplied by the
//! authentication collaborator, and the lifecycle they move through.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized ──(session data loaded)──▶ Ready(Session)
//! ```
//!
//! A view rendered before the session is loaded (for example the first,
//! server-side render) sees `Uninitialized`. The guard denies every gated
//! item in that state, so the first render is deterministic and never shows
//! content the user may not be allowed to see.

use crate::primitives::MAX_SESSION_PERMISSIONS;
use crate::types::{Permission, Role};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// RAW SESSION (boundary input)
// =============================================================================

/// Session data exactly as the authentication collaborator hands it over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSession {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

// =============================================================================
// SESSION
// =============================================================================

/// Typed authorization facts of a loaded session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The single active role, if the backend reported a known one.
    pub role: Option<Role>,
    /// Granted permissions. BTreeSet for deterministic ordering.
    pub permissions: BTreeSet<Permission>,
}

/// Outcome of parsing a [`RawSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSession {
    pub session: Session,
    /// Keys that were not recognised and have been dropped.
    pub rejected: Vec<String>,
}

impl Session {
    #[must_use]
    pub fn new(role: Option<Role>, permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            role,
            permissions: permissions.into_iter().collect(),
        }
    }

    /// Parse raw strings into the closed vocabularies.
    ///
    /// Unknown role names and permission keys are dropped and reported in
    /// [`ParsedSession::rejected`]. Dropping can only remove access. Keys past
    /// `MAX_SESSION_PERMISSIONS` are rejected as well.
    #[must_use]
    pub fn from_raw(raw: &RawSession) -> ParsedSession {
        let mut rejected = Vec::new();

        let role = match raw.role.as_deref() {
            Some(name) => match name.parse::<Role>() {
                Ok(role) => Some(role),
                Err(_) => {
                    rejected.push(name.to_string());
                    None
                }
            },
            None => None,
        };

        let mut permissions = BTreeSet::new();
        for (index, key) in raw.permissions.iter().enumerate() {
            if index >= MAX_SESSION_PERMISSIONS {
                rejected.push(key.clone());
                continue;
            }
            match key.parse::<Permission>() {
                Ok(permission) => {
                    permissions.insert(permission);
                }
                Err(_) => rejected.push(key.clone()),
            }
        }

        ParsedSession {
            session: Session { role, permissions },
            rejected,
        }
    }

    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }

    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.role.is_some_and(Role::is_super_admin)
    }
}

// =============================================================================
// SESSION STATE
// =============================================================================

/// Two-state lifecycle of session availability.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Session data is not available yet.
    #[default]
    Uninitialized,
    /// Session data has been loaded.
    Ready(Session),
}

impl SessionState {
    /// Build from optional raw data: `None` means the session is not loaded.
    ///
    /// Returns the state and any rejected keys.
    #[must_use]
    pub fn from_raw(raw: Option<&RawSession>) -> (Self, Vec<String>) {
        match raw {
            Some(raw) => {
                let parsed = Session::from_raw(raw);
                (SessionState::Ready(parsed.session), parsed.rejected)
            }
            None => (SessionState::Uninitialized, Vec::new()),
        }
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Ready(session) => Some(session),
            SessionState::Uninitialized => None,
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, SessionState::Ready(_))
    }
}

impl From<Session> for SessionState {
    fn from(session: Session) -> Self {
        SessionState::Ready(session)
    }
}
