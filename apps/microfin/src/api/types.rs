//! # API Request/Response Types
//!
//! JSON structures for the HTTP API. Session and requirement data arrive as
//! plain strings and are resolved into the core's closed vocabularies by the
//! handlers.

use chrono::NaiveDate;
use microfin_core::{
    BirthRecord, CategoryCheck, MenuItem, PageAccess, RawRequirement, RawSession,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// IDENTITY
// =============================================================================

/// Identity parse request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseRequest {
    pub nic: String,
    /// Evaluation date for the age; today when omitted.
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

/// Identity parse response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResponse {
    pub success: bool,
    pub record: Option<BirthRecord>,
    pub error: Option<String>,
}

impl ParseResponse {
    pub fn success(record: BirthRecord) -> Self {
        Self {
            success: true,
            record: Some(record),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            record: None,
            error: Some(msg.into()),
        }
    }
}

/// Category/gender check request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRequest {
    pub category: String,
    pub gender: String,
}

/// Category/gender check response.
pub type CategoryResponse = CategoryCheck;

// =============================================================================
// ACCESS
// =============================================================================

/// Access check request. A missing `session` means it is not loaded yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessRequest {
    #[serde(default)]
    pub session: Option<RawSession>,
    #[serde(flatten)]
    pub requirement: RawRequirement,
}

/// Access check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessResponse {
    pub allowed: bool,
    /// Session or requirement keys that were not recognised.
    #[serde(default)]
    pub unknown_keys: Vec<String>,
}

/// Menu request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuRequest {
    #[serde(default)]
    pub session: Option<RawSession>,
}

/// Menu response: the console menu pruned to what the session may see.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuResponse {
    pub items: Vec<MenuItem>,
    #[serde(default)]
    pub unknown_keys: Vec<String>,
}

/// Page gate response.
///
/// `access` is `pending`, `granted` or `redirect`; `redirect` carries the
/// target path only in the last case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse {
    pub access: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(default)]
    pub unknown_keys: Vec<String>,
}

impl PageResponse {
    pub fn new(outcome: PageAccess, unknown_keys: Vec<String>) -> Self {
        let access = outcome.label().to_string();
        let redirect = match outcome {
            PageAccess::Redirect(path) => Some(path),
            PageAccess::Pending | PageAccess::Granted => None,
        };
        Self {
            access,
            redirect,
            unknown_keys,
        }
    }
}
