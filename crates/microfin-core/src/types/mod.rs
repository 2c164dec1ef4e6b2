//! # Core Type Definitions
//!
//! This module contains the boundary types shared by every microfin module:
//! - Identity output (`Gender`, `IdentityFormat`, `BirthRecord`)
//! - Authorization vocabulary (`Permission`, `Role`)
//! - Error types (`MicrofinError`)
//!
//! ## Closed Vocabularies
//!
//! Permissions and roles arrive from the authentication collaborator as plain
//! strings. They are parsed here into closed enumerations so that a misspelt
//! key can never silently grant access: anything unrecognised is rejected at
//! the boundary and therefore fails closed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// GENDER
// =============================================================================

/// Gender encoded in the day-of-year field of an identity number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// The display label used by the console forms.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = MicrofinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Male" | "male" | "MALE" | "M" => Ok(Gender::Male),
            "Female" | "female" | "FEMALE" | "F" => Ok(Gender::Female),
            other => Err(MicrofinError::UnknownGender(other.to_string())),
        }
    }
}

// =============================================================================
// IDENTITY FORMAT
// =============================================================================

/// Which of the two fixed-width identity shapes matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IdentityFormat {
    /// 9 digits followed by `V` (voter) or `X` (non-voter).
    Legacy { voter: bool },
    /// 12 digits with a full four-digit year.
    Current,
}

impl IdentityFormat {
    /// Fixed character width of this shape.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            IdentityFormat::Legacy { .. } => 10,
            IdentityFormat::Current => 12,
        }
    }
}

impl fmt::Display for IdentityFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityFormat::Legacy { voter: true } => f.write_str("legacy (voter)"),
            IdentityFormat::Legacy { voter: false } => f.write_str("legacy (non-voter)"),
            IdentityFormat::Current => f.write_str("current"),
        }
    }
}

// =============================================================================
// BIRTH RECORD
// =============================================================================

/// Birth data decoded from an identity number.
///
/// Derived on demand and never stored. `date_of_birth` serialises as
/// `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthRecord {
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    /// Completed years as of the evaluation date.
    pub age: u32,
    /// Gender-adjusted day of year (1..=366).
    pub day_of_year: u16,
    pub format: IdentityFormat,
}

impl BirthRecord {
    /// `date_of_birth` rendered as `YYYY-MM-DD`.
    #[must_use]
    pub fn dob_string(&self) -> String {
        self.date_of_birth.format("%Y-%m-%d").to_string()
    }
}

// =============================================================================
// PERMISSION
// =============================================================================

/// A permission key granted to a session by the authentication backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "dashboard.view")]
    DashboardView,
    #[serde(rename = "branches.view")]
    BranchesView,
    #[serde(rename = "centers.view")]
    CentersView,
    #[serde(rename = "groups.view")]
    GroupsView,
    #[serde(rename = "customers.view")]
    CustomersView,
    #[serde(rename = "loans.create")]
    LoansCreate,
    #[serde(rename = "loans.approve")]
    LoansApprove,
    #[serde(rename = "loans.view")]
    LoansView,
    #[serde(rename = "collections.view")]
    CollectionsView,
    #[serde(rename = "receipts.approvecancel")]
    ReceiptsApproveCancel,
    #[serde(rename = "finance.view")]
    FinanceView,
    #[serde(rename = "finance.transactions")]
    FinanceTransactions,
    #[serde(rename = "staff.view")]
    StaffView,
    #[serde(rename = "roles.view")]
    RolesView,
    #[serde(rename = "settings.view")]
    SettingsView,
}

impl Permission {
    /// Every known permission, in declaration order.
    pub const ALL: [Permission; 15] = [
        Permission::DashboardView,
        Permission::BranchesView,
        Permission::CentersView,
        Permission::GroupsView,
        Permission::CustomersView,
        Permission::LoansCreate,
        Permission::LoansApprove,
        Permission::LoansView,
        Permission::CollectionsView,
        Permission::ReceiptsApproveCancel,
        Permission::FinanceView,
        Permission::FinanceTransactions,
        Permission::StaffView,
        Permission::RolesView,
        Permission::SettingsView,
    ];

    /// The dotted key used on the wire.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Permission::DashboardView => "dashboard.view",
            Permission::BranchesView => "branches.view",
            Permission::CentersView => "centers.view",
            Permission::GroupsView => "groups.view",
            Permission::CustomersView => "customers.view",
            Permission::LoansCreate => "loans.create",
            Permission::LoansApprove => "loans.approve",
            Permission::LoansView => "loans.view",
            Permission::CollectionsView => "collections.view",
            Permission::ReceiptsApproveCancel => "receipts.approvecancel",
            Permission::FinanceView => "finance.view",
            Permission::FinanceTransactions => "finance.transactions",
            Permission::StaffView => "staff.view",
            Permission::RolesView => "roles.view",
            Permission::SettingsView => "settings.view",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Permission {
    type Err = MicrofinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Permission::ALL
            .into_iter()
            .find(|p| p.key() == key)
            .ok_or_else(|| MicrofinError::UnknownPermission(key.to_string()))
    }
}

// =============================================================================
// ROLE
// =============================================================================

/// The single active role of a console session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Manager,
    Staff,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::SuperAdmin, Role::Admin, Role::Manager, Role::Staff];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Staff => "staff",
        }
    }

    /// Whether this role is the super-administrator.
    #[must_use]
    pub const fn is_super_admin(self) -> bool {
        matches!(self, Role::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Role {
    type Err = MicrofinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Role::ALL
            .into_iter()
            .find(|r| r.key() == key)
            .ok_or_else(|| MicrofinError::UnknownRole(key.to_string()))
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in microfin.
///
/// - Identity parsing has a single failure: `UnrecognizedFormat`
/// - The access guard never produces errors; it denies instead
/// - The CORE should never panic; all errors must be recoverable
#[derive(Debug, Error)]
pub enum MicrofinError {
    /// The identity number matches neither shape, or its day of year is out of range.
    #[error("Unrecognized identity number format")]
    UnrecognizedFormat,

    /// A permission key that is not part of the console vocabulary.
    #[error("Unknown permission: {0}")]
    UnknownPermission(String),

    /// A role name that is not part of the console vocabulary.
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// A gender label that is neither Male nor Female.
    #[error("Unknown gender: {0}")]
    UnknownGender(String),

    /// A policy value is inconsistent or out of range.
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_keys_round_trip() {
        for permission in Permission::ALL {
            let parsed: Permission = permission.key().parse().expect("known key");
            assert_eq!(parsed, permission);
        }
    }

    #[test]
    fn permission_typo_rejected() {
        let result = "loans.aprove".parse::<Permission>();
        assert!(matches!(result, Err(MicrofinError::UnknownPermission(k)) if k == "loans.aprove"));
    }

    #[test]
    fn permission_serde_uses_dotted_key() {
        let json = serde_json::to_string(&Permission::ReceiptsApproveCancel).expect("serialize");
        assert_eq!(json, "\"receipts.approvecancel\"");
    }

    #[test]
    fn role_parse_and_display() {
        let role: Role = "super_admin".parse().expect("known role");
        assert!(role.is_super_admin());
        assert_eq!(role.to_string(), "super_admin");
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn gender_labels() {
        assert_eq!(Gender::Female.as_str(), "Female");
        assert_eq!("male".parse::<Gender>().expect("gender"), Gender::Male);
        assert!("other".parse::<Gender>().is_err());
    }

    #[test]
    fn birth_record_serializes_iso_date() {
        let record = BirthRecord {
            date_of_birth: NaiveDate::from_ymd_opt(1985, 1, 23).expect("date"),
            gender: Gender::Male,
            age: 40,
            day_of_year: 23,
            format: IdentityFormat::Legacy { voter: true },
        };
        let json = serde_json::to_string(&record).expect("serialize");
        assert!(json.contains("\"date_of_birth\":\"1985-01-23\""));
        assert_eq!(record.dob_string(), "1985-01-23");
    }
}
