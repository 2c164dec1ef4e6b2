//! # Policy Configuration
//!
//! The deployment-tunable rules, grouped so that a single document (the
//! binary reads it from TOML) configures every component.
//!
//! ```toml
//! [parser]
//! leap_day = "strict"
//! century = { mode = "window", pivot = 10 }
//!
//! [category]
//! restricted_category = "Loan Customer"
//! required_gender = "Female"
//! message = "Loan Customers must be Female according to NIC."
//!
//! [access]
//! super_admin_scope = "permissions_only"
//! redirect_path = "/"
//! ```

use crate::access::{AccessGuard, SuperAdminScope};
use crate::category::CategoryRule;
use crate::identity::{IdentityParser, ParserPolicy};
use crate::navigation::PageGate;
use crate::primitives::DEFAULT_REDIRECT_PATH;
use crate::types::MicrofinError;
use serde::{Deserialize, Serialize};

/// Access-related settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessPolicy {
    pub super_admin_scope: SuperAdminScope,
    pub redirect_path: String,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            super_admin_scope: SuperAdminScope::default(),
            redirect_path: DEFAULT_REDIRECT_PATH.to_string(),
        }
    }
}

/// Every tunable rule in one place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub parser: ParserPolicy,
    pub category: CategoryRule,
    pub access: AccessPolicy,
}

impl PolicyConfig {
    /// Reject values no component can work with.
    pub fn validate(&self) -> Result<(), MicrofinError> {
        self.parser.validate()?;
        if self.category.restricted_category.trim().is_empty() {
            return Err(MicrofinError::InvalidPolicy(
                "restricted category must not be empty".to_string(),
            ));
        }
        if !self.access.redirect_path.starts_with('/') {
            return Err(MicrofinError::InvalidPolicy(format!(
                "redirect path '{}' must start with '/'",
                self.access.redirect_path
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn parser(&self) -> IdentityParser {
        IdentityParser::with_policy(self.parser)
    }

    #[must_use]
    pub fn guard(&self) -> AccessGuard {
        AccessGuard::with_scope(self.access.super_admin_scope)
    }

    #[must_use]
    pub fn page_gate(&self) -> PageGate {
        PageGate::new(self.guard()).with_redirect(self.access.redirect_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{CenturyPolicy, LeapDayPolicy};

    #[test]
    fn default_policy_is_valid() {
        let policy = PolicyConfig::default();
        assert!(policy.validate().is_ok());
        assert_eq!(policy.guard().scope(), SuperAdminScope::PermissionsOnly);
        assert_eq!(policy.page_gate().redirect_path(), "/");
        assert_eq!(policy.parser().policy().leap_day, LeapDayPolicy::Strict);
    }

    #[test]
    fn empty_category_rejected() {
        let mut policy = PolicyConfig::default();
        policy.category.restricted_category = "  ".to_string();
        assert!(matches!(policy.validate(), Err(MicrofinError::InvalidPolicy(_))));
    }

    #[test]
    fn relative_redirect_rejected() {
        let mut policy = PolicyConfig::default();
        policy.access.redirect_path = "home".to_string();
        assert!(policy.validate().is_err());
    }

    #[test]
    fn deserializes_partial_json() {
        let json = r#"{"parser":{"century":{"mode":"window","pivot":10}},"access":{"super_admin_scope":"everything"}}"#;
        let policy: PolicyConfig = serde_json::from_str(json).expect("policy");
        assert_eq!(policy.parser.century, CenturyPolicy::Window { pivot: 10 });
        assert_eq!(policy.parser.leap_day, LeapDayPolicy::Strict);
        assert_eq!(policy.access.super_admin_scope, SuperAdminScope::Everything);
        assert_eq!(policy.access.redirect_path, "/");
        assert_eq!(policy.category, CategoryRule::default());
    }
}
