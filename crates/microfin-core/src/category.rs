//! # Customer Category Rule
//!
//! A single soft validation: customers registered under a restricted
//! category must have the gender required for it, as decoded from their
//! identity number. Failures are returned as values carrying a display
//! message; callers decide whether to block or warn.

use crate::types::Gender;
use serde::{Deserialize, Serialize};

/// Result of a category/gender check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCheck {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
}

impl CategoryCheck {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }
}

/// The restricted category and the gender it requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryRule {
    pub restricted_category: String,
    pub required_gender: Gender,
    pub message: String,
}

impl Default for CategoryRule {
    fn default() -> Self {
        Self {
            restricted_category: "Loan Customer".to_string(),
            required_gender: Gender::Female,
            message: "Loan Customers must be Female according to NIC.".to_string(),
        }
    }
}

impl CategoryRule {
    /// Check a category against a gender label such as `"Female"`.
    ///
    /// The label must equal the required gender's label exactly; anything
    /// else, including an empty label, is a mismatch for the restricted
    /// category.
    #[must_use]
    pub fn check(&self, category: &str, gender: &str) -> CategoryCheck {
        if category == self.restricted_category && gender != self.required_gender.as_str() {
            return CategoryCheck::rejected(self.message.clone());
        }
        CategoryCheck::ok()
    }

    /// Typed variant of [`CategoryRule::check`].
    #[must_use]
    pub fn check_gender(&self, category: &str, gender: Gender) -> CategoryCheck {
        self.check(category, gender.as_str())
    }
}

/// Check with the default rule.
#[must_use]
pub fn validate_category_against_gender(category: &str, gender: &str) -> CategoryCheck {
    CategoryRule::default().check(category, gender)
}
