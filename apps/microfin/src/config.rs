//! # Policy File Loading
//!
//! Reads a [`PolicyConfig`] from a TOML file. Every section and key is
//! optional; missing values fall back to the built-in defaults.
//!
//! Server security settings are not part of this file; they come from
//! environment variables (see [`crate::api`]).

use microfin_core::{MicrofinError, PolicyConfig};
use std::path::Path;

/// Maximum policy file size (64 KB).
const MAX_POLICY_FILE_SIZE: u64 = 64 * 1024;

/// Parse and validate a policy document.
pub fn parse_policy(contents: &str) -> Result<PolicyConfig, MicrofinError> {
    let policy: PolicyConfig = toml::from_str(contents)
        .map_err(|e| MicrofinError::InvalidPolicy(format!("Malformed policy file: {}", e)))?;
    policy.validate()?;
    Ok(policy)
}

/// Load the policy from `path`, or the defaults when no path is given.
pub fn load_policy(path: Option<&Path>) -> Result<PolicyConfig, MicrofinError> {
    let Some(path) = path else {
        tracing::debug!("No policy file given, using defaults");
        return Ok(PolicyConfig::default());
    };

    let metadata = std::fs::metadata(path).map_err(|e| {
        MicrofinError::IoError(format!("Cannot read policy file '{}': {}", path.display(), e))
    })?;
    if !metadata.is_file() {
        return Err(MicrofinError::IoError(format!(
            "Policy path '{}' is not a regular file",
            path.display()
        )));
    }
    if metadata.len() > MAX_POLICY_FILE_SIZE {
        return Err(MicrofinError::InvalidPolicy(format!(
            "Policy file size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_POLICY_FILE_SIZE
        )));
    }

    let contents = std::fs::read_to_string(path).map_err(|e| {
        MicrofinError::IoError(format!("Cannot read policy file '{}': {}", path.display(), e))
    })?;
    let policy = parse_policy(&contents)?;

    tracing::info!(
        path = %path.display(),
        super_admin_scope = ?policy.access.super_admin_scope,
        century = ?policy.parser.century,
        "Policy loaded"
    );
    Ok(policy)
}

/// Render a policy back to TOML.
pub fn render_policy(policy: &PolicyConfig) -> Result<String, MicrofinError> {
    toml::to_string(policy)
        .map_err(|e| MicrofinError::InvalidPolicy(format!("Cannot render policy: {}", e)))
}
