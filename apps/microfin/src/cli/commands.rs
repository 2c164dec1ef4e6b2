//! # CLI Command Implementations
//!
//! Each command prints a human-readable report, or a JSON document with
//! `--json-mode`. JSON output uses the same shapes as the HTTP API.

use super::{RequirementArgs, SessionArgs};
use crate::api::{self, AccessResponse, MenuResponse, PageResponse};
use crate::config::render_policy;
use chrono::NaiveDate;
use microfin_core::{
    MenuItem, MicrofinError, PageAccess, PolicyConfig, SessionState, console_menu, visible_menu,
};
use serde::Serialize;

/// Pretty-print any serializable value as JSON.
fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

/// Resolve CLI session flags, reporting any dropped keys.
fn resolve_session(args: &SessionArgs) -> (SessionState, Vec<String>) {
    let raw = args.to_raw();
    let (state, rejected) = SessionState::from_raw(raw.as_ref());
    if !rejected.is_empty() {
        tracing::warn!(
            event = "session_keys_rejected",
            keys = ?rejected,
            "Ignoring unknown role or permission keys"
        );
    }
    (state, rejected)
}

fn describe_session(state: &SessionState) -> String {
    match state.session() {
        None => "not loaded".to_string(),
        Some(session) => {
            let role = session.role.map_or("none", |r| r.key());
            let perms: Vec<&str> = session.permissions.iter().map(|p| p.key()).collect();
            format!("role={} permissions=[{}]", role, perms.join(", "))
        }
    }
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(policy: PolicyConfig, host: &str, port: u16) -> Result<(), MicrofinError> {
    println!("microfin Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:              {}", host);
    println!("  Port:              {}", port);
    println!("  Super admin scope: {:?}", policy.access.super_admin_scope);
    println!("  Redirect path:     {}", policy.access.redirect_path);
    println!();
    println!("Endpoints:");
    println!("  GET  /health             - Health check");
    println!("  GET  /policy             - Active policy");
    println!("  POST /identity/parse     - Decode an identity number");
    println!("  POST /identity/category  - Category/gender check");
    println!("  POST /access/check       - Evaluate a requirement");
    println!("  POST /access/menu        - Filtered console menu");
    println!("  POST /access/page        - Page gate outcome");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, policy).await
}

// =============================================================================
// IDENTITY COMMANDS
// =============================================================================

/// Decode an identity number.
pub fn cmd_parse(
    policy: &PolicyConfig,
    json_mode: bool,
    nic: &str,
    today: Option<NaiveDate>,
) -> Result<(), MicrofinError> {
    let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
    let record = policy.parser().parse_on(nic, today)?;

    if json_mode {
        print_json(&record);
        return Ok(());
    }

    println!("Identity Number");
    println!("===============");
    println!("Format:        {}", record.format);
    println!("Date of birth: {}", record.dob_string());
    println!("Gender:        {}", record.gender);
    println!("Age:           {} (on {})", record.age, today);

    Ok(())
}

/// Check a customer category against a gender label.
///
/// A rejected combination is a normal outcome, not a command failure.
pub fn cmd_category(
    policy: &PolicyConfig,
    json_mode: bool,
    category: &str,
    gender: &str,
) -> Result<(), MicrofinError> {
    let check = policy.category.check(category, gender);

    if json_mode {
        print_json(&check);
        return Ok(());
    }

    match &check.message {
        None => println!("OK: '{}' is allowed for {}", category, gender),
        Some(message) => println!("REJECTED: {}", message),
    }
    Ok(())
}

// =============================================================================
// ACCESS COMMANDS
// =============================================================================

/// Evaluate one requirement.
pub fn cmd_access_check(
    policy: &PolicyConfig,
    json_mode: bool,
    session: &SessionArgs,
    requirement: &RequirementArgs,
) -> Result<(), MicrofinError> {
    let (state, mut unknown_keys) = resolve_session(session);
    let resolved = requirement.to_raw().resolve();
    unknown_keys.extend(resolved.rejected.iter().cloned());

    let allowed = policy.guard().allows_resolved(&resolved, &state);

    if json_mode {
        print_json(&AccessResponse {
            allowed,
            unknown_keys,
        });
        return Ok(());
    }

    println!("Session:  {}", describe_session(&state));
    println!("Decision: {}", if allowed { "ALLOW" } else { "DENY" });
    if !unknown_keys.is_empty() {
        println!("Ignored:  {}", unknown_keys.join(", "));
    }
    Ok(())
}

fn print_menu(items: &[MenuItem], depth: usize) {
    for item in items {
        println!("{}- {} ({})", "  ".repeat(depth), item.label, item.id);
        print_menu(&item.children, depth + 1);
    }
}

/// Print the console menu filtered for the session.
pub fn cmd_access_menu(
    policy: &PolicyConfig,
    json_mode: bool,
    session: &SessionArgs,
) -> Result<(), MicrofinError> {
    let (state, unknown_keys) = resolve_session(session);
    let items = visible_menu(&policy.guard(), &state, &console_menu());

    if json_mode {
        print_json(&MenuResponse {
            items,
            unknown_keys,
        });
        return Ok(());
    }

    println!("Console Menu ({})", describe_session(&state));
    println!("============");
    if items.is_empty() {
        println!("(nothing visible)");
    }
    print_menu(&items, 0);
    Ok(())
}

/// Evaluate the page gate.
pub fn cmd_access_page(
    policy: &PolicyConfig,
    json_mode: bool,
    session: &SessionArgs,
    requirement: &RequirementArgs,
) -> Result<(), MicrofinError> {
    let (state, mut unknown_keys) = resolve_session(session);
    let resolved = requirement.to_raw().resolve();
    unknown_keys.extend(resolved.rejected.iter().cloned());

    let outcome = policy.page_gate().evaluate_resolved(&resolved, &state);

    if json_mode {
        print_json(&PageResponse::new(outcome, unknown_keys));
        return Ok(());
    }

    match outcome {
        PageAccess::Pending => println!("PENDING: session not loaded, show placeholder"),
        PageAccess::Granted => println!("GRANTED"),
        PageAccess::Redirect(path) => println!("REDIRECT: {}", path),
    }
    Ok(())
}

// =============================================================================
// POLICY COMMAND
// =============================================================================

/// Print the active policy.
pub fn cmd_policy(policy: &PolicyConfig, json_mode: bool) -> Result<(), MicrofinError> {
    if json_mode {
        print_json(policy);
        return Ok(());
    }
    print!("{}", render_policy(policy)?);
    Ok(())
}
