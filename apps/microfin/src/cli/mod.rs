//! # microfin CLI Module
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `nic parse` - Decode an identity number
//! - `nic category` - Check a customer category against a gender
//! - `access check` - Evaluate one access requirement
//! - `access menu` - Print the console menu as a session sees it
//! - `access page` - Evaluate the page gate
//! - `policy` - Print the active policy as TOML

mod commands;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use microfin_core::{MicrofinError, RawRequirement, RawSession};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// microfin - identity and access utilities for the microfinance console
#[derive(Parser, Debug)]
#[command(name = "microfin")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML policy file (defaults apply when omitted)
    #[arg(short = 'P', long, global = true)]
    pub policy: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// National identity number utilities
    Nic {
        #[command(subcommand)]
        command: NicCommands,
    },

    /// Role and permission checks
    Access {
        #[command(subcommand)]
        command: AccessCommands,
    },

    /// Print the active policy
    Policy,
}

#[derive(Subcommand, Debug)]
pub enum NicCommands {
    /// Decode birth date, gender and age
    Parse {
        /// Identity number (legacy 9 digits + V/X, or 12 digits)
        nic: String,

        /// Evaluate the age on this date (YYYY-MM-DD) instead of today
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Check a customer category against a gender label
    Category {
        #[arg(short, long)]
        category: String,

        #[arg(short, long)]
        gender: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum AccessCommands {
    /// Evaluate one requirement
    Check {
        #[command(flatten)]
        session: SessionArgs,

        #[command(flatten)]
        requirement: RequirementArgs,
    },

    /// Print the console menu filtered for the session
    Menu {
        #[command(flatten)]
        session: SessionArgs,
    },

    /// Evaluate the page gate
    Page {
        #[command(flatten)]
        session: SessionArgs,

        #[command(flatten)]
        requirement: RequirementArgs,
    },
}

/// The session an access command is evaluated against.
#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Session role key (e.g. staff, super_admin)
    #[arg(long)]
    pub role: Option<String>,

    /// Session permission keys (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub permissions: Vec<String>,

    /// Treat the session as not loaded yet
    #[arg(long, conflicts_with_all = ["role", "permissions"])]
    pub uninitialized: bool,
}

impl SessionArgs {
    /// `None` when the session is not loaded yet.
    #[must_use]
    pub fn to_raw(&self) -> Option<RawSession> {
        if self.uninitialized {
            return None;
        }
        Some(RawSession {
            role: self.role.clone(),
            permissions: self.permissions.clone(),
        })
    }
}

/// The requirement an access command checks.
#[derive(Args, Debug, Clone, Default)]
pub struct RequirementArgs {
    /// Required permission key
    #[arg(long = "require-permission")]
    pub permission: Option<String>,

    /// Allowed role keys (comma-separated)
    #[arg(long = "require-roles", value_delimiter = ',')]
    pub roles: Option<Vec<String>>,
}

impl RequirementArgs {
    #[must_use]
    pub fn to_raw(&self) -> RawRequirement {
        RawRequirement {
            permission: self.permission.clone(),
            roles: self.roles.clone(),
        }
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), MicrofinError> {
    let policy = crate::config::load_policy(cli.policy.as_deref())?;
    let json_mode = cli.json_mode;

    if cli.verbose {
        tracing::info!(
            policy_file = ?cli.policy,
            super_admin_scope = ?policy.access.super_admin_scope,
            "Policy ready"
        );
    }

    match cli.command {
        Some(Commands::Server { host, port }) => cmd_server(policy, &host, port).await,
        Some(Commands::Nic { command }) => match command {
            NicCommands::Parse { nic, today } => cmd_parse(&policy, json_mode, &nic, today),
            NicCommands::Category { category, gender } => {
                cmd_category(&policy, json_mode, &category, &gender)
            }
        },
        Some(Commands::Access { command }) => match command {
            AccessCommands::Check {
                session,
                requirement,
            } => cmd_access_check(&policy, json_mode, &session, &requirement),
            AccessCommands::Menu { session } => cmd_access_menu(&policy, json_mode, &session),
            AccessCommands::Page {
                session,
                requirement,
            } => cmd_access_page(&policy, json_mode, &session, &requirement),
        },
        Some(Commands::Policy) | None => cmd_policy(&policy, json_mode),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_access_check() {
        let cli = Cli::try_parse_from([
            "microfin",
            "access",
            "check",
            "--role",
            "staff",
            "--permissions",
            "centers.view,loans.view",
            "--require-permission",
            "centers.view",
            "--require-roles",
            "admin,staff",
        ])
        .expect("valid arguments");

        let Some(Commands::Access {
            command:
                AccessCommands::Check {
                    session,
                    requirement,
                },
        }) = cli.command
        else {
            panic!("expected access check");
        };
        assert_eq!(session.permissions, vec!["centers.view", "loans.view"]);
        let raw = session.to_raw().expect("session present");
        assert_eq!(raw.role.as_deref(), Some("staff"));
        assert_eq!(
            requirement.to_raw().roles,
            Some(vec!["admin".to_string(), "staff".to_string()])
        );
    }

    #[test]
    fn uninitialized_session_has_no_raw_data() {
        let cli = Cli::try_parse_from(["microfin", "access", "menu", "--uninitialized"])
            .expect("valid arguments");
        let Some(Commands::Access {
            command: AccessCommands::Menu { session },
        }) = cli.command
        else {
            panic!("expected access menu");
        };
        assert!(session.to_raw().is_none());
    }

    #[test]
    fn uninitialized_conflicts_with_role() {
        let result = Cli::try_parse_from([
            "microfin",
            "access",
            "menu",
            "--uninitialized",
            "--role",
            "admin",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_today_override() {
        let cli = Cli::try_parse_from([
            "microfin",
            "nic",
            "parse",
            "850234567V",
            "--today",
            "2026-10-16",
        ])
        .expect("valid arguments");
        let Some(Commands::Nic {
            command: NicCommands::Parse { nic, today },
        }) = cli.command
        else {
            panic!("expected nic parse");
        };
        assert_eq!(nic, "850234567V");
        assert_eq!(today, NaiveDate::from_ymd_opt(2026, 10, 16));
    }
}
