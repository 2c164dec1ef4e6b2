//! # microfin
//!
//! The binary for the microfinance console's identity and access utilities.
//!
//! This application provides:
//! - HTTP JSON API server (axum-based)
//! - CLI interface for one-off checks
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │            apps/microfin (THE BINARY)         │
//! │                                               │
//! │   ┌─────────────┐        ┌─────────────┐      │
//! │   │    CLI      │        │  HTTP API   │      │
//! │   │   (clap)    │        │   (axum)    │      │
//! │   └──────┬──────┘        └──────┬──────┘      │
//! │          └───────────┬──────────┘             │
//! │                      ▼                        │
//! │             ┌─────────────────┐               │
//! │             │  microfin-core  │               │
//! │             │   (THE LOGIC)   │               │
//! │             └─────────────────┘               │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! microfin server --host 0.0.0.0 --port 8080 --policy policy.toml
//!
//! # CLI operations
//! microfin nic parse 850234567V
//! microfin nic category --category "Loan Customer" --gender Female
//! microfin access check --role staff --permissions centers.view --require-permission centers.view
//! ```

use clap::Parser;
use microfin::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // MICROFIN_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("MICROFIN_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "microfin=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_banner() {
    println!(
        r#"
  microfin v{}
  identity and access utilities
"#,
        env!("CARGO_PKG_VERSION")
    );
}
