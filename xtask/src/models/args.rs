//! # CLI Argument Definitions
//!
//! Subcommands of the `cargo xtask` developer toolkit.

use clap::{Parser, Subcommand};

/// The main CLI structure parsing command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "cargo xtask")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Developer toolkit for the OcrHub workspace")]
pub struct Cli {
    /// The main subcommand to execute.
    #[command(subcommand)]
    pub command: AppCommands,
}

/// Enumeration of available application subcommands.
#[derive(Debug, Subcommand)]
pub enum AppCommands {
    /// List the workspace crates with their descriptions
    List {},
    /// Manage the containerized OCR service
    Dev {
        #[command(subcommand)]
        action: DevAction,
    },
    /// Run tests (workspace by default)
    Test {
        /// Run tests for a specific crate (auto-prefixes with 'ocrhub-' if missing)
        project: Option<String>,
    },
    /// Run doc tests (workspace by default)
    Doctest {
        /// Run doc tests for a specific crate (auto-prefixes with 'ocrhub-' if missing)
        project: Option<String>,
    },
    /// Run a project
    Run {
        /// Run a specific crate (auto-prefixes with 'ocrhub-' if missing)
        #[arg(default_value = "server")]
        project: String,
    },
}

/// Enumeration of available development subcommands.
#[derive(Debug, Subcommand)]
pub enum DevAction {
    /// Build and start the OCR service container
    Up {},
    /// Stop the service
    Down {
        /// Also remove volumes (wipes uploads, results and the model cache)
        #[arg(short, long)]
        volumes: bool,
    },
    /// Show container and health status
    Status {},
    /// Follow logs from services
    Logs {
        /// Specific service name (e.g., 'ocrhub')
        service: Option<String>,
    },
}
