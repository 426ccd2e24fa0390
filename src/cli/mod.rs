// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Fabstir Page Monitor CLI
#[derive(Parser, Debug)]
#[command(name = "monitor-cli")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "One-shot checks and baseline management for the page monitor", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a single check against the stored baseline
    Check(commands::CheckArgs),

    /// Print the stored baseline for a URL
    ShowBaseline(commands::BaselineArgs),

    /// Delete the stored baseline so the next check re-baselines
    ResetBaseline(commands::BaselineArgs),

    /// Print the baseline key derived from a URL
    Key(commands::KeyArgs),

    /// Print version information
    Version,
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Check(args) => commands::check(args).await,
        Commands::ShowBaseline(args) => commands::show_baseline(args).await,
        Commands::ResetBaseline(args) => commands::reset_baseline(args).await,
        Commands::Key(args) => {
            commands::print_key(args);
            Ok(())
        }
        Commands::Version => {
            println!("{}", serde_json::to_string_pretty(&crate::version::get_version_info())?);
            Ok(())
        }
    }
}
