//! Mobility CLI - encrypted administration of travellers, scooters and operators
//!
//! This is the command-line interface for Mobility. It logs in the acting
//! operator, hands validated input to the core library and prints the
//! `(success, message)` outcome of every operation.

mod app;
mod cli;
mod commands;
mod config;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MOBILITY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let ctx = AppContext::new(cli);
    match &cli.command {
        Commands::Init(args) => commands::handle_init(&ctx, args),
        Commands::Login => commands::handle_login(&ctx),
        Commands::Passwd => commands::handle_passwd(&ctx),
        Commands::Users(command) => commands::handle_users(&ctx, command),
        Commands::Travellers(command) => commands::handle_travellers(&ctx, command),
        Commands::Scooters(command) => commands::handle_scooters(&ctx, command),
        Commands::Backups(command) => commands::handle_backups(&ctx, command),
        Commands::Restore(command) => commands::handle_restore(&ctx, command),
        Commands::Logs(command) => commands::handle_logs(&ctx, command),
        Commands::Completions { shell } => commands::handle_completions(*shell),
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
