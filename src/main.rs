//! modkit - draft-to-ready builds and a hot-update dev server for UI modules.

mod actor;
mod cli;
mod config;
mod core;
mod embed;
mod hot_update;
mod logger;
mod normalize;
mod reload;
mod store;
mod utils;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{ProjectConfig, init_config};
use std::sync::Arc;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    match &cli.command {
        Commands::Init { name, dry } => {
            let cwd = std::env::current_dir().context("Failed to get current working directory")?;
            let root = cli::init::resolve_root(&cwd, name.as_deref());
            cli::init::new_project(&root, &cli.config, *dry)
        }
        Commands::Build => {
            let config = load_config(cli)?;
            cli::build::run(&config)
        }
        Commands::Versions { name } => {
            let config = load_config(cli)?;
            cli::versions::run(&config, name.as_deref())
        }
        Commands::Serve { .. } => {
            load_config(cli)?;
            cli::serve::run()
        }
    }
}

/// Load the project config and install it as the global handle.
fn load_config(cli: &'static Cli) -> Result<Arc<ProjectConfig>> {
    Ok(init_config(ProjectConfig::load(cli)?))
}
