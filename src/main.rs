//! Kiln - incremental builds and live reload for small static sites.

mod actor;
mod cli;
mod config;
mod core;
mod logger;
mod registry;
mod reload;
mod render;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{SiteConfig, cfg, init_config};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    init_config(SiteConfig::load(cli)?);
    let config = cfg();

    match &cli.command {
        Commands::Build { .. } => cli::build::build_site(&config.build, false).map(|_| ()),
        Commands::Serve { .. } => cli::serve::serve_site(&config),
    }
}
