//! Inkling CLI Application
//!
//! Command-line interface and MCP server for the Inkling note studio.

mod args;
mod cli;
mod mcp;
mod renderer;

use std::sync::Arc;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use inkling_core::{Config, StoreBuilder};
use log::info;
use mcp::{run_stdio_server, InklingMcpServer};
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        config,
        no_color,
        command,
    } = Args::parse();

    let config = Config::load(config.as_deref()).context("Failed to load configuration")?;
    let store = Arc::new(
        StoreBuilder::new()
            .with_database_path(database_file)
            .build()
            .await
            .context("Failed to initialize store")?,
    );

    info!("Inkling started");

    if let Some(Serve) = command {
        info!("Starting Inkling MCP server");
        return run_stdio_server(InklingMcpServer::new(store, &config))
            .await
            .context("MCP server failed");
    }

    let cli = Cli::new(store, config, TerminalRenderer::new(!no_color));
    match command {
        Some(Project { command }) => cli.handle_project_command(command).await,
        Some(Draft { command }) => cli.handle_draft_command(command).await,
        Some(Refine(args)) => cli.refine(args).await,
        Some(AddVersion(args)) => cli.add_version(args).await,
        Some(Transcribe(args)) => cli.transcribe(args).await,
        Some(Serve) | None => cli.list_projects().await,
    }
}
