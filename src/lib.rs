pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod pagination;
pub mod rating;
pub mod services;
pub mod views;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use cli::Cli;
use colored::Colorize;
use std::path::Path;

use crate::cli::Command;
use crate::config::settings::AppConfig;
use crate::services::{ImportService, ProcessingService, ServerService};

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::new();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_init() -> Result<()> {
    let config = AppConfig::new();
    let pool = database::create_pool(&config.server.database_path)?;
    database::setup::init_pool(&pool)?;
    println!("{} {}", "Initialized".green().bold(), config.server.database_path);
    Ok(())
}

pub fn handle_reset() -> Result<()> {
    let config = AppConfig::new();
    let pool = database::create_pool(&config.server.database_path)?;
    database::setup::reset_pool(&pool)?;
    println!("{} {}", "Reset".yellow().bold(), config.server.database_path);
    Ok(())
}

pub fn handle_import(path: &Path) -> Result<()> {
    let service = ImportService::new(AppConfig::new());
    let summary = service.run(path)?;

    println!("{} {}", "Imported".green().bold(), path.display());
    println!("  players:    {}", summary.players);
    println!("  ratings:    {}", summary.ratings);
    println!(
        "  games:      {} new, {}",
        summary.new_games,
        format!("{} duplicates", summary.duplicate_games).dimmed()
    );
    println!("  matchups:   {}", summary.processing.matchups);
    Ok(())
}

pub fn handle_process() -> Result<()> {
    let service = ProcessingService::new(AppConfig::new());
    let summary = service.run()?;

    println!("{} {} games", "Processed".green().bold(), summary.games);
    println!("  matchups:        {}", summary.matchups);
    println!("  versus matchups: {}", summary.versus_matchups);
    println!("  rating buckets:  {}", summary.rating_buckets);
    if summary.skipped > 0 {
        println!("{}", format!("  skipped {} invalid games", summary.skipped).red());
    }
    Ok(())
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}
