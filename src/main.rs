mod cli;
mod config;
mod db;
mod models;
mod notify;
mod occasion;
mod prayer_times;
mod quran;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    // Ensure data directory exists and open DB
    AppConfig::ensure_data_dir()?;
    let mut conn = db::open(&AppConfig::db_path()?)?;

    match cli.command {
        Some(Commands::Times { date }) => {
            handlers::handle_times(&conn, &config, date.as_deref())?;
        }
        Some(Commands::Next) => {
            handlers::handle_next(&conn, &config)?;
        }
        Some(Commands::Occasions) => {
            handlers::handle_occasions(&conn, &config)?;
        }
        Some(Commands::Calendar { month, year, csv }) => {
            handlers::handle_calendar(&mut conn, &config, month, year, csv)?;
        }
        Some(Commands::Quran { number, search }) => {
            handlers::handle_quran(&config, number, search.as_deref())?;
        }
        Some(Commands::Remind { action }) => {
            handlers::handle_remind(&mut conn, &config, &action)?;
        }
        Some(Commands::Config { write }) => {
            handlers::handle_config(&conn, &config, write)?;
        }

        // No subcommand → launch TUI
        None => {
            tui::app::run(conn, config)?;
        }
    }

    Ok(())
}
