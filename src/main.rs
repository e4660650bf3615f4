// src/main.rs
mod app;
mod cli;
mod config;
mod crypto;
mod directory;
mod error;
mod forms;
mod models;
mod search;
mod seed;
mod session;
mod templates;
mod tui;

use clap::Parser;

fn main() -> Result<(), error::AppError> {
    env_logger::init();
    log::info!("Starting WiFi Admin application");

    let cli_args = cli::Cli::parse();
    let config = cli::resolve_config(&cli_args).map_err(|e| {
        log::error!("Failed to load configuration: {:#?}", e);
        eprintln!("Error: {}", e);
        e
    })?;

    match cli::handle_cli_command(cli_args, &config) {
        Ok(should_run_tui) => {
            if should_run_tui {
                if let Err(e) = tui::run_tui(&config) {
                    log::error!("Application TUI error: {:#?}", e);
                    eprintln!("Error: {}", e);
                    return Err(e);
                }
            } else {
                log::info!("CLI command processed.");
            }
        }
        Err(e) => {
            log::error!("Application failed: {:#?}", e);
            eprintln!("Error: {}", e);
            return Err(e);
        }
    }

    log::info!("WiFi Admin application finished successfully.");
    Ok(())
}
