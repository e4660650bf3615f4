// src/cli.rs
use crate::app::AppState;
use crate::config::{self, Config};
use crate::error::{AppError, AppResult};
use crate::models::{Client, ClientStatus};
use crate::search::{self, StatusSummary};
use clap::{Parser, Subcommand};
use log;
use rpassword;
use std::path::PathBuf;

/// Track WiFi-subscription clients from the terminal.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(arg_required_else_help = false)] // No subcommand launches the TUI
pub struct Cli {
    /// Read configuration from this file instead of the platform config dir
    #[clap(long, global = true, value_parser)]
    pub config: Option<PathBuf>,

    /// Admin username for read-only commands (defaults to the configured admin)
    #[clap(short, long, global = true)]
    pub user: Option<String>,

    #[clap(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List clients, optionally filtered
    List {
        /// Case-insensitive match against name, email or phone
        #[clap(short, long, default_value = "")]
        query: String,
        /// Only show clients with this status (active, expiring, expired)
        #[clap(short, long, value_parser = parse_status)]
        status: Option<ClientStatus>,
    },
    /// Show one client in detail
    Show {
        /// Client identifier
        id: String,
    },
    /// Count clients per status
    Summary,
    /// Launch the Terminal User Interface (TUI)
    Tui,
}

fn parse_status(value: &str) -> Result<ClientStatus, String> {
    ClientStatus::parse(value)
        .ok_or_else(|| format!("unknown status '{}', expected active, expiring or expired", value))
}

pub fn resolve_config(cli: &Cli) -> AppResult<Config> {
    match &cli.config {
        Some(path) => Ok(config::load_config_from(path)?),
        None => Ok(config::load_config()),
    }
}

/// Handles the parsed CLI command.
/// Returns `Ok(true)` if the TUI should run, `Ok(false)` if a CLI command was handled.
pub fn handle_cli_command(cli: Cli, config: &Config) -> AppResult<bool> {
    log::debug!("Handling CLI command: {:?}", cli.command);
    let command = match cli.command {
        None | Some(Commands::Tui) => {
            log::info!("Preparing to launch TUI.");
            return Ok(true);
        }
        Some(command) => command,
    };

    let mut state = AppState::from_config(config)?;
    let username = cli.user.unwrap_or_else(|| config.admin.username.clone());
    let password = rpassword::prompt_password("Enter admin password: ").map_err(|e| {
        log::error!("Failed to read admin password: {}", e);
        AppError::Cli(format!("Failed to read password: {}", e))
    })?;
    authenticate(&mut state, &username, &password)?;

    let output = run_command(&state, command)?;
    println!("{}", output);
    Ok(false)
}

/// Renders the output of a read-only command against an authenticated state.
pub fn run_command(state: &AppState, command: Commands) -> AppResult<String> {
    match command {
        Commands::List { query, status } => {
            log::info!("Executing 'list' command (query: {:?}, status: {:?})", query, status);
            let matches = search::filter_clients(state.directory.clients(), &query, status);
            log::info!("Listed {} clients.", matches.len());
            if matches.is_empty() {
                return Ok("No clients found.".to_string());
            }
            let mut lines = vec![format!("Clients ({}):", matches.len())];
            lines.extend(matches.iter().map(|client| format_client_row(client)));
            Ok(lines.join("\n"))
        }
        Commands::Show { id } => {
            log::info!("Executing 'show' command for client {}", id);
            let client = state.directory.get_by_id(&id).ok_or_else(|| {
                log::warn!("Show command: client {} not found", id);
                AppError::Cli(format!("Client not found: {}", id))
            })?;
            Ok(format_client_detail(client))
        }
        Commands::Summary => {
            let summary = StatusSummary::tally(state.directory.clients());
            Ok(format_summary(&summary))
        }
        Commands::Tui => Err(AppError::Cli("The 'tui' command has no text output".to_string())),
    }
}

fn authenticate(state: &mut AppState, username: &str, password: &str) -> AppResult<()> {
    crate::forms::validate_login(username, password).map_err(|e| AppError::Cli(e.to_string()))?;
    let outcome = state.session.login(username, password);
    if !outcome.success {
        return Err(AppError::Cli("Invalid username or password.".to_string()));
    }
    if outcome.requires_password_change {
        // Read-only output is still allowed; the TUI enforces the change.
        println!("Notice: the admin password must be changed at the next TUI login.");
    }
    Ok(())
}

pub fn format_client_row(client: &Client) -> String {
    format!(
        "  [{:<2}] {:<20} {:<26} {:<14} {:>4} days  {}",
        client.id,
        client.name,
        client.email,
        client.phone,
        client.subscription_days,
        client.status.label()
    )
}

pub fn format_client_detail(client: &Client) -> String {
    [
        format!("Name:          {}", client.name),
        format!("ID:            {}", client.id),
        format!("Status:        {}", client.status.label()),
        format!("Email:         {}", client.email),
        format!("Phone:         {}", client.phone),
        format!("Days left:     {}", client.subscription_days),
        format!("Expires:       {}", client.subscription_end_date.format("%Y-%m-%d")),
        format!("Last update:   {}", client.last_update.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
        format!("Notes:         {}", client.notes),
    ]
    .join("\n")
}

pub fn format_summary(summary: &StatusSummary) -> String {
    format!(
        "Active: {}  Expiring: {}  Expired: {}  (total {})",
        summary.active,
        summary.expiring,
        summary.expired,
        summary.total()
    )
}
