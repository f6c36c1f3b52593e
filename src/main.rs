//! condotui - A terminal client for condominium administration
//!
//! Browse and edit the records of a condominium backend (units, spaces,
//! reservations, packages, visitors...) from the terminal.

mod api;
mod app;
mod config;
mod error;
mod events;
mod grid;
mod logging;
mod tasks;
mod ui;

use std::io::{self, BufRead, Stdout};

use anyhow::Context;
use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use crate::api::CondoClient;
use crate::app::{App, Request};
use crate::config::Config;
use crate::events::EventHandler;
use crate::tasks::{create_task_channel, TaskSpawner};

/// Command line interface.
#[derive(Debug, Parser)]
#[command(name = "condotui", version, about)]
struct Cli {
    /// Profile to use instead of the configured default.
    #[arg(short, long)]
    profile: Option<String>,

    /// Terminal width at or below which records are shown as cards.
    #[arg(long)]
    breakpoint: Option<u16>,

    /// Log verbosity; overrides RUST_LOG and the settings file.
    #[arg(long, value_parser = ["error", "warn", "info", "debug", "trace"])]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Store the API token of a profile in the OS keychain (read from stdin).
    SetToken {
        /// Profile name.
        profile: String,
    },
    /// Print the location of the configuration file.
    ConfigPath,
}

/// Restores the terminal when dropped, including on early returns.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn new() -> anyhow::Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            error!("Failed to disable raw mode: {}", e);
        }
        if let Err(e) = execute!(self.terminal.backend_mut(), LeaveAlternateScreen) {
            error!("Failed to leave alternate screen: {}", e);
        }
        if let Err(e) = self.terminal.show_cursor() {
            error!("Failed to show cursor: {}", e);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load();

    if let Err(e) = logging::init(&log_options(&cli, config.as_ref().ok())) {
        eprintln!("Warning: logging disabled: {e:#}");
    }

    let result = match cli.command {
        Some(Command::SetToken { ref profile }) => set_token(profile),
        Some(Command::ConfigPath) => {
            println!("{}", Config::config_path()?.display());
            Ok(())
        }
        None => match config.context("Failed to load configuration") {
            Ok(config) => run(&cli, config).await,
            Err(e) => Err(e),
        },
    };

    logging::shutdown();
    result
}

/// Logging options from the settings file and the command line.
fn log_options(cli: &Cli, config: Option<&Config>) -> logging::LogOptions {
    let settings = config.map(|config| &config.settings);
    logging::LogOptions {
        directory: settings.and_then(|s| s.log_dir.clone()),
        level: settings.map(|s| s.log_level.clone()),
        cli_level: cli.log_level.clone(),
    }
}

fn set_token(profile: &str) -> anyhow::Result<()> {
    eprintln!("Token para o perfil '{profile}':");
    let mut token = String::new();
    io::stdin().lock().read_line(&mut token)?;
    let token = token.trim();
    if token.is_empty() {
        anyhow::bail!("Token vazio");
    }
    api::auth::store_token(profile, token)?;
    println!("Token salvo para o perfil '{profile}'.");
    Ok(())
}

async fn run(cli: &Cli, config: Config) -> anyhow::Result<()> {
    let profile = config.active_profile(cli.profile.as_deref())?;
    let settings = &config.settings;
    let breakpoint = cli.breakpoint.unwrap_or(settings.compact_breakpoint);
    info!(profile = %profile.name, url = %profile.url, breakpoint, "Starting UI");

    let client = CondoClient::new(&profile, settings.page_size)?;
    let (mut rx, spawner) = create_task_channel();
    let handler = EventHandler::with_tick_rate(settings.tick_rate_ms);

    let mut guard = TerminalGuard::new()?;
    let width = guard.terminal.size()?.width;
    let mut app = App::new(profile, breakpoint, width);

    while !app.should_quit() {
        dispatch(&client, &spawner, app.take_requests());
        guard.terminal.draw(|frame| app.view(frame))?;

        let event = handler.next()?;
        app.update(event);

        while let Ok(message) = rx.try_recv() {
            debug!(?message, "Task finished");
            app.handle_api_message(message);
        }
    }

    Ok(())
}

fn dispatch(client: &CondoClient, spawner: &TaskSpawner, requests: Vec<Request>) {
    for request in requests {
        match request {
            Request::FetchPage {
                resource,
                page,
                search,
            } => spawner.spawn_fetch_page(client, resource, page, search),
            Request::SaveRow {
                resource,
                id,
                payload,
            } => spawner.spawn_save_row(client, resource, id, payload),
            Request::CreateRow { resource, payload } => {
                spawner.spawn_create_row(client, resource, payload)
            }
            Request::DeleteRow { resource, id } => spawner.spawn_delete_row(client, resource, id),
            Request::FetchAvailability { space_id, month } => {
                spawner.spawn_fetch_availability(client, space_id, month)
            }
        }
    }
}
