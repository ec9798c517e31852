//! AgriReg field console
//!
//! Terminal interface for registry operators. Sessions end automatically
//! after a period of inactivity, with a countdown warning beforehand.

use std::fs::OpenOptions;
use std::io::{self, BufRead};
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;

use agrireg_session::SessionFile;
use agrireg_tui::app::{AccountConfig, ConsoleConfig};
use agrireg_tui::auth::hash_password;
use agrireg_tui::App;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use zeroize::Zeroizing;

#[derive(Parser)]
#[command(name = "agrireg", version, about = "AgriReg field console")]
struct Cli {
    /// Configuration file (defaults to $XDG_CONFIG_HOME/agrireg/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the idle warning threshold, in seconds
    #[arg(long)]
    warning_secs: Option<u64>,

    /// Override the idle logout threshold, in seconds
    #[arg(long)]
    hard_secs: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Hash a password read from stdin for use in config.json
    HashPassword,

    /// Add an operator account; the password is read from stdin
    AddAccount {
        #[arg(long)]
        email: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long = "role")]
        roles: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => ConsoleConfig::config_file_path(),
    };

    match cli.command {
        Some(Command::HashPassword) => {
            let password = read_password()?;
            println!("{}", hash_password(&password)?);
            return Ok(());
        }
        Some(Command::AddAccount { email, name, roles }) => {
            let path = config_path.context("Could not determine config directory")?;
            return add_account(&path, email, name, roles);
        }
        None => {}
    }

    // Set up panic hook to restore terminal on crash
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    init_logging()?;

    let config = match &config_path {
        Some(path) => ConsoleConfig::load_from(path),
        None => ConsoleConfig::default(),
    }
    .with_overrides(cli.warning_secs, cli.hard_secs)?;

    // Fail before touching the terminal.
    config
        .session
        .validate()
        .context("Invalid session thresholds")?;

    let session_file = if config.persist_session {
        ConsoleConfig::session_file_path().map(SessionFile::new)
    } else {
        None
    };

    let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
    let result = runtime.block_on(run_app(config, session_file));

    if let Err(e) = &result {
        tracing::error!("Application error: {:#}", e);
    }

    result
}

/// Log to a file so output never lands on the alternate screen
fn init_logging() -> Result<()> {
    let file_layer = match ConsoleConfig::log_file_path() {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(EnvFilter::from_default_env().add_directive("agrireg=info".parse()?))
        .init();
    Ok(())
}

async fn run_app(config: ConsoleConfig, session_file: Option<SessionFile>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = match App::new(config, session_file) {
        Ok(mut app) => app.run(&mut terminal).await,
        Err(e) => Err(e),
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn read_password() -> Result<Zeroizing<String>> {
    let mut line = Zeroizing::new(String::new());
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    Ok(Zeroizing::new(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn add_account(
    path: &std::path::Path,
    email: String,
    name: Option<String>,
    roles: Vec<String>,
) -> Result<()> {
    let password = read_password()?;
    let email = agrireg_session::normalize_email(&email);

    let account = AccountConfig {
        id: Some(uuid::Uuid::new_v4().to_string()),
        email: email.clone(),
        name,
        password_hash: hash_password(&password)?,
        roles,
    };
    ConsoleConfig::add_account_to(path, account)
        .with_context(|| format!("Config left unchanged at {}", path.display()))?;

    println!("Saved account {} to {}", email, path.display());
    Ok(())
}
