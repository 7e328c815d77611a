//! Fumotion TUI Entry Point
//!
//! Usage:
//!   fumotion-tui
//!
//! Environment:
//!   API_URL / FUMOTION_API_URL   Service base URL (default: https://fumotion.tech)
//!   FUMOTION_POLL_INTERVAL_MS    Chat refresh period
//!   FUMOTION_SESSION_FILE        Where the session is persisted
//!   FUMOTION_CONFIG              Config file (default: ~/.config/fumotion/client.toml)
//!   RUST_LOG                     Log filter; logs go to fumotion-tui.log

use std::fs::{self, File};
use std::io::{self, IsTerminal};
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fumotion_core::{load_config, FumotionClient};
use fumotion_tui::App;

const LOG_FILE: &str = "fumotion-tui.log";

/// `$XDG_STATE_HOME/fumotion`, falling back to the data dir
fn log_dir() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|dir| dir.join("fumotion"))
}

/// Log to a file; the terminal belongs to the UI
fn init_logging() {
    let Some(dir) = log_dir() else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = File::options().create(true).append(true).open(dir.join(LOG_FILE)) else {
        return;
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: fumotion-tui requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means stdin/stdout are piped or the session has no TTY");
        eprintln!("(for SSH, use the -t flag).");
        std::process::exit(1);
    }

    let config = load_config().context("loading configuration")?;
    tracing::info!(
        api_url = %config.api_url,
        source = %config.source(),
        "Starting fumotion-tui"
    );

    // Restore the terminal before the panic message prints
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(FumotionClient::new(config));
    let result = app.run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
