mod app;
mod config;
mod market_data;
mod state;
mod ui;

use std::fs::File;
use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::App;
use config::Config;
use market_data::client::{BrsClient, MarketApi};
use state::snapshot_cache::SnapshotCache;

/// The TUI owns stdout, so log output goes to a file.
fn init_tracing(config: &Config) -> Result<()> {
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = File::create(&config.log_path)
        .with_context(|| format!("creating log file {}", config.log_path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(false)
        .with_writer(Arc::new(log_file))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config)?;
    info!("bazarwatch starting");

    let api: Arc<dyn MarketApi> = Arc::new(BrsClient::new(&config)?);
    let mut app = App::new(SnapshotCache::new(config.cache_path.clone()));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app::run(&mut terminal, &mut app, api, config.refresh_interval).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {err:?}");
    }
    info!("bazarwatch exiting");
    Ok(())
}
