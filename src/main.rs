mod animation;
mod app;
mod config;
mod deck;
mod error;
mod event;
mod machine;
mod records;
mod session;
mod storage;
mod ui;

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use crate::app::App;
use crate::config::CliArgs;
use crate::deck::Catalog;
use crate::error::OracleError;
use crate::event::{Event, EventHandler};
use crate::records::Records;
use crate::session::Session;
use crate::storage::{FileStore, KeyValueStore, MemoryStore, Persistence};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CliArgs::parse();

    if cli.print_default_config {
        print!("{}", config::default_config_toml());
        return Ok(());
    }

    install_panic_hook();

    let config = config::load(&cli)?;
    let data_dir = config.data_dir();

    // Keep the guard alive until exit so buffered log lines are flushed
    let _log_guard = if cli.no_log {
        None
    } else {
        init_logging(&data_dir, &config.general.log_level)
    };

    info!("oracle starting");

    let catalog = Catalog::load(config.catalog_path().as_deref())
        .wrap_err("Failed to load the card catalog")?;

    let store: Arc<dyn KeyValueStore> = match FileStore::open(&data_dir) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(
                "Records directory {} unavailable ({e}); nothing will be saved this session",
                data_dir.display()
            );
            Arc::new(MemoryStore::new())
        }
    };
    let records = Records::load(Persistence::new(store));
    let session = Session::new(&catalog, records, config.session(), StdRng::from_entropy());
    let mut app = App::new(session, catalog, &config);

    if config.general.auto_shuffle_on_open {
        app.session
            .request_shuffle_from(config.general.open_shuffle_progress);
    }

    // Setup terminal
    enable_raw_mode()
        .map_err(|e| OracleError::Terminal(format!("Failed to enable raw mode: {e}")))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut events = EventHandler::new(Duration::from_millis(config.tick_rate_ms()));

    // ── Main event loop ───────────────────────────────────────────────
    terminal.draw(|f| ui::draw(f, &app))?;
    while let Some(event) = events.next().await {
        match event {
            Event::Key(key) => app.handle_key(key),
            Event::Frame(at) => {
                app.on_tick(at);
                terminal.draw(|f| ui::draw(f, &app))?;
            }
            Event::Resize(..) => {
                terminal.draw(|f| ui::draw(f, &app))?;
            }
        }

        if app.should_quit {
            break;
        }
    }

    events.stop();
    app.session.flush().await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("oracle exiting");
    Ok(())
}

/// Install a panic hook that restores the terminal before printing the panic
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(panic_info);
    }));
    color_eyre::install().ok();
}

/// Log to `oracle.log` in the records directory; stdout belongs to the TUI.
fn init_logging(dir: &Path, level: &str) -> Option<WorkerGuard> {
    use tracing_subscriber::EnvFilter;

    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!("Logging disabled: cannot create {}: {e}", dir.display());
        return None;
    }
    let appender = tracing_appender::rolling::never(dir, "oracle.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}
