use std::fs::{self, File};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;
mod config;
mod editor;
mod form;
mod interaction;
mod panel;
mod sync;
mod task_detail;
mod ui;

use api::ApiClient;
use app::{App, AppEvent};
use config::{CliArgs, Config};
use interaction::ChannelInteraction;
use task_detail::TaskDetailView;

/// Log to a file; stdout belongs to the terminal UI
fn init_tracing() -> Result<()> {
    let log_dir = dirs::cache_dir()
        .context("Could not find cache directory")?
        .join("task-comments");
    fs::create_dir_all(&log_dir).context("Could not create log directory")?;
    let log_file = File::create(log_dir.join("comments-tui.log"))
        .context("Could not create log file")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "comments_tui=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if args.help {
        println!("{}", CliArgs::usage());
        return Ok(());
    }

    let config = Config::from_env().with_args(&args);

    if let Err(e) = init_tracing() {
        eprintln!("Warning: logging disabled: {:#}", e);
    }
    tracing::info!(server = %config.server_url, task = ?config.task_id, "starting");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let res = run_app(&mut terminal, config).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "app exited with error");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    config: Config,
) -> Result<()> {
    // Create event channel
    let (tx, mut rx) = mpsc::channel::<AppEvent>(100);

    // Spawn input handler
    let tx_input = tx.clone();
    tokio::spawn(async move {
        loop {
            if event::poll(Duration::from_millis(100)).unwrap_or(false) {
                if let Ok(Event::Key(key)) = event::read() {
                    if key.kind == KeyEventKind::Press {
                        let _ = tx_input.send(AppEvent::Key(key)).await;
                    }
                }
            }
            // Send tick events for UI refresh
            if tx_input.send(AppEvent::Tick).await.is_err() {
                break;
            }
        }
    });

    let api = Arc::new(ApiClient::new(&config.server_url));
    let interaction = Arc::new(ChannelInteraction::new(tx.clone()));
    let view = TaskDetailView::resolve(config.task_id.as_deref());

    let mut app = App::new(view, api, interaction, tx);
    app.start();

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        let Some(event) = rx.recv().await else {
            return Ok(());
        };

        if app.handle_event(event) {
            return Ok(());
        }

        // Check if terminal needs clearing after external editor
        if app.needs_terminal_clear {
            terminal.clear()?;
            app.needs_terminal_clear = false;
        }
    }
}
