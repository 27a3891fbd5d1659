use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use weft::adapters::{ReqwestBackend, SseEventSource};
use weft::app::{App, AppMessage};
use weft::config::ConfigManager;
use weft::terminal::{setup_panic_hook, TerminalManager};
use weft::traits::EventSource;
use weft::ui;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<()> {
    if std::env::args().any(|arg| arg == "--version") {
        println!("weft {}", VERSION);
        std::process::exit(0);
    }

    color_eyre::install()?;
    setup_panic_hook();
    init_tracing();

    let config_manager = ConfigManager::new();
    let config = config_manager
        .as_ref()
        .map(|m| m.load())
        .unwrap_or_default();

    // First positional argument selects the workspace.
    let workspace_id = std::env::args()
        .nth(1)
        .filter(|arg| !arg.starts_with('-'))
        .unwrap_or_else(|| "default".to_string());

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let backend = Arc::new(ReqwestBackend::new(&config.backend_url));
        let events_url = config.events_url.clone();
        let mut app = App::new(backend, config, config_manager, workspace_id);

        spawn_event_stream(events_url, app.message_tx.clone());
        app.refresh_models();

        let mut manager = TerminalManager::new()?;
        let result = run_app(manager.terminal(), &mut app).await;
        drop(manager);
        result
    })
}

/// Log to `~/.weft/weft.log`; the TUI owns stdout.
fn init_tracing() {
    let Some(home) = dirs::home_dir() else {
        return;
    };
    let dir = home.join(".weft");
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = std::fs::File::create(dir.join("weft.log")) else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(file)
        .with_ansi(false)
        .init();
}

/// Pump the SSE stream into the app's message channel, reconnecting with a
/// short backoff when it drops.
fn spawn_event_stream(url: String, message_tx: mpsc::UnboundedSender<AppMessage>) {
    tokio::spawn(async move {
        loop {
            match SseEventSource::connect(&url) {
                Ok(mut source) => loop {
                    match source.next_event().await {
                        Ok(Some(event)) => {
                            if message_tx.send(AppMessage::Server(event)).is_err() {
                                return;
                            }
                        }
                        Ok(None) => {
                            let _ = message_tx.send(AppMessage::StreamClosed { reason: None });
                            break;
                        }
                        Err(e) => {
                            let _ = message_tx.send(AppMessage::StreamClosed {
                                reason: Some(e.to_string()),
                            });
                            break;
                        }
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "event stream connect failed");
                }
            }
            tokio::time::sleep(std::time::Duration::from_secs(2)).await;
        }
    });
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let mut event_stream = EventStream::new();
    // Take the message receiver from the app (we need ownership for select!)
    let mut message_rx = app
        .message_rx
        .take()
        .expect("message receiver already taken");

    loop {
        if app.needs_redraw {
            terminal.draw(|f| ui::draw(f, app))?;
        }

        tokio::select! {
            event_result = event_stream.next() => {
                match event_result {
                    Some(Ok(Event::Key(key))) => app.handle_key(key),
                    Some(Ok(Event::Resize(_, _))) => app.mark_dirty(),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "terminal event error");
                    }
                    None => return Ok(()),
                }
            }
            msg = message_rx.recv() => {
                match msg {
                    Some(msg) => app.handle_message(msg),
                    None => return Ok(()),
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
