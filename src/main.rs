use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vitalwatch::app::{self, App, View};
use vitalwatch::data::{Dashboard, TerminalBell, Tone};
use vitalwatch::{events, ui};
use vitalwatch::{ApiClient, DataSource, EnvironmentName, LiveSource, Settings, StreamSource};

#[derive(Parser, Debug)]
#[command(name = "vitalwatch")]
#[command(about = "Terminal dashboard for live vital-sign telemetry")]
struct Args {
    /// Optional TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend environment to use (overrides the settings file)
    #[arg(long, value_enum)]
    env: Option<EnvironmentName>,

    /// HTTP base URL (overrides the active environment)
    #[arg(long)]
    api_url: Option<String>,

    /// WebSocket URL (overrides the active environment)
    #[arg(long)]
    ws_url: Option<String>,

    /// Read newline-delimited JSON frames from stdin instead of the backend
    #[arg(long, conflicts_with = "export")]
    stdin: bool,

    /// Disable the audible alert cue
    #[arg(long)]
    no_tone: bool,

    /// Log file (the terminal belongs to the dashboard)
    #[arg(long, default_value = "vitalwatch.log")]
    log_file: PathBuf,

    /// Fetch the latest reading and history once, write a JSON report and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_file)?;

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(env) = args.env {
        settings.environment = env;
    }
    settings.override_endpoints(args.api_url.clone(), args.ws_url.clone());
    if args.no_tone {
        settings.alerts.tone = false;
    }
    info!(
        "environment {:?}: api {}, stream {}",
        settings.environment,
        settings.endpoints().api_base_url,
        settings.endpoints().ws_url
    );

    // Handle export mode (non-interactive)
    if let Some(export_path) = args.export {
        return export_to_file(&settings, &export_path);
    }

    // Network tasks run on this runtime while the TUI owns the main thread
    let runtime = tokio::runtime::Runtime::new()?;
    let guard = runtime.enter();

    let source: Box<dyn DataSource> = if args.stdin {
        Box::new(StreamSource::spawn(tokio::io::stdin(), "stdin"))
    } else {
        let client = ApiClient::new(&settings.endpoints().api_base_url)?;
        Box::new(LiveSource::spawn(
            &settings.endpoints().ws_url,
            settings.retry_policy(),
            client,
            settings.history.refresh,
        ))
    };

    let tone: Option<Box<dyn Tone>> = if settings.alerts.tone {
        Some(Box::new(TerminalBell))
    } else {
        None
    };
    let dashboard = Dashboard::from_settings(&settings, tone);

    let result = run_tui(source, dashboard);
    drop(guard);
    runtime.shutdown_timeout(Duration::from_millis(500));
    result
}

/// Send tracing output to `path`, filtered by `RUST_LOG` (default `info`).
fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

/// Run the TUI with the given data source
fn run_tui(source: Box<dyn DataSource>, dashboard: Dashboard) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(source, dashboard);
    app.reload_data();

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 70;
    const MIN_HEIGHT: u16 = 16;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(
                    0,
                    (area.height / 2).saturating_sub(2),
                    area.width,
                    5.min(area.height),
                );
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(12),   // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Live => ui::live::render(frame, app, chunks[2]),
                View::Map => ui::map::render(frame, app, chunks[2]),
                View::History => ui::history::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            // Alert banner sits over the top of the content area
            ui::common::render_alert(frame, app, chunks[2]);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        // Drain the feed every frame; events are applied in arrival order
        app.reload_data();
        app.tick();
    }

    Ok(())
}

/// Fetch the latest reading and history once and write a JSON report
fn export_to_file(settings: &Settings, export_path: &Path) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    let client = ApiClient::new(&settings.endpoints().api_base_url)?;

    let (latest, history) =
        runtime.block_on(async { tokio::join!(client.fetch_latest(), client.fetch_history()) });

    let mut dashboard = Dashboard::from_settings(settings, None);
    let mut errors = serde_json::Map::new();

    match latest {
        Ok(reading) => dashboard.ingest(reading, Instant::now(), Local::now()),
        Err(e) => {
            warn!("export: failed to fetch latest reading: {}", e);
            errors.insert("latest".to_string(), json!(e.to_string()));
        }
    }

    let records = match history {
        Ok(records) => records,
        Err(e) => {
            warn!("export: failed to load historical data: {}", e);
            errors.insert("history".to_string(), json!(e.to_string()));
            Vec::new()
        }
    };

    let mut report = dashboard.export(Local::now());
    if let Some(object) = report.as_object_mut() {
        object.insert("api_base_url".to_string(), json!(client.base_url()));
        object.insert("vitals".to_string(), json!(dashboard_vitals(&dashboard)));
        object.insert("history".to_string(), json!(records));
        object.insert("errors".to_string(), serde_json::Value::Object(errors));
    }

    app::write_json(export_path, &report)?;

    println!("Exported vitals report to: {}", export_path.display());
    Ok(())
}

fn dashboard_vitals(dashboard: &Dashboard) -> Vec<serde_json::Value> {
    vitalwatch::MetricKind::ALL
        .iter()
        .filter_map(|kind| dashboard.vital(*kind))
        .map(|metric| json!(metric))
        .collect()
}
