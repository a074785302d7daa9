mod app;
mod components;
mod config;
mod controller;
mod error;
mod event;
mod fs;
mod handler;
mod layout;
mod logging;
mod theme;
mod tui;
mod ui;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{debug, info, warn};

use crate::app::App;
use crate::config::{AppConfig, GeneralConfig, LoggingConfig, ViewConfig, WatcherConfig};
use crate::controller::{resolve_input, NavigationController};
use crate::error::{AppError, Result};
use crate::event::{spawn_refresh, Event, EventHandler};
use crate::fs::opener::SystemLauncher;
use crate::fs::watcher::{DirWatcher, DirectoryWatch, NoopWatcher};
use crate::theme::RenderContext;
use crate::tui::{install_panic_hook, Tui};

/// Poll interval for terminal input; also the tick period.
const TICK_MS: u64 = 100;

/// A terminal directory explorer with live list and grid views.
#[derive(Parser, Debug)]
#[command(name = "fx", version, about)]
struct Cli {
    /// Directory to open (defaults to the configured path, then home)
    path: Option<PathBuf>,

    /// Read configuration from this file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Disable live updates
    #[arg(long)]
    no_watcher: bool,

    /// Start in grid view
    #[arg(long)]
    grid: bool,

    /// Use ASCII icons instead of nerd font glyphs
    #[arg(long)]
    no_icons: bool,

    /// Log filter directive, e.g. "debug" or "fx_explorer=trace"
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    /// Flags as a partial config that wins over every file.
    fn overrides(&self) -> AppConfig {
        AppConfig {
            general: GeneralConfig::default(),
            view: ViewConfig {
                default_mode: self.grid.then(|| "grid".to_string()),
                use_icons: self.no_icons.then_some(false),
                ..Default::default()
            },
            watcher: WatcherConfig {
                enabled: self.no_watcher.then_some(false),
                ..Default::default()
            },
            theme: Default::default(),
            logging: LoggingConfig {
                level: self.log_level.clone(),
                ..Default::default()
            },
        }
    }
}

/// CLI path, else the configured path, else home, else the working directory.
fn start_directory(cli: &Cli, config: &AppConfig) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    if let Some(path) = &cli.path {
        return resolve_input(&path.to_string_lossy(), &cwd).map_err(|_| {
            AppError::InvalidPath(format!("{} does not exist", path.display()))
        });
    }
    if let Some(configured) = config.default_path() {
        match resolve_input(configured, &cwd) {
            Ok(path) => return Ok(path),
            Err(e) => warn!(error = %e, "configured default_path ignored"),
        }
    }
    Ok(dirs::home_dir().unwrap_or(cwd))
}

fn build_watcher(config: &AppConfig, events: &EventHandler) -> Box<dyn DirectoryWatch> {
    if !config.watcher_enabled() {
        info!("live updates disabled");
        return Box::new(NoopWatcher);
    }
    match DirWatcher::new(Duration::from_millis(config.debounce_ms()), events.sender()) {
        Ok(watcher) => Box::new(watcher),
        Err(e) => {
            warn!(error = %e, "watcher unavailable, continuing without live updates");
            Box::new(NoopWatcher)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));
    let config = loaded.config;
    let _log_guard = logging::init_logging(&config.log_directory(), config.log_level())?;
    for warning in &loaded.warnings {
        warn!("{warning}");
    }

    let start = start_directory(&cli, &config)?;
    info!(
        path = %start.display(),
        theme = config.theme_scheme(),
        watcher = config.watcher_enabled(),
        "starting"
    );
    let ctx = RenderContext::from_config(&config);

    let mut events = EventHandler::new(Duration::from_millis(TICK_MS));
    let event_tx = events.sender();
    let controller = NavigationController::open(
        &start,
        config.default_view_mode(),
        build_watcher(&config, &events),
        Box::new(SystemLauncher),
        Duration::from_millis(config.retry_ms()),
    )?;
    let mut app = App::new(controller, ctx.grid_item_width);

    install_panic_hook();
    let mut tui = Tui::new(config.mouse_enabled())?;

    let result = run(&mut app, &mut tui, &mut events, &event_tx, &ctx).await;
    tui.restore()?;
    info!(path = %app.view.current_path().display(), "explorer closed");
    result
}

async fn run(
    app: &mut App,
    tui: &mut Tui,
    events: &mut EventHandler,
    event_tx: &tokio::sync::mpsc::UnboundedSender<Event>,
    ctx: &RenderContext,
) -> Result<()> {
    loop {
        tui.draw(|frame| ui::render(app, frame, ctx))?;
        dispatch(app, events.next().await?, event_tx);
        if app.should_quit {
            return Ok(());
        }
    }
}

/// Apply one mailbox event to the app.
fn dispatch(app: &mut App, event: Event, event_tx: &tokio::sync::mpsc::UnboundedSender<Event>) {
    match event {
        Event::Key(key) => handler::handle_key_event(app, key),
        Event::Mouse(mouse) => handler::handle_mouse_event(app, mouse),
        Event::Tick => app.tick(Instant::now()),
        // The next draw reads the new size from the frame.
        Event::Resize(width, height) => debug!(width, height, "terminal resized"),
        Event::Watch(change) => {
            if let Some(request) = app.handle_watch_event(change) {
                spawn_refresh(request, event_tx);
            }
        }
        Event::Refreshed(outcome) => {
            if let Some(request) = app.handle_refreshed(outcome) {
                spawn_refresh(request, event_tx);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::entries::ViewMode;
    use crate::fs::watcher::WatchEvent;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use tempfile::TempDir;

    fn setup() -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let controller = NavigationController::open(
            dir.path(),
            ViewMode::List,
            Box::new(NoopWatcher),
            Box::new(SystemLauncher),
            Duration::from_secs(1),
        )
        .unwrap();
        (dir, App::new(controller, 10))
    }

    #[test]
    fn resize_leaves_listing_and_selection_alone() {
        let (dir, mut app) = setup();
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        app.selected_index = 1;
        dispatch(&mut app, Event::Resize(120, 40), &tx);
        assert_eq!(app.selected_index, 1);
        assert_eq!(app.view.current_path(), dir.path());
        assert!(!app.should_quit);
    }

    #[test]
    fn key_events_reach_the_handler() {
        let (_dir, mut app) = setup();
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        dispatch(&mut app, Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)), &tx);
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn watch_change_spawns_refresh_back_into_mailbox() {
        let (dir, mut app) = setup();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        std::fs::write(dir.path().join("new.txt"), "x").unwrap();
        dispatch(&mut app, Event::Watch(WatchEvent::Changed(dir.path().to_path_buf())), &tx);

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("refresh did not report back")
            .expect("channel closed");
        assert!(matches!(event, Event::Refreshed(_)));
        dispatch(&mut app, event, &tx);
        assert!(app.view.real_entries().any(|e| e.display_name() == "new.txt"));
    }
}
