use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::prelude::*;
use ratatui_image::{picker::Picker, protocol::StatefulProtocol};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{error, info, warn};

use inboxreview::app::App;
use inboxreview::backend::{Backend, Dispatcher, HttpBackend, Integration, OptionKind};
use inboxreview::config::Config;
use inboxreview::event::{Command, Msg};
use inboxreview::logging;
use inboxreview::poller::StatusPoller;
use inboxreview::ui::{render_details, render_help, render_menu, render_pagination, render_preview};

/// Toast expiry check
const TICK: Duration = Duration::from_millis(250);

type Tui = Terminal<CrosstermBackend<Stdout>>;

#[derive(Parser, Debug)]
#[command(name = "inboxreview", version, about = "Review and classify documents waiting in the inbox")]
struct Cli {
    /// Config file (default: <config dir>/inboxreview/config.toml)
    #[arg(long, env = "INBOXREVIEW_CONFIG")]
    config: Option<String>,

    /// Backend root URL, overrides the config file
    #[arg(long, env = "INBOXREVIEW_BASE_URL")]
    base_url: Option<String>,

    /// tracing filter, e.g. "debug" or "inboxreview=trace"
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .as_deref()
        .map(|p| PathBuf::from(shellexpand::tilde(p).into_owned()));
    let (mut config, config_error) = match Config::load(config_path.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    if let Some(base_url) = cli.base_url {
        config.server.base_url = base_url;
    }
    if cli.log_level.is_some() {
        config.log_level = cli.log_level;
    }

    match logging::init(config.log_level.as_deref()) {
        Ok(path) => info!(log = %path.display(), "starting inboxreview"),
        Err(e) => eprintln!("logging disabled: {e:#}"),
    }
    if let Some(e) = config_error {
        warn!(error = %e, "using default configuration");
    }
    info!(base_url = %config.server.base_url, api = ?config.server.api, "backend");

    let config = Arc::new(config);
    let backend: Arc<dyn Backend> =
        Arc::new(HttpBackend::new(&config.server).context("building HTTP client")?);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let dispatcher = Dispatcher::new(Arc::clone(&backend), tx.clone());
    let poller = StatusPoller::spawn(Arc::clone(&backend), config.poll.interval(), tx);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    // Graphics protocol detection has to happen inside the alternate screen
    let picker = Picker::from_query_stdio()
        .inspect_err(|e| warn!(error = ?e, "terminal image support unavailable"))
        .ok();

    let mut app = App::new(config);
    let result = run(&mut terminal, &mut app, &dispatcher, &mut rx, picker).await;

    poller.stop();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        error!(error = %e, "exiting with error");
    }
    result
}

async fn run(
    terminal: &mut Tui,
    app: &mut App,
    dispatcher: &Dispatcher,
    rx: &mut UnboundedReceiver<Msg>,
    picker: Option<Picker>,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(TICK);
    let mut thumbnail: Option<StatefulProtocol> = None;

    app.set_viewport_height(terminal.size()?.height);
    dispatcher.dispatch(app.start());

    loop {
        terminal.draw(|f| render(f, app, &mut thumbnail))?;

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(event)) => dispatcher.dispatch(handle_event(app, event)),
                Some(Err(e)) => warn!(error = %e, "terminal event error"),
                None => break,
            },
            Some(msg) = rx.recv() => {
                dispatcher.dispatch(app.update(msg));
                if let Some(image) = app.take_thumbnail() {
                    thumbnail = picker.as_ref().map(|p| p.new_resize_protocol(image));
                }
            }
            _ = tick.tick() => app.expire_toast(),
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_event(app: &mut App, event: Event) -> Vec<Command> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(_) if app.menu.is_none() => {
                app.handle_click(mouse.column, mouse.row)
            }
            MouseEventKind::ScrollDown if app.menu.is_none() => app.next_page(),
            MouseEventKind::ScrollUp if app.menu.is_none() => app.previous_page(),
            _ => Vec::new(),
        },
        Event::Resize(_, rows) => {
            app.set_viewport_height(rows);
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) -> Vec<Command> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Vec::new();
    }

    // Option menu captures navigation while open
    if app.menu.is_some() {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.menu_next(),
            KeyCode::Char('k') | KeyCode::Up => app.menu_previous(),
            KeyCode::Enter => return app.choose_option(),
            KeyCode::Esc | KeyCode::Char('q') => app.close_menu(),
            _ => {}
        }
        return Vec::new();
    }

    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            Vec::new()
        }
        KeyCode::Char('j') | KeyCode::Down => app.next_page(),
        KeyCode::Char('k') | KeyCode::Up => app.previous_page(),
        KeyCode::Enter => app.open_current_page(),
        KeyCode::Char('c') => app.open_selector(OptionKind::Correspondent),
        KeyCode::Char('t') => app.open_selector(OptionKind::DocumentType),
        KeyCode::Char('p') => app.open_selector(OptionKind::StoragePath),
        KeyCode::Char('r') => app.load_inbox_queue(),
        KeyCode::Char('R') => app.refresh_metadata(),
        KeyCode::Char('A') => app.connect(Integration::Ai),
        KeyCode::Char('P') => app.connect(Integration::Paperless),
        KeyCode::Char(c) => match app.quick_tag_slot(c) {
            Some(slot) => app.quick_tag(slot),
            None => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn render(f: &mut Frame, app: &mut App, thumbnail: &mut Option<StatefulProtocol>) {
    let area = f.area();
    let config = app.config.clone();
    let theme = &config.theme;

    // Split into main area and help bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    // Pagination on the left, document on the right
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(config.layout.pagination_width),
            Constraint::Min(1),
        ])
        .split(chunks[0]);

    // Store pane area for mouse handling
    app.set_pagination_area(panes[0]);
    render_pagination(f, panes[0], &app.queue, &mut app.pagination, theme);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(config.layout.detail_height),
            Constraint::Min(1),
        ])
        .split(panes[1]);

    render_details(f, right[0], app, theme);
    render_preview(
        f,
        right[1],
        app.preview,
        thumbnail.as_mut(),
        app.preview_max_height,
        theme,
    );

    if let Some(menu) = app.menu.as_mut() {
        render_menu(f, chunks[0], menu, theme);
    }

    render_help(
        f,
        chunks[1],
        app.menu.is_some(),
        app.toast.as_ref(),
        app.connection,
        theme,
    );
}
