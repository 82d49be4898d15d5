mod app;
mod calendar;
mod components;
mod config;
mod event;
mod input;
mod remote;
mod theme;
mod tui;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use app::{App, AppOptions, ViewMode};
use calendar::timezone::{parse_tz, DEFAULT_SOURCE_TZ};
use calendar::{EventQuery, EventSource, Store};
use chrono::Utc;
use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use config::Config;
use event::{AppEvent, Events};
use ratatui::layout::{Constraint, Layout, Rect};
use remote::{AuthClient, DocumentClient};

#[derive(Parser, Debug)]
#[command(name = "events-tui", version, about = "Browse events across timezones")]
struct Cli {
    /// JSON file with event records
    #[arg(long)]
    events: Option<PathBuf>,

    /// Timezone to show times in
    #[arg(long)]
    timezone: Option<String>,

    /// Timezone the stored times are written in
    #[arg(long)]
    source_timezone: Option<String>,

    /// Read and write events through the remote document store
    #[arg(long)]
    remote: bool,

    /// Config file (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the upcoming events and exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging();

    let config = Config::load(cli.config.as_deref())?;
    theme::init(&config.theme);

    let source_tz = match cli.source_timezone.as_deref() {
        Some(name) => parse_tz(name)?,
        None => parse_tz(&config.display.source_timezone).unwrap_or(DEFAULT_SOURCE_TZ),
    };
    let active_tz = match cli.timezone.as_deref().or(config.display.timezone.as_deref()) {
        Some(name) => parse_tz(name)?,
        None => source_tz,
    };
    let view = config
        .display
        .view
        .as_deref()
        .and_then(ViewMode::parse)
        .unwrap_or(ViewMode::List);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .wrap_err("Failed to start async runtime")?;

    let http = reqwest::Client::new();
    let remote_enabled = cli.remote || config.remote.enabled;
    let auth = if remote_enabled {
        config.remote.validate()?;
        config.remote.api_key.as_ref().map(|key| {
            Arc::new(AuthClient::new(http.clone(), config.remote.auth_url.clone(), key.clone()))
        })
    } else {
        None
    };

    let source = if remote_enabled {
        let client = DocumentClient::new(
            http,
            config.remote.documents_url.clone(),
            config.remote.project_id.clone().unwrap_or_default(),
            config.remote.collection.clone(),
            config.remote.api_key.clone(),
        );
        EventSource::Remote {
            client: Arc::new(client),
            admins: Arc::new(config.remote.admins.clone()),
        }
    } else {
        EventSource::File(cli.events.clone().unwrap_or_else(|| config.data.events_path()))
    };
    log::info!("Event source: {}", source.describe());

    if cli.list {
        return print_list(&runtime, source, source_tz, active_tz);
    }

    let mut events = Events::new();
    let options = AppOptions {
        source: source_tz,
        timezone: active_tz,
        view,
        auth,
        now: Utc::now(),
    };
    let mut app = App::new(Store::new(source), options, events.tasks(runtime.handle().clone()));
    app.load();

    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app, &mut events);
    tui::restore()?;
    result
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging() {
    let path = config::log_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match std::fs::OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    let _ = builder.try_init();
}

fn print_list(
    runtime: &tokio::runtime::Runtime,
    source: EventSource,
    source_tz: chrono_tz::Tz,
    active_tz: chrono_tz::Tz,
) -> Result<()> {
    let records = runtime.block_on(source.fetch())?;
    let mut query = EventQuery::new(source_tz);
    query.categories.sync(&records);
    for record in query.apply(&records, Utc::now()) {
        let projected = calendar::timezone::convert_to_timezone(record.date, record.time, source_tz, active_tz);
        let when = if projected.time_label.is_empty() {
            projected.date_label
        } else {
            format!("{} @ {}", projected.date_label, projected.time_label)
        };
        println!("{:>24}  {} [{}]", when, record.title, record.category);
    }
    Ok(())
}

fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut Events) -> Result<()> {
    while app.running {
        app.refresh_clock(Utc::now());

        terminal.draw(|frame| {
            let area = frame.area();

            // Main layout: content + status bar
            let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);
            let content_area = layout[0];

            match app.view_mode {
                ViewMode::List => render_list_layout(frame, content_area, app),
                ViewMode::Month => render_month_layout(frame, content_area, app),
            }

            if app.input_mode == app::InputMode::Categories {
                components::CategoryPanel::render(frame, area, &app.query.categories, app.category_cursor);
            }

            if let Some(ref picker) = app.picker {
                components::TimezonePicker::render(frame, area, picker, &app.zones, app.timezone);
            }

            if let Some(ref form) = app.sign_in {
                components::SignInForm::render(frame, area, form);
            }

            if let Some(ref form) = app.form_state {
                components::EventForm::render(frame, area, form, app.source_tz());
            }

            if let Some(ref record) = app.detail {
                let ev = app::DisplayEvent {
                    record,
                    projected: app.project(record),
                };
                components::day_view::render_detail_popup(frame, area, &ev, app.source_tz(), app.timezone);
            }

            if app.show_help {
                components::help::render_help(frame, area);
            }

            components::StatusBar::render(frame, layout[1], app);
        })?;

        if let Some(ev) = events.next(Duration::from_millis(100))? {
            if let AppEvent::Key(key) = &ev {
                log::trace!("key {:?}", key.code);
            }
            app.handle(ev);
        }
    }

    Ok(())
}

fn render_list_layout(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let visible = app.visible();
    let mut title = app.query.scope.label().to_string();
    if !app.query.search.is_empty() {
        title = format!("{} matching \"{}\"", title, app.query.search);
    }
    let footer = format!(
        "{} event{} - times in {}",
        visible.len(),
        if visible.len() == 1 { "" } else { "s" },
        app.timezone.name()
    );
    components::ListView::render(frame, area, &title, &visible, app.list_cursor, &footer);
}

fn render_month_layout(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let days = app.month_days();
    let day_events = app.day_events();

    if area.width < 80 {
        let content = Layout::vertical([Constraint::Length(10), Constraint::Min(3)]).split(area);
        components::MonthView::render(frame, content[0], app.selected_date, app.today, &days);
        components::DayView::render(frame, content[1], app.selected_date, &day_events, app.day_cursor);
    } else {
        let content = Layout::horizontal([Constraint::Length(46), Constraint::Min(20)]).split(area);
        components::MonthView::render(frame, content[0], app.selected_date, app.today, &days);
        components::DayView::render(frame, content[1], app.selected_date, &day_events, app.day_cursor);
    }
}
