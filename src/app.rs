use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::calendar::filter::group_by_day;
use crate::calendar::timezone::{catalogue, convert_to_timezone, Projected, ZoneOption};
use crate::calendar::{EventQuery, EventRecord, Store};
use crate::components::event_form::EventFormState;
use crate::components::sign_in::SignInState;
use crate::components::timezone_picker::TimezonePickerState;
use crate::event::{AppEvent, Tasks};
use crate::remote::{AuthAction, AuthClient, AuthSession};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewMode {
    List,
    Month,
}

impl ViewMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list" => Some(ViewMode::List),
            "month" | "calendar" => Some(ViewMode::Month),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Search,
    Timezone,
    Categories,
    SignIn,
    Form,
}

/// A record with its date and time in the active timezone.
#[derive(Debug, Clone)]
pub struct DisplayEvent<'a> {
    pub record: &'a EventRecord,
    pub projected: Projected,
}

pub struct AppOptions {
    pub source: Tz,
    pub timezone: Tz,
    pub view: ViewMode,
    pub auth: Option<Arc<AuthClient>>,
    pub now: DateTime<Utc>,
}

pub struct App {
    pub running: bool,
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub now: DateTime<Utc>,
    pub today: NaiveDate,
    pub selected_date: NaiveDate,
    pub list_cursor: usize,
    pub day_cursor: usize,
    pub timezone: Tz,
    pub query: EventQuery,
    pub zones: Vec<ZoneOption>,
    pub picker: Option<TimezonePickerState>,
    pub category_cursor: usize,
    pub sign_in: Option<SignInState>,
    pub form_state: Option<EventFormState>,
    pub detail: Option<EventRecord>,
    pub show_help: bool,
    pub status_message: Option<String>,
    pub loading: bool,
    pub session: Option<AuthSession>,
    auth: Option<Arc<AuthClient>>,
    store: Store,
    tasks: Tasks,
}

impl App {
    pub fn new(store: Store, options: AppOptions, tasks: Tasks) -> Self {
        let today = options.now.with_timezone(&options.timezone).date_naive();
        Self {
            running: true,
            view_mode: options.view,
            input_mode: InputMode::Normal,
            now: options.now,
            today,
            selected_date: today,
            list_cursor: 0,
            day_cursor: 0,
            timezone: options.timezone,
            query: EventQuery::new(options.source),
            zones: catalogue(),
            picker: None,
            category_cursor: 0,
            sign_in: None,
            form_state: None,
            detail: None,
            show_help: false,
            status_message: None,
            loading: false,
            session: None,
            auth: options.auth,
            store,
            tasks,
        }
    }

    pub fn source_tz(&self) -> Tz {
        self.query.source
    }

    #[cfg(test)]
    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn refresh_clock(&mut self, now: DateTime<Utc>) {
        self.now = now;
        self.today = now.with_timezone(&self.timezone).date_naive();
    }

    // ── Derived views ──

    pub fn project(&self, record: &EventRecord) -> Projected {
        convert_to_timezone(record.date, record.time, self.source_tz(), self.timezone)
    }

    pub fn visible(&self) -> Vec<DisplayEvent<'_>> {
        self.query
            .apply(self.store.events(), self.now)
            .into_iter()
            .map(|record| DisplayEvent {
                record,
                projected: self.project(record),
            })
            .collect()
    }

    pub fn month_days(&self) -> BTreeMap<NaiveDate, Vec<&EventRecord>> {
        let visible = self.query.apply(self.store.events(), self.now);
        group_by_day(&visible, self.source_tz(), self.timezone)
    }

    pub fn day_events(&self) -> Vec<DisplayEvent<'_>> {
        self.month_days()
            .remove(&self.selected_date)
            .unwrap_or_default()
            .into_iter()
            .map(|record| DisplayEvent {
                record,
                projected: self.project(record),
            })
            .collect()
    }

    fn selected_record(&self) -> Option<EventRecord> {
        match self.view_mode {
            ViewMode::List => self.visible().get(self.list_cursor).map(|e| e.record.clone()),
            ViewMode::Month => self.day_events().get(self.day_cursor).map(|e| e.record.clone()),
        }
    }

    fn clamp_cursors(&mut self) {
        let list_len = self.visible().len();
        self.list_cursor = self.list_cursor.min(list_len.saturating_sub(1));
        let day_len = self.day_events().len();
        self.day_cursor = self.day_cursor.min(day_len.saturating_sub(1));
    }

    // ── Background results ──

    pub fn handle(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => crate::input::handle_key(self, key),
            AppEvent::Loaded(result) => self.on_loaded(result),
            AppEvent::Auth(result) => self.on_auth(result),
            AppEvent::Created(result) => self.on_created(result),
        }
    }

    /// Fetch events from the configured source in the background.
    pub fn load(&mut self) {
        if self.form_state.as_ref().is_some_and(|f| f.submitting) {
            self.status_message = Some("Wait for the new event to save".to_string());
            return;
        }
        self.loading = true;
        let source = self.store.source().clone();
        log::info!("Loading events from {}", source.describe());
        self.tasks.spawn(async move {
            AppEvent::Loaded(source.fetch().await.map_err(|e| e.to_string()))
        });
    }

    fn on_loaded(&mut self, result: Result<Vec<EventRecord>, String>) {
        self.loading = false;
        match result {
            Ok(events) => {
                let n = events.len();
                self.store.replace(events);
                self.query.categories.sync(self.store.events());
                self.clamp_cursors();
                self.status_message = Some(format!("Loaded {} event{}", n, if n == 1 { "" } else { "s" }));
            }
            Err(err) => {
                log::error!("Failed to load events: {}", err);
                self.status_message = Some(format!("Failed to load events: {}", err));
            }
        }
    }

    fn on_auth(&mut self, result: Result<AuthSession, String>) {
        match result {
            Ok(session) => {
                self.status_message = Some(format!("Signed in as {}", session.email));
                self.session = Some(session);
                self.sign_in = None;
                self.input_mode = InputMode::Normal;
            }
            Err(err) => {
                if let Some(ref mut form) = self.sign_in {
                    form.pending = None;
                    form.error = Some(err);
                } else {
                    self.status_message = Some(err);
                }
            }
        }
    }

    fn on_created(&mut self, result: Result<EventRecord, String>) {
        match result {
            Ok(record) => {
                let projected = self.project(&record);
                self.status_message = Some(format!("Created {}", record.title));
                self.store.insert(record);
                self.query.categories.sync(self.store.events());
                self.selected_date = projected.date;
                self.form_state = None;
                self.input_mode = InputMode::Normal;
                self.clamp_cursors();
            }
            Err(err) => {
                log::error!("Failed to create event: {}", err);
                if let Some(ref mut form) = self.form_state {
                    form.submitting = false;
                    form.error = Some(err);
                } else {
                    self.status_message = Some(err);
                }
            }
        }
    }

    // ── Navigation ──

    pub fn select_next(&mut self) {
        let len = self.visible().len();
        if self.list_cursor + 1 < len {
            self.list_cursor += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.list_cursor = self.list_cursor.saturating_sub(1);
    }

    pub fn select_next_in_day(&mut self) {
        let len = self.day_events().len();
        if self.day_cursor + 1 < len {
            self.day_cursor += 1;
        }
    }

    pub fn select_prev_in_day(&mut self) {
        self.day_cursor = self.day_cursor.saturating_sub(1);
    }

    pub fn next_day(&mut self) {
        self.selected_date = self
            .selected_date
            .succ_opt()
            .unwrap_or(self.selected_date);
        self.on_date_changed();
    }

    pub fn prev_day(&mut self) {
        self.selected_date = self
            .selected_date
            .pred_opt()
            .unwrap_or(self.selected_date);
        self.on_date_changed();
    }

    pub fn next_week(&mut self) {
        self.selected_date += chrono::Duration::weeks(1);
        self.on_date_changed();
    }

    pub fn prev_week(&mut self) {
        self.selected_date -= chrono::Duration::weeks(1);
        self.on_date_changed();
    }

    pub fn next_month(&mut self) {
        self.selected_date = shift_month(self.selected_date, 1);
        self.on_date_changed();
    }

    pub fn prev_month(&mut self) {
        self.selected_date = shift_month(self.selected_date, -1);
        self.on_date_changed();
    }

    pub fn go_to_today(&mut self) {
        self.refresh_clock(Utc::now());
        self.selected_date = self.today;
        let today = self.today;
        let first_upcoming = self
            .visible()
            .iter()
            .position(|e| e.projected.date >= today);
        self.list_cursor = first_upcoming.unwrap_or(0);
        self.on_date_changed();
    }

    fn on_date_changed(&mut self) {
        self.day_cursor = 0;
    }

    // ── Filters ──

    pub fn toggle_scope(&mut self) {
        self.query.scope = self.query.scope.toggled();
        self.list_cursor = 0;
        self.clamp_cursors();
    }

    pub fn toggle_sort(&mut self) {
        self.query.order = self.query.order.toggled();
        self.list_cursor = 0;
    }

    pub fn set_timezone(&mut self, tz: Tz) {
        log::info!("Active timezone {} -> {}", self.timezone.name(), tz.name());
        self.timezone = tz;
        self.today = self.now.with_timezone(&tz).date_naive();
        self.clamp_cursors();
    }

    pub fn open_timezone_picker(&mut self) {
        self.picker = Some(TimezonePickerState::open(&self.zones, self.timezone));
        self.input_mode = InputMode::Timezone;
    }

    pub fn confirm_timezone(&mut self) {
        let choice = self.picker.as_ref().and_then(|p| p.selected(&self.zones));
        self.close_timezone_picker();
        if let Some(tz) = choice {
            self.set_timezone(tz);
            self.status_message = Some(format!("Times shown in {}", tz.name()));
        }
    }

    pub fn close_timezone_picker(&mut self) {
        self.picker = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn open_categories(&mut self) {
        if self.query.categories.is_empty() {
            self.status_message = Some("No categories to filter yet".to_string());
            return;
        }
        self.category_cursor = 0;
        self.input_mode = InputMode::Categories;
    }

    pub fn move_category_cursor(&mut self, delta: isize) {
        let total = self.query.categories.rows().len();
        if total == 0 {
            self.category_cursor = 0;
            return;
        }
        let next = self.category_cursor as isize + delta;
        self.category_cursor = next.clamp(0, total as isize - 1) as usize;
    }

    pub fn toggle_category_row(&mut self) {
        if let Some(row) = self.query.categories.rows().get(self.category_cursor) {
            self.query.categories.toggle_row(row);
            self.clamp_cursors();
        }
    }

    pub fn set_all_categories(&mut self, value: bool) {
        self.query.categories.set_all(value);
        self.clamp_cursors();
    }

    pub fn start_search(&mut self) {
        self.input_mode = InputMode::Search;
    }

    pub fn search_input(&mut self, c: char) {
        self.query.search.push(c);
        self.list_cursor = 0;
    }

    pub fn search_backspace(&mut self) {
        self.query.search.pop();
        self.list_cursor = 0;
    }

    /// Leave search mode; `keep == false` also drops the query.
    pub fn finish_search(&mut self, keep: bool) {
        if !keep {
            self.query.search.clear();
        }
        self.input_mode = InputMode::Normal;
        self.clamp_cursors();
    }

    // ── Detail ──

    pub fn show_detail(&mut self) {
        self.detail = self.selected_record();
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    // ── Accounts ──

    pub fn open_sign_in(&mut self) {
        if self.auth.is_none() {
            self.status_message = Some("No remote account service configured".to_string());
            return;
        }
        self.sign_in = Some(SignInState::default());
        self.input_mode = InputMode::SignIn;
    }

    pub fn close_sign_in(&mut self) {
        self.sign_in = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn submit_sign_in(&mut self, action: AuthAction) {
        let Some(client) = self.auth.clone() else {
            return;
        };
        let Some(ref mut form) = self.sign_in else {
            return;
        };
        if form.is_busy() {
            return;
        }
        form.error = None;
        form.pending = Some(action);
        let email = form.email.clone();
        let password = form.password.clone();
        self.tasks.spawn(async move {
            let result = match action {
                AuthAction::SignIn => client.sign_in(&email, &password).await,
                AuthAction::Register => client.register(&email, &password).await,
            };
            AppEvent::Auth(result.map_err(|e| e.to_string()))
        });
    }

    pub fn sign_out(&mut self) {
        if let Some(session) = self.session.take() {
            log::info!("Signed out {}", session.email);
            self.status_message = Some("Signed out".to_string());
        }
    }

    // ── Event creation ──

    pub fn open_event_form(&mut self) {
        if self.loading {
            self.status_message = Some("Events are still loading".to_string());
            return;
        }
        if !self.store.is_loaded() {
            self.status_message = Some("Events failed to load; press r to retry".to_string());
            return;
        }
        if let Err(err) = self.store.source().permits(self.session.as_ref()) {
            let source = self.store.source();
            if source.requires_sign_in() && self.session.is_none() && self.auth.is_some() {
                self.open_sign_in();
                self.status_message = Some("Sign in to create events".to_string());
            } else {
                self.status_message = Some(err.to_string());
            }
            return;
        }
        self.form_state = Some(EventFormState::new(self.selected_date));
        self.input_mode = InputMode::Form;
    }

    pub fn close_event_form(&mut self) {
        self.form_state = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn submit_event_form(&mut self) {
        let Some(ref mut form) = self.form_state else {
            return;
        };
        if form.submitting {
            return;
        }
        let record = match form.to_record() {
            Ok(record) => record,
            Err(err) => {
                form.error = Some(err);
                return;
            }
        };
        form.error = None;
        form.submitting = true;

        let source = self.store.source().clone();
        let session = self.session.clone();
        self.tasks.spawn(async move {
            let result = source.create(session, record).await;
            AppEvent::Created(result.map_err(|e| e.to_string()))
        });
    }
}

/// Same day in another month, clamped to that month's length.
pub fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 + months;
    let (year, month) = (total.div_euclid(12), total.rem_euclid(12) as u32 + 1);
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.and_then(|n| n.pred_opt()).map(|d| d.day()).unwrap_or(31)
}
