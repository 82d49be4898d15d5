use chrono::{Datelike, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::calendar::event::{format_short_date, parse_clock_time, parse_short_date};
use crate::calendar::EventRecord;
use crate::theme;

pub const CATEGORIES: [&str; 5] = ["Concert", "Ceremony", "Release", "Football", "Other"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormField {
    Title,
    Date,
    Time,
    Location,
    Category,
    Subcategory,
    Description,
}

impl FormField {
    pub fn next(&self) -> Self {
        match self {
            FormField::Title => FormField::Date,
            FormField::Date => FormField::Time,
            FormField::Time => FormField::Location,
            FormField::Location => FormField::Category,
            FormField::Category => FormField::Subcategory,
            FormField::Subcategory => FormField::Description,
            FormField::Description => FormField::Title,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FormField::Title => FormField::Description,
            FormField::Date => FormField::Title,
            FormField::Time => FormField::Date,
            FormField::Location => FormField::Time,
            FormField::Category => FormField::Location,
            FormField::Subcategory => FormField::Category,
            FormField::Description => FormField::Subcategory,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventFormState {
    pub title: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub category_index: usize,
    pub subcategory: String,
    pub description: String,
    pub active_field: FormField,
    pub error: Option<String>,
    pub submitting: bool,
}

impl EventFormState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            title: String::new(),
            date: format_short_date(date),
            time: String::new(),
            location: String::new(),
            category_index: CATEGORIES.len() - 1,
            subcategory: String::new(),
            description: String::new(),
            active_field: FormField::Title,
            error: None,
            submitting: false,
        }
    }

    pub fn category(&self) -> &'static str {
        CATEGORIES[self.category_index % CATEGORIES.len()]
    }

    pub fn next_category(&mut self) {
        self.category_index = (self.category_index + 1) % CATEGORIES.len();
    }

    fn active_text(&mut self) -> Option<&mut String> {
        match self.active_field {
            FormField::Title => Some(&mut self.title),
            FormField::Date => Some(&mut self.date),
            FormField::Time => Some(&mut self.time),
            FormField::Location => Some(&mut self.location),
            FormField::Subcategory => Some(&mut self.subcategory),
            FormField::Description => Some(&mut self.description),
            FormField::Category => None,
        }
    }

    pub fn input_char(&mut self, c: char) {
        if self.active_field == FormField::Category {
            if c == ' ' {
                self.next_category();
            }
            return;
        }
        if let Some(text) = self.active_text() {
            text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(text) = self.active_text() {
            text.pop();
        }
    }

    /// Validate the fields and build the record to store.
    pub fn to_record(&self) -> Result<EventRecord, String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title is required".to_string());
        }
        let date = parse_form_date(&self.date)
            .ok_or_else(|| format!("Invalid date '{}'. Use M/D/YY or YYYY-MM-DD", self.date.trim()))?;
        if !STORABLE_YEARS.contains(&date.year()) {
            return Err(format!(
                "Date '{}' is outside {}-{}",
                self.date.trim(),
                STORABLE_YEARS.start(),
                STORABLE_YEARS.end()
            ));
        }
        let time = match self.time.trim() {
            "" => None,
            t => Some(
                parse_form_time(t)
                    .ok_or_else(|| format!("Invalid time '{}'. Use h:mm AM/PM or HH:MM", t))?,
            ),
        };
        let optional = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        Ok(EventRecord {
            id: None,
            title: title.to_string(),
            date,
            time,
            location: optional(&self.location),
            category: self.category().to_string(),
            subcategory: optional(&self.subcategory),
            description: optional(&self.description),
        })
    }
}

/// Dates are stored with a two-digit year read back as 2000 + YY.
const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 2000..=2099;

pub fn parse_form_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    parse_short_date(s)
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

pub fn parse_form_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    parse_clock_time(s)
        .ok()
        .or_else(|| NaiveTime::parse_from_str(s, "%H:%M").ok())
}

pub struct EventForm;

impl EventForm {
    pub fn render(frame: &mut Frame, area: Rect, state: &EventFormState, source: Tz) {
        // Center the form popup
        let form_w = area.width.clamp(30, 60);
        let form_h = area.height.clamp(10, 15);
        let x = area.x + (area.width.saturating_sub(form_w)) / 2;
        let y = area.y + (area.height.saturating_sub(form_h)) / 2;
        let form_area = Rect::new(x, y, form_w, form_h).intersection(area);

        frame.render_widget(Clear, form_area);

        let block = Block::default()
            .title(" New Event ")
            .title_style(Style::default().fg(ratatui::style::Color::Green).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ratatui::style::Color::Green));

        let inner = block.inner(form_area);
        frame.render_widget(block, form_area);

        let rows = Layout::vertical([
            Constraint::Length(1), // title
            Constraint::Length(1), // date
            Constraint::Length(1), // time
            Constraint::Length(1), // location
            Constraint::Length(1), // category
            Constraint::Length(1), // subcategory
            Constraint::Length(1), // description
            Constraint::Length(1), // zone note
            Constraint::Length(1), // error
            Constraint::Length(1), // help
            Constraint::Min(0),
        ])
        .split(inner);

        let active = state.active_field;
        render_field(frame, rows[0], "Title:", &state.title, active == FormField::Title);
        render_field(frame, rows[1], "Date:", &state.date, active == FormField::Date);
        render_field(frame, rows[2], "Time:", &state.time, active == FormField::Time);
        render_field(frame, rows[3], "Where:", &state.location, active == FormField::Location);
        render_field(
            frame,
            rows[4],
            "Type:",
            &format!("< {} >", state.category()),
            active == FormField::Category,
        );
        render_field(frame, rows[5], "Sub:", &state.subcategory, active == FormField::Subcategory);
        render_field(frame, rows[6], "Notes:", &state.description, active == FormField::Description);

        let note = format!("Times are in {}", source.name());
        frame.render_widget(Paragraph::new(note).style(theme::current().dim), rows[7]);

        if let Some(ref err) = state.error {
            frame.render_widget(Paragraph::new(err.as_str()).style(theme::ERROR_STYLE), rows[8]);
        } else if state.submitting {
            frame.render_widget(Paragraph::new("Saving...").style(theme::current().dim), rows[8]);
        }

        let help = Line::from(vec![
            Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Next ", theme::current().dim),
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Save ", theme::current().dim),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Cancel", theme::current().dim),
        ]);
        frame.render_widget(Paragraph::new(help), rows[9]);
    }
}

pub(crate) fn render_field(frame: &mut Frame, area: Rect, label: &str, value: &str, active: bool) {
    let label_w = if label.is_empty() { 0 } else { 7 };
    let cursor = if active { "_" } else { "" };

    let style = if active {
        Style::default().fg(ratatui::style::Color::Cyan)
    } else {
        Style::default()
    };

    let mut spans = Vec::new();
    if !label.is_empty() {
        spans.push(Span::styled(
            format!("{:<width$}", label, width = label_w),
            theme::current().dim,
        ));
    }
    spans.push(Span::styled(format!("{}{}", value, cursor), style));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> EventFormState {
        let mut form = EventFormState::new(NaiveDate::from_ymd_opt(2025, 8, 15).unwrap());
        form.title = "  Fall Concert ".to_string();
        form
    }

    #[test]
    fn test_new_form_prefills_date() {
        let form = filled();
        assert_eq!(form.date, "8/15/25");
        assert_eq!(form.category(), "Other");
    }

    #[test]
    fn test_to_record_trims_and_accepts_both_formats() {
        let mut form = filled();
        form.date = "2025-08-16".to_string();
        form.time = "19:30".to_string();
        form.category_index = 0;
        let record = form.to_record().unwrap();
        assert_eq!(record.title, "Fall Concert");
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 8, 16).unwrap());
        assert_eq!(record.time, NaiveTime::from_hms_opt(19, 30, 0));
        assert_eq!(record.category, "Concert");
        assert_eq!(record.location, None);

        form.time = "7:30 PM".to_string();
        assert_eq!(form.to_record().unwrap().time, NaiveTime::from_hms_opt(19, 30, 0));
    }

    #[test]
    fn test_to_record_rejects_missing_title_and_bad_values() {
        let mut form = filled();
        form.title.clear();
        assert_eq!(form.to_record().unwrap_err(), "Title is required");

        let mut form = filled();
        form.date = "someday".to_string();
        assert!(form.to_record().unwrap_err().contains("someday"));

        let mut form = filled();
        form.time = "25:00".to_string();
        assert!(form.to_record().unwrap_err().contains("25:00"));
    }

    #[test]
    fn test_to_record_rejects_years_the_file_cannot_hold() {
        let mut form = filled();
        form.date = "1999-12-31".to_string();
        assert_eq!(form.to_record().unwrap_err(), "Date '1999-12-31' is outside 2000-2099");

        form.date = "2100-01-01".to_string();
        assert!(form.to_record().unwrap_err().contains("2100-01-01"));

        form.date = "2099-12-31".to_string();
        let record = form.to_record().unwrap();
        let stored = format_short_date(record.date);
        assert_eq!(parse_short_date(&stored).unwrap(), record.date);
    }

    #[test]
    fn test_typing_and_category_cycle() {
        let mut form = filled();
        form.active_field = FormField::Category;
        form.input_char('x');
        assert_eq!(form.category(), "Other");
        form.input_char(' ');
        assert_eq!(form.category(), "Concert");

        form.active_field = form.active_field.next();
        form.input_char('A');
        form.input_char('B');
        form.backspace();
        assert_eq!(form.subcategory, "A");
        assert_eq!(form.active_field.prev(), FormField::Category);
    }
}
