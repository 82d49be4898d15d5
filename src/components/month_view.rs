use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::days_in_month;
use crate::calendar::EventRecord;
use crate::theme;

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub struct MonthView;

impl MonthView {
    /// `days` holds events keyed by their day in the active timezone.
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        selected_date: NaiveDate,
        today: NaiveDate,
        days: &BTreeMap<NaiveDate, Vec<&EventRecord>>,
    ) {
        let year = selected_date.year();
        let month = selected_date.month();

        let block = Block::default()
            .title(format!(" {} ", selected_date.format("%B %Y")))
            .title_style(theme::current().header)
            .borders(Borders::ALL)
            .border_style(theme::current().border);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let header_cells: Vec<Span> = DAY_NAMES
            .iter()
            .map(|d| Span::styled(format!("{:^6}", d), theme::current().header))
            .collect();
        let header = Line::from(header_cells);

        let Some(first_day) = NaiveDate::from_ymd_opt(year, month, 1) else {
            return;
        };
        let first_weekday = first_day.weekday().num_days_from_sunday() as i32;
        let month_len = days_in_month(year, month) as i32;

        let mut weeks: Vec<Line> = Vec::new();
        let mut current_day: i32 = 1 - first_weekday;

        while current_day <= month_len {
            let mut cells: Vec<Span> = Vec::new();
            for _ in 0..7 {
                let date = (1..=month_len)
                    .contains(&current_day)
                    .then(|| NaiveDate::from_ymd_opt(year, month, current_day as u32))
                    .flatten();
                match date {
                    None => cells.push(Span::raw("      ")),
                    Some(date) => cells.extend(day_cell(date, selected_date, today, days.get(&date))),
                }
                current_day += 1;
            }
            weeks.push(Line::from(cells));
        }

        let mut constraints = vec![Constraint::Length(1)]; // header
        for _ in &weeks {
            constraints.push(Constraint::Length(1));
        }
        constraints.push(Constraint::Min(0)); // fill remaining

        let rows = Layout::vertical(constraints).split(inner);

        frame.render_widget(Paragraph::new(header), rows[0]);
        for (i, week) in weeks.into_iter().enumerate() {
            frame.render_widget(Paragraph::new(week), rows[i + 1]);
        }
    }
}

/// Day number plus a marker in the first event's category colour.
fn day_cell(
    date: NaiveDate,
    selected: NaiveDate,
    today: NaiveDate,
    events: Option<&Vec<&EventRecord>>,
) -> Vec<Span<'static>> {
    let style = if date == today && date == selected {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else if date == selected {
        theme::current().selected
    } else if date == today {
        theme::current().today
    } else {
        Style::default()
    };

    let marker = match events.and_then(|evs| evs.first().map(|ev| (evs.len(), ev))) {
        Some((1, ev)) => Span::styled("\u{25cf} ", Style::default().fg(theme::current().category_color(&ev.category))),
        Some((_, ev)) => Span::styled("+ ", Style::default().fg(theme::current().category_color(&ev.category))),
        None => Span::raw("  "),
    };

    vec![
        Span::styled(format!(" {:>2} ", date.day()), style),
        marker,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_render_grid_marks_event_days() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
        let record = EventRecord::new("Graduation", date, "Ceremony");
        let mut days = BTreeMap::new();
        days.insert(date, vec![&record]);

        let mut terminal = Terminal::new(TestBackend::new(46, 10)).unwrap();
        terminal
            .draw(|f| MonthView::render(f, f.area(), date, date, &days))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(text.contains("June 2025"));
        assert!(text.contains("Sun"));
        assert!(text.contains("\u{25cf}"));
        assert!(text.contains("30"));
    }
}
