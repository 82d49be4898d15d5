use chrono::NaiveDate;
use chrono_tz::Tz;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::DisplayEvent;
use crate::calendar::category::class_for;
use crate::calendar::event::format_clock_time;
use crate::theme;

pub struct DayView;

impl DayView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        date: NaiveDate,
        events: &[DisplayEvent],
        selected: usize,
    ) {
        let w = area.width as usize;

        let title = if w >= 30 {
            format!(" {} ", date.format("%A, %B %-d, %Y"))
        } else if w >= 18 {
            format!(" {} ", date.format("%b %-d, %Y"))
        } else {
            format!(" {} ", date.format("%m/%d"))
        };

        let count_str = match events.len() {
            0 => String::new(),
            1 => " 1 event ".to_string(),
            n => format!(" {} events ", n),
        };

        let block = Block::default()
            .title(title)
            .title_style(theme::current().header)
            .title_bottom(Line::from(Span::styled(count_str, theme::current().dim)))
            .borders(Borders::ALL)
            .border_style(theme::current().border);

        if events.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let msg = Paragraph::new("No events").style(theme::current().dim);
            frame.render_widget(msg, inner);
            return;
        }

        let inner_w = area.width.saturating_sub(2) as usize;

        let all_day: Vec<(usize, &DisplayEvent)> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.projected.time.is_none())
            .collect();
        let timed: Vec<(usize, &DisplayEvent)> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.projected.time.is_some())
            .collect();

        let mut items: Vec<ListItem> = Vec::new();

        if !all_day.is_empty() {
            items.push(ListItem::new(Line::from(Span::styled(
                "All Day",
                Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ))));
            for (i, ev) in &all_day {
                items.push(format_event(ev, inner_w, *i == selected));
            }
            if !timed.is_empty() {
                items.push(ListItem::new(Line::from("")));
            }
        }

        for (i, ev) in &timed {
            items.push(format_event(ev, inner_w, *i == selected));
        }

        let list = List::new(items).block(block);
        frame.render_widget(list, area);
    }
}

fn format_event(ev: &DisplayEvent, max_width: usize, selected: bool) -> ListItem<'static> {
    let indicator = Span::styled(
        "  ",
        Style::default().bg(theme::current().category_color(&ev.record.category)),
    );

    let time_str = if ev.projected.time_label.is_empty() {
        " ".to_string()
    } else {
        format!(" {:>8} ", ev.projected.time_label)
    };
    let time_span = Span::styled(time_str.clone(), Style::default().add_modifier(Modifier::DIM));

    let title_style = if selected {
        theme::current().selected
    } else {
        Style::default()
    };
    let title_span = Span::styled(ev.record.title.clone(), title_style);

    let mut spans = vec![indicator, time_span, title_span];

    // Only show location if there's room
    let used = 2 + time_str.len() + ev.record.title.len();
    if let Some(ref loc) = ev.record.location {
        if used + 3 + loc.len() <= max_width {
            spans.push(Span::styled(format!(" @ {}", loc), theme::current().dim));
        }
    }

    ListItem::new(Line::from(spans))
}

/// Render the event detail popup overlay.
pub fn render_detail_popup(frame: &mut Frame, area: Rect, ev: &DisplayEvent, source: Tz, active: Tz) {
    let popup_w = area.width.clamp(30, 60);
    let popup_h = area.height.clamp(8, 16);
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h).intersection(area);

    frame.render_widget(Clear, popup_area);

    let color = theme::current().category_color(&ev.record.category);
    let block = Block::default()
        .title(format!(" {} ", ev.record.title))
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let dim = theme::current().dim;
    let mut category = ev.record.category.clone();
    if let Some(ref sub) = ev.record.subcategory {
        category = format!("{} / {}", category, sub);
    }

    let mut lines: Vec<Line> = vec![
        Line::from(vec![
            Span::styled("  ", Style::default().bg(color)),
            Span::raw(format!(" {} ", category)),
            Span::styled(format!("({})", class_for(&ev.record.category)), dim),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("When: ", dim),
            Span::raw(if ev.projected.time_label.is_empty() {
                ev.projected.date_label.clone()
            } else {
                format!("{} @ {} ({})", ev.projected.date_label, ev.projected.time_label, active.name())
            }),
        ]),
    ];

    if let Some(time) = ev.record.time {
        if source != active {
            lines.push(Line::from(vec![
                Span::styled("Listed: ", dim),
                Span::raw(format!(
                    "{} {} ({})",
                    ev.record.date.format("%a, %b %-d"),
                    format_clock_time(time),
                    source.name()
                )),
            ]));
        }
    }

    if let Some(ref loc) = ev.record.location {
        lines.push(Line::from(vec![
            Span::styled("Location: ", dim),
            Span::raw(loc.clone()),
        ]));
    }

    if let Some(ref notes) = ev.record.description {
        lines.push(Line::from(""));
        for line in notes.lines() {
            lines.push(Line::from(line.to_string()));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Press Esc to close", dim)));

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::timezone::convert_to_timezone;
    use crate::calendar::EventRecord;
    use chrono::NaiveTime;
    use ratatui::{backend::TestBackend, Terminal};

    fn text(terminal: &Terminal<TestBackend>) -> String {
        terminal.backend().buffer().content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_detail_popup_shows_both_zones() {
        let record = EventRecord::new("Premiere", NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(), "Release")
            .with_time(NaiveTime::from_hms_opt(18, 0, 0).unwrap())
            .with_location("Main St");
        let source = chrono_tz::America::Chicago;
        let active = chrono_tz::Europe::London;
        let projected = convert_to_timezone(record.date, record.time, source, active);
        let ev = DisplayEvent { record: &record, projected };

        let mut terminal = Terminal::new(TestBackend::new(70, 16)).unwrap();
        terminal
            .draw(|f| render_detail_popup(f, f.area(), &ev, source, active))
            .unwrap();
        let out = text(&terminal);
        assert!(out.contains("Premiere"));
        assert!(out.contains("Sun, Mar 2 @ 12:00 AM"));
        assert!(out.contains("Sat, Mar 1 6:00 PM"));
        assert!(out.contains("Main St"));
    }

    #[test]
    fn test_day_view_groups_all_day_first() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let timed = EventRecord::new("Show", date, "Concert").with_time(NaiveTime::from_hms_opt(20, 0, 0).unwrap());
        let untimed = EventRecord::new("Drop", date, "Release");
        let tz = chrono_tz::America::Chicago;
        let events = vec![
            DisplayEvent { record: &timed, projected: convert_to_timezone(date, timed.time, tz, tz) },
            DisplayEvent { record: &untimed, projected: convert_to_timezone(date, None, tz, tz) },
        ];
        let mut terminal = Terminal::new(TestBackend::new(50, 8)).unwrap();
        terminal.draw(|f| DayView::render(f, f.area(), date, &events, 0)).unwrap();
        let out = text(&terminal);
        let all_day = out.find("All Day").unwrap();
        let drop = out.find("Drop").unwrap();
        let show = out.find("Show").unwrap();
        assert!(all_day < drop && drop < show);
        assert!(out.contains("2 events"));
    }
}
