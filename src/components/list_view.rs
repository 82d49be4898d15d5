use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::DisplayEvent;
use crate::theme;

pub struct ListView;

impl ListView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        title: &str,
        events: &[DisplayEvent],
        selected: usize,
        footer: &str,
    ) {
        let block = Block::default()
            .title(format!(" {} ", title))
            .title_style(theme::current().header)
            .title_bottom(Line::from(Span::styled(format!(" {} ", footer), theme::current().dim)))
            .borders(Borders::ALL)
            .border_style(theme::current().border);

        if events.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let msg = Paragraph::new("No events to show").style(theme::current().dim);
            frame.render_widget(msg, inner);
            return;
        }

        let inner = block.inner(area);
        let height = inner.height as usize;
        let left_w = (inner.width as usize / 2).max(12);
        let offset = selected.saturating_sub(height.saturating_sub(1));

        let items: Vec<ListItem> = events
            .iter()
            .enumerate()
            .skip(offset)
            .take(height)
            .map(|(i, ev)| format_row(ev, left_w, i == selected))
            .collect();

        frame.render_widget(List::new(items).block(block), area);
    }
}

/// `date @ time` right aligned on the left, title badge on the right.
fn format_row(ev: &DisplayEvent, left_w: usize, selected: bool) -> ListItem<'static> {
    let when = if ev.projected.time_label.is_empty() {
        ev.projected.date_label.clone()
    } else {
        format!("{} @ {}", ev.projected.date_label, ev.projected.time_label)
    };
    let when_style = if selected {
        theme::current().selected
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    let mut title_style = theme::current().category_style(&ev.record.category);
    if selected {
        title_style = title_style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    }

    ListItem::new(Line::from(vec![
        Span::styled(format!("{:>width$}", when, width = left_w), when_style),
        Span::raw("  "),
        Span::styled(format!(" {} ", ev.record.title), title_style),
    ]))
}
