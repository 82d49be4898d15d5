use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::calendar::category::FilterRow;
use crate::calendar::CategoryFilter;
use crate::theme;

pub struct CategoryPanel;

impl CategoryPanel {
    pub fn render(frame: &mut Frame, area: Rect, filter: &CategoryFilter, cursor: usize) {
        let rows = filter.rows();

        let popup_w = area.width.clamp(24, 40);
        let popup_h = (rows.len() as u16 + 3).clamp(5, area.height.max(5));
        let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
        let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
        let popup_area = Rect::new(x, y, popup_w, popup_h).intersection(area);

        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(" Categories ")
            .title_style(Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD))
            .title_bottom(Line::from(Span::styled(
                " Space:Toggle a:All u:None Esc:Close ",
                theme::current().dim,
            )))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta));

        if rows.is_empty() {
            let inner = block.inner(popup_area);
            frame.render_widget(block, popup_area);
            frame.render_widget(
                Paragraph::new("No categories yet").style(theme::current().dim),
                inner,
            );
            return;
        }

        let height = block.inner(popup_area).height as usize;
        let offset = cursor.saturating_sub(height.saturating_sub(1));

        let items: Vec<ListItem> = rows
            .iter()
            .enumerate()
            .skip(offset)
            .take(height)
            .map(|(i, row)| {
                let indent = match row {
                    FilterRow::Category { .. } => "",
                    FilterRow::Subcategory { .. } => "    ",
                };
                let swatch = match row {
                    FilterRow::Category { name, .. } => {
                        Span::styled("  ", Style::default().bg(theme::current().category_color(name)))
                    }
                    FilterRow::Subcategory { .. } => Span::raw(""),
                };
                let style = if i == cursor {
                    theme::current().selected
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(vec![
                    Span::raw(indent),
                    Span::styled(format!("{} ", row.marker()), style),
                    Span::styled(row.label(), style),
                    Span::raw(" "),
                    swatch,
                ]))
            })
            .collect();

        frame.render_widget(List::new(items).block(block), popup_area);
    }
}
