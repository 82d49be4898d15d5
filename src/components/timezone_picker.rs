use chrono_tz::Tz;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::calendar::timezone::{search, ZoneOption};
use crate::theme;

/// Searchable dropdown state over the zone catalogue.
#[derive(Debug, Clone, Default)]
pub struct TimezonePickerState {
    pub query: String,
    pub cursor: usize,
}

impl TimezonePickerState {
    /// Start with the cursor on the active zone.
    pub fn open(options: &[ZoneOption], active: Tz) -> Self {
        let cursor = options.iter().position(|o| o.zone == active).unwrap_or(0);
        Self {
            query: String::new(),
            cursor,
        }
    }

    pub fn input_char(&mut self, c: char) {
        self.query.push(c);
        self.cursor = 0;
    }

    pub fn backspace(&mut self) {
        self.query.pop();
        self.cursor = 0;
    }

    pub fn move_by(&mut self, delta: isize, total: usize) {
        if total == 0 {
            self.cursor = 0;
            return;
        }
        let next = self.cursor as isize + delta;
        self.cursor = next.clamp(0, total as isize - 1) as usize;
    }

    pub fn selected(&self, options: &[ZoneOption]) -> Option<Tz> {
        search(options, &self.query).get(self.cursor).map(|o| o.zone)
    }
}

pub struct TimezonePicker;

impl TimezonePicker {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        state: &TimezonePickerState,
        options: &[ZoneOption],
        active: Tz,
    ) {
        let popup_w = area.width.clamp(24, 48);
        let popup_h = area.height.clamp(6, 20);
        let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
        let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
        let popup_area = Rect::new(x, y, popup_w, popup_h).intersection(area);

        frame.render_widget(Clear, popup_area);

        let matches = search(options, &state.query);
        let block = Block::default()
            .title(" Timezone ")
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .title_bottom(Line::from(Span::styled(
                format!(" {} of {} ", matches.len(), options.len()),
                theme::current().dim,
            )))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let rows = Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).split(inner);

        let search_line = Line::from(vec![
            Span::styled("Search: ", theme::current().dim),
            Span::styled(format!("{}_", state.query), Style::default().fg(Color::Cyan)),
        ]);
        frame.render_widget(Paragraph::new(search_line), rows[0]);

        // Keep the cursor inside the visible window
        let height = rows[1].height as usize;
        let offset = state.cursor.saturating_sub(height.saturating_sub(1));

        let items: Vec<ListItem> = matches
            .iter()
            .enumerate()
            .skip(offset)
            .take(height)
            .map(|(i, option)| {
                let style = if i == state.cursor {
                    theme::current().selected
                } else if option.zone == active {
                    theme::current().highlight
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(Span::styled(option.label.clone(), style)))
            })
            .collect();

        if items.is_empty() {
            frame.render_widget(
                Paragraph::new("No matching zones").style(theme::current().dim),
                rows[1],
            );
        } else {
            frame.render_widget(List::new(items), rows[1]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::timezone::catalogue;

    #[test]
    fn test_open_puts_cursor_on_active_zone() {
        let options = catalogue();
        let state = TimezonePickerState::open(&options, chrono_tz::Europe::Paris);
        assert_eq!(state.selected(&options), Some(chrono_tz::Europe::Paris));
    }

    #[test]
    fn test_typing_filters_and_resets_cursor() {
        let options = catalogue();
        let mut state = TimezonePickerState::open(&options, chrono_tz::Europe::Paris);
        for c in "new york".chars() {
            state.input_char(c);
        }
        assert_eq!(state.cursor, 0);
        assert_eq!(state.selected(&options), Some(chrono_tz::America::New_York));
    }

    #[test]
    fn test_move_by_clamps() {
        let mut state = TimezonePickerState::default();
        state.move_by(-3, 10);
        assert_eq!(state.cursor, 0);
        state.move_by(25, 10);
        assert_eq!(state.cursor, 9);
        state.move_by(1, 0);
        assert_eq!(state.cursor, 0);
    }
}
