use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, InputMode, ViewMode};
use crate::theme;

pub struct StatusBar;

impl StatusBar {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let w = area.width as usize;
        let status = theme::current().status;

        let mode_str = match app.view_mode {
            ViewMode::List => "[1]List",
            ViewMode::Month => "[2]Month",
        };

        let focus = match app.input_mode {
            InputMode::Search => " [Search]",
            InputMode::Form => " [New Event]",
            InputMode::SignIn => " [Sign In]",
            InputMode::Timezone => " [Timezone]",
            InputMode::Categories => " [Categories]",
            InputMode::Normal => "",
        };

        let user = app
            .session
            .as_ref()
            .map(|s| format!(" {}", s.email))
            .unwrap_or_default();

        let left = format!(
            " {}{} {} {}{} ",
            mode_str,
            focus,
            app.query.scope.label(),
            app.timezone.name(),
            user
        );

        // Show status message if present, otherwise show width-aware hints
        let right = if let Some(ref msg) = app.status_message {
            format!(" {} ", msg)
        } else if app.loading {
            " Loading events... ".to_string()
        } else if w >= 100 {
            " a:Upcoming/All s:Sort z:Zone c:Categories /:Search n:New ?:Help q:Quit ".to_string()
        } else if w >= 60 {
            " a:Scope z:Zone c:Cat n:New ?:Help q:Quit ".to_string()
        } else {
            " ?:Help q:Quit ".to_string()
        };

        let padding = " ".repeat(w.saturating_sub(left.chars().count() + right.chars().count()));

        let line = Line::from(vec![
            Span::styled(left, status),
            Span::styled(padding, status),
            Span::styled(right, status),
        ]);

        frame.render_widget(Paragraph::new(line).style(status), area);
    }
}
