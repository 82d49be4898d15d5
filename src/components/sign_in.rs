use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::event_form::render_field;
use crate::remote::AuthAction;
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignInField {
    Email,
    Password,
}

impl SignInField {
    pub fn toggle(&self) -> Self {
        match self {
            SignInField::Email => SignInField::Password,
            SignInField::Password => SignInField::Email,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignInState {
    pub email: String,
    pub password: String,
    pub active_field: SignInField,
    pub error: Option<String>,
    pub pending: Option<AuthAction>,
}

impl Default for SignInState {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            active_field: SignInField::Email,
            error: None,
            pending: None,
        }
    }
}

impl SignInState {
    pub fn input_char(&mut self, c: char) {
        match self.active_field {
            SignInField::Email => self.email.push(c),
            SignInField::Password => self.password.push(c),
        }
    }

    pub fn backspace(&mut self) {
        match self.active_field {
            SignInField::Email => self.email.pop(),
            SignInField::Password => self.password.pop(),
        };
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }
}

pub struct SignInForm;

impl SignInForm {
    pub fn render(frame: &mut Frame, area: Rect, state: &SignInState) {
        let form_w = area.width.clamp(30, 52);
        let form_h = area.height.clamp(8, 9);
        let x = area.x + (area.width.saturating_sub(form_w)) / 2;
        let y = area.y + (area.height.saturating_sub(form_h)) / 2;
        let form_area = Rect::new(x, y, form_w, form_h).intersection(area);

        frame.render_widget(Clear, form_area);

        let block = Block::default()
            .title(" Please sign in ")
            .title_style(Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue));

        let inner = block.inner(form_area);
        frame.render_widget(block, form_area);

        let rows = Layout::vertical([
            Constraint::Length(1), // email
            Constraint::Length(1), // password
            Constraint::Length(1), // spacer
            Constraint::Length(1), // error / progress
            Constraint::Length(1), // help
            Constraint::Min(0),
        ])
        .split(inner);

        let masked = "*".repeat(state.password.chars().count());
        render_field(frame, rows[0], "Email:", &state.email, state.active_field == SignInField::Email);
        render_field(frame, rows[1], "Pass:", &masked, state.active_field == SignInField::Password);

        if let Some(action) = state.pending {
            frame.render_widget(
                Paragraph::new(action.pending_label()).style(theme::current().dim),
                rows[3],
            );
        } else if let Some(ref err) = state.error {
            frame.render_widget(Paragraph::new(err.as_str()).style(theme::ERROR_STYLE), rows[3]);
        }

        let key = Style::default().add_modifier(Modifier::BOLD);
        let help = Line::from(vec![
            Span::styled("Enter", key),
            Span::styled(":Sign in ", theme::current().dim),
            Span::styled("^R", key),
            Span::styled(":Register ", theme::current().dim),
            Span::styled("Esc", key),
            Span::styled(":Cancel", theme::current().dim),
        ]);
        frame.render_widget(Paragraph::new(help), rows[4]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_goes_to_active_field() {
        let mut state = SignInState::default();
        for c in "me@x.io".chars() {
            state.input_char(c);
        }
        state.active_field = state.active_field.toggle();
        state.input_char('p');
        state.input_char('w');
        state.backspace();
        assert_eq!(state.email, "me@x.io");
        assert_eq!(state.password, "p");
        assert!(!state.is_busy());
    }
}
