use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::theme;

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("j/k", "Next/previous event (list), week (month)"),
            ("h/l", "Previous/next day"),
            ("[/]", "Previous/next month"),
            ("J/K", "Next/previous event of the day"),
            ("t", "Jump to today"),
        ],
    ),
    (
        "Views & filters",
        &[
            ("1/2", "List / Month view"),
            ("a", "Upcoming / All events"),
            ("s", "Sort ascending / descending"),
            ("z", "Choose timezone"),
            ("c", "Category filter"),
            ("/", "Search titles and places"),
        ],
    ),
    (
        "Actions",
        &[
            ("Enter", "Event details"),
            ("n", "Create new event"),
            ("i/o", "Sign in / sign out"),
            ("r", "Reload events"),
            ("q", "Quit"),
        ],
    ),
];

pub fn render_help(frame: &mut Frame, area: Rect) {
    let popup_w = area.width.clamp(30, 56);
    let popup_h = area.height.clamp(12, 24);
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h).intersection(area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Keybindings ")
        .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let section_style = Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED);

    let mut lines = Vec::new();
    for (i, (section, keys)) in SECTIONS.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(*section, section_style)));
        for (key, desc) in keys.iter() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<8}", key), key_style),
                Span::raw(*desc),
            ]));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Esc or ? to close", theme::current().dim)));

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}
