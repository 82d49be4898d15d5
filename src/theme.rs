use std::collections::BTreeMap;
use std::sync::OnceLock;

use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

use crate::calendar::category::class_for;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Install the theme built from config. Only the first call wins.
pub fn init(config: &ThemeConfig) {
    let theme = config.clone().into_theme();
    log::debug!("Using theme {}", theme.name);
    let _ = THEME.set(theme);
}

/// Get the active theme (default until `init` runs).
pub fn current() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

// Const fallbacks used in places that need compile-time styles
pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::White)
    .add_modifier(Modifier::BOLD);
pub const DIM_STYLE: Style = Style::new().fg(Color::DarkGray);
pub const BORDER_STYLE: Style = Style::new().fg(Color::Gray);
pub const STATUS_STYLE: Style = Style::new().fg(Color::White).bg(Color::DarkGray);
pub const SELECTED_STYLE: Style = Style::new().fg(Color::Black).bg(Color::Cyan);
pub const TODAY_STYLE: Style = Style::new().fg(Color::Black).bg(Color::Yellow);
pub const ERROR_STYLE: Style = Style::new().fg(Color::LightRed);

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub today: Style,
    pub selected: Style,
    pub header: Style,
    pub dim: Style,
    pub border: Style,
    pub status: Style,
    pub highlight: Style,
    /// Colours keyed by category class (`concert`, `football`, ...).
    pub categories: BTreeMap<String, Color>,
}

fn default_category_colors() -> BTreeMap<String, Color> {
    [
        ("concert", Color::Magenta),
        ("ceremony", Color::Yellow),
        ("release", Color::Cyan),
        ("football", Color::Green),
        ("other", Color::Gray),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            today: TODAY_STYLE,
            selected: SELECTED_STYLE,
            header: HEADER_STYLE,
            dim: DIM_STYLE,
            border: BORDER_STYLE,
            status: STATUS_STYLE,
            highlight: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            categories: default_category_colors(),
        }
    }
}

impl Theme {
    /// Get a built-in preset by name.
    pub fn preset(name: &str) -> Self {
        match name {
            "dracula" => Self::dracula(),
            "nord" => Self::nord(),
            _ => Self::default(),
        }
    }

    fn dracula() -> Self {
        let mut categories = default_category_colors();
        categories.insert("concert".into(), Color::Rgb(255, 121, 198)); // pink
        categories.insert("ceremony".into(), Color::Rgb(241, 250, 140)); // yellow
        categories.insert("release".into(), Color::Rgb(139, 233, 253)); // cyan
        categories.insert("football".into(), Color::Rgb(80, 250, 123)); // green
        Self {
            name: "dracula".to_string(),
            today: Style::default().fg(Color::Black).bg(Color::Rgb(189, 147, 249)),
            selected: Style::default().fg(Color::Black).bg(Color::Rgb(139, 233, 253)),
            header: Style::default().fg(Color::Rgb(248, 248, 242)).add_modifier(Modifier::BOLD),
            dim: Style::default().fg(Color::Rgb(98, 114, 164)),
            border: Style::default().fg(Color::Rgb(68, 71, 90)),
            status: Style::default()
                .fg(Color::Rgb(248, 248, 242))
                .bg(Color::Rgb(68, 71, 90)),
            highlight: Style::default()
                .bg(Color::Rgb(68, 71, 90))
                .add_modifier(Modifier::BOLD),
            categories,
        }
    }

    fn nord() -> Self {
        let mut categories = default_category_colors();
        categories.insert("concert".into(), Color::Rgb(180, 142, 173));
        categories.insert("ceremony".into(), Color::Rgb(235, 203, 139));
        categories.insert("release".into(), Color::Rgb(136, 192, 208));
        categories.insert("football".into(), Color::Rgb(163, 190, 140));
        Self {
            name: "nord".to_string(),
            today: Style::default().fg(Color::Black).bg(Color::Rgb(235, 203, 139)),
            selected: Style::default().fg(Color::Black).bg(Color::Rgb(136, 192, 208)),
            header: Style::default().fg(Color::Rgb(229, 233, 240)).add_modifier(Modifier::BOLD),
            dim: Style::default().fg(Color::Rgb(76, 86, 106)),
            border: Style::default().fg(Color::Rgb(67, 76, 94)),
            status: Style::default()
                .fg(Color::Rgb(229, 233, 240))
                .bg(Color::Rgb(67, 76, 94)),
            highlight: Style::default()
                .bg(Color::Rgb(67, 76, 94))
                .add_modifier(Modifier::BOLD),
            categories,
        }
    }

    pub fn category_color(&self, category: &str) -> Color {
        let class = class_for(category);
        self.categories
            .get(class)
            .or_else(|| self.categories.get("other"))
            .copied()
            .unwrap_or(Color::Gray)
    }

    /// Badge style for an event title of this category.
    pub fn category_style(&self, category: &str) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(self.category_color(category))
    }
}

// ── TOML config types ──

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    pub preset: Option<String>,
    pub today_fg: Option<String>,
    pub today_bg: Option<String>,
    pub selected_fg: Option<String>,
    pub selected_bg: Option<String>,
    pub header_fg: Option<String>,
    pub dim_fg: Option<String>,
    pub border_fg: Option<String>,
    pub status_fg: Option<String>,
    pub status_bg: Option<String>,
    /// Category class to colour, e.g. `football = "#00aa00"`.
    pub categories: BTreeMap<String, String>,
}

impl ThemeConfig {
    pub fn into_theme(self) -> Theme {
        // Start from preset or default
        let mut theme = self
            .preset
            .as_deref()
            .map(Theme::preset)
            .unwrap_or_default();

        // Override individual colors
        if let Some(c) = self.today_fg.as_deref().and_then(parse_color) {
            theme.today = theme.today.fg(c);
        }
        if let Some(c) = self.today_bg.as_deref().and_then(parse_color) {
            theme.today = theme.today.bg(c);
        }
        if let Some(c) = self.selected_fg.as_deref().and_then(parse_color) {
            theme.selected = theme.selected.fg(c);
        }
        if let Some(c) = self.selected_bg.as_deref().and_then(parse_color) {
            theme.selected = theme.selected.bg(c);
        }
        if let Some(c) = self.header_fg.as_deref().and_then(parse_color) {
            theme.header = theme.header.fg(c);
        }
        if let Some(c) = self.dim_fg.as_deref().and_then(parse_color) {
            theme.dim = theme.dim.fg(c);
        }
        if let Some(c) = self.border_fg.as_deref().and_then(parse_color) {
            theme.border = theme.border.fg(c);
        }
        if let Some(c) = self.status_fg.as_deref().and_then(parse_color) {
            theme.status = theme.status.fg(c);
        }
        if let Some(c) = self.status_bg.as_deref().and_then(parse_color) {
            theme.status = theme.status.bg(c);
        }
        for (class, value) in &self.categories {
            match parse_color(value) {
                Some(c) => {
                    theme.categories.insert(class.to_lowercase(), c);
                }
                None => log::warn!("Ignoring unknown colour {:?} for category {}", value, class),
            }
        }

        theme
    }
}

/// Parse a color string: hex "#rrggbb", or named colors.
fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if s.starts_with('#') && s.len() == 7 {
        let r = u8::from_str_radix(&s[1..3], 16).ok()?;
        let g = u8::from_str_radix(&s[3..5], 16).ok()?;
        let b = u8::from_str_radix(&s[5..7], 16).ok()?;
        return Some(Color::Rgb(r, g, b));
    }
    match s.to_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "gray" | "grey" => Some(Color::Gray),
        "darkgray" | "darkgrey" => Some(Color::DarkGray),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#ff0080"), Some(Color::Rgb(255, 0, 128)));
        assert_eq!(parse_color(" Grey "), Some(Color::Gray));
        assert_eq!(parse_color("#ff00"), None);
        assert_eq!(parse_color("mauve"), None);
    }

    #[test]
    fn test_category_color_falls_back_to_other() {
        let theme = Theme::default();
        assert_eq!(theme.category_color("Football"), Color::Green);
        assert_eq!(theme.category_color("Birthday"), Color::Gray);
    }

    #[test]
    fn test_config_overrides_category_colors() {
        let mut config = ThemeConfig {
            preset: Some("nord".to_string()),
            ..Default::default()
        };
        config.categories.insert("Football".into(), "#010203".into());
        config.categories.insert("concert".into(), "nonsense".into());
        let theme = config.into_theme();
        assert_eq!(theme.name, "nord");
        assert_eq!(theme.category_color("Football"), Color::Rgb(1, 2, 3));
        assert_eq!(theme.category_color("Concert"), Color::Rgb(180, 142, 173));
    }
}
