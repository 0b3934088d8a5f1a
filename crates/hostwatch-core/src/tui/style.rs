//! Color scheme and styles.

use ratatui::style::{Color, Modifier, Style};

use super::state::StatusKind;

pub struct Theme;

impl Theme {
    pub const BG: Color = Color::Reset;
    pub const HEADER_BG: Color = Color::Blue;

    pub const FG: Color = Color::White;
    pub const FG_DIM: Color = Color::DarkGray;
    pub const HEADER_FG: Color = Color::White;

    pub const TAB_ACTIVE: Color = Color::Cyan;
    pub const TAB_INACTIVE: Color = Color::Gray;

    // Metric series
    pub const CPU_COLOR: Color = Color::Cyan;
    pub const MEM_COLOR: Color = Color::Magenta;
    pub const DISK_COLOR: Color = Color::Yellow;
    pub const NET_SENT_COLOR: Color = Color::Blue;
    pub const NET_RECV_COLOR: Color = Color::Green;

    pub const WARNING: Color = Color::Yellow;
    pub const CRITICAL: Color = Color::Red;
}

/// Pre-defined styles.
pub struct Styles;

impl Styles {
    pub fn default() -> Style {
        Style::default().fg(Theme::FG).bg(Theme::BG)
    }

    pub fn header() -> Style {
        Style::default()
            .fg(Theme::HEADER_FG)
            .bg(Theme::HEADER_BG)
            .add_modifier(Modifier::BOLD)
    }

    pub fn table_header() -> Style {
        Style::default()
            .fg(Theme::HEADER_FG)
            .bg(Theme::HEADER_BG)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab_active() -> Style {
        Style::default()
            .fg(Theme::TAB_ACTIVE)
            .bg(Theme::HEADER_BG)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab_inactive() -> Style {
        Style::default().fg(Theme::TAB_INACTIVE).bg(Theme::HEADER_BG)
    }

    pub fn dim() -> Style {
        Style::default().fg(Theme::FG_DIM)
    }

    pub fn label() -> Style {
        Style::default().add_modifier(Modifier::BOLD)
    }

    /// Value style that turns yellow above 75% and red above 90%.
    pub fn percent_value(pct: f64) -> Style {
        let fg = if pct >= 90.0 {
            Theme::CRITICAL
        } else if pct >= 75.0 {
            Theme::WARNING
        } else {
            Theme::FG
        };
        Style::default().fg(fg)
    }

    pub fn status(kind: StatusKind) -> Style {
        match kind {
            StatusKind::Info => Style::default().fg(Theme::FG),
            StatusKind::Warning => Style::default().fg(Theme::WARNING),
            StatusKind::Error => Style::default()
                .fg(Theme::CRITICAL)
                .add_modifier(Modifier::BOLD),
        }
    }

    pub fn series(color: Color) -> Style {
        Style::default().fg(color)
    }
}
