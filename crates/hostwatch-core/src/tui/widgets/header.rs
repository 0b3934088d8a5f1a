//! Header widget showing sample time, tabs and refresh interval.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::fmt::{format_clock, format_interval};
use crate::storage::model::now_millis;
use crate::tui::state::{AppState, Tab};
use crate::tui::style::Styles;

/// Renders the header bar.
pub fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::horizontal([
        Constraint::Length(10), // Time
        Constraint::Min(20),    // Tabs
        Constraint::Length(28), // Interval / sequence
    ])
    .split(area);

    let taken_at = state.snapshot.taken_at().unwrap_or_else(now_millis);
    let time = Paragraph::new(format!(" {}", format_clock(taken_at))).style(Styles::header());
    frame.render_widget(time, chunks[0]);

    let tabs: Vec<Span> = Tab::all()
        .iter()
        .enumerate()
        .flat_map(|(i, tab)| {
            let style = if *tab == state.current_tab {
                Styles::tab_active()
            } else {
                Styles::tab_inactive()
            };
            vec![
                Span::styled(format!(" {}:", i + 1), Styles::tab_inactive()),
                Span::styled(format!("{} ", tab.name()), style),
            ]
        })
        .collect();
    frame.render_widget(
        Paragraph::new(Line::from(tabs)).style(Styles::header()),
        chunks[1],
    );

    let info = if state.snapshot.is_unstarted() {
        format!("every {}  waiting ", format_interval(state.interval))
    } else {
        format!(
            "every {}  #{} ",
            format_interval(state.interval),
            state.snapshot.sequence
        )
    };
    frame.render_widget(
        Paragraph::new(info)
            .style(Styles::header())
            .alignment(ratatui::layout::Alignment::Right),
        chunks[2],
    );
}
