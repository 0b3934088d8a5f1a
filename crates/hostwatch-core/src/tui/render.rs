//! Main rendering logic for TUI.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use super::state::{AppState, Tab};
use super::widgets::{render_graphs, render_header, render_metrics, render_status};

/// Main render function.
pub fn render(frame: &mut Frame, state: &mut AppState) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Min(10),   // Content
        Constraint::Length(1), // Status
    ])
    .split(frame.area());

    render_header(frame, chunks[0], state);
    match state.current_tab {
        Tab::Metrics => render_metrics(frame, chunks[1], state),
        Tab::Graphs => render_graphs(frame, chunks[1], state),
    }
    render_status(frame, chunks[2], state);
}
