//! Bottom status line: last sampler message, or key hints.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::widgets::Paragraph;

use crate::tui::state::AppState;
use crate::tui::style::Styles;

const HINTS: &str = " q:quit  1/2/Tab:tabs  +/-:interval  \u{2191}\u{2193}/PgUp/PgDn:scroll";

pub fn render_status(frame: &mut Frame, area: Rect, state: &AppState) {
    let line = match &state.status {
        Some(status) => Paragraph::new(format!(" {}", status.text)).style(Styles::status(status.kind)),
        None => Paragraph::new(HINTS).style(Styles::dim()),
    };
    frame.render_widget(line, area);
}
