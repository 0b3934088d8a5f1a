//! Metrics tab: current readings and the process table.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Color;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table};

use crate::fmt::{format_mb, format_percent, truncate};
use crate::storage::{HostSample, ProcessInfo};
use crate::tui::state::AppState;
use crate::tui::style::{Styles, Theme};

const NAME_WIDTH: usize = 32;

pub fn render_metrics(frame: &mut Frame, area: Rect, state: &mut AppState) {
    let chunks = Layout::vertical([Constraint::Length(6), Constraint::Min(3)]).split(area);

    let snapshot = state.snapshot.clone();
    let lines = match snapshot.sample.as_ref() {
        Some(sample) => summary_lines(sample),
        None => vec![Line::styled("Waiting for first sample...", Styles::dim())],
    };
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Host ")),
        chunks[0],
    );

    // Two rows go to borders, one to the column header.
    state.page_size = usize::from(chunks[1].height.saturating_sub(3)).max(1);
    let processes = snapshot
        .sample
        .as_ref()
        .map(|s| s.processes.as_slice())
        .unwrap_or(&[]);
    render_process_table(frame, chunks[1], processes, state.process_scroll, state.page_size);
}

fn summary_lines(sample: &HostSample) -> Vec<Line<'static>> {
    let pct_line = |label: &'static str, pct: f64, color: Color| {
        Line::from(vec![
            Span::styled(label, Styles::label().fg(color)),
            Span::styled(format_percent(pct), Styles::percent_value(pct)),
        ])
    };
    vec![
        pct_line("CPU Usage: ", sample.cpu_percent, Theme::CPU_COLOR),
        pct_line("Memory Usage: ", sample.mem_percent, Theme::MEM_COLOR),
        pct_line("Disk Usage: ", sample.disk_percent, Theme::DISK_COLOR),
        Line::from(vec![
            Span::styled("Network Usage - ", Styles::label()),
            Span::raw(network_text(sample)),
        ]),
    ]
}

/// `"Sent: 10.00 MB, Received: 50.00 MB"`.
pub(crate) fn network_text(sample: &HostSample) -> String {
    format!(
        "Sent: {}, Received: {}",
        format_mb(sample.net_bytes_sent),
        format_mb(sample.net_bytes_recv)
    )
}

/// Table rows for the visible window of the process list.
pub(crate) fn process_rows(processes: &[ProcessInfo], scroll: usize, rows: usize) -> Vec<[String; 3]> {
    processes
        .iter()
        .skip(scroll)
        .take(rows)
        .map(|p| {
            [
                p.pid.to_string(),
                truncate(&p.name, NAME_WIDTH),
                format_mb(p.resident_memory_bytes),
            ]
        })
        .collect()
}

fn render_process_table(
    frame: &mut Frame,
    area: Rect,
    processes: &[ProcessInfo],
    scroll: usize,
    rows: usize,
) {
    let header = Row::new(["PID", "Name", "Memory Usage"]).style(Styles::table_header());
    let body = process_rows(processes, scroll, rows)
        .into_iter()
        .map(|cells| Row::new(cells).style(Styles::default()));

    let title = format!(" Processes ({}) ", processes.len());
    let table = Table::new(
        body,
        [
            Constraint::Length(8),
            Constraint::Min(16),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_text_uses_megabytes() {
        let sample = HostSample {
            net_bytes_sent: 10_485_760,
            net_bytes_recv: 52_428_800,
            ..Default::default()
        };
        assert_eq!(network_text(&sample), "Sent: 10.00 MB, Received: 50.00 MB");
    }

    #[test]
    fn process_rows_follow_scroll_window() {
        let processes: Vec<_> = (1..=5)
            .map(|pid| ProcessInfo::new(pid, format!("proc{pid}"), u64::from(pid) * 1_048_576))
            .collect();

        let rows = process_rows(&processes, 1, 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], ["2".to_string(), "proc2".to_string(), "2.00 MB".to_string()]);
        assert_eq!(rows[1][0], "3");

        assert!(process_rows(&processes, 10, 2).is_empty());
    }
}
