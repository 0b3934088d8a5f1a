//! Graphs tab: CPU, memory and network over the rolling window.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Color;
use ratatui::symbols::Marker;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType};

use crate::fmt::bytes_to_mib;
use crate::tui::state::AppState;
use crate::tui::style::{Styles, Theme};

/// Points indexed by position in the window, oldest at x = 0.
pub(crate) fn series_points(values: &[f64]) -> Vec<(f64, f64)> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| (i as f64, *v))
        .collect()
}

/// Cumulative byte counters as MB points.
pub(crate) fn mib_points(values: &[u64]) -> Vec<(f64, f64)> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| (i as f64, bytes_to_mib(*v)))
        .collect()
}

/// Y bounds covering every point, padded so flat lines stay visible.
pub(crate) fn y_bounds<'a>(series: impl IntoIterator<Item = &'a [(f64, f64)]>) -> [f64; 2] {
    let (min, max) = series
        .into_iter()
        .flat_map(|s| s.iter().map(|(_, y)| *y))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
            (lo.min(y), hi.max(y))
        });
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    let pad = ((max - min) * 0.05).max(0.5);
    [(min - pad).max(0.0), max + pad]
}

fn x_bounds(len: usize) -> [f64; 2] {
    [0.0, len.saturating_sub(1).max(1) as f64]
}

pub fn render_graphs(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::vertical([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .split(area);

    let snap = &state.snapshot;
    let cpu = series_points(&snap.cpu);
    let mem = series_points(&snap.mem);
    render_percent_chart(frame, chunks[0], " CPU Usage (%) ", "CPU", &cpu, Theme::CPU_COLOR);
    render_percent_chart(frame, chunks[1], " Memory Usage (%) ", "Memory", &mem, Theme::MEM_COLOR);

    let sent = mib_points(&snap.net_sent);
    let recv = mib_points(&snap.net_recv);
    let bounds = y_bounds([sent.as_slice(), recv.as_slice()]);
    let datasets = vec![
        line_dataset("Sent", &sent, Theme::NET_SENT_COLOR),
        line_dataset("Received", &recv, Theme::NET_RECV_COLOR),
    ];
    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Network Usage (MB) "),
        )
        .x_axis(Axis::default().bounds(x_bounds(sent.len())).style(Styles::dim()))
        .y_axis(
            Axis::default()
                .bounds(bounds)
                .labels(vec![
                    Span::raw(format!("{:.1}", bounds[0])),
                    Span::raw(format!("{:.1}", bounds[1])),
                ])
                .style(Styles::dim()),
        );
    frame.render_widget(chart, chunks[2]);
}

fn line_dataset<'a>(name: &'static str, points: &'a [(f64, f64)], color: Color) -> Dataset<'a> {
    Dataset::default()
        .name(name)
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Styles::series(color))
        .data(points)
}

fn render_percent_chart(
    frame: &mut Frame,
    area: Rect,
    title: &'static str,
    name: &'static str,
    points: &[(f64, f64)],
    color: Color,
) {
    let chart = Chart::new(vec![line_dataset(name, points, color)])
        .block(Block::default().borders(Borders::ALL).title(title))
        .x_axis(Axis::default().bounds(x_bounds(points.len())).style(Styles::dim()))
        .y_axis(
            Axis::default()
                .bounds([0.0, 100.0])
                .labels(vec![Span::raw("0"), Span::raw("50"), Span::raw("100")])
                .style(Styles::dim()),
        );
    frame.render_widget(chart, area);
}
