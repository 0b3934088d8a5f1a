//! TUI widgets.

mod graphs;
mod header;
mod metrics;
mod status;

pub use graphs::render_graphs;
pub use header::render_header;
pub use metrics::render_metrics;
pub use status::render_status;
