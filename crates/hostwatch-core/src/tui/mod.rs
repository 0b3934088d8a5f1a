//! Terminal front end for a running sampler.
//!
//! Two tabs: live labels with a process table, and rolling charts of the
//! sampled windows.

mod app;
mod event;
mod input;
mod render;
pub(crate) mod state;
pub(crate) mod style;
mod widgets;

pub use app::App;
pub use state::{AppState, Status, StatusKind, Tab};
