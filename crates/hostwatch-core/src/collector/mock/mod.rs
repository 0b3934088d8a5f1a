//! Test doubles: an in-memory `/proc` tree and a scripted probe.

mod filesystem;
mod probe;
mod scenarios;

pub use filesystem::MockFs;
pub use probe::{ScriptedProbe, Step};
