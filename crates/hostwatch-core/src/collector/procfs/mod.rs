//! Readers for the Linux `/proc` filesystem.

pub mod parser;
pub mod process;

pub use parser::ParseError;
pub use process::ProcessLister;
