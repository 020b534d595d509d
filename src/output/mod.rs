//! Output formatting module
//!
//! Renders gateway answers for the command line.

mod formatter;

pub use formatter::{OutputFormat, ResponseFormatter};
