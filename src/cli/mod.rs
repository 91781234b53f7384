//! CLI command handlers

pub mod commands;

pub use commands::{format_table, results, ties, top, ResultsOptions, TopOptions};
