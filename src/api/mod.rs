//! Results API server module
//!
//! HTTP front end for spreadsheet uploads and downloads.
//! Run with `talent-server`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server};
